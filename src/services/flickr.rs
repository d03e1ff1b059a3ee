// src/services/flickr.rs

//! Flickr REST client.
//!
//! Two calls are consumed: the paged photo search and the per-photo raw tag
//! list (search hits do not include parsed tags). Both sit behind the
//! [`PhotoSearch`] trait so sessions can be driven by a mock in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{FlickrConfig, SearchHit, SearchPage, SearchWindow};

/// Capability interface over the photo search service.
#[async_trait]
pub trait PhotoSearch: Send + Sync {
    /// Fetch one page of hits for the window's current bounds and page.
    async fn search(&self, window: &SearchWindow, page_size: u32) -> Result<SearchPage>;

    /// Fetch the full raw tag list for one photo.
    async fn fetch_tags(&self, photo_id: &str) -> Result<Vec<String>>;
}

/// HTTP client for the Flickr REST endpoint.
pub struct FlickrClient {
    config: FlickrConfig,
    client: Client,
}

/// Extras requested with every search so hits arrive self-contained.
const SEARCH_EXTRAS: &str =
    "description,license,date_upload,date_taken,owner_name,geo,url_o,url_l,url_sq";

impl FlickrClient {
    /// Create a new client from connection settings.
    pub fn new(config: FlickrConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn method_url(&self, method: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.endpoint)?;
        url.query_pairs_mut()
            .append_pair("method", method)
            .append_pair("api_key", &self.config.api_key)
            .append_pair("format", "json")
            .append_pair("nojsoncallback", "1");
        Ok(url)
    }
}

fn de_u64<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(u64),
        Str(String),
    }
    match Option::<NumOrStr>::deserialize(d)? {
        Some(NumOrStr::Num(n)) => Ok(n),
        Some(NumOrStr::Str(s)) => Ok(s.trim().parse().unwrap_or(0)),
        None => Ok(0),
    }
}

#[derive(Debug, Default, Deserialize)]
struct PhotosBlock {
    #[serde(default)]
    pages: u32,
    #[serde(default, deserialize_with = "de_u64")]
    total: u64,
    #[serde(default)]
    photo: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    photos: PhotosBlock,
    #[serde(default)]
    stat: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawTag {
    #[serde(default)]
    raw: String,
}

#[derive(Debug, Default, Deserialize)]
struct TagList {
    #[serde(default)]
    tag: Vec<RawTag>,
}

#[derive(Debug, Default, Deserialize)]
struct TagPhoto {
    #[serde(default)]
    tags: TagList,
}

#[derive(Debug, Deserialize)]
struct TagEnvelope {
    #[serde(default)]
    photo: TagPhoto,
    #[serde(default)]
    stat: String,
    #[serde(default)]
    message: String,
}

#[async_trait]
impl PhotoSearch for FlickrClient {
    async fn search(&self, window: &SearchWindow, page_size: u32) -> Result<SearchPage> {
        let mut url = self.method_url("flickr.photos.search")?;
        url.query_pairs_mut()
            .append_pair("machine_tags", &self.config.machine_tags)
            .append_pair("machine_tag_mode", "any")
            .append_pair("license", &self.config.licenses)
            .append_pair("min_upload_date", &window.lower.to_string())
            .append_pair("max_upload_date", &window.upper.to_string())
            .append_pair("sort", "date-posted-desc")
            .append_pair("extras", SEARCH_EXTRAS)
            .append_pair("per_page", &page_size.to_string())
            .append_pair("page", &window.page.to_string());

        let envelope: SearchEnvelope = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if envelope.stat != "ok" {
            return Err(AppError::api(
                format!("search year={} page={}", window.year, window.page),
                envelope.message,
            ));
        }

        Ok(SearchPage {
            hits: envelope.photos.photo,
            pages: envelope.photos.pages,
            total: envelope.photos.total,
        })
    }

    async fn fetch_tags(&self, photo_id: &str) -> Result<Vec<String>> {
        let mut url = self.method_url("flickr.tags.getListPhoto")?;
        url.query_pairs_mut().append_pair("photo_id", photo_id);

        let envelope: TagEnvelope = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if envelope.stat != "ok" {
            return Err(AppError::api(
                format!("tags photo={photo_id}"),
                envelope.message,
            ));
        }

        Ok(envelope
            .photo
            .tags
            .tag
            .into_iter()
            .map(|t| t.raw)
            .collect())
    }
}
