// src/models/photo.rs

//! Photo data structures: the raw search hit as the service returns it and
//! the harvested occurrence record built from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use super::terms::Term;

/// Number-or-string helper for the service's loosely typed JSON. Coordinates
/// and epoch timestamps arrive as strings in some response modes and as
/// numbers in others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(f64),
    Str(String),
}

fn de_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    match Option::<NumOrStr>::deserialize(d)? {
        Some(NumOrStr::Num(n)) => Ok(n),
        Some(NumOrStr::Str(s)) => Ok(s.trim().parse().unwrap_or(0.0)),
        None => Ok(0.0),
    }
}

fn de_epoch<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(de_f64(d)? as i64)
}

fn de_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Option::<NumOrStr>::deserialize(d)? {
        Some(NumOrStr::Num(n)) => Ok(n.to_string()),
        Some(NumOrStr::Str(s)) => Ok(s),
        None => Ok(String::new()),
    }
}

/// Nested `{"_content": "..."}` wrapper used for description bodies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    #[serde(rename = "_content", default)]
    pub content: String,
}

/// One raw hit from the photo search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    pub id: String,

    #[serde(default)]
    pub owner: String,

    #[serde(default, rename = "ownername")]
    pub owner_name: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: Content,

    /// License code; a number in the wire format.
    #[serde(default, deserialize_with = "de_string")]
    pub license: String,

    /// Upload time as epoch seconds. This is the sort key the search service
    /// pages by, and what window narrowing keys on.
    #[serde(default, rename = "dateupload", deserialize_with = "de_epoch")]
    pub date_upload: i64,

    /// Capture time ("date taken"), if the photographer recorded one.
    #[serde(default, rename = "datetaken")]
    pub date_taken: String,

    #[serde(default, deserialize_with = "de_f64")]
    pub latitude: f64,

    #[serde(default, deserialize_with = "de_f64")]
    pub longitude: f64,

    /// Geocoding accuracy level; 0 means the photo carries no geo block.
    #[serde(default, deserialize_with = "de_epoch")]
    pub accuracy: i64,

    /// Original-resolution image URL; absent when the owner restricts access.
    #[serde(default, rename = "url_o")]
    pub url_original: Option<String>,

    /// Large-resolution fallback URL.
    #[serde(default, rename = "url_l")]
    pub url_large: Option<String>,

    /// Square thumbnail URL.
    #[serde(default, rename = "url_sq")]
    pub url_thumbnail: Option<String>,
}

impl SearchHit {
    /// Geo block, if the photo is geocoded at all.
    pub fn geo(&self) -> Option<(f64, f64, i64)> {
        if self.accuracy == 0 && self.latitude == 0.0 && self.longitude == 0.0 {
            None
        } else {
            Some((self.latitude, self.longitude, self.accuracy))
        }
    }

    /// Public page URL for the photo.
    pub fn page_url(&self) -> String {
        format!("https://www.flickr.com/photos/{}/{}", self.owner, self.id)
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    /// Page count the service claims for this query; capped by the ceiling.
    pub pages: u32,
    pub total: u64,
}

/// A harvested occurrence candidate, immutable once constructed.
///
/// The extractor either produces a record with a scientific name or nothing;
/// partially filled records never reach the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRecord {
    pub id: String,
    pub link: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub title: String,
    pub description: String,
    pub license: String,
    pub owner: String,
    pub photographer: String,
    /// Date the photo depicts, distinct from the upload date.
    pub date_recorded: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<i64>,
    pub scientific_name: String,
    /// Recognized machine-tag attributes not hard-typed above.
    pub attributes: BTreeMap<Term, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_deserializes_stringly_numbers() {
        let json = r#"{
            "id": "123",
            "owner": "42@N01",
            "ownername": "someone",
            "title": "a fir",
            "license": 4,
            "dateupload": "1592041200",
            "latitude": "40.5",
            "longitude": -3.25,
            "accuracy": "12",
            "url_sq": "https://live.example/sq.jpg"
        }"#;
        let hit: SearchHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.license, "4");
        assert_eq!(hit.date_upload, 1_592_041_200);
        assert_eq!(hit.geo(), Some((40.5, -3.25, 12)));
        assert!(hit.url_original.is_none());
    }

    #[test]
    fn test_hit_without_geo() {
        let hit: SearchHit = serde_json::from_str(r#"{"id": "9"}"#).unwrap();
        assert_eq!(hit.geo(), None);
        assert_eq!(hit.page_url(), "https://www.flickr.com/photos//9");
    }
}
