// src/services/extract.rs

//! Record extraction.
//!
//! Turns one raw search hit plus its raw machine tags into a [`PhotoRecord`].
//! Extraction is all-or-nothing: without a resolved scientific name there is
//! no record, never a partially filled one.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{PhotoRecord, SearchHit, Term, term_for_tag};
use crate::services::PhotoSearch;

/// `namespace:key=value` machine-tag shape. Keys are matched
/// case-insensitively by the term table; values keep their case.
static MACHINE_TAG: OnceLock<Regex> = OnceLock::new();

fn machine_tag_re() -> &'static Regex {
    MACHINE_TAG.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_]+:[A-Za-z0-9_]+)=(.+)$").expect("static regex")
    })
}

/// Fetch the photo's raw tags and extract a record.
///
/// The tag lookup is one extra network call per candidate. Its failure is
/// non-fatal: the hit is extracted as if it carried no tags at all, which
/// normally discards it for lack of a scientific name.
pub async fn extract_via(search: &dyn PhotoSearch, hit: &SearchHit) -> Option<PhotoRecord> {
    let raw_tags = match search.fetch_tags(&hit.id).await {
        Ok(tags) => tags,
        Err(e) => {
            log::warn!("Tag lookup failed for photo {}: {}. Proceeding untagged.", hit.id, e);
            Vec::new()
        }
    };
    extract(hit, &raw_tags)
}

/// Build a record from a hit and its already-fetched raw tag list.
pub fn extract(hit: &SearchHit, raw_tags: &[String]) -> Option<PhotoRecord> {
    // Hard-typed fields come straight from the hit's own metadata.
    let (mut latitude, mut longitude, mut accuracy) = (None, None, None);
    if let Some((lat, lon, acc)) = hit.geo() {
        latitude = Some(lat);
        longitude = Some(lon);
        accuracy = Some(acc);
    }

    // Original resolution preferred; owners can restrict it, in which case
    // the large rendition stands in.
    let image_url = hit
        .url_original
        .clone()
        .or_else(|| hit.url_large.clone())
        .unwrap_or_default();

    let mut scientific_name = String::new();
    let mut attributes: BTreeMap<Term, String> = BTreeMap::new();

    for raw in raw_tags {
        let Some(caps) = machine_tag_re().captures(raw.trim()) else {
            continue; // plain keyword tag
        };
        let key = &caps[1];
        let value = caps[2].trim();
        let Some(term) = term_for_tag(key) else {
            continue;
        };

        match term {
            Term::ScientificName => {
                if !value.is_empty() {
                    scientific_name = value.to_string();
                }
            }
            Term::DecimalLatitude | Term::DecimalLongitude => {
                match value.parse::<f64>() {
                    // The hit's own geo block is authoritative; tags only
                    // fill coordinates the service did not provide.
                    Ok(v) if term == Term::DecimalLatitude => {
                        latitude.get_or_insert(v);
                    }
                    Ok(v) => {
                        longitude.get_or_insert(v);
                    }
                    Err(_) => {
                        log::debug!(
                            "Photo {}: dropping non-numeric {}={:?}",
                            hit.id,
                            term.column(),
                            value
                        );
                    }
                }
            }
            term if term.is_numeric() => {
                if value.parse::<f64>().is_ok() {
                    attributes.insert(term, value.to_string());
                } else {
                    log::debug!(
                        "Photo {}: dropping non-numeric {}={:?}",
                        hit.id,
                        term.column(),
                        value
                    );
                }
            }
            term => {
                attributes.insert(term, value.to_string());
            }
        }
    }

    if scientific_name.is_empty() {
        return None;
    }

    Some(PhotoRecord {
        id: hit.id.clone(),
        link: hit.page_url(),
        image_url,
        thumbnail_url: hit.url_thumbnail.clone().unwrap_or_default(),
        title: hit.title.clone(),
        description: hit.description.content.clone(),
        license: hit.license.clone(),
        owner: hit.owner.clone(),
        photographer: hit.owner_name.clone(),
        date_recorded: (!hit.date_taken.is_empty()).then(|| hit.date_taken.clone()),
        latitude,
        longitude,
        accuracy,
        scientific_name,
        attributes,
    })
}
