// src/lib.rs

//! Flickr occurrence harvester library

pub mod error;
pub mod models;
pub mod services;
pub mod sink;
pub mod storage;
