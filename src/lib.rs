//! Trend-ranked news digest.
//!
//! Pulls a week of articles for a topic, learns which title terms are
//! trending, then ranks yesterday's articles by those terms and writes the
//! top ones to a YAML data file for a static site.

pub mod config;
pub mod domain;
pub mod errors;
pub mod services;
pub mod sources;
pub mod storage;
pub mod text;
