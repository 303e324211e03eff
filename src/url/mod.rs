//! URL handling module for a11y-beacon
//!
//! Canonicalizes externally supplied URLs into a stable identity key so
//! that results and scheduled targets arriving through different entry
//! points (manual, scheduled, sitemap) deduplicate correctly.

mod normalize;

pub use normalize::normalize_url;
