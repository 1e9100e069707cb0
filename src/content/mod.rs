//! Content classification and rendering.
//!
//! # Responsibilities
//! - Map store paths to the content type they are served with
//! - Render diagnostic pages from store templates
//!
//! # Design Decisions
//! - Classification is total: unknown extensions fall back to octet-stream
//! - Script and markup types always carry an explicit utf-8 charset

pub mod mime;
pub mod template;

pub use mime::classify;
