//! # lng
//!
//! Flat-file localization tables: an ordered key file joined by row index
//! to one line-aligned text file per language, with editor-time mutation
//! and runtime lookup with fallback. The persisted format is plain text,
//! deliberately hand-editable.

pub mod config;
pub mod error;
pub mod language;
pub mod lines;
pub mod search;
pub mod store;

pub use error::StoreError;
pub use language::Language;
pub use lines::{DirSource, LineSource, PackSource};
pub use store::{normalize_key, LngStore, ERROR_KEY, NAME_KEY};
