//! Loading columnar files into an in-memory [`crate::types::DataSet`].
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]) which auto-detects the format
//! by file extension and infers the schema when none is given.
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`parquet`]

use std::collections::HashSet;

use crate::error::{IngestionError, IngestionResult};

pub mod csv;
pub mod parquet;
pub mod unified;

pub use unified::{IngestionFormat, LoadOptions, ingest_from_path};

/// Fails on the first name that appears twice; `origin` says where the names came from.
pub(crate) fn ensure_unique_names<'a>(
    origin: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> IngestionResult<()> {
    let mut seen = HashSet::new();
    match names.into_iter().find(|name| !seen.insert(*name)) {
        Some(duplicate) => Err(IngestionError::SchemaMismatch {
            message: format!("duplicate column '{duplicate}' in {origin}"),
        }),
        None => Ok(()),
    }
}
