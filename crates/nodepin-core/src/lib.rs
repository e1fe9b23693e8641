//! Version resolution logic shared by the nodepin binary and backends.
//!
//! This crate has no knowledge of prompts or concrete version managers:
//! - Release catalog model, validation and fetching.
//! - Nearest-version suggestions around a target version.
//! - Verified download of version-manager installer scripts.

mod catalog;
mod install_script;
mod suggest;

/// Release catalog model, parser and fetch helper.
pub use catalog::{
    Catalog, CatalogError, DEFAULT_CATALOG_URL, LtsStatus, ReleaseRecord, fetch_release_catalog,
    parse_release_catalog,
};
/// Installer script download helper with retry and optional checksum pin.
pub use install_script::{InstallScriptError, download_install_script};
/// Suggestion engine.
pub use suggest::{
    DEFAULT_SUGGESTION_LIMIT, SuggestError, SuggestionSet, suggest, suggest_with_limit,
};
