mod error;
mod traits;
pub mod version;

pub use error::BackendError;
pub use traits::{
    BackendDetection, BackendInfo, BackendProvider, InstallGuidance, ManagerCapabilities,
    UseOutcome, VersionManager,
};
pub use version::{InvalidVersionReason, VersionParseError, compare, normalize, parse_version};
