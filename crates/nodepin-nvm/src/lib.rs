mod backend;
mod client;
mod detection;
mod output;
mod provider;

pub use backend::NvmBackend;
pub use client::{NvmClient, NvmEnvironment, NvmTimeouts};
pub use detection::{NvmDetection, NvmVariant};
pub use output::{check_install_output, classify_use_output, parse_current};
pub use provider::NvmProvider;

pub use nodepin_backend::{
    BackendDetection, BackendError, BackendInfo, BackendProvider, InstallGuidance,
    ManagerCapabilities, UseOutcome, VersionManager,
};
