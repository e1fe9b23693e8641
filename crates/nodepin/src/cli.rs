use clap::Parser;
use std::path::PathBuf;

use crate::settings::AppSettings;

/// Make the active Node.js version match the project's `.nvmrc`.
#[derive(Debug, Parser)]
#[command(name = "nodepin", version, about)]
pub struct Cli {
    /// Version declaration file [default: .nvmrc]
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Install nvm without asking when it is missing
    #[arg(long)]
    pub auto_install_nvm: bool,

    /// Release index to suggest versions from
    #[arg(long, value_name = "URL")]
    pub catalog_url: Option<String>,

    /// nvm installation directory [default: $NVM_DIR or ~/.nvm]
    #[arg(long, value_name = "DIR")]
    pub nvm_dir: Option<PathBuf>,

    /// Write debug logs
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(file) = &self.file {
            settings.declaration_file.clone_from(file);
        }
        if let Some(url) = &self.catalog_url {
            settings.catalog_url.clone_from(url);
        }
        if self.nvm_dir.is_some() {
            settings.nvm_dir.clone_from(&self.nvm_dir);
        }
        settings.auto_install_backend |= self.auto_install_nvm;
        settings.debug_logging |= self.debug;
    }
}
