//! The per-project version declaration file (`.nvmrc` by default).

use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Missing,
    Empty,
    /// Raw trimmed contents, not yet validated.
    Declared(String),
}

pub fn read_declaration(path: &Path) -> io::Result<Declaration> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let trimmed = contents.trim();
            if trimmed.is_empty() {
                Ok(Declaration::Empty)
            } else {
                Ok(Declaration::Declared(trimmed.to_string()))
            }
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Declaration::Missing),
        Err(error) => Err(error),
    }
}

/// Replace the declaration with `version` plus a trailing newline.
///
/// The contents go to a sibling temporary file first and are renamed into
/// place, so readers never observe a partially written declaration.
pub fn write_declaration(path: &Path, version: &str) -> io::Result<()> {
    let version = version.trim();
    if version.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "refusing to write an empty version",
        ));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(version.as_bytes())?;
    temp.write_all(b"\n")?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|error| error.error)?;
    Ok(())
}
