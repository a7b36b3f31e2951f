//! Storage locations and the working directory derived from them.

use crate::config::PrefixStrip;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const S3_SCHEME: &str = "s3://";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("storage location is empty")]
    Empty,
    #[error("storage location {0:?} leaves no directory name once the scheme is removed")]
    NoDirectoryName(String),
    #[error("working directory {0:?} would escape the launch directory")]
    Escapes(String),
}

/// Remove the storage scheme from `location` according to `mode`.
pub fn strip_scheme(location: &str, mode: PrefixStrip) -> &str {
    match mode {
        PrefixStrip::Exact => location.strip_prefix(S3_SCHEME).unwrap_or(location),
        PrefixStrip::Charset => {
            location.trim_start_matches(|c: char| matches!(c, 's' | '3' | ':' | '/'))
        }
    }
}

/// Relative working directory for an interferogram location,
/// e.g. `s3://myints/job1` -> `myints/job1`.
pub fn workdir_name(location: &str, mode: PrefixStrip) -> Result<PathBuf, LocationError> {
    if location.trim().is_empty() {
        return Err(LocationError::Empty);
    }
    let stripped = strip_scheme(location, mode);
    if stripped.trim_matches('/').is_empty() {
        return Err(LocationError::NoDirectoryName(location.to_string()));
    }
    let path = Path::new(stripped);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(LocationError::Escapes(stripped.to_string()));
    }
    Ok(path.to_path_buf())
}
