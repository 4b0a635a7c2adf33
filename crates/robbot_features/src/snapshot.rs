//! Offline data loaded from TOML files

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::SourceError;

/// Deserialize a snapshot file.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let raw = std::fs::read_to_string(path).map_err(|cause| SourceError::Read {
        path: path.to_path_buf(),
        cause,
    })?;
    let value = toml::from_str(&raw).map_err(|cause| SourceError::Parse {
        path: path.to_path_buf(),
        cause,
    })?;
    debug!("Loaded snapshot from {}", path.display());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JokeList;

    #[test]
    fn missing_files_report_their_path() {
        let err = load_toml::<JokeList>(Path::new("/nonexistent/jokes.toml")).unwrap_err();
        match err {
            SourceError::Read { path, .. } => assert!(path.ends_with("jokes.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
