//! Environment loading helpers

use std::path::PathBuf;

/// Load variables from a `.env` file in the current directory or its parents.
///
/// Variables already present in the process environment win. Returns the path
/// of the file that was loaded, if any.
pub fn load_env_file() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded environment file");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("failed to load .env file: {e}");
            None
        }
    }
}

