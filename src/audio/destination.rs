use std::path::{Path, PathBuf};

use tracing::info;

use super::backend::DestinationResolver;
use crate::error::DestinationError;

/// Always resolves to the configured directory
#[derive(Debug, Clone)]
pub struct FixedDestination {
    dir: PathBuf,
}

impl FixedDestination {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait::async_trait]
impl DestinationResolver for FixedDestination {
    async fn resolve(&self) -> Result<PathBuf, DestinationError> {
        Ok(self.dir.clone())
    }
}

/// Resolves the user's "Sounds" directory
///
/// Voice memos live next to the music library: `~/Music` becomes
/// `~/Sounds`. Without a known music directory, falls back to `~/Sounds`.
#[derive(Debug, Clone, Default)]
pub struct SoundsDirectory;

#[async_trait::async_trait]
impl DestinationResolver for SoundsDirectory {
    async fn resolve(&self) -> Result<PathBuf, DestinationError> {
        let dir = match dirs::audio_dir() {
            Some(music) => sounds_beside(&music),
            None => dirs::home_dir()
                .map(|home| home.join("Sounds"))
                .ok_or_else(|| {
                    DestinationError::Unresolved("no audio or home directory".to_string())
                })?,
        };

        info!("Recording destination resolved: {}", dir.display());
        Ok(dir)
    }
}

/// Replace a trailing `Music` component with `Sounds`
fn sounds_beside(music: &Path) -> PathBuf {
    match (music.file_name(), music.parent()) {
        (Some(name), Some(parent)) if name == "Music" => parent.join("Sounds"),
        _ => music.to_path_buf(),
    }
}
