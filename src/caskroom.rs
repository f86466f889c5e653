//! Homebrew Caskroom inventory - installed casks and their metadata.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::cellar::{compare_versions, detect_prefix};
use crate::error::Result;

/// An installed cask from the Caskroom.
#[derive(Debug, Clone)]
pub struct InstalledCask {
    pub token: String,
    /// Newest version directory present for the token.
    pub version: String,
    /// Human-readable name from cask metadata, when resolved.
    pub display_name: Option<String>,
}

/// The slice of the cask definition JSON brewls reads from `.metadata/`.
#[derive(Debug, Deserialize)]
struct CaskMetadata {
    #[serde(default)]
    name: Vec<String>,
}

/// Handle on a Homebrew Caskroom directory.
#[derive(Debug, Clone)]
pub struct Caskroom {
    path: PathBuf,
}

impl Caskroom {
    /// Caskroom under an explicit Homebrew prefix.
    pub fn new(prefix: &Path) -> Self {
        Self {
            path: prefix.join("Caskroom"),
        }
    }

    /// Caskroom under the detected system prefix.
    pub fn detect() -> Self {
        Self::new(&detect_prefix())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Read every installed cask with its newest version, sorted by token.
    ///
    /// A missing Caskroom is an empty inventory. Token directories with no
    /// version directory at all (only `.metadata`, say) are skipped.
    pub fn installed_casks(&self) -> Result<Vec<InstalledCask>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let mut casks = Vec::new();
        for entry in fs::read_dir(&self.path)
            .with_context(|| format!("Failed to read Caskroom: {}", self.path.display()))?
        {
            let entry = entry?;
            let token = entry.file_name().to_string_lossy().to_string();

            if token.starts_with('.') || !entry.path().is_dir() {
                continue;
            }

            if let Some(version) = newest_version(&entry.path())? {
                casks.push(InstalledCask {
                    token,
                    version,
                    display_name: None,
                });
            }
        }

        casks.sort_by(|a, b| a.token.cmp(&b.token));
        Ok(casks)
    }

    /// Fill in display names from Caskroom metadata where available.
    ///
    /// Metadata is only written by recent Homebrew versions, so a missing or
    /// unreadable definition just leaves the token in place.
    pub fn resolve_display_names(&self, casks: &mut [InstalledCask]) {
        for cask in casks {
            match self.read_display_name(&cask.token) {
                Ok(name) => cask.display_name = name,
                Err(err) => {
                    tracing::debug!("no display name for {}: {:#}", cask.token, err);
                }
            }
        }
    }

    fn read_display_name(&self, token: &str) -> anyhow::Result<Option<String>> {
        let metadata_dir = self.path.join(token).join(".metadata");
        if !metadata_dir.is_dir() {
            return Ok(None);
        }

        // Layout: .metadata/<version>/<timestamp>/Casks/<token>.json
        let wanted = format!("{}.json", token);
        for entry in WalkDir::new(&metadata_dir).max_depth(4) {
            let entry = entry?;
            if entry.file_type().is_file() && entry.file_name().to_string_lossy() == wanted {
                let contents = fs::read_to_string(entry.path())
                    .with_context(|| format!("Failed to read {}", entry.path().display()))?;
                let metadata: CaskMetadata = serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse {}", entry.path().display()))?;
                return Ok(metadata.name.into_iter().next());
            }
        }

        Ok(None)
    }
}

/// Newest version directory under a cask token directory.
fn newest_version(token_dir: &Path) -> Result<Option<String>> {
    let mut versions = Vec::new();

    for entry in fs::read_dir(token_dir)
        .with_context(|| format!("Failed to read {}", token_dir.display()))?
    {
        let entry = entry?;
        let version = entry.file_name().to_string_lossy().to_string();

        // `.metadata` lives alongside the version directories
        if version.starts_with('.') || !entry.path().is_dir() {
            continue;
        }

        versions.push(version);
    }

    versions.sort_by(|a, b| compare_versions(b, a));
    Ok(versions.into_iter().next())
}
