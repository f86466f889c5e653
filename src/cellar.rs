//! Homebrew Cellar inventory - installed formulae and their install receipts.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use rayon::prelude::*;
use serde::Deserialize;

use crate::error::Result;

/// Detect the Homebrew prefix on this system.
///
/// `HOMEBREW_PREFIX` wins when set; otherwise fall back to the standard
/// per-architecture location.
pub fn detect_prefix() -> PathBuf {
    if let Ok(prefix) = std::env::var("HOMEBREW_PREFIX") {
        return PathBuf::from(prefix);
    }

    #[cfg(target_arch = "aarch64")]
    {
        PathBuf::from("/opt/homebrew")
    }
    #[cfg(not(target_arch = "aarch64"))]
    {
        PathBuf::from("/usr/local")
    }
}

/// Whether the `brew` executable is reachable on PATH.
pub fn brew_on_path() -> bool {
    Command::new("brew")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Runtime dependency entry from an install receipt.
///
/// Receipts record the full transitive runtime closure, with
/// `declared_directly` marking the dependencies the formula itself declares.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeDependency {
    pub full_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub declared_directly: bool,
}

/// The subset of `INSTALL_RECEIPT.json` this crate consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallReceipt {
    #[serde(default)]
    pub installed_on_request: bool,
    #[serde(default)]
    pub runtime_dependencies: Vec<RuntimeDependency>,
}

/// One installed version of a formula.
#[derive(Debug, Clone)]
pub struct Keg {
    pub version: String,
    pub path: PathBuf,
    /// Parsed receipt, or `None` when the keg has no readable one.
    pub receipt: Option<InstallReceipt>,
}

impl Keg {
    fn load(version: String, path: PathBuf) -> Self {
        let receipt = match read_receipt(&path) {
            Ok(receipt) => Some(receipt),
            Err(err) => {
                tracing::debug!("unreadable receipt in {}: {:#}", path.display(), err);
                None
            }
        };
        Self {
            version,
            path,
            receipt,
        }
    }

    /// Whether this keg was installed on request (vs pulled in as a dependency).
    pub fn installed_on_request(&self) -> bool {
        self.receipt
            .as_ref()
            .map(|r| r.installed_on_request)
            .unwrap_or(false)
    }

    /// Runtime dependencies recorded in the receipt.
    pub fn runtime_dependencies(&self) -> &[RuntimeDependency] {
        self.receipt
            .as_ref()
            .map(|r| r.runtime_dependencies.as_slice())
            .unwrap_or(&[])
    }
}

/// An installed formula and every keg present for it, newest first.
#[derive(Debug, Clone)]
pub struct InstalledFormula {
    pub name: String,
    pub kegs: Vec<Keg>,
}

impl InstalledFormula {
    /// The newest keg, if any version directory is present.
    pub fn newest(&self) -> Option<&Keg> {
        self.kegs.first()
    }
}

/// Handle on a Homebrew Cellar directory.
#[derive(Debug, Clone)]
pub struct Cellar {
    path: PathBuf,
}

impl Cellar {
    /// Cellar under an explicit Homebrew prefix.
    pub fn new(prefix: &Path) -> Self {
        Self {
            path: prefix.join("Cellar"),
        }
    }

    /// Cellar under the detected system prefix.
    pub fn detect() -> Self {
        Self::new(&detect_prefix())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Read every installed formula, sorted by name with kegs newest first.
    ///
    /// A missing Cellar is an empty inventory, not an error. Receipts are
    /// parsed in parallel; a keg with an unreadable receipt is kept without
    /// one so the formula still shows up in the listing.
    pub fn installed_formulae(&self) -> Result<Vec<InstalledFormula>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.path)
            .with_context(|| format!("Failed to read Cellar: {}", self.path.display()))?
        {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();

            // Skip hidden entries like .DS_Store
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }

            dirs.push((name, entry.path()));
        }

        let mut formulae = dirs
            .par_iter()
            .map(|(name, path)| read_formula(name, path))
            .collect::<Result<Vec<_>>>()?;

        formulae.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(formulae)
    }
}

fn read_formula(name: &str, formula_dir: &Path) -> Result<InstalledFormula> {
    let mut kegs = Vec::new();

    for entry in fs::read_dir(formula_dir)
        .with_context(|| format!("Failed to read {}", formula_dir.display()))?
    {
        let entry = entry?;
        let version = entry.file_name().to_string_lossy().to_string();

        if version.starts_with('.') || !entry.path().is_dir() {
            continue;
        }

        kegs.push(Keg::load(version, entry.path()));
    }

    // Newest first, so kegs[0] is the version to report
    kegs.sort_by(|a, b| compare_versions(&b.version, &a.version));

    Ok(InstalledFormula {
        name: name.to_string(),
        kegs,
    })
}

fn read_receipt(keg_path: &Path) -> anyhow::Result<InstallReceipt> {
    let receipt_path = keg_path.join("INSTALL_RECEIPT.json");
    let contents = fs::read_to_string(&receipt_path)
        .with_context(|| format!("Failed to read receipt: {}", receipt_path.display()))?;
    let receipt = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse receipt: {}", receipt_path.display()))?;
    Ok(receipt)
}

/// Compare two version strings, numeric segments first, then lexicographic.
///
/// Segments are the digit runs, so Homebrew revision suffixes order the way
/// brew orders them: "1.2.3_2" > "1.2.3_1" > "1.2.3".
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    fn numeric(version: &str) -> Vec<u64> {
        version
            .split(|c: char| !c.is_ascii_digit())
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.parse().ok())
            .collect()
    }

    let a_nums = numeric(a);
    let b_nums = numeric(b);

    for i in 0..a_nums.len().max(b_nums.len()) {
        match a_nums.get(i).unwrap_or(&0).cmp(b_nums.get(i).unwrap_or(&0)) {
            Ordering::Equal => {}
            other => return other,
        }
    }

    a.cmp(b)
}
