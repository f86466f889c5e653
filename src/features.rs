//! Experimental feature flags, toggled via the `BREWLS_FEATURE_FLAGS`
//! environment variable (comma-separated, case-insensitive).

use std::collections::HashSet;

/// Environment variable holding the comma-separated flag list.
pub const FEATURE_FLAGS_ENV: &str = "BREWLS_FEATURE_FLAGS";

/// Resolve cask display names from Caskroom metadata.
pub const CASK_NAMES: &str = "cask-names";

/// The set of feature flags enabled for this invocation.
#[derive(Debug, Clone, Default)]
pub struct FeatureFlags {
    enabled: HashSet<String>,
}

impl FeatureFlags {
    /// Read flags from [`FEATURE_FLAGS_ENV`]. An unset variable enables nothing.
    pub fn from_env() -> Self {
        Self::parse(&std::env::var(FEATURE_FLAGS_ENV).unwrap_or_default())
    }

    /// Parse a comma-separated flag list. Entries are trimmed and lowercased;
    /// blanks and duplicates are dropped.
    pub fn parse(raw: &str) -> Self {
        let enabled = raw
            .split(',')
            .map(normalize)
            .filter(|flag| !flag.is_empty())
            .collect();
        Self { enabled }
    }

    /// Whether `flag` is enabled. The query is normalized the same way as
    /// the environment value, so lookups are case- and whitespace-insensitive.
    pub fn enabled(&self, flag: &str) -> bool {
        self.enabled.contains(normalize(flag).as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

fn normalize(flag: &str) -> String {
    flag.trim().to_lowercase()
}
