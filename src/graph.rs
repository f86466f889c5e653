//! Reverse dependency graph over the installed inventory.

use std::collections::{HashMap, HashSet};

use crate::caskroom::InstalledCask;
use crate::cellar::{InstalledFormula, Keg};

/// Which installed packages depend on which, derived from install receipts.
///
/// Edges come from the runtime dependencies recorded for each formula's
/// newest keg, restricted to packages that are actually installed. Casks
/// never contribute outgoing edges because Homebrew writes no dependency
/// receipts for them, but they can appear as dependents' targets when a
/// formula names a cask token.
#[derive(Debug, Default)]
pub struct ReverseDeps {
    installed_by: HashMap<String, Vec<String>>,
}

impl ReverseDeps {
    /// Build the graph from the full installed inventory.
    pub fn build(formulae: &[InstalledFormula], casks: &[InstalledCask]) -> Self {
        let installed: HashSet<&str> = formulae
            .iter()
            .map(|f| f.name.as_str())
            .chain(casks.iter().map(|c| c.token.as_str()))
            .collect();

        let mut installed_by: HashMap<String, Vec<String>> = HashMap::new();
        for formula in formulae {
            let Some(keg) = formula.newest() else { continue };

            let deps = dedup_sorted(
                keg.runtime_dependencies()
                    .iter()
                    .map(|dep| dep.full_name.clone()),
            );
            for dep in deps {
                if installed.contains(dep.as_str()) {
                    installed_by
                        .entry(dep)
                        .or_default()
                        .push(formula.name.clone());
                }
            }
        }

        for dependents in installed_by.values_mut() {
            dependents.sort();
            dependents.dedup();
        }

        Self { installed_by }
    }

    /// Installed packages that depend on `name`, sorted and duplicate-free.
    pub fn installed_by(&self, name: &str) -> &[String] {
        self.installed_by
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Root rule for formulae: installed on request and required by nothing.
    pub fn formula_is_root(&self, formula: &InstalledFormula) -> bool {
        let on_request = formula
            .newest()
            .map(Keg::installed_on_request)
            .unwrap_or(false);
        on_request && self.installed_by(&formula.name).is_empty()
    }

    /// Root rule for casks: required by nothing.
    pub fn cask_is_root(&self, cask: &InstalledCask) -> bool {
        self.installed_by(&cask.token).is_empty()
    }
}

/// Sorted, duplicate-free copy of the input. Always returns an allocated
/// vector, even for empty input.
pub fn dedup_sorted<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut result: Vec<String> = items.into_iter().collect();
    result.sort();
    result.dedup();
    result
}
