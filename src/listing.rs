//! Building and rendering the extended listing.
//!
//! [`Listing`] is the assembled report: plain data, serializable as-is for
//! `--json`. Terminal rendering happens through [`Listing::render`] with a
//! caller-supplied writer so tests capture exactly what users see.

use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;

use crate::caskroom::InstalledCask;
use crate::cellar::{InstalledFormula, Keg};
use crate::graph::ReverseDeps;

/// One formula row in the report.
#[derive(Debug, Serialize)]
pub struct FormulaRow {
    pub name: String,
    /// Installed versions, newest first. Empty when no keg exists.
    pub versions: Vec<String>,
    pub installed_by: Vec<String>,
    pub installed_on_request: bool,
    pub root: bool,
}

/// One cask row in the report.
#[derive(Debug, Serialize)]
pub struct CaskRow {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub version: String,
    pub installed_by: Vec<String>,
    pub root: bool,
}

impl CaskRow {
    /// The name to show: display name when resolved, token otherwise.
    fn display(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.token)
    }
}

/// The assembled report for both package kinds.
#[derive(Debug, Serialize)]
pub struct Listing {
    pub formulae: Vec<FormulaRow>,
    pub casks: Vec<CaskRow>,
}

/// Rendering controls for terminal output.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Whether stdout is a terminal. Enables the legends, footer, and
    /// dependent-list truncation.
    pub tty: bool,
    /// Terminal width for truncating long dependent lists; `None` disables.
    pub width: Option<usize>,
    pub show_formulae: bool,
    pub show_casks: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tty: false,
            width: None,
            show_formulae: true,
            show_casks: true,
        }
    }
}

/// A row reduced to the three displayed columns.
struct Row {
    name: String,
    root: bool,
    version: String,
    installed_by: Vec<String>,
}

impl Listing {
    /// Assemble the report from the inventory and its reverse-dep graph.
    ///
    /// With `all_versions` every keg version is carried; otherwise only the
    /// newest. Dependent lists come straight from the graph, already sorted.
    pub fn build(
        formulae: &[InstalledFormula],
        casks: &[InstalledCask],
        graph: &ReverseDeps,
        all_versions: bool,
    ) -> Self {
        let formula_rows = formulae
            .iter()
            .map(|f| {
                let versions: Vec<String> = if all_versions {
                    f.kegs.iter().map(|keg| keg.version.clone()).collect()
                } else {
                    f.newest()
                        .map(|keg| vec![keg.version.clone()])
                        .unwrap_or_default()
                };
                FormulaRow {
                    name: f.name.clone(),
                    versions,
                    installed_by: graph.installed_by(&f.name).to_vec(),
                    installed_on_request: f
                        .newest()
                        .map(Keg::installed_on_request)
                        .unwrap_or(false),
                    root: graph.formula_is_root(f),
                }
            })
            .collect();

        let cask_rows = casks
            .iter()
            .map(|c| CaskRow {
                token: c.token.clone(),
                display_name: c.display_name.clone(),
                version: c.version.clone(),
                installed_by: graph.installed_by(&c.token).to_vec(),
                root: graph.cask_is_root(c),
            })
            .collect();

        Self {
            formulae: formula_rows,
            casks: cask_rows,
        }
    }

    /// Render the report for a terminal or a pipe.
    ///
    /// Piped output carries the same columns minus the legends, footer, and
    /// truncation, so it stays grep- and awk-friendly.
    pub fn render(&self, out: &mut impl Write, opts: &RenderOptions) -> io::Result<()> {
        // A section is visible unless it is filtered out, or empty on a pipe
        let formulae_visible = opts.show_formulae && (opts.tty || !self.formulae.is_empty());
        let casks_visible = opts.show_casks && (opts.tty || !self.casks.is_empty());

        if formulae_visible {
            let rows: Vec<Row> = self
                .formulae
                .iter()
                .map(|f| Row {
                    name: f.name.clone(),
                    root: f.root,
                    version: if f.versions.is_empty() {
                        "N/A".to_string()
                    } else {
                        f.versions.join(" ")
                    },
                    installed_by: f.installed_by.clone(),
                })
                .collect();
            let legend = "(* = installed on request, required by no other package)";
            render_section(out, "Formulae", legend, "No formulae installed", &rows, opts)?;
        }

        if casks_visible {
            let rows: Vec<Row> = self
                .casks
                .iter()
                .map(|c| Row {
                    name: c.display().to_string(),
                    root: c.root,
                    version: c.version.clone(),
                    installed_by: c.installed_by.clone(),
                })
                .collect();
            if formulae_visible {
                writeln!(out)?;
            }
            // Casks record no install reason, so their root rule is dependents-only
            let legend = "(* = required by no other package)";
            render_section(out, "Casks", legend, "No casks installed", &rows, opts)?;
        }

        if opts.tty {
            let mut parts = Vec::new();
            if opts.show_formulae {
                parts.push(count(self.formulae.len(), "formula", "formulae"));
            }
            if opts.show_casks {
                parts.push(count(self.casks.len(), "cask", "casks"));
            }
            writeln!(out, "\n{} {} installed", "✓".green(), parts.join(", ").bold())?;
        }

        Ok(())
    }
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, plural)
    }
}

fn render_section(
    out: &mut impl Write,
    title: &str,
    legend: &str,
    empty_message: &str,
    rows: &[Row],
    opts: &RenderOptions,
) -> io::Result<()> {
    writeln!(out, "{}", format!("==> {}", title).bold().green())?;
    if opts.tty {
        writeln!(out, "{}", legend.dimmed())?;
    }

    if rows.is_empty() {
        writeln!(out, "{}", empty_message.dimmed())?;
        return Ok(());
    }

    // " *" on root rows widens the name column
    let name_width = rows
        .iter()
        .map(|row| row.name.len() + if row.root { 2 } else { 0 })
        .chain(["NAME".len()])
        .max()
        .unwrap_or(4);
    let version_width = rows
        .iter()
        .map(|row| row.version.len())
        .chain(["VERSION".len()])
        .max()
        .unwrap_or(7);

    let header = format!(
        "{:<name_width$}  {:<version_width$}  {}",
        "NAME", "VERSION", "INSTALLED BY"
    );
    writeln!(out, "{}", header.dimmed())?;

    for row in rows {
        let mut name_cell = row.name.bold().to_string();
        let mut visible = row.name.len();
        if row.root {
            name_cell.push_str(&format!(" {}", "*".green()));
            visible += 2;
        }
        for _ in visible..name_width {
            name_cell.push(' ');
        }

        let version_cell = format!("{:<version_width$}", row.version).dimmed();
        let installed_by = installed_by_cell(
            &row.installed_by,
            opts,
            name_width + version_width + 4,
        );

        let line = format!("{}  {}  {}", name_cell, version_cell, installed_by);
        writeln!(out, "{}", line.trim_end())?;
    }

    Ok(())
}

/// Join the dependent list, truncating with a `(+N)` tail when the line
/// would overflow an interactive terminal.
fn installed_by_cell(installed_by: &[String], opts: &RenderOptions, used: usize) -> String {
    let joined = installed_by.join(", ");

    if !opts.tty {
        return joined;
    }
    let Some(width) = opts.width else {
        return joined;
    };
    let available = width.saturating_sub(used);
    if available < 16 || joined.len() <= available {
        return joined;
    }

    let mut shown = 0;
    let mut length = 0;
    for (i, name) in installed_by.iter().enumerate() {
        let addition = if i == 0 { name.len() } else { name.len() + 2 };
        // Leave room for the " (+N)" tail
        if shown > 0 && length + addition + 8 > available {
            break;
        }
        length += addition;
        shown += 1;
    }

    let mut cell = installed_by[..shown].join(", ");
    let hidden = installed_by.len() - shown;
    if hidden > 0 {
        cell.push_str(&format!(" (+{})", hidden));
    }
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cellar::{InstallReceipt, RuntimeDependency};
    use std::path::PathBuf;

    fn formula(name: &str, on_request: bool, deps: &[&str]) -> InstalledFormula {
        InstalledFormula {
            name: name.to_string(),
            kegs: vec![Keg {
                version: "1.0.0".to_string(),
                path: PathBuf::new(),
                receipt: Some(InstallReceipt {
                    installed_on_request: on_request,
                    runtime_dependencies: deps
                        .iter()
                        .map(|dep| RuntimeDependency {
                            full_name: dep.to_string(),
                            version: "1.0".to_string(),
                            declared_directly: true,
                        })
                        .collect(),
                }),
            }],
        }
    }

    fn render_plain(listing: &Listing, opts: &RenderOptions) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        listing.render(&mut out, opts).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample() -> Listing {
        let formulae = vec![
            formula("packageA", true, &["packageB"]),
            formula("packageB", false, &["packageC"]),
            formula("packageC", false, &[]),
            formula("packageD", true, &["packageB"]),
            formula("packageF", true, &[]),
        ];
        let casks = vec![InstalledCask {
            token: "packageE".to_string(),
            version: "2.1".to_string(),
            display_name: None,
        }];
        let graph = ReverseDeps::build(&formulae, &casks);
        Listing::build(&formulae, &casks, &graph, false)
    }

    #[test]
    fn test_piped_output_is_exact() {
        let output = render_plain(&sample(), &RenderOptions::default());
        let expected = "\
==> Formulae
NAME        VERSION  INSTALLED BY
packageA *  1.0.0
packageB    1.0.0    packageA, packageD
packageC    1.0.0    packageB
packageD *  1.0.0
packageF *  1.0.0

==> Casks
NAME        VERSION  INSTALLED BY
packageE *  2.1
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_tty_output_adds_legends_and_footer() {
        let opts = RenderOptions {
            tty: true,
            ..RenderOptions::default()
        };
        let output = render_plain(&sample(), &opts);

        assert!(output.contains("(* = installed on request, required by no other package)"));
        assert!(output.contains("(* = required by no other package)"));
        assert!(output.ends_with("✓ 5 formulae, 1 cask installed\n"));
    }

    #[test]
    fn test_empty_listing_is_silent_when_piped() {
        let graph = ReverseDeps::build(&[], &[]);
        let listing = Listing::build(&[], &[], &graph, false);
        let output = render_plain(&listing, &RenderOptions::default());
        assert!(output.is_empty());
    }

    #[test]
    fn test_empty_listing_says_so_on_a_tty() {
        let graph = ReverseDeps::build(&[], &[]);
        let listing = Listing::build(&[], &[], &graph, false);
        let opts = RenderOptions {
            tty: true,
            ..RenderOptions::default()
        };
        let output = render_plain(&listing, &opts);

        assert!(output.contains("No formulae installed"));
        assert!(output.contains("No casks installed"));
        assert!(output.contains("0 formulae, 0 casks installed"));
    }

    #[test]
    fn test_missing_version_renders_na() {
        let formulae = vec![InstalledFormula {
            name: "ghost".to_string(),
            kegs: Vec::new(),
        }];
        let graph = ReverseDeps::build(&formulae, &[]);
        let listing = Listing::build(&formulae, &[], &graph, false);
        let opts = RenderOptions {
            show_casks: false,
            ..RenderOptions::default()
        };
        let output = render_plain(&listing, &opts);

        assert!(output.contains("ghost"));
        assert!(output.contains("N/A"));
    }

    #[test]
    fn test_all_versions_joined_newest_first() {
        let mut wget = formula("wget", true, &[]);
        let mut old = wget.kegs[0].clone();
        old.version = "1.24.5".to_string();
        wget.kegs[0].version = "1.25.0".to_string();
        wget.kegs.push(old);

        let formulae = vec![wget];
        let graph = ReverseDeps::build(&formulae, &[]);
        let listing = Listing::build(&formulae, &[], &graph, true);
        assert_eq!(listing.formulae[0].versions, ["1.25.0", "1.24.5"]);

        let opts = RenderOptions {
            show_casks: false,
            ..RenderOptions::default()
        };
        let output = render_plain(&listing, &opts);
        assert!(output.contains("1.25.0 1.24.5"));
    }

    #[test]
    fn test_section_filter_skips_other_kind() {
        let listing = sample();
        let opts = RenderOptions {
            show_casks: false,
            ..RenderOptions::default()
        };
        let output = render_plain(&listing, &opts);
        assert!(output.contains("==> Formulae"));
        assert!(!output.contains("==> Casks"));
    }

    #[test]
    fn test_long_dependent_lists_truncate_on_tty() {
        let dependents: Vec<String> = (0..20).map(|i| format!("package{:02}", i)).collect();
        let deps: Vec<&str> = dependents.iter().map(String::as_str).collect();

        let mut formulae = vec![formula("base", false, &[])];
        for dep in &deps {
            formulae.push(formula(dep, true, &["base"]));
        }
        formulae.sort_by(|a, b| a.name.cmp(&b.name));

        let graph = ReverseDeps::build(&formulae, &[]);
        let listing = Listing::build(&formulae, &[], &graph, false);

        let opts = RenderOptions {
            tty: true,
            width: Some(60),
            show_casks: false,
            ..RenderOptions::default()
        };
        let output = render_plain(&listing, &opts);
        let base_line = output
            .lines()
            .find(|line| line.starts_with("base"))
            .unwrap();

        assert!(base_line.contains("(+"), "expected truncation tail: {}", base_line);
        assert!(base_line.len() <= 60 + 8, "line too long: {}", base_line);

        // Piped output never truncates
        let piped = render_plain(&listing, &RenderOptions::default());
        let full_line = piped.lines().find(|line| line.starts_with("base")).unwrap();
        assert!(full_line.contains("package19"));
    }

    #[test]
    fn test_json_shape() {
        let listing = sample();
        let json = serde_json::to_value(&listing).unwrap();

        assert_eq!(json["formulae"][0]["name"], "packageA");
        assert_eq!(json["formulae"][0]["root"], true);
        assert_eq!(json["formulae"][0]["versions"][0], "1.0.0");
        assert_eq!(json["formulae"][1]["installed_by"][0], "packageA");
        assert_eq!(json["formulae"][1]["installed_by"][1], "packageD");
        assert_eq!(json["formulae"][1]["root"], false);
        assert_eq!(json["casks"][0]["token"], "packageE");
        assert_eq!(json["casks"][0]["root"], true);
        // Unresolved display names stay out of the JSON
        assert!(json["casks"][0].get("display_name").is_none());
    }

    #[test]
    fn test_cask_display_name_used_when_present() {
        let casks = vec![InstalledCask {
            token: "firefox".to_string(),
            version: "128.0".to_string(),
            display_name: Some("Firefox".to_string()),
        }];
        let graph = ReverseDeps::build(&[], &casks);
        let listing = Listing::build(&[], &casks, &graph, false);
        let opts = RenderOptions {
            show_formulae: false,
            ..RenderOptions::default()
        };
        let output = render_plain(&listing, &opts);

        assert!(output.starts_with("==> Casks"));
        assert!(output.contains("Firefox"));
        assert!(!output.lines().any(|l| l.starts_with("firefox")));
    }
}
