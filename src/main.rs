use std::io::IsTerminal;

use clap::Parser;

use brewls::caskroom::Caskroom;
use brewls::cellar::{self, Cellar};
use brewls::colors;
use brewls::error::BrewlsError;
use brewls::features::{CASK_NAMES, FeatureFlags};
use brewls::graph::ReverseDeps;
use brewls::listing::{Listing, RenderOptions};

#[derive(Parser)]
#[command(name = "brewls")]
#[command(author, version, about = "Extended Homebrew ls output with installed versions and reverse deps", long_about = None)]
struct Cli {
    /// Show all installed versions, not just the newest
    #[arg(long)]
    versions: bool,

    /// Emit the listing as JSON
    #[arg(long)]
    json: bool,

    /// Only list formulae
    #[arg(long, conflicts_with = "casks")]
    formulae: bool,

    /// Only list casks
    #[arg(long)]
    casks: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over the --verbose default
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    colors::init_colors();

    run(&cli)?;
    Ok(())
}

fn run(cli: &Cli) -> brewls::Result<()> {
    let prefix = cellar::detect_prefix();
    let cellar = Cellar::new(&prefix);
    let caskroom = Caskroom::new(&prefix);

    // No Cellar, no Caskroom, and no brew on PATH: Homebrew itself is missing
    if !cellar.exists() && !caskroom.exists() && !cellar::brew_on_path() {
        return Err(BrewlsError::HomebrewNotFound(prefix));
    }

    let formulae = cellar.installed_formulae()?;
    let mut casks = caskroom.installed_casks()?;
    tracing::debug!(
        formulae = formulae.len(),
        casks = casks.len(),
        "scanned {}",
        prefix.display()
    );

    let flags = FeatureFlags::from_env();
    if flags.enabled(CASK_NAMES) {
        caskroom.resolve_display_names(&mut casks);
    }

    let graph = ReverseDeps::build(&formulae, &casks);
    let mut listing = Listing::build(&formulae, &casks, &graph, cli.versions || cli.json);

    // Section filters drop the other kind from every output form
    if cli.formulae {
        listing.casks.clear();
    }
    if cli.casks {
        listing.formulae.clear();
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let stdout = std::io::stdout();
    let tty = stdout.is_terminal();
    let opts = RenderOptions {
        tty,
        width: if tty {
            term_size::dimensions().map(|(w, _)| w)
        } else {
            None
        },
        show_formulae: !cli.casks,
        show_casks: !cli.formulae,
    };

    let mut out = stdout.lock();
    listing.render(&mut out, &opts)?;
    Ok(())
}
