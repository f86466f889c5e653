//! Print the top-level packages on this machine: everything installed on
//! request that nothing else depends on.
//!
//! Run with: cargo run --example roots

use brewls::caskroom::Caskroom;
use brewls::cellar::Cellar;
use brewls::graph::ReverseDeps;

fn main() -> anyhow::Result<()> {
    let cellar = Cellar::detect();
    let caskroom = Caskroom::detect();

    let formulae = cellar.installed_formulae()?;
    let casks = caskroom.installed_casks()?;
    let graph = ReverseDeps::build(&formulae, &casks);

    for formula in &formulae {
        if graph.formula_is_root(formula) {
            let version = formula
                .newest()
                .map(|keg| keg.version.as_str())
                .unwrap_or("N/A");
            println!("{} {}", formula.name, version);
        }
    }

    for cask in &casks {
        if graph.cask_is_root(cask) {
            println!("{} {} (cask)", cask.token, cask.version);
        }
    }

    Ok(())
}
