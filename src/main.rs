// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use std::path::Path;

use caramelo_clinic::{export_ledger, logger, seed, ClinicConfig};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = ClinicConfig::from_env();
    let _log_guard = logger::init(&config.log)?;

    if args.len() > 1 && args[1] == "export" {
        // Export mode
        let target = args.get(2).map(String::as_str).unwrap_or("ledger.csv");
        run_export(Path::new(target))?;
    } else {
        // UI mode (default)
        run_ui_mode(config)?;
    }

    Ok(())
}

fn run_export(path: &Path) -> Result<()> {
    println!("📤 Exporting ledger (invoices + expenses)");

    let store = seed::seeded_store();
    let rows = export_ledger(path, store.invoices(), store.expenses())
        .with_context(|| format!("Failed to write ledger to {}", path.display()))?;

    println!("✓ Wrote {} rows to {}", rows, path.display());
    tracing::info!(rows, path = %path.display(), "ledger exported");
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: ClinicConfig) -> Result<()> {
    use caramelo_clinic::{Session, SystemOpener};

    let today = chrono::Local::now().date_naive();
    let session = Session::new(config, seed::seeded_store(), SystemOpener::new(), today);

    let mut app = ui::App::new(session);
    ui::run_ui(&mut app)?;

    println!("\n✅ Caramelo closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: ClinicConfig) -> Result<()> {
    eprintln!("❌ Dashboard not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or export the ledger: caramelo export <path>");
    std::process::exit(1);
}
