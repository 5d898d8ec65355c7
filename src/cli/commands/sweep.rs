use super::open_service;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use chrono::Utc;

/// Handle the `sweep` command.
///  - default : keep only the current and previous shift
///  - --reset : wipe every cycle record and break session
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sweep { reset } = cmd {
        let service = open_service(cfg)?;
        let store = service.store();

        let stats = if *reset {
            warning("Deleting ALL cycle records and break sessions…");
            let stats = store.delete_all()?;
            if let Err(e) = store.audit(
                "daily_reset",
                "manual",
                &format!(
                    "Removed {} cycle records and {} break sessions",
                    stats.cycles_removed, stats.breaks_removed
                ),
            ) {
                eprintln!("⚠️ Failed to write internal log: {}", e);
            }
            stats
        } else {
            let now = Utc::now();
            let [current, previous] = service.shifts().window(now);
            println!("🕒 Keeping {} and {}", current, previous);
            let stats = service.retention().sweep(now)?;
            if let Err(e) = store.audit(
                "sweep",
                &format!("{}+{}", current, previous),
                &format!("Removed {} records outside the shift window", stats.total()),
            ) {
                eprintln!("⚠️ Failed to write internal log: {}", e);
            }
            stats
        };

        success(format!(
            "Removed {} cycle records and {} break sessions",
            stats.cycles_removed, stats.breaks_removed
        ));
    }

    Ok(())
}
