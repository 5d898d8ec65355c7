use super::open_service;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::server::{self, ServeOptions};
use crate::ui::messages::info;
use std::sync::Arc;
use std::time::Duration;

/// Handle the `serve` command: open the DB, build the service, run the API.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Serve {
        bind,
        port,
        sweep_interval,
    } = cmd
    {
        let opts = ServeOptions {
            bind_address: bind.clone().unwrap_or_else(|| cfg.bind_address.clone()),
            port: port.unwrap_or(cfg.port),
            sweep_interval: Duration::from_secs(sweep_interval.unwrap_or(cfg.sweep_interval_secs)),
        };

        let service = Arc::new(open_service(cfg)?);

        info(format!(
            "Serving on {}:{} (database: {})",
            opts.bind_address, opts.port, cfg.database
        ));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| AppError::Server(format!("cannot start runtime: {e}")))?;

        runtime.block_on(server::serve(service, opts))?;
    }

    Ok(())
}
