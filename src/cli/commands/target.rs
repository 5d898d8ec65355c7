use super::open_service;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::time::format_secs;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Target {
        department,
        model,
        seconds,
    } = cmd
    {
        let service = open_service(cfg)?;
        service.set_target(department, model, Some(*seconds))?;

        success(format!(
            "Target for {} / {} set to {}s ({})",
            department.trim(),
            model.trim(),
            seconds,
            format_secs(*seconds)
        ));
    }

    Ok(())
}
