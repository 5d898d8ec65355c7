use super::open_service;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::records::CycleRecord;
use crate::models::shift::ShiftClock;
use crate::ui::messages::header;
use crate::utils::colors::{GREY, RESET, color_for_cycle};
use crate::utils::table::{Column, Table};
use crate::utils::time::{format_secs, wall_hms};

fn cycle_table(clock: &ShiftClock, records: &[CycleRecord]) -> Table {
    let mut table = Table::new(vec![
        Column::right("#", 3),
        Column::left("Completed at", 19),
        Column::right("Cycle", 8),
        Column::right("Seconds", 7),
    ]);

    for (i, rec) in records.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            wall_hms(clock, &rec.timestamp),
            format_secs(rec.cycle_time_sec),
            rec.cycle_time_sec.to_string(),
        ]);
    }
    table
}

fn average(records: &[CycleRecord]) -> Option<i64> {
    if records.is_empty() {
        return None;
    }
    let total: i64 = records.iter().map(|r| r.cycle_time_sec).sum();
    Some(total / records.len() as i64)
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Records { device, json } = cmd {
        let service = open_service(cfg)?;
        let data = service.graph_data(device)?;
        let clock = service.shifts();

        if *json {
            let out = serde_json::to_string_pretty(&data).map_err(|e| AppError::Other(e.to_string()))?;
            println!("{}", out);
            return Ok(());
        }

        header(format!(
            "{} · {} / {}",
            data.device_id,
            data.department.as_deref().unwrap_or("unassigned"),
            data.model.as_deref().unwrap_or("-")
        ));

        match data.target_time {
            Some(t) => println!("🎯 Target: {}s", t),
            None => println!("🎯 Target: {GREY}not set{RESET}"),
        }

        for (shift, records) in [
            (data.current_shift, &data.current_shift_records),
            (data.previous_shift, &data.previous_shift_records),
        ] {
            println!("\n📋 {} ({} boards)", shift, records.len());
            if records.is_empty() {
                println!("{GREY}  no records{RESET}");
                continue;
            }
            print!("{}", cycle_table(clock, records).render());
            if let Some(avg) = average(records) {
                let color = color_for_cycle(avg, data.target_time);
                println!("  average: {color}{}{RESET}", format_secs(avg));
            }
        }

        println!("\n☕ Breaks in {}: {}", data.current_shift, data.break_sessions.len());
        for b in &data.break_sessions {
            println!(
                "  {} → {}  ({})",
                wall_hms(clock, &b.start_time),
                wall_hms(clock, &b.end_time),
                format_secs(b.duration_sec)
            );
        }
    }

    Ok(())
}
