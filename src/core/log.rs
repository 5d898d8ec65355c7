use crate::db::pool::DbPool;
use crate::errors::AppResult;
use ansi_term::Colour;

/// ANSI colour for an operation name
fn color_for_operation(op: &str) -> Colour {
    match op {
        "target" => Colour::Green,
        "daily_reset" => Colour::Red,
        "sweep" => Colour::Yellow,
        "migration_applied" => Colour::Purple,
        "serve" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51), // orange
        _ => Colour::White,
    }
}

/// Operation and target in one column, truncated to `max` visible characters.
fn op_target_label(operation: &str, target: &str, max: usize) -> String {
    let label = if target.is_empty() {
        operation.to_string()
    } else {
        format!("{operation} ({target})")
    };

    if label.chars().count() > max {
        let mut s: String = label.chars().take(max.saturating_sub(3)).collect();
        s.push_str("...");
        s
    } else {
        label
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &mut DbPool) -> AppResult<()> {
        let mut stmt = pool.conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: i32 = row.get(0)?;
            let raw_date: String = row.get(1)?;
            let operation: String = row.get(2)?;
            let target: Option<String> = row.get(3)?;
            let message: String = row.get(4)?;

            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            Ok((id, date, operation, target.unwrap_or_default(), message))
        })?;

        let mut entries = Vec::new();
        for r in rows {
            entries.push(r?);
        }

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let labels: Vec<String> = entries
            .iter()
            .map(|(_, _, op, target, _)| op_target_label(op, target, 60))
            .collect();

        let op_w = labels.iter().map(|l| l.chars().count()).max().unwrap_or(10);
        let id_w = entries
            .iter()
            .map(|(id, _, _, _, _)| id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries
            .iter()
            .map(|(_, date, _, _, _)| date.len())
            .max()
            .unwrap_or(10);

        println!("📜 Internal log:\n");

        for ((id, date, operation, _, message), label) in entries.into_iter().zip(labels) {
            let color = color_for_operation(&operation);

            // only the operation word is coloured
            let visible_len = label.chars().count();
            let colored = match label.split_once(' ') {
                Some((op_word, rest)) => format!("{} {}", color.paint(op_word), rest),
                None => color.paint(label.as_str()).to_string(),
            };

            let padding = " ".repeat(op_w.saturating_sub(visible_len));

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                id,
                date,
                colored,
                padding,
                message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}
