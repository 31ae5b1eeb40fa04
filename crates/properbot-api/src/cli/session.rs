//! Session browsing command.

use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use console::style;

use crate::state::AppState;

/// List past sessions as a table (or JSON with `--json`).
pub async fn list_sessions(state: &AppState, limit: i64, json: bool) -> anyhow::Result<()> {
    let sessions = state.chat_service.list_sessions(Some(limit), None).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!("  {}", style("No sessions yet. Start one with `properbot chat`.").dim());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["ID", "Title", "Started", "Msgs", "Tokens", "Status"]);

    for session in &sessions {
        let tokens = session.total_input_tokens + session.total_output_tokens;
        table.add_row(vec![
            session.id.to_string(),
            session.title.clone().unwrap_or_else(|| "-".to_string()),
            session.started_at.format("%Y-%m-%d %H:%M").to_string(),
            session.message_count.to_string(),
            tokens.to_string(),
            session.status.to_string(),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}
