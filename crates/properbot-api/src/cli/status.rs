//! System status dashboard.

use console::style;

use properbot_core::chat::repository::ChatRepository;
use properbot_core::listing::cache::ListingCache;

use crate::state::AppState;

/// Print data-dir, config, and store counts.
pub async fn status(state: &AppState, json: bool) -> anyhow::Result<()> {
    let sessions = state.chat_service.chat_repo().count_sessions().await?;
    let messages = state.chat_service.chat_repo().count_messages().await?;
    let cached_listings = state.listing_cache.count_listings().await?;
    let api_key_set = properbot_infra::secret::openai_api_key().is_ok();

    if json {
        let status = serde_json::json!({
            "data_dir": state.data_dir.display().to_string(),
            "model": state.config.model,
            "harvest_base_url": state.config.harvest.base_url,
            "offline": state.offline,
            "api_key_set": api_key_set,
            "sessions": sessions,
            "messages": messages,
            "cached_listings": cached_listings,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let check_mark = |ok: bool| {
        if ok {
            format!("{}", style("✓").green())
        } else {
            format!("{}", style("✗").red())
        }
    };

    println!();
    println!("  {} ProperBot status", style("🏠").bold());
    println!();
    println!("  Data dir:        {}", state.data_dir.display());
    println!("  Model:           {}", state.config.model);
    println!("  Harvest service: {}", state.config.harvest.base_url);
    if state.offline {
        println!("  {}", style("Offline mode: fixture listings").yellow());
    }
    println!("  {} API key configured", check_mark(api_key_set));
    println!();
    println!("  Sessions:        {sessions}");
    println!("  Messages:        {messages}");
    println!("  Cached listings: {cached_listings}");
    println!();

    Ok(())
}
