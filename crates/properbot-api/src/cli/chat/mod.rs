//! Interactive chat loop.
//!
//! Coordinates the complete conversation lifecycle: session creation or
//! resumption, the input loop, agent runs with live tool activity in the
//! spinner, slash commands, persistence, and session cleanup.

pub mod commands;
pub mod input;

use std::time::Instant;

use console::style;
use tracing::warn;

use properbot_core::agent::context::AgentContext;
use properbot_core::agent::executor::AgentExecutor;
use properbot_core::agent::prompt::SystemPromptBuilder;
use properbot_core::agent::title::generate_title;
use properbot_core::chat::session::SessionManager;
use properbot_types::agent::{AgentEvent, AgentOutcome};
use properbot_types::chat::MessageRole;
use properbot_types::error::AgentError;
use properbot_types::llm::StopReason;

use crate::state::AppState;

use self::commands::ChatCommand;
use self::input::{ChatInput, InputEvent};

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState, resume: Option<String>) -> anyhow::Result<()> {
    let executor = state.build_agent()?;

    // Resolve or create the session
    let session = match &resume {
        Some(sid) => {
            let id: uuid::Uuid = sid
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid session id: {sid}"))?;
            state
                .chat_service
                .get_session(&id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("session {sid} not found"))?
        }
        None => {
            state
                .chat_service
                .create_session(state.config.model.clone())
                .await?
        }
    };

    let mut context = AgentContext::new(
        state.agent_config(),
        SystemPromptBuilder::build(&executor.tools().specs(), session.last_query.as_ref()),
        session.last_query.clone(),
    );

    // Load prior messages for resumed sessions
    let history = state
        .chat_service
        .get_messages(&session.id, None, None)
        .await
        .unwrap_or_default();
    for msg in &history {
        match msg.role {
            MessageRole::User => context.add_user_message(msg.content.clone()),
            MessageRole::Assistant => context.add_assistant_message(msg.content.clone()),
            MessageRole::System => {}
        }
    }

    let mut session_manager = SessionManager::new(session);
    let session_id = session_manager.session().id;
    if !history.is_empty() {
        // Resumed sessions already had their first exchange
        session_manager.increment_turn();
    }

    print_banner(state, &session_id.to_string(), !history.is_empty());

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => {
                            commands::print_help();
                        }
                        ChatCommand::Clear => {
                            chat_input.clear();
                        }
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::History => {
                            print_history(state, &session_id).await?;
                        }
                        ChatCommand::Criteria => {
                            print_criteria(&context);
                        }
                    }
                    continue;
                }

                // Rebuild the prompt so refinements from earlier turns are
                // visible to the model.
                context.system_prompt = SystemPromptBuilder::build(
                    &executor.tools().specs(),
                    context.last_query.as_ref(),
                );

                match run_turn(state, &executor, &mut context, &mut session_manager, &text).await {
                    Ok(outcome) => {
                        println!("\n  {}\n", outcome.answer.trim());
                    }
                    Err(e) => {
                        eprintln!(
                            "\n  {} {e}\n",
                            style("!").yellow().bold()
                        );
                    }
                }
            }
        }
    }

    let _ = state.chat_service.end_session(&session_id).await;
    Ok(())
}

/// Run one agent turn: spinner with live tool activity, then persistence.
async fn run_turn(
    state: &AppState,
    executor: &AgentExecutor,
    context: &mut AgentContext,
    session_manager: &mut SessionManager,
    text: &str,
) -> Result<AgentOutcome, AgentError> {
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_style(
        indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner()),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<AgentEvent>();
    let start = Instant::now();

    let outcome = {
        let run = executor.run(context, text, Some(&tx));
        tokio::pin!(run);

        loop {
            tokio::select! {
                result = &mut run => break result,
                Some(event) = rx.recv() => match event {
                    AgentEvent::ToolCall { name, .. } => {
                        spinner.set_message(format!("running {name}..."));
                    }
                    AgentEvent::ToolResult { summary, .. } => {
                        spinner.set_message(summary);
                    }
                    _ => {}
                },
            }
        }
    };
    spinner.finish_and_clear();

    let outcome = outcome?;
    let response_ms = start.elapsed().as_millis() as u64;

    // Persist the exchange
    let _ = state
        .chat_service
        .save_user_message(session_id_of(session_manager), text.to_string())
        .await;
    let _ = state
        .chat_service
        .save_assistant_message(
            session_id_of(session_manager),
            outcome.answer.clone(),
            state.config.model.clone(),
            outcome.usage.input_tokens,
            outcome.usage.output_tokens,
            StopReason::EndTurn.to_string(),
            response_ms,
        )
        .await;
    let _ = state
        .chat_service
        .update_session_tokens(
            &session_id_of(session_manager),
            outcome.usage.input_tokens,
            outcome.usage.output_tokens,
        )
        .await;

    context.add_user_message(text.to_string());
    context.add_assistant_message(outcome.answer.clone());
    session_manager.add_token_usage(outcome.usage.input_tokens, outcome.usage.output_tokens);
    session_manager.increment_turn();

    if let Some(query) = context.last_query.clone() {
        session_manager.set_last_query(query.clone());
        if let Err(e) = state
            .chat_service
            .save_last_query(&session_id_of(session_manager), &query)
            .await
        {
            warn!(error = %e, "Failed to persist search criteria");
        }
    }

    if session_manager.needs_title() {
        if let Ok(title) = generate_title(
            executor.engine().provider(),
            text,
            &outcome.answer,
            &state.config.model,
        )
        .await
        {
            session_manager.session_mut().title = Some(title.clone());
            let _ = state
                .chat_service
                .update_session_title(&session_id_of(session_manager), title)
                .await;
        }
    }

    Ok(outcome)
}

fn session_id_of(session_manager: &SessionManager) -> uuid::Uuid {
    session_manager.session().id
}

fn print_banner(state: &AppState, session_id: &str, resumed: bool) {
    println!();
    println!(
        "  {} {}",
        style("🏠 ProperBot").cyan().bold(),
        style(format!("({})", state.config.model)).dim()
    );
    if state.offline {
        println!("  {}", style("offline mode: fixture listings").yellow());
    }
    let label = if resumed { "resumed session" } else { "session" };
    println!("  {}", style(format!("{label} {session_id}")).dim());
    println!(
        "  {}",
        style("Ask about houses on the market. /help for commands, Ctrl+D to exit.").dim()
    );
    println!();
}

async fn print_history(state: &AppState, session_id: &uuid::Uuid) -> anyhow::Result<()> {
    let messages = state
        .chat_service
        .get_messages(session_id, Some(20), None)
        .await?;
    println!();
    for msg in &messages {
        let role_label = match msg.role {
            MessageRole::User => format!("{}", style("You").green()),
            MessageRole::Assistant => format!("{}", style("ProperBot").cyan()),
            MessageRole::System => "System".to_string(),
        };
        let preview = if msg.content.chars().count() > 100 {
            let head: String = msg.content.chars().take(97).collect();
            format!("{head}...")
        } else {
            msg.content.clone()
        };
        println!("  {} {}", style(role_label).bold(), preview);
    }
    println!();
    Ok(())
}

fn print_criteria(context: &AgentContext) {
    println!();
    match &context.last_query {
        Some(query) => {
            let json = serde_json::to_string_pretty(query)
                .unwrap_or_else(|_| "(unprintable)".to_string());
            println!("  {}", style("Current search criteria:").bold());
            for line in json.lines() {
                println!("  {line}");
            }
        }
        None => {
            println!("  {}", style("No search criteria yet. Ask about a location!").dim());
        }
    }
    println!();
}
