//! One-shot question command.
//!
//! `properbot ask "<question>"` creates a session, runs the agent once,
//! prints the answer, and persists the exchange like any other turn.

use std::time::Instant;

use console::style;

use properbot_core::agent::context::AgentContext;
use properbot_core::agent::prompt::SystemPromptBuilder;
use properbot_types::llm::StopReason;

use crate::state::AppState;

/// Ask a single question and print the answer.
pub async fn ask(state: &AppState, question: &str, json: bool) -> anyhow::Result<()> {
    let executor = state.build_agent()?;

    let session = state
        .chat_service
        .create_session(state.config.model.clone())
        .await?;

    let mut context = AgentContext::new(
        state.agent_config(),
        SystemPromptBuilder::build(&executor.tools().specs(), None),
        None,
    );

    let start = Instant::now();
    let outcome = executor.run(&mut context, question, None).await?;
    let response_ms = start.elapsed().as_millis() as u64;

    let _ = state
        .chat_service
        .save_user_message(session.id, question.to_string())
        .await;
    let _ = state
        .chat_service
        .save_assistant_message(
            session.id,
            outcome.answer.clone(),
            state.config.model.clone(),
            outcome.usage.input_tokens,
            outcome.usage.output_tokens,
            StopReason::EndTurn.to_string(),
            response_ms,
        )
        .await;
    if let Some(query) = &context.last_query {
        let _ = state.chat_service.save_last_query(&session.id, query).await;
    }
    let _ = state.chat_service.end_session(&session.id).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for step in &outcome.steps {
            println!(
                "  {} {}",
                style("→").dim(),
                style(format!("{}({})", step.tool, step.input)).dim()
            );
        }
        println!();
        println!("{}", outcome.answer.trim());
    }

    Ok(())
}
