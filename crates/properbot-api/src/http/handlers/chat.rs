//! SSE streaming chat endpoint.
//!
//! POST /api/v1/chat/stream
//!
//! Runs the agent for one user message and streams its progress as
//! Server-Sent Events. Follows the same flow as the CLI chat loop:
//! resolve session -> load history -> build executor -> run -> persist.
//!
//! SSE event types:
//! - `session` — initial event with `{ "session_id": "..." }`
//! - `tool_call` — the agent invoked a tool: `{ "name": "...", "input": {...} }`
//! - `tool_result` — tool observation summary: `{ "name": "...", "summary": "..." }`
//! - `text` — the final answer: `{ "text": "..." }`
//! - `usage` — token usage: `{ "input_tokens": N, "output_tokens": N }`
//! - `done` — stream complete: `{}`
//! - `error` — error occurred: `{ "message": "..." }`

use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::Deserialize;
use tokio_stream::Stream;

use properbot_core::agent::context::AgentContext;
use properbot_core::agent::prompt::SystemPromptBuilder;
use properbot_core::agent::title::generate_title;
use properbot_types::agent::AgentEvent;
use properbot_types::chat::MessageRole;
use properbot_types::error::AgentError;
use properbot_types::llm::StopReason;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for the streaming chat endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamChatRequest {
    /// Existing session ID to continue; if absent, a new session is created.
    pub session_id: Option<String>,
    /// The user message to send to the agent.
    pub message: String,
}

/// POST /api/v1/chat/stream — SSE streaming chat.
///
/// Resolves the session, runs the agent, streams progress events, and
/// persists both sides of the exchange plus the refined query afterward.
pub async fn stream_chat(
    State(state): State<AppState>,
    Json(body): Json<StreamChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if body.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    // Resolve or create the session
    let session = match &body.session_id {
        Some(sid) => {
            let id = sid
                .parse::<uuid::Uuid>()
                .map_err(|_| AppError::Validation("Invalid session_id format".to_string()))?;
            state
                .chat_service
                .get_session(&id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("session {sid} not found")))?
        }
        None => state.chat_service.create_session(state.config.model.clone()).await?,
    };
    let session_id = session.id;

    let executor = state
        .build_agent()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Build agent context with history and the remembered query
    let system_prompt =
        SystemPromptBuilder::build(&executor.tools().specs(), session.last_query.as_ref());
    let mut context =
        AgentContext::new(state.agent_config(), system_prompt, session.last_query.clone());

    let history = state
        .chat_service
        .get_messages(&session_id, None, None)
        .await
        .unwrap_or_default();
    let is_first_exchange = history.is_empty();
    for msg in &history {
        match msg.role {
            MessageRole::User => context.add_user_message(msg.content.clone()),
            MessageRole::Assistant => context.add_assistant_message(msg.content.clone()),
            MessageRole::System => {}
        }
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<AgentEvent>();

    let chat_service = state.chat_service.clone();
    let model = state.config.model.clone();
    let user_message = body.message.clone();
    let needs_title = session.title.is_none() && is_first_exchange;

    // Run the agent on its own task so events stream while it works.
    let run_handle = tokio::spawn(async move {
        let start = Instant::now();
        let outcome = executor.run(&mut context, &user_message, Some(&tx)).await?;
        let response_ms = start.elapsed().as_millis() as u64;

        // Persist the exchange; failures here must not kill the stream
        let _ = chat_service
            .save_user_message(session_id, user_message.clone())
            .await;
        let _ = chat_service
            .save_assistant_message(
                session_id,
                outcome.answer.clone(),
                model.clone(),
                outcome.usage.input_tokens,
                outcome.usage.output_tokens,
                StopReason::EndTurn.to_string(),
                response_ms,
            )
            .await;
        let _ = chat_service
            .update_session_tokens(
                &session_id,
                outcome.usage.input_tokens,
                outcome.usage.output_tokens,
            )
            .await;

        if let Some(query) = &context.last_query {
            let _ = chat_service.save_last_query(&session_id, query).await;
        }

        if needs_title {
            if let Ok(title) = generate_title(
                executor.engine().provider(),
                &user_message,
                &outcome.answer,
                &model,
            )
            .await
            {
                let _ = chat_service.update_session_title(&session_id, title).await;
            }
        }

        Ok::<(), AgentError>(())
    });

    let sse_stream = async_stream::stream! {
        let session_json = serde_json::json!({ "session_id": session_id.to_string() });
        yield Ok::<_, Infallible>(Event::default().event("session").data(session_json.to_string()));

        while let Some(agent_event) = rx.recv().await {
            let (name, data) = match agent_event {
                AgentEvent::ToolCall { name, input } => (
                    "tool_call",
                    serde_json::json!({ "name": name, "input": input }),
                ),
                AgentEvent::ToolResult { name, summary } => (
                    "tool_result",
                    serde_json::json!({ "name": name, "summary": summary }),
                ),
                AgentEvent::FinalAnswer { text } => {
                    ("text", serde_json::json!({ "text": text }))
                }
                AgentEvent::Usage(usage) => (
                    "usage",
                    serde_json::to_value(&usage).unwrap_or_default(),
                ),
            };
            yield Ok(Event::default().event(name).data(data.to_string()));
        }

        match run_handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let data = serde_json::json!({ "message": e.to_string() });
                yield Ok(Event::default().event("error").data(data.to_string()));
            }
            Err(e) => {
                let data = serde_json::json!({ "message": format!("agent task failed: {e}") });
                yield Ok(Event::default().event("error").data(data.to_string()));
            }
        }

        yield Ok(Event::default().event("done").data("{}"));
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
