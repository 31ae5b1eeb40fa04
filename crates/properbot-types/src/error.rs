use thiserror::Error;

/// Errors from repository operations (used by trait definitions in properbot-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the harvest service boundary.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("harvest service unreachable: {0}")]
    Unreachable(String),

    #[error("harvest service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode harvest response: {0}")]
    Decode(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Errors from tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("tool '{tool}' failed: {message}")]
    Failed { tool: String, message: String },
}

/// Errors from running the agent loop.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("llm error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    #[error("agent exceeded {0} iterations without a final answer")]
    MaxIterations(u32),

    #[error("could not parse a structured action: {0}")]
    MalformedAction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_harvest_error_display() {
        let err = HarvestError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn test_tool_error_display() {
        let err = ToolError::InvalidArguments {
            tool: "home_search".to_string(),
            message: "location is required".to_string(),
        };
        assert!(err.to_string().contains("home_search"));
        assert!(err.to_string().contains("location is required"));
    }

    #[test]
    fn test_agent_error_max_iterations() {
        let err = AgentError::MaxIterations(6);
        assert!(err.to_string().contains('6'));
    }
}
