//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. Services are generic over repository traits, but AppState pins them
//! to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use properbot_core::agent::engine::AgentEngine;
use properbot_core::agent::executor::AgentExecutor;
use properbot_core::chat::service::ChatService;
use properbot_core::listing::cache::BoxListingCache;
use properbot_core::listing::source::BoxListingSource;
use properbot_core::llm::box_provider::BoxLlmProvider;
use properbot_core::tool::home_search::HomeSearchTool;
use properbot_core::tool::registry::ToolRegistry;
use properbot_core::tool::BoxTool;
use properbot_infra::config::{load_global_config, resolve_data_dir};
use properbot_infra::harvest::{HttpListingSource, StaticListingSource};
use properbot_infra::llm::openai_compat::OpenAiCompatProvider;
use properbot_infra::secret::openai_api_key;
use properbot_infra::sqlite::chat::SqliteChatRepository;
use properbot_infra::sqlite::listing::SqliteListingCache;
use properbot_infra::sqlite::pool::DatabasePool;
use properbot_types::agent::AgentConfig;
use properbot_types::config::GlobalConfig;

/// Concrete type alias for the chat service pinned to the SQLite repository.
pub type ConcreteChatService = ChatService<SqliteChatRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub listing_cache: Arc<SqliteListingCache>,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
    /// Serve fixture listings instead of calling the harvest service.
    pub offline: bool,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init(offline: bool) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        // Initialize database
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("properbot.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        let chat_service = ChatService::new(SqliteChatRepository::new(db_pool.clone()));
        let listing_cache = SqliteListingCache::new(db_pool.clone());

        Ok(Self {
            chat_service: Arc::new(chat_service),
            listing_cache: Arc::new(listing_cache),
            config,
            data_dir,
            db_pool,
            offline,
        })
    }

    /// LLM settings derived from the global config.
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            max_iterations: self.config.max_iterations,
            window_turns: self.config.window_turns,
        }
    }

    /// Build an agent executor: provider + home search tool over the
    /// configured listing source.
    ///
    /// Reads the API key from the environment; offline mode swaps the
    /// harvest client for the fixture source.
    pub fn build_agent(&self) -> anyhow::Result<AgentExecutor> {
        let api_key = openai_api_key()?;

        let provider = match self.config.base_url.as_deref() {
            Some(base_url) => {
                OpenAiCompatProvider::compatible(&api_key, &self.config.model, base_url)
            }
            None => OpenAiCompatProvider::openai(&api_key, &self.config.model),
        };
        let engine = AgentEngine::new(BoxLlmProvider::new(provider));

        let source = if self.offline {
            BoxListingSource::new(StaticListingSource::with_sample_data())
        } else {
            BoxListingSource::new(HttpListingSource::new(&self.config.harvest)?)
        };

        let cache = BoxListingCache::new(SqliteListingCache::new(self.db_pool.clone()));
        let home_search =
            HomeSearchTool::new(source, Some(cache)).with_max_results(self.config.max_results);

        let registry = ToolRegistry::new();
        registry.register(BoxTool::new(home_search));

        Ok(AgentExecutor::new(
            engine,
            registry,
            self.config.max_iterations,
        ))
    }
}
