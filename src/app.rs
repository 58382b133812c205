use crate::application::{AnchorService, AuditPipeline};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::llm_clients::{LLMClient, OpenAIClient};
use crate::interfaces::http::LogEntry;
use std::sync::{Arc, Mutex};

/// Long-lived services shared by every request
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: AuditPipeline,
    pub anchor: Arc<AnchorService>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl AppState {
    pub fn new(config: AppConfig, logs: Arc<Mutex<Vec<LogEntry>>>) -> Self {
        let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(OpenAIClient::new());
        Self::with_llm_client(config, llm_client, logs)
    }

    pub fn with_llm_client(
        config: AppConfig,
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        logs: Arc<Mutex<Vec<LogEntry>>>,
    ) -> Self {
        let anchor = Arc::new(AnchorService::from_config(&config.ledger));
        let pipeline = AuditPipeline::from_config(&config, llm_client, anchor.clone());
        Self {
            config,
            pipeline,
            anchor,
            logs,
        }
    }
}
