use std::sync::Arc;

use crate::agent::{AgentFactory, AgentInterface};
use crate::buffer::ResponseBuffer;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub agent: Arc<dyn AgentInterface>,
    /// Latest reply shown to any client, seeded with the greeting
    pub latest: Arc<ResponseBuffer>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let agent = AgentFactory::create_agent(&config)?;
        Ok(Self::with_agent(config, agent))
    }

    pub fn with_agent(config: Config, agent: Arc<dyn AgentInterface>) -> Self {
        let latest = Arc::new(ResponseBuffer::with_message(config.agent.greeting.clone()));
        Self {
            config,
            agent,
            latest,
        }
    }
}
