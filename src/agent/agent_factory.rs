use std::sync::Arc;
use tracing::info;
use anyhow::Result;

use crate::agent::agents::AgentInterface;
use crate::agent::agents::stylist_agent::StylistAgent;
use crate::agent::stateless_llm_factory::StatelessLLMFactory;
use crate::agent::tools::ToolRegistry;
use crate::config::Config;

/// Factory for creating agent instances
pub struct AgentFactory;

impl AgentFactory {
    /// Create an agent based on the configuration.
    ///
    /// # Arguments
    /// * `config` - Application configuration; `agent.conversation_agent_choice`
    ///   selects the agent and `llm` configures its model
    pub fn create_agent(config: &Config) -> Result<Arc<dyn AgentInterface>> {
        let choice = config.agent.conversation_agent_choice.as_str();
        info!("Initializing agent: {}", choice);

        match choice {
            "stylist_agent" => {
                let llm = StatelessLLMFactory::create_llm(&config.llm)?;

                let agent = StylistAgent::new(
                    llm,
                    config.agent.system_prompt.clone(),
                    ToolRegistry::stylist(),
                    config.agent.max_steps,
                    config.agent.max_history,
                );

                Ok(Arc::new(agent))
            }
            _ => Err(anyhow::anyhow!("Unsupported agent type: {}", choice)),
        }
    }
}
