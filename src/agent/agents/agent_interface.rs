use async_trait::async_trait;

use crate::agent::output_types::AgentEvent;
use crate::agent::tools::ToolContext;

/// Receives every event the agent produces during an invocation
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &AgentEvent);
}

/// Summary of a finished invocation
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Number of model calls made
    pub steps: usize,
    /// Final assistant event, the one without tool calls
    pub last_event: AgentEvent,
}

/// Base interface for all agent implementations
#[async_trait]
pub trait AgentInterface: Send + Sync {
    /// Run the agent on an instruction.
    ///
    /// Events are delivered to `handler` as they are produced. Tools
    /// write through `ctx`, which belongs to the calling request.
    ///
    /// # Arguments
    /// * `instruction` - Templated instruction embedding the user's text
    /// * `handler` - Receives each assistant and tool-result event
    /// * `ctx` - Per-invocation tool context
    async fn invoke(
        &self,
        instruction: &str,
        handler: &dyn EventHandler,
        ctx: &ToolContext<'_>,
    ) -> anyhow::Result<AgentOutcome>;
}
