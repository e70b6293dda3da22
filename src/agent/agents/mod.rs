pub mod agent_interface;
pub mod stylist_agent;

pub use agent_interface::{AgentInterface, EventHandler};
