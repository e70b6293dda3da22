use serde::{Deserialize, Serialize};
use std::fs;
use anyhow::Result;

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an expert fashion stylist. Your goal is to help users find their personal style.
Your task is to provide fashion advice and offer products based on the user's preferences.
You can use the tools available to you to assist with this.
Note that for any prompts you ask the user, make sure you actually explicitly state the question you are asking, and possible some sample answers so they know what to type.
Keep the questions as simple as possible so the user doesn't have to type much. And don't ask more than 3 questions.
";

pub const DEFAULT_GREETING: &str =
    "Hello! I'm your fashion stylist assistant. How can I help you with your style today?";

pub const DEFAULT_INSTRUCTION_TEMPLATE: &str =
    "Continue the conversation with the user. The user says: {message}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding `index.html` and other UI assets
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "static".to_string()
}

/// Connection parameters for the chat model backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai_compatible_llm" or "ollama_llm"
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "openai_compatible_llm".to_string()
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_choice")]
    pub conversation_agent_choice: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// `{message}` is replaced with the user's text
    #[serde(default = "default_instruction_template")]
    pub instruction_template: String,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Messages kept in the conversation memory between chats, 0 keeps all
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_agent_choice() -> String {
    "stylist_agent".to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

fn default_instruction_template() -> String {
    DEFAULT_INSTRUCTION_TEMPLATE.to_string()
}

fn default_max_steps() -> usize {
    8
}

fn default_max_history() -> usize {
    40
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            conversation_agent_choice: default_agent_choice(),
            system_prompt: default_system_prompt(),
            greeting: default_greeting(),
            instruction_template: default_instruction_template(),
            max_steps: default_max_steps(),
            max_history: default_max_history(),
        }
    }
}

impl AgentConfig {
    /// Wrap the user's text in the instruction sent to the agent
    pub fn render_instruction(&self, user_message: &str) -> String {
        self.instruction_template.replace("{message}", user_message)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// `LLM_MODEL` takes precedence over `MODEL_ID`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LLM_URL") {
            self.llm.base_url = url;
        }

        if let Some(model) = lookup("LLM_MODEL").or_else(|| lookup("MODEL_ID")) {
            self.llm.model = model;
        }

        if let Some(key) = lookup("LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }

        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(value) => self.server.port = value,
                Err(_) => tracing::warn!("Invalid PORT: {}", port),
            }
        }

        if let Some(dir) = lookup("STATIC_DIR") {
            self.server.static_dir = dir;
        }
    }
}
