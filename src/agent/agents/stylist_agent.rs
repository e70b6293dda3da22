use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::agent_interface::{AgentInterface, AgentOutcome, EventHandler};
use crate::agent::input_types::ChatMessage;
use crate::agent::output_types::{AgentEvent, ToolResult, ToolUse};
use crate::agent::stateless_llm::StatelessLLMInterface;
use crate::agent::tools::{ToolContext, ToolRegistry};

/// Tool-using agent with a single conversation memory.
///
/// The memory lives as long as the agent, so every chat continues the same
/// conversation. Invocations are serialized on the memory lock. After each
/// successful invocation the memory is trimmed to `max_history` messages;
/// a failed invocation leaves it as it was before the call.
pub struct StylistAgent {
    memory: Mutex<Vec<ChatMessage>>,
    llm: Arc<dyn StatelessLLMInterface>,
    system: String,
    tools: ToolRegistry,
    max_steps: usize,
    max_history: usize,
}

impl StylistAgent {
    /// Initialize the agent with LLM, system prompt and tools
    ///
    /// # Arguments
    /// * `llm` - The LLM to use
    /// * `system` - System prompt
    /// * `tools` - Tools offered to the model
    /// * `max_steps` - Upper bound on model calls per invocation
    /// * `max_history` - Messages kept between invocations, 0 keeps all
    pub fn new(
        llm: Arc<dyn StatelessLLMInterface>,
        system: String,
        tools: ToolRegistry,
        max_steps: usize,
        max_history: usize,
    ) -> Self {
        debug!("Stylist Agent: Setting system prompt: '''{}'''", system);
        if tools.is_empty() {
            warn!("StylistAgent initialized without tools, handoff is unavailable.");
        } else {
            info!("StylistAgent initialized with {} tools.", tools.len());
        }

        Self {
            memory: Mutex::new(Vec::new()),
            llm,
            system,
            tools,
            max_steps: max_steps.max(1),
            max_history,
        }
    }

    #[cfg(test)]
    async fn memory_len(&self) -> usize {
        self.memory.lock().await.len()
    }

    async fn run_tool(&self, tool_use: &ToolUse, ctx: &ToolContext<'_>) -> ToolResult {
        let Some(tool) = self.tools.get(&tool_use.name) else {
            warn!("Model requested unknown tool: {}", tool_use.name);
            return ToolResult::error(
                tool_use.tool_use_id.clone(),
                format!("Unknown tool: {}", tool_use.name),
            );
        };

        info!("Running tool {} ({})", tool_use.name, tool_use.tool_use_id);
        match tool.call(tool_use, ctx).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Tool {} failed: {}", tool_use.name, e);
                ToolResult::error(tool_use.tool_use_id.clone(), e.to_string())
            }
        }
    }

    /// One user turn: model calls and tool runs until a reply without tool calls
    async fn run_turn(
        &self,
        memory: &mut Vec<ChatMessage>,
        instruction: &str,
        handler: &dyn EventHandler,
        ctx: &ToolContext<'_>,
    ) -> anyhow::Result<AgentOutcome> {
        memory.push(ChatMessage::user(instruction));

        let specs = self.tools.specs();

        for step in 1..=self.max_steps {
            let reply = self
                .llm
                .chat_completion(memory, Some(&self.system), &specs)
                .await
                .context("LLM error")?;

            let event = AgentEvent::from_message(&reply);
            let calls = reply.requested_tools().to_vec();
            memory.push(reply);
            handler.on_event(&event);

            if calls.is_empty() {
                return Ok(AgentOutcome {
                    steps: step,
                    last_event: event,
                });
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                let tool_use = ToolUse::from_call(call);
                let result = self.run_tool(&tool_use, ctx).await;
                memory.push(ChatMessage::tool_result(call.id.clone(), result.text()));
                results.push(result);
            }
            handler.on_event(&AgentEvent::tool_results(results));
        }

        anyhow::bail!(
            "Agent stopped after {} steps without a final answer",
            self.max_steps
        )
    }
}

/// Drop the oldest messages so at most `max_history` remain.
///
/// The kept window always starts at a user message, so an assistant tool
/// call is never separated from its tool results. When the newest turn alone
/// is longer than `max_history`, that whole turn is kept. Returns the number
/// of messages removed.
fn trim_history(memory: &mut Vec<ChatMessage>, max_history: usize) -> usize {
    if max_history == 0 || memory.len() <= max_history {
        return 0;
    }

    let earliest = memory.len() - max_history;
    let cut = memory[earliest..]
        .iter()
        .position(|m| m.role == "user")
        .map(|offset| earliest + offset)
        .or_else(|| memory.iter().rposition(|m| m.role == "user"))
        .unwrap_or(0);

    memory.drain(..cut);
    cut
}

#[async_trait]
impl AgentInterface for StylistAgent {
    async fn invoke(
        &self,
        instruction: &str,
        handler: &dyn EventHandler,
        ctx: &ToolContext<'_>,
    ) -> anyhow::Result<AgentOutcome> {
        let mut memory = self.memory.lock().await;
        let start = memory.len();

        match self.run_turn(&mut memory, instruction, handler, ctx).await {
            Ok(outcome) => {
                let dropped = trim_history(&mut memory, self.max_history);
                if dropped > 0 {
                    debug!(
                        "Dropped {} old messages, {} remain in memory",
                        dropped,
                        memory.len()
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                memory.truncate(start);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::extractor::MessageBufferHandler;
    use crate::agent::input_types::ToolCall;
    use crate::agent::output_types::ToolStatus;
    use crate::buffer::ResponseBuffer;
    use crate::error::LlmError;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    /// Replays canned replies and records what it was sent
    struct ScriptedLLM {
        replies: StdMutex<VecDeque<ChatMessage>>,
        seen: StdMutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedLLM {
        fn new(replies: Vec<ChatMessage>) -> Arc<Self> {
            Arc::new(Self {
                replies: StdMutex::new(replies.into()),
                seen: StdMutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Vec<ChatMessage>> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatelessLLMInterface for ScriptedLLM {
        async fn chat_completion(
            &self,
            messages: &[ChatMessage],
            _system: Option<&str>,
            _tools: &[Value],
        ) -> Result<ChatMessage, LlmError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(LlmError::EmptyResponse)
        }
    }

    /// Collects every event for inspection
    #[derive(Default)]
    struct Recorder(StdMutex<Vec<AgentEvent>>);

    impl EventHandler for Recorder {
        fn on_event(&self, event: &AgentEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn agent(llm: Arc<ScriptedLLM>, max_steps: usize) -> StylistAgent {
        StylistAgent::new(llm, "system".to_string(), ToolRegistry::stylist(), max_steps, 0)
    }

    fn handoff_call(id: &str, message: &str) -> ChatMessage {
        ChatMessage::assistant_with_tools(
            Some("Let's find your style.".to_string()),
            vec![ToolCall::new(
                id,
                "handoff_to_user",
                serde_json::json!({ "message": message }).to_string(),
            )],
        )
    }

    #[tokio::test]
    async fn test_text_reply_ends_invocation() {
        let llm = ScriptedLLM::new(vec![ChatMessage::assistant("Wear more navy.")]);
        let agent = agent(llm.clone(), 4);
        let buffer = ResponseBuffer::new();

        let outcome = agent
            .invoke("hello", &MessageBufferHandler::new(&buffer), &ToolContext::new(&buffer))
            .await
            .unwrap();

        assert_eq!(outcome.steps, 1);
        assert_eq!(buffer.get(), "Wear more navy.");
        assert_eq!(agent.memory_len().await, 2);
        assert_eq!(llm.calls()[0][0], ChatMessage::user("hello"));
    }

    #[tokio::test]
    async fn test_handoff_then_final_answer() {
        let llm = ScriptedLLM::new(vec![
            handoff_call("call_1", "Favorite color?"),
            ChatMessage::assistant("What is your favorite color? (e.g. blue, black)"),
        ]);
        let agent = agent(llm.clone(), 4);
        let buffer = ResponseBuffer::new();
        let recorder = Recorder::default();

        let outcome = agent
            .invoke("I need an outfit", &recorder, &ToolContext::new(&buffer))
            .await
            .unwrap();

        assert_eq!(outcome.steps, 2);
        // handoff tool wrote its question into the buffer
        assert_eq!(buffer.get(), "Favorite color?");

        let events = recorder.0.lock().unwrap().clone();
        assert_eq!(events.len(), 3);
        assert!(events[0].is_assistant());
        assert_eq!(events[1].role, "user");
        let result = events[1].content[0].tool_result.as_ref().unwrap();
        assert_eq!(result.status, ToolStatus::Success);

        // second model call sees the tool result keyed by the call id
        let second = &llm.calls()[1];
        let tool_msg = second.last().unwrap();
        assert_eq!(tool_msg.role, "tool");
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_last_assistant_event_wins() {
        let llm = ScriptedLLM::new(vec![
            handoff_call("call_1", "Favorite color?"),
            ChatMessage::assistant("Thanks!"),
        ]);
        let agent = agent(llm, 4);
        let buffer = ResponseBuffer::new();

        agent
            .invoke("hi", &MessageBufferHandler::new(&buffer), &ToolContext::new(&buffer))
            .await
            .unwrap();

        // the last assistant event wins
        assert_eq!(buffer.get(), "Thanks!");
    }

    #[tokio::test]
    async fn test_unknown_tool_reported_to_model() {
        let llm = ScriptedLLM::new(vec![
            ChatMessage::assistant_with_tools(
                None,
                vec![ToolCall::new("call_9", "checkout", "{}")],
            ),
            ChatMessage::assistant("Sorry, I can't do that."),
        ]);
        let agent = agent(llm.clone(), 4);
        let buffer = ResponseBuffer::new();

        let outcome = agent
            .invoke("buy it", &MessageBufferHandler::new(&buffer), &ToolContext::new(&buffer))
            .await
            .unwrap();

        assert_eq!(outcome.steps, 2);
        let tool_msg = llm.calls()[1].last().unwrap().clone();
        assert_eq!(tool_msg.content.as_deref(), Some("Unknown tool: checkout"));
    }

    #[tokio::test]
    async fn test_max_steps_exceeded() {
        let llm = ScriptedLLM::new(vec![
            handoff_call("call_1", "One?"),
            handoff_call("call_2", "Two?"),
        ]);
        let agent = agent(llm, 2);
        let buffer = ResponseBuffer::new();

        let err = agent
            .invoke("loop", &MessageBufferHandler::new(&buffer), &ToolContext::new(&buffer))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("2 steps"));
        // the unfinished tool-call chain is not kept
        assert_eq!(agent.memory_len().await, 0);
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let llm = ScriptedLLM::new(vec![]);
        let agent = agent(llm, 2);
        let buffer = ResponseBuffer::new();

        let err = agent
            .invoke("hi", &MessageBufferHandler::new(&buffer), &ToolContext::new(&buffer))
            .await
            .unwrap_err();
        assert_eq!(format!("{:#}", err), "LLM error: model returned no choices");
        assert!(!buffer.is_set());
        assert_eq!(agent.memory_len().await, 0);
    }

    #[tokio::test]
    async fn test_failed_invocation_keeps_earlier_turns() {
        let llm = ScriptedLLM::new(vec![ChatMessage::assistant("First.")]);
        let agent = agent(llm.clone(), 2);
        let buffer = ResponseBuffer::new();
        let handler = MessageBufferHandler::new(&buffer);

        agent.invoke("one", &handler, &ToolContext::new(&buffer)).await.unwrap();
        assert!(agent
            .invoke("two", &handler, &ToolContext::new(&buffer))
            .await
            .is_err());
        assert_eq!(agent.memory_len().await, 2);
    }

    #[tokio::test]
    async fn test_memory_is_bounded() {
        let replies = (0..200)
            .map(|i| ChatMessage::assistant(format!("Reply {}", i)))
            .collect();
        let llm = ScriptedLLM::new(replies);
        let agent = StylistAgent::new(
            llm.clone(),
            "system".to_string(),
            ToolRegistry::stylist(),
            2,
            40,
        );
        let buffer = ResponseBuffer::new();
        let handler = MessageBufferHandler::new(&buffer);

        for i in 0..200 {
            let instruction = format!("turn {}", i);
            agent
                .invoke(&instruction, &handler, &ToolContext::new(&buffer))
                .await
                .unwrap();
        }

        assert_eq!(agent.memory_len().await, 40);
        // the last request carries the 20 kept turns plus the new instruction
        let last_request = llm.calls().last().unwrap().clone();
        assert_eq!(last_request.len(), 41);
        assert_eq!(last_request[0], ChatMessage::user("turn 179"));
        assert_eq!(last_request[40], ChatMessage::user("turn 199"));
    }

    #[test]
    fn test_trim_history_keeps_tool_results_with_their_call() {
        let mut memory = vec![
            ChatMessage::user("one"),
            ChatMessage::assistant("First."),
            ChatMessage::user("two"),
            ChatMessage::assistant_with_tools(
                None,
                vec![ToolCall::new("call_1", "handoff_to_user", "{}")],
            ),
            ChatMessage::tool_result("call_1", "Waiting"),
            ChatMessage::assistant("Second."),
            ChatMessage::user("three"),
            ChatMessage::assistant("Third."),
        ];

        // a window of 5 would start at the tool result, so the cut moves
        // forward to the next user message
        let dropped = trim_history(&mut memory, 5);

        assert_eq!(dropped, 6);
        assert_eq!(
            memory,
            vec![ChatMessage::user("three"), ChatMessage::assistant("Third.")]
        );
    }

    #[test]
    fn test_trim_history_keeps_oversized_last_turn() {
        let mut memory = vec![
            ChatMessage::user("one"),
            ChatMessage::assistant("First."),
            ChatMessage::user("two"),
            ChatMessage::assistant_with_tools(
                None,
                vec![ToolCall::new("call_1", "handoff_to_user", "{}")],
            ),
            ChatMessage::tool_result("call_1", "Waiting"),
            ChatMessage::assistant("Second."),
        ];

        let dropped = trim_history(&mut memory, 2);

        assert_eq!(dropped, 2);
        assert_eq!(memory[0], ChatMessage::user("two"));
        assert_eq!(memory.len(), 4);
        assert_eq!(trim_history(&mut memory, 0), 0);
    }

    #[tokio::test]
    async fn test_memory_carries_across_invocations() {
        let llm = ScriptedLLM::new(vec![
            ChatMessage::assistant("First."),
            ChatMessage::assistant("Second."),
        ]);
        let agent = agent(llm.clone(), 2);
        let buffer = ResponseBuffer::new();
        let handler = MessageBufferHandler::new(&buffer);

        agent.invoke("one", &handler, &ToolContext::new(&buffer)).await.unwrap();
        agent.invoke("two", &handler, &ToolContext::new(&buffer)).await.unwrap();

        let second = &llm.calls()[1];
        assert_eq!(second.len(), 3);
        assert_eq!(second[1], ChatMessage::assistant("First."));
        assert_eq!(agent.memory_len().await, 4);
    }
}
