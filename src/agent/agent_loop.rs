//! Core planning loop implementation.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::Config;
use crate::llm::{ChatMessage, LlmClient};
use crate::tools::{DispatchError, ToolRegistry};

use super::state::Conversation;
use super::termination::{self, Step};
use super::{prompt, PlannerError};

/// Terminal result of a planning run: the final answer plus the full
/// conversation that produced it.
#[derive(Debug)]
pub struct PlanOutcome {
    pub answer: String,
    pub conversation: Conversation,
}

/// Drives one bounded conversation to a final itinerary.
///
/// Each run owns its [`Conversation`] exclusively and is strictly
/// sequential: the model call, then each tool dispatch in request order,
/// each awaited to completion before the next begins. Concurrent planning
/// requests are independent `run` calls with no shared mutable state.
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    model: String,
    max_tool_calls: usize,
}

impl Planner {
    pub fn new(config: &Config, llm: Arc<dyn LlmClient>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            llm,
            tools,
            model: config.default_model.clone(),
            max_tool_calls: config.max_tool_calls,
        }
    }

    /// Plan from a rendered user request and return the final answer.
    pub async fn plan(&self, user_request: &str) -> Result<PlanOutcome, PlannerError> {
        self.run(Conversation::starting_with(user_request)).await
    }

    /// Drive `conversation` until the model produces a final answer.
    ///
    /// Terminates on the first of: a response without tool calls, a
    /// response that already contains a complete itinerary, or the
    /// tool-call ceiling (which forces one last tool-free model turn).
    /// The ceiling makes the loop total: every iteration either finishes
    /// or increases `tool_calls_made`.
    pub async fn run(&self, mut conversation: Conversation) -> Result<PlanOutcome, PlannerError> {
        // Fresh correlation id per request; threaded to the backend so
        // concurrent requests stay isolated in its session accounting.
        let correlation = Uuid::new_v4().to_string();

        conversation.ensure_system_prompt(prompt::SYSTEM_PROMPT);
        let schemas = self.tools.tool_schemas();

        loop {
            if conversation.tool_calls_made() >= self.max_tool_calls {
                tracing::info!(
                    correlation = %correlation,
                    calls = conversation.tool_calls_made(),
                    "tool-call ceiling reached, forcing final answer"
                );
                return self.force_final_answer(conversation, &correlation).await;
            }

            tracing::debug!(
                correlation = %correlation,
                context = conversation.messages().len(),
                calls = conversation.tool_calls_made(),
                "invoking model"
            );

            let response = self
                .llm
                .chat_completion(&self.model, conversation.messages(), Some(&schemas), &correlation)
                .await
                .map_err(PlannerError::ModelInvocation)?;

            match termination::next_step(&response, conversation.tool_calls_made(), self.max_tool_calls) {
                Step::Finish => {
                    let answer = response.content.clone().ok_or(PlannerError::EmptyResponse)?;
                    conversation.push(response);
                    tracing::info!(correlation = %correlation, "final answer produced");
                    return Ok(PlanOutcome { answer, conversation });
                }
                Step::DispatchTools => {
                    let calls = response.tool_calls.clone().unwrap_or_default();
                    conversation.push(response);

                    for call in &calls {
                        tracing::info!(
                            correlation = %correlation,
                            tool = %call.function.name,
                            args = %call.function.arguments,
                            "dispatching tool call"
                        );

                        let result = match self.tools.dispatch(call).await {
                            Ok(output) => output,
                            // Execution failures go back to the model as
                            // results so it can retry with different
                            // arguments or plan without the data.
                            Err(DispatchError::ToolFailed { tool, source }) => {
                                tracing::warn!(tool = %tool, error = %source, "tool execution failed");
                                format!("tool {} failed: {}", tool, source)
                            }
                            // Dispatch-level failures are defects, not
                            // data problems; no point feeding them back.
                            Err(DispatchError::UnknownTool(name)) => {
                                return Err(PlannerError::UnknownTool(name));
                            }
                            Err(DispatchError::InvalidArguments { tool, reason }) => {
                                return Err(PlannerError::InvalidToolArguments { tool, reason });
                            }
                        };

                        conversation.push(ChatMessage::tool_result(&call.id, result));
                    }
                }
            }
        }
    }

    /// One last model turn with tools disabled and a stop directive
    /// appended. The tool-free invocation cannot request calls, so this
    /// branch never loops.
    async fn force_final_answer(
        &self,
        mut conversation: Conversation,
        correlation: &str,
    ) -> Result<PlanOutcome, PlannerError> {
        let mut context = conversation.messages().to_vec();
        context.push(ChatMessage::system(prompt::FORCED_FINAL_DIRECTIVE));

        let response = self
            .llm
            .chat_completion(&self.model, &context, None, correlation)
            .await
            .map_err(PlannerError::ModelInvocation)?;

        let answer = response.content.clone().ok_or(PlannerError::EmptyResponse)?;
        conversation.push(response);
        Ok(PlanOutcome { answer, conversation })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::llm::{FunctionCall, Role, ToolCall};
    use crate::tools::Tool;

    /// Replays a fixed response script and records, per invocation,
    /// whether tools were enabled.
    struct ScriptedModel {
        responses: Mutex<VecDeque<ChatMessage>>,
        tools_enabled: Mutex<Vec<bool>>,
    }

    impl ScriptedModel {
        fn new(responses: Vec<ChatMessage>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                tools_enabled: Mutex::new(Vec::new()),
            })
        }

        fn invocations(&self) -> Vec<bool> {
            self.tools_enabled.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedModel {
        async fn chat_completion(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            tools: Option<&[Value]>,
            _session: &str,
        ) -> anyhow::Result<ChatMessage> {
            self.tools_enabled.lock().unwrap().push(tools.is_some());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("model script exhausted"))
        }
    }

    /// Counts executions and echoes its own name plus the arguments.
    struct CountingTool {
        name: &'static str,
        executions: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Test tool."
        }

        fn parameters_schema(&self) -> Value {
            json!({ "type": "object", "properties": { "q": { "type": "string" } }, "required": [] })
        }

        async fn execute(&self, args: Value) -> anyhow::Result<String> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{}:{}", self.name, args["q"].as_str().unwrap_or("-")))
        }
    }

    fn test_registry(executions: Arc<AtomicUsize>) -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::from_tools(vec![
            Arc::new(CountingTool { name: "search_flights", executions: executions.clone() }),
            Arc::new(CountingTool { name: "search_hotels", executions }),
        ]))
    }

    fn planner(
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolRegistry>,
        max_tool_calls: usize,
    ) -> Planner {
        let mut config = Config::new("test-key".to_string(), "test-model".to_string());
        config.max_tool_calls = max_tool_calls;
        Planner::new(&config, llm, tools)
    }

    fn tool_call(id: &str, tool: &str, q: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: tool.to_string(),
                arguments: json!({ "q": q }).to_string(),
            },
        }
    }

    fn assistant_with_calls(calls: Vec<ToolCall>) -> ChatMessage {
        ChatMessage {
            role: Role::Assistant,
            content: None,
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    #[tokio::test]
    async fn plain_first_response_means_one_invocation_and_no_dispatches() {
        let executions = Arc::new(AtomicUsize::new(0));
        let model = ScriptedModel::new(vec![ChatMessage::assistant("Here is a simple plan.")]);
        let outcome = planner(model.clone(), test_registry(executions.clone()), 10)
            .plan("plan 3 days, Delhi to Goa")
            .await
            .unwrap();

        assert_eq!(outcome.answer, "Here is a simple plan.");
        assert_eq!(model.invocations(), vec![true]);
        assert_eq!(executions.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.conversation.tool_calls_made(), 0);
    }

    #[tokio::test]
    async fn ceiling_forces_a_tool_free_final_turn() {
        let executions = Arc::new(AtomicUsize::new(0));
        let model = ScriptedModel::new(vec![
            assistant_with_calls(vec![tool_call("c1", "search_flights", "a")]),
            assistant_with_calls(vec![tool_call("c2", "search_flights", "b")]),
            ChatMessage::assistant("Best-effort plan from gathered data."),
        ]);

        let outcome = planner(model.clone(), test_registry(executions.clone()), 2)
            .plan("plan a trip")
            .await
            .unwrap();

        // Two tool-enabled turns reach the ceiling; the third turn must
        // run with tools disabled and terminate without dispatching.
        assert_eq!(model.invocations(), vec![true, true, false]);
        assert_eq!(executions.load(Ordering::SeqCst), 2);
        assert_eq!(outcome.conversation.tool_calls_made(), 2);
        assert_eq!(outcome.answer, "Best-effort plan from gathered data.");
    }

    #[tokio::test]
    async fn tool_results_mirror_request_order() {
        let executions = Arc::new(AtomicUsize::new(0));
        let model = ScriptedModel::new(vec![
            assistant_with_calls(vec![
                tool_call("c1", "search_flights", "first"),
                tool_call("c2", "search_hotels", "second"),
            ]),
            ChatMessage::assistant("done"),
        ]);

        let outcome = planner(model, test_registry(executions), 10)
            .plan("plan a trip")
            .await
            .unwrap();

        let tool_messages: Vec<&ChatMessage> = outcome
            .conversation
            .messages()
            .iter()
            .filter(|m| m.role == Role::Tool)
            .collect();

        assert_eq!(tool_messages.len(), 2);
        assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(tool_messages[0].content.as_deref(), Some("search_flights:first"));
        assert_eq!(tool_messages[1].tool_call_id.as_deref(), Some("c2"));
        assert_eq!(tool_messages[1].content.as_deref(), Some("search_hotels:second"));
    }

    #[tokio::test]
    async fn unknown_tool_escalates() {
        let executions = Arc::new(AtomicUsize::new(0));
        let model = ScriptedModel::new(vec![assistant_with_calls(vec![tool_call(
            "c1",
            "summon_dragon",
            "-",
        )])]);

        let err = planner(model, test_registry(executions), 10)
            .plan("plan a trip")
            .await
            .unwrap_err();

        assert!(matches!(err, PlannerError::UnknownTool(name) if name == "summon_dragon"));
    }

    #[tokio::test]
    async fn failing_tool_is_reported_back_not_escalated() {
        struct Flaky;

        #[async_trait]
        impl Tool for Flaky {
            fn name(&self) -> &str {
                "search_flights"
            }
            fn description(&self) -> &str {
                "Test tool."
            }
            fn parameters_schema(&self) -> Value {
                json!({ "type": "object", "properties": {}, "required": [] })
            }
            async fn execute(&self, _args: Value) -> anyhow::Result<String> {
                anyhow::bail!("upstream timed out")
            }
        }

        let model = ScriptedModel::new(vec![
            assistant_with_calls(vec![tool_call("c1", "search_flights", "-")]),
            ChatMessage::assistant("planned around the outage"),
        ]);
        let tools = Arc::new(ToolRegistry::from_tools(vec![Arc::new(Flaky)]));

        let outcome = planner(model, tools, 10).plan("plan a trip").await.unwrap();

        let failure = outcome
            .conversation
            .messages()
            .iter()
            .find(|m| m.role == Role::Tool)
            .and_then(|m| m.content.clone())
            .unwrap();
        assert!(failure.contains("search_flights failed"));
        assert!(failure.contains("upstream timed out"));
        assert_eq!(outcome.answer, "planned around the outage");
    }

    #[tokio::test]
    async fn detected_itinerary_stops_before_dispatching() {
        let executions = Arc::new(AtomicUsize::new(0));
        let finished = "# ✈️ 3-Day Trip: Delhi → Goa\n## 📅 DETAILED DAY-BY-DAY ITINERARY\nDay 1...";
        let mut response = ChatMessage::assistant(finished);
        response.tool_calls = Some(vec![tool_call("c1", "search_flights", "again")]);

        let outcome = planner(ScriptedModel::new(vec![response]), test_registry(executions.clone()), 10)
            .plan("plan a trip")
            .await
            .unwrap();

        assert_eq!(outcome.answer, finished);
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scripted_end_to_end_scenario() {
        let executions = Arc::new(AtomicUsize::new(0));
        let model = ScriptedModel::new(vec![
            assistant_with_calls(vec![tool_call("c1", "search_flights", "DEL-GOI")]),
            assistant_with_calls(vec![tool_call("c2", "search_hotels", "Goa")]),
            ChatMessage::assistant("# Your Goa plan"),
        ]);

        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::system("test instructions"));
        conversation.push(ChatMessage::user("plan 3 days, Delhi to Goa"));

        let outcome = planner(model.clone(), test_registry(executions.clone()), 10)
            .run(conversation)
            .await
            .unwrap();

        assert_eq!(executions.load(Ordering::SeqCst), 2);
        assert_eq!(outcome.conversation.tool_calls_made(), 2);
        assert_eq!(outcome.answer, "# Your Goa plan");
        assert_eq!(model.invocations(), vec![true, true, true]);
    }

    #[tokio::test]
    async fn empty_model_response_is_an_error() {
        let empty = ChatMessage {
            role: Role::Assistant,
            content: None,
            tool_calls: None,
            tool_call_id: None,
        };
        let executions = Arc::new(AtomicUsize::new(0));

        let err = planner(ScriptedModel::new(vec![empty]), test_registry(executions), 10)
            .plan("plan a trip")
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::EmptyResponse));
    }
}
