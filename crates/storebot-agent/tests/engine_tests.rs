// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation engine loop against a scripted model.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use storebot_agent::parser::INVALID_JSON;
use storebot_agent::{ConversationEngine, EngineSettings, FALLBACK_REPLY, Responder};
use storebot_core::{ConversationState, Intent, Role, StateUpdate, StorebotError, ToolCall};
use storebot_test_utils::{FixtureStore, MemoryStorage, MockCatalog, MockProvider, ScriptedReply};
use storebot_tools::{Tool, ToolRegistry};
use tracing_test::traced_test;

fn storefront() -> ToolRegistry {
    ToolRegistry::storefront(
        Arc::new(MemoryStorage::new()),
        Arc::new(FixtureStore::new()),
        Arc::new(MockCatalog::default()),
        10,
    )
}

fn engine(
    provider: Arc<MockProvider>,
    tools: ToolRegistry,
    settings: EngineSettings,
) -> ConversationEngine {
    ConversationEngine::new(provider, Arc::new(tools), settings)
}

fn user_state(text: &str) -> ConversationState {
    let mut state = ConversationState::new("chat-1");
    state.push(storebot_core::ChatMessage::user(text));
    state
}

struct SlowTool;

#[async_trait]
impl Tool for SlowTool {
    fn name(&self) -> &str {
        "slow_lookup"
    }

    fn description(&self) -> &str {
        "Never answers in time"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({"type": "object", "properties": {}})
    }

    async fn invoke(
        &self,
        _args: serde_json::Value,
        call_id: &str,
    ) -> Result<StateUpdate, StorebotError> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Ok(StateUpdate::tool_reply(call_id, "late"))
    }
}

struct BrokenTool;

#[async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &str {
        "broken_lookup"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({"type": "object", "properties": {}})
    }

    async fn invoke(
        &self,
        _args: serde_json::Value,
        _call_id: &str,
    ) -> Result<StateUpdate, StorebotError> {
        Err(StorebotError::Internal("backend offline".into()))
    }
}

fn tool_result<'a>(state: &'a ConversationState, call_id: &str) -> &'a str {
    state
        .messages
        .iter()
        .find(|m| m.tool_call_id.as_deref() == Some(call_id))
        .map(|m| m.content.as_str())
        .unwrap()
}

#[tokio::test]
async fn plain_reply_is_parsed() {
    let provider = Arc::new(MockProvider::with_script(vec![ScriptedReply::json(
        "Hello! How can I help?",
        "GREETING",
    )]));
    let engine = engine(provider.clone(), storefront(), EngineSettings::default());
    let mut state = user_state("hi");

    let reply = engine.respond("chat-1", &mut state).await.unwrap();
    assert_eq!(reply.content, "Hello! How can I help?");
    assert_eq!(reply.intent, Intent::Greeting);
    assert_eq!(provider.call_count().await, 1);
}

#[tokio::test]
async fn system_prompt_is_inserted_once() {
    let provider = Arc::new(MockProvider::with_script(vec![
        ScriptedReply::json("one", "GREETING"),
        ScriptedReply::json("two", "OTHER"),
    ]));
    let engine = engine(provider.clone(), storefront(), EngineSettings::default());
    let mut state = user_state("hi");

    engine.respond("chat-1", &mut state).await.unwrap();
    state.push(storebot_core::ChatMessage::user("again"));
    engine.respond("chat-1", &mut state).await.unwrap();

    let systems = state.messages.iter().filter(|m| m.role == Role::System).count();
    assert_eq!(systems, 1);
    assert_eq!(state.messages[0].role, Role::System);
    assert!(state.messages[0].content.contains("chat-1"));

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tools.len(), 3);
}

#[tokio::test]
async fn tool_results_feed_the_next_model_call() {
    let provider = Arc::new(MockProvider::with_script(vec![
        ScriptedReply::tool_call("call-1", "get_store_data", json!({"intent": "store_hours"})),
        ScriptedReply::json("We open at 09:00 on weekdays.", "STORE_HOURS"),
    ]));
    let engine = engine(provider.clone(), storefront(), EngineSettings::default());
    let mut state = user_state("when do you open?");

    let reply = engine.respond("chat-1", &mut state).await.unwrap();
    assert_eq!(reply.intent, Intent::StoreHours);

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 2);
    let tool_message = requests[1]
        .messages
        .iter()
        .find(|m| m.role == Role::Tool)
        .unwrap();
    assert_eq!(tool_message.tool_call_id.as_deref(), Some("call-1"));
    assert!(tool_message.content.contains("Monday To Friday: 09:00 - 19:00"));
}

#[tokio::test]
async fn parallel_calls_are_answered_in_call_order() {
    let provider = Arc::new(MockProvider::with_script(vec![
        ScriptedReply::ToolCalls(vec![
            ToolCall {
                id: "a".into(),
                name: "get_store_data".into(),
                arguments: json!({"intent": "store_location"}),
            },
            ToolCall {
                id: "b".into(),
                name: "get_products_data".into(),
                arguments: json!({"intent": "product_categories"}),
            },
        ]),
        ScriptedReply::json("Here you go.", "STORE_LOCATION"),
    ]));
    let engine = engine(provider, storefront(), EngineSettings::default());
    let mut state = user_state("where are you and what do you sell?");

    engine.respond("chat-1", &mut state).await.unwrap();

    let ids: Vec<&str> = state
        .messages
        .iter()
        .filter_map(|m| m.tool_call_id.as_deref())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn catalog_outage_does_not_abort_sibling_calls() {
    let catalog = Arc::new(MockCatalog::default());
    catalog.set_failing(true);
    let tools = ToolRegistry::storefront(
        Arc::new(MemoryStorage::new()),
        Arc::new(FixtureStore::new()),
        catalog.clone(),
        10,
    );
    let provider = Arc::new(MockProvider::with_script(vec![
        ScriptedReply::ToolCalls(vec![
            ToolCall {
                id: "a".into(),
                name: "get_products_data".into(),
                arguments: json!({"intent": "product_list"}),
            },
            ToolCall {
                id: "b".into(),
                name: "get_store_data".into(),
                arguments: json!({"intent": "store_hours"}),
            },
        ]),
        ScriptedReply::json("We open at 09:00.", "STORE_HOURS"),
    ]));
    let engine = engine(provider.clone(), tools, EngineSettings::default());
    let mut state = user_state("what do you sell and when are you open?");

    let reply = engine.respond("chat-1", &mut state).await.unwrap();

    assert_eq!(reply.content, "We open at 09:00.");
    assert_eq!(catalog.call_count(), 1);
    assert_eq!(
        tool_result(&state, "a"),
        "Error fetching product data: Products service is currently unavailable"
    );
    assert!(tool_result(&state, "b").contains("- Monday To Friday: 09:00 - 19:00"));
    assert_eq!(provider.call_count().await, 2);
}

#[tokio::test]
async fn failing_tool_does_not_abort_sibling_calls() {
    let mut tools = storefront();
    tools.register(Arc::new(BrokenTool));
    let provider = Arc::new(MockProvider::with_script(vec![
        ScriptedReply::ToolCalls(vec![
            ToolCall {
                id: "a".into(),
                name: "broken_lookup".into(),
                arguments: json!({}),
            },
            ToolCall {
                id: "b".into(),
                name: "get_store_data".into(),
                arguments: json!({"intent": "store_hours"}),
            },
        ]),
        ScriptedReply::json("We open at 09:00.", "STORE_HOURS"),
    ]));
    let engine = engine(provider, tools, EngineSettings::default());
    let mut state = user_state("when are you open?");

    let reply = engine.respond("chat-1", &mut state).await.unwrap();

    assert_eq!(reply.intent, Intent::StoreHours);
    assert_eq!(
        tool_result(&state, "a"),
        "Tool 'broken_lookup' failed: internal error: backend offline"
    );
    assert!(tool_result(&state, "b").contains("- Monday To Friday: 09:00 - 19:00"));
}

#[tokio::test]
async fn unknown_tool_gets_an_error_result() {
    let provider = Arc::new(MockProvider::with_script(vec![
        ScriptedReply::tool_call("call-9", "delete_everything", json!({})),
        ScriptedReply::json("I can't do that.", "OTHER"),
    ]));
    let engine = engine(provider, storefront(), EngineSettings::default());
    let mut state = user_state("wipe it");

    let reply = engine.respond("chat-1", &mut state).await.unwrap();
    assert_eq!(reply.content, "I can't do that.");

    let result = state
        .messages
        .iter()
        .find(|m| m.tool_call_id.as_deref() == Some("call-9"))
        .unwrap();
    assert_eq!(result.content, "Tool 'delete_everything' is not available.");
}

#[tokio::test(start_paused = true)]
async fn slow_tool_times_out() {
    let provider = Arc::new(MockProvider::with_script(vec![
        ScriptedReply::tool_call("call-1", "slow_lookup", json!({})),
        ScriptedReply::json("Sorry, that took too long.", "OTHER"),
    ]));
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(SlowTool));
    let settings = EngineSettings {
        tool_timeout: Duration::from_secs(2),
        ..EngineSettings::default()
    };
    let engine = engine(provider, tools, settings);
    let mut state = user_state("look it up");

    let reply = engine.respond("chat-1", &mut state).await.unwrap();
    assert_eq!(reply.content, "Sorry, that took too long.");

    let result = state
        .messages
        .iter()
        .find(|m| m.tool_call_id.as_deref() == Some("call-1"))
        .unwrap();
    assert_eq!(result.content, "Tool 'slow_lookup' timed out after 2s.");
}

#[tokio::test]
#[traced_test]
async fn round_trip_cap_falls_back() {
    let script = (0..5)
        .map(|i| {
            ScriptedReply::tool_call(
                &format!("call-{i}"),
                "get_store_data",
                json!({"intent": "store_info"}),
            )
        })
        .collect();
    let provider = Arc::new(MockProvider::with_script(script));
    let settings = EngineSettings {
        max_round_trips: 2,
        ..EngineSettings::default()
    };
    let engine = engine(provider.clone(), storefront(), settings);
    let mut state = user_state("tell me everything");

    let reply = engine.respond("chat-1", &mut state).await.unwrap();
    assert_eq!(reply.content, FALLBACK_REPLY);
    assert_eq!(reply.intent, Intent::Other);
    assert_eq!(provider.call_count().await, 2);
    assert!(state.pending_tool_calls().is_empty());
    assert!(logs_contain("round-trip limit reached with tool calls pending"));
}

#[tokio::test]
async fn provider_failure_falls_back() {
    let provider = Arc::new(MockProvider::with_script(vec![ScriptedReply::Failure(
        "upstream down".into(),
    )]));
    let engine = engine(provider, storefront(), EngineSettings::default());
    let mut state = user_state("hi");

    let reply = engine.respond("chat-1", &mut state).await.unwrap();
    assert_eq!(reply.content, FALLBACK_REPLY);
    assert_eq!(reply.intent, Intent::Other);
}

#[tokio::test]
async fn unstructured_reply_is_passed_through_as_other() {
    let provider = Arc::new(MockProvider::with_script(vec![ScriptedReply::text(
        "Just plain words",
    )]));
    let engine = engine(provider, storefront(), EngineSettings::default());
    let mut state = user_state("hi");

    let reply = engine.respond("chat-1", &mut state).await.unwrap();
    assert_eq!(reply.intent, Intent::Other);
    assert_eq!(reply.content, INVALID_JSON);
}
