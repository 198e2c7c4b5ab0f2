// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the chat and message API.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use storebot_core::types::{MessageQuery, NewChat, SortOrder, validate_content};
use storebot_core::{Chat, Intent, Message, Sender, StorebotError};

use crate::error::ApiError;
use crate::server::AppState;

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub app: String,
    pub version: String,
    pub environment: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Pagination for GET /chats.
#[derive(Debug, Default, Deserialize)]
pub struct ChatPage {
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Request body for POST /messages.
#[derive(Debug, Deserialize)]
pub struct NewMessageRequest {
    pub chat_id: String,
    pub content: String,
    pub sender: Sender,
    #[serde(default)]
    pub intent: Option<Intent>,
}

/// Filters for GET /messages.
#[derive(Debug, Default, Deserialize)]
pub struct MessageParams {
    pub chat_id: Option<String>,
    pub sender: Option<Sender>,
    pub intent: Option<Intent>,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub skip: u32,
    pub limit: Option<u32>,
}

impl From<MessageParams> for MessageQuery {
    fn from(params: MessageParams) -> Self {
        Self {
            chat_id: params.chat_id,
            sender: params.sender,
            intent: params.intent,
            sort_order: params.sort_order,
            skip: params.skip,
            limit: params
                .limit
                .unwrap_or(MessageQuery::MAX_LIMIT)
                .clamp(1, MessageQuery::MAX_LIMIT),
        }
    }
}

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        app: state.app_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.environment.clone(),
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// POST /chats
pub async fn create_chat(
    State(state): State<AppState>,
    Json(body): Json<NewChat>,
) -> Result<(StatusCode, Json<Chat>), ApiError> {
    let chat = state.storage.create_chat(body).await?;
    info!(chat_id = %chat.id, "chat created");
    Ok((StatusCode::CREATED, Json(chat)))
}

/// GET /chats
pub async fn list_chats(
    State(state): State<AppState>,
    Query(page): Query<ChatPage>,
) -> Result<Json<Vec<Chat>>, ApiError> {
    let limit = page.limit.unwrap_or(MessageQuery::MAX_LIMIT);
    Ok(Json(state.storage.list_chats(page.skip, limit).await?))
}

/// GET /chats/{chat_id}
pub async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<Chat>, ApiError> {
    state
        .storage
        .get_conversation(&chat_id)
        .await?
        .map(Json)
        .ok_or_else(|| StorebotError::not_found("chat", chat_id).into())
}

/// POST /messages
///
/// Stores the message and, for client messages, schedules a background turn.
/// The response does not wait for the bot reply.
pub async fn create_message(
    State(state): State<AppState>,
    Json(body): Json<NewMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    validate_content(&body.content)?;

    let intent = match body.sender {
        Sender::Client => {
            if body.intent.is_some() {
                debug!(chat_id = %body.chat_id, "ignoring caller intent on client message");
            }
            None
        }
        Sender::Bot => Some(body.intent.ok_or_else(|| {
            StorebotError::Validation("bot messages require an intent".into())
        })?),
    };

    let message = state
        .storage
        .append_message(&body.chat_id, &body.content, body.sender, intent)
        .await?;

    if message.sender == Sender::Client {
        let _turn = state.dispatcher.dispatch(message.clone());
        debug!(chat_id = %message.chat_id, message_id = %message.id, "turn scheduled");
    }

    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /messages
pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<MessageParams>,
) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(state.storage.list_messages(params.into()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_request_deserializes_without_intent() {
        let json = r#"{"chat_id": "c1", "content": "Hello", "sender": "CLIENT"}"#;
        let req: NewMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.sender, Sender::Client);
        assert!(req.intent.is_none());
    }

    #[test]
    fn message_params_clamp_the_limit() {
        let query: MessageQuery = MessageParams {
            limit: Some(5000),
            ..MessageParams::default()
        }
        .into();
        assert_eq!(query.limit, MessageQuery::MAX_LIMIT);

        let query: MessageQuery = MessageParams {
            limit: Some(0),
            ..MessageParams::default()
        }
        .into();
        assert_eq!(query.limit, 1);
    }

    #[test]
    fn health_response_serializes() {
        let json = serde_json::to_string(&HealthResponse {
            status: "ok".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"ok"}"#);
    }
}
