// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use rusqlite::types::Value;
use rusqlite::{OptionalExtension, params, params_from_iter};
use storebot_core::types::{MessageQuery, SortOrder, now_timestamp};
use storebot_core::{Intent, Message, Sender, StorebotError};

use super::{parse_column, parse_optional_column};
use crate::database::{Database, map_tr_err};

const MESSAGE_COLUMNS: &str = "id, chat_id, content, sender, intent, created_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        content: row.get(2)?,
        sender: parse_column(3, row.get(3)?)?,
        intent: parse_optional_column(4, row.get(4)?)?,
        created_at: row.get(5)?,
    })
}

/// Insert a message and touch its chat. Returns `None` when the chat does not exist.
pub async fn insert_message(
    db: &Database,
    chat_id: &str,
    content: &str,
    sender: Sender,
    intent: Option<Intent>,
) -> Result<Option<Message>, StorebotError> {
    let message = Message {
        id: uuid::Uuid::new_v4().to_string(),
        chat_id: chat_id.to_string(),
        content: content.to_string(),
        sender,
        intent,
        created_at: now_timestamp(),
    };

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let touched = tx.execute(
                "UPDATE chats SET updated_at = ?2 WHERE id = ?1",
                params![message.chat_id, message.created_at],
            )?;
            if touched == 0 {
                return Ok(None);
            }
            tx.execute(
                "INSERT INTO messages (id, chat_id, content, sender, intent, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    message.id,
                    message.chat_id,
                    message.content,
                    message.sender.to_string(),
                    message.intent.map(|i| i.to_string()),
                    message.created_at,
                ],
            )?;
            tx.commit()?;
            Ok(Some(message))
        })
        .await
        .map_err(map_tr_err)
}

/// Set a message's intent. Returns `None` when the message does not exist.
pub async fn update_intent(
    db: &Database,
    message_id: &str,
    intent: Intent,
) -> Result<Option<Message>, StorebotError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE messages SET intent = ?2 WHERE id = ?1",
                params![message_id, intent.to_string()],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![message_id],
                row_to_message,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// List messages matching `query`, ordered by creation time then insertion order.
pub async fn list_messages(
    db: &Database,
    query: MessageQuery,
) -> Result<Vec<Message>, StorebotError> {
    let mut sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE 1 = 1");
    let mut args: Vec<Value> = Vec::new();

    if let Some(chat_id) = query.chat_id {
        sql.push_str(" AND chat_id = ?");
        args.push(Value::Text(chat_id));
    }
    if let Some(sender) = query.sender {
        sql.push_str(" AND sender = ?");
        args.push(Value::Text(sender.to_string()));
    }
    if let Some(intent) = query.intent {
        sql.push_str(" AND intent = ?");
        args.push(Value::Text(intent.to_string()));
    }

    let direction = match query.sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    sql.push_str(&format!(
        " ORDER BY created_at {direction}, rowid {direction} LIMIT ? OFFSET ?"
    ));
    args.push(Value::Integer(
        i64::from(query.limit.clamp(1, MessageQuery::MAX_LIMIT)),
    ));
    args.push(Value::Integer(i64::from(query.skip)));

    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<Message>> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(args), row_to_message)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Every message of a chat, oldest first.
pub async fn history(db: &Database, chat_id: &str) -> Result<Vec<Message>, StorebotError> {
    let chat_id = chat_id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<Message>> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map(params![chat_id], row_to_message)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
