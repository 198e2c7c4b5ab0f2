// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat CRUD operations.

use rusqlite::{OptionalExtension, params};
use storebot_core::types::{NewChat, TransferRequest, now_timestamp};
use storebot_core::{Chat, StorebotError};

use super::parse_optional_column;
use crate::database::{Database, map_tr_err};

const CHAT_COLUMNS: &str = "id, client_name, client_email, initial_intent, transfer_inquiry_id, \
     transfer_query, transferred_to_operator, operator_transfer_time, created_at, updated_at";

pub(crate) fn row_to_chat(row: &rusqlite::Row<'_>) -> rusqlite::Result<Chat> {
    Ok(Chat {
        id: row.get(0)?,
        client_name: row.get(1)?,
        client_email: row.get(2)?,
        initial_intent: parse_optional_column(3, row.get(3)?)?,
        transfer_inquiry_id: row.get(4)?,
        transfer_query: row.get(5)?,
        transferred_to_operator: row.get(6)?,
        operator_transfer_time: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Insert a new chat with a fresh id.
pub async fn create_chat(db: &Database, new: NewChat) -> Result<Chat, StorebotError> {
    let now = now_timestamp();
    let chat = Chat {
        id: uuid::Uuid::new_v4().to_string(),
        client_name: new.client_name,
        client_email: new.client_email,
        initial_intent: new.initial_intent,
        transfer_inquiry_id: None,
        transfer_query: None,
        transferred_to_operator: false,
        operator_transfer_time: None,
        created_at: now.clone(),
        updated_at: now,
    };

    let row = chat.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO chats (id, client_name, client_email, initial_intent, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.id,
                    row.client_name,
                    row.client_email,
                    row.initial_intent.map(|i| i.to_string()),
                    row.created_at,
                    row.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    Ok(chat)
}

/// Get a chat by id.
pub async fn get_chat(db: &Database, id: &str) -> Result<Option<Chat>, StorebotError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = ?1"),
                params![id],
                row_to_chat,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// List chats, newest first.
pub async fn list_chats(db: &Database, skip: u32, limit: u32) -> Result<Vec<Chat>, StorebotError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<Chat>> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CHAT_COLUMNS} FROM chats ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt.query_map(params![limit, skip], row_to_chat)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Record an escalation. Returns `None` when the chat does not exist.
///
/// The transfer flag is only ever set, never cleared.
pub async fn mark_transferred(
    db: &Database,
    transfer: TransferRequest,
) -> Result<Option<Chat>, StorebotError> {
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(
                "UPDATE chats SET client_name = ?2, client_email = ?3, transfer_inquiry_id = ?4,
                     transfer_query = ?5, transferred_to_operator = 1,
                     operator_transfer_time = ?6, updated_at = ?6
                 WHERE id = ?1",
                params![
                    transfer.chat_id,
                    transfer.name,
                    transfer.email,
                    transfer.inquiry_id,
                    transfer.query,
                    now,
                ],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            let chat = tx.query_row(
                &format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = ?1"),
                params![transfer.chat_id],
                row_to_chat,
            )?;
            tx.commit()?;
            Ok(Some(chat))
        })
        .await
        .map_err(map_tr_err)
}
