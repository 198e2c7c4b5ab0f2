// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for chats and messages.

pub mod chats;
pub mod messages;

use std::str::FromStr;

use rusqlite::types::Type;

/// Parse a TEXT column into an enum, surfacing bad values as conversion failures.
pub(crate) fn parse_column<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse a nullable TEXT column into an optional enum.
pub(crate) fn parse_optional_column<T>(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.map(|value| parse_column(idx, value)).transpose()
}
