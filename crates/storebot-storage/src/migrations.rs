// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled in via `embed_migrations!`
//! and applied every time a [`Database`](crate::Database) is opened.

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<usize, refinery::Error> {
    let report = embedded::migrations::runner().run(conn)?;
    Ok(report.applied_migrations().len())
}
