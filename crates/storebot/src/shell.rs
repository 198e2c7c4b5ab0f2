// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `storebot shell`: an interactive console chat with the assistant.
//!
//! Creates one chat and runs each line as a client turn, printing the
//! stored bot reply and its intent.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use storebot_agent::TurnOutcome;
use storebot_config::model::StorebotConfig;
use storebot_core::types::NewChat;
use storebot_core::{Sender, StorebotError};

use crate::stack::Stack;

pub async fn run_shell(config: StorebotConfig) -> Result<(), StorebotError> {
    let stack = Stack::build(&config).await?;
    let chat = stack.storage.create_chat(NewChat::default()).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| StorebotError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.agent.name).bold().green());
    println!("chat {}", chat.id.dimmed());
    println!("Type {} to exit.\n", "/quit".yellow());

    let prompt = format!("{}> ", "you".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if let Err(e) = run_turn(&stack, &chat.id, trimmed).await {
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    stack.dispatcher.drain().await;
    stack.storage.close().await
}

async fn run_turn(stack: &Stack, chat_id: &str, text: &str) -> Result<(), StorebotError> {
    let message = stack
        .storage
        .append_message(chat_id, text, Sender::Client, None)
        .await?;
    let outcome = stack
        .dispatcher
        .dispatch(message)
        .await
        .map_err(|e| StorebotError::Internal(format!("turn task failed: {e}")))?;

    match outcome {
        TurnOutcome::Completed { bot_message, .. } => {
            println!("{} {}", "bot>".cyan(), bot_message.content);
            if let Some(intent) = bot_message.intent {
                println!("{}", format!("[{intent}]").dimmed());
            }
        }
        TurnOutcome::Failed { error } => {
            eprintln!("{}: {error}", "turn failed".red());
        }
    }
    Ok(())
}
