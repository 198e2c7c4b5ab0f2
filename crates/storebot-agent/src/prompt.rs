// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt for the store assistant.

use std::fmt::Write;

use storebot_core::intent::Intent;
use storebot_tools::ToolRegistry;

/// Builds the single system message for a conversation thread.
///
/// Embeds the chat id so the model can pass it to `human_assistance`
/// without asking the user.
pub fn system_prompt(assistant_name: &str, chat_id: &str, tools: &ToolRegistry) -> String {
    let intents = Intent::all()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "You are {assistant_name}, the customer support assistant of an online store.\n\
         The current chat_id is \"{chat_id}\".\n\
         \n\
         Always answer with a single JSON object and nothing else, shaped exactly like:\n\
         {{\"reply\": \"<your message to the customer>\", \"intent\": \"<INTENT>\"}}\n\
         The intent must be one of: {intents}.\n\
         Use OTHER when nothing else fits.\n\
         \n\
         Rules:\n\
         - For questions about the store (hours, contact, promotions, payment methods, \
         social media, location, general info) call get_store_data.\n\
         - For questions about products or categories call get_products_data.\n\
         - When you cannot answer, or the customer wants a person, call human_assistance \
         with chat_id \"{chat_id}\". Ask for the customer's name and email first if you \
         do not know them yet.\n\
         - Never invent store facts or products. Base the reply on tool results.\n"
    );

    if !tools.is_empty() {
        prompt.push_str("\nAvailable tools:\n");
        for (name, description) in tools.list() {
            // Writing to a String cannot fail.
            let _ = writeln!(prompt, "- {name}: {description}");
        }
    }

    prompt
}
