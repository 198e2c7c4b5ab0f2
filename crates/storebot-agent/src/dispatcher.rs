// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background turn dispatch with one serialized state per chat.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use storebot_core::state::ConversationState;
use storebot_core::traits::StorageAdapter;
use storebot_core::types::{Message, Sender};
use storebot_core::StorebotError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::processor::{TurnOutcome, TurnProcessor};

/// Cached chat states kept when no limit is configured.
pub const DEFAULT_MAX_CACHED_CHATS: usize = 1000;

/// Cached state of one chat.
struct ChatSlot {
    /// `None` until hydrated from storage.
    state: Mutex<Option<ConversationState>>,
    /// Logical time of the last dispatch, for LRU eviction.
    last_used: AtomicU64,
}

type StateSlot = Arc<ChatSlot>;

/// Runs turns off the request path.
///
/// Turns of the same chat run one at a time against a shared state; turns
/// of different chats run in parallel. The state cache holds at most
/// `max_cached` chats once their turns finish; evicted chats are hydrated
/// again from storage.
#[derive(Clone)]
pub struct TurnDispatcher {
    processor: Arc<TurnProcessor>,
    storage: Arc<dyn StorageAdapter>,
    states: Arc<DashMap<String, StateSlot>>,
    clock: Arc<AtomicU64>,
    max_cached: usize,
    tracker: TaskTracker,
}

impl TurnDispatcher {
    pub fn new(processor: Arc<TurnProcessor>, storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            processor,
            storage,
            states: Arc::new(DashMap::new()),
            clock: Arc::new(AtomicU64::new(0)),
            max_cached: DEFAULT_MAX_CACHED_CHATS,
            tracker: TaskTracker::new(),
        }
    }

    /// Caps the number of cached chat states. Values below 1 are raised to 1.
    pub fn with_max_cached_chats(mut self, max_cached: usize) -> Self {
        self.max_cached = max_cached.max(1);
        self
    }

    /// Spawns the turn for a stored client message.
    pub fn dispatch(&self, message: Message) -> JoinHandle<TurnOutcome> {
        let slot = self.slot(&message.chat_id);
        let processor = Arc::clone(&self.processor);
        let storage = Arc::clone(&self.storage);
        let states = Arc::clone(&self.states);
        let max_cached = self.max_cached;

        debug!(chat_id = %message.chat_id, message_id = %message.id, "dispatching turn");

        self.tracker.spawn(async move {
            let (outcome, hydrated) = run_turn(&slot, &processor, storage.as_ref(), &message).await;
            drop(slot);

            if !hydrated {
                states.remove_if(&message.chat_id, |_, s| Arc::strong_count(s) == 1);
            }
            evict_idle(&states, max_cached);
            outcome
        })
    }

    /// Waits for every in-flight turn.
    pub async fn drain(&self) {
        self.tracker.close();
        if !self.tracker.is_empty() {
            info!(count = self.tracker.len(), "waiting for in-flight turns");
        }
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Drops the cached state. The next turn reloads it from storage.
    pub fn forget(&self, chat_id: &str) {
        self.states.remove(chat_id);
    }

    pub fn is_cached(&self, chat_id: &str) -> bool {
        self.states.contains_key(chat_id)
    }

    pub fn cached_chats(&self) -> usize {
        self.states.len()
    }

    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    fn slot(&self, chat_id: &str) -> StateSlot {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        let slot = self
            .states
            .entry(chat_id.to_string())
            .or_insert_with(|| {
                Arc::new(ChatSlot {
                    state: Mutex::new(None),
                    last_used: AtomicU64::new(tick),
                })
            })
            .clone();
        slot.last_used.store(tick, Ordering::Relaxed);
        slot
    }
}

/// Runs one turn under the chat's lock. The flag reports whether the slot
/// holds a hydrated state afterwards.
async fn run_turn(
    slot: &ChatSlot,
    processor: &TurnProcessor,
    storage: &dyn StorageAdapter,
    message: &Message,
) -> (TurnOutcome, bool) {
    let mut guard = slot.state.lock().await;
    if guard.is_none() {
        match hydrate(storage, message).await {
            Ok(state) => *guard = Some(state),
            Err(e) => {
                error!(chat_id = %message.chat_id, error = %e, "failed to load chat history");
                return (
                    TurnOutcome::Failed {
                        error: e.to_string(),
                    },
                    false,
                );
            }
        }
    }
    let Some(state) = guard.as_mut() else {
        return (
            TurnOutcome::Failed {
                error: "conversation state unavailable".into(),
            },
            false,
        );
    };
    (processor.process(state, message).await, true)
}

/// Drops least recently used chats with no running or queued turn until the
/// cache fits `max_cached`.
fn evict_idle(states: &DashMap<String, StateSlot>, max_cached: usize) {
    let excess = states.len().saturating_sub(max_cached);
    if excess == 0 {
        return;
    }

    let mut idle: Vec<(String, u64)> = states
        .iter()
        .filter(|entry| Arc::strong_count(entry.value()) == 1)
        .map(|entry| {
            (
                entry.key().clone(),
                entry.value().last_used.load(Ordering::Relaxed),
            )
        })
        .collect();
    idle.sort_by_key(|(_, tick)| *tick);

    for (chat_id, _) in idle.into_iter().take(excess) {
        // A dispatch may have claimed the slot since the scan.
        if states
            .remove_if(&chat_id, |_, s| Arc::strong_count(s) == 1)
            .is_some()
        {
            debug!(chat_id = %chat_id, "evicted idle chat state");
        }
    }
}

/// Rebuilds a chat's state from storage for the turn of `current`.
///
/// Replays everything stored before `current` plus bot replies stored after
/// it. Later client messages wait for their own turn.
async fn hydrate(
    storage: &dyn StorageAdapter,
    current: &Message,
) -> Result<ConversationState, StorebotError> {
    let chat = storage
        .get_conversation(&current.chat_id)
        .await?
        .ok_or_else(|| StorebotError::not_found("chat", current.chat_id.as_str()))?;
    let history = storage.conversation_history(&current.chat_id).await?;
    let cut = history
        .iter()
        .position(|m| m.id == current.id)
        .unwrap_or(history.len());

    let mut state = ConversationState::from_history(
        current.chat_id.clone(),
        history
            .iter()
            .enumerate()
            .filter(|(idx, m)| *idx < cut || m.sender == Sender::Bot)
            .map(|(_, m)| m),
    );
    state.name = chat.client_name;
    state.email = chat.client_email;
    state.last_inquiry_id = chat.transfer_inquiry_id;

    debug!(chat_id = %current.chat_id, messages = state.messages.len(), "hydrated chat state");
    Ok(state)
}
