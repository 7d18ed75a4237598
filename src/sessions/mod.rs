//! Per-session conversation state: bounded turn histories behind a keyed,
//! concurrency-safe store.

pub mod store;
pub mod types;

pub use store::{
    DEFAULT_MAX_TURNS, MemorySessionStore, SessionHandle, SessionHistory, SessionStore,
};
pub use types::{ConversationTurn, TurnRole};
