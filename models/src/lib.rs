pub mod configuration;
pub mod context;
pub mod conversation;
pub mod error;
pub mod history;
pub mod message;
pub mod storage;

pub use crate::context::Context;
pub use crate::conversation::Conversation;
pub use crate::error::StoreError;
pub use crate::history::HistoryEntry;
pub use crate::message::Message;
