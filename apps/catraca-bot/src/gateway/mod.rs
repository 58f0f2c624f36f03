use anyhow::Result;
use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId};

use crate::models::charge::{Charge, ChargeRequest};

pub mod pix;
pub mod telegram;

/// Handle of a previously sent, editable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageTarget {
    pub chat: ChatId,
    pub message: MessageId,
}

/// Outbound user-facing sends. Business flows treat delivery as
/// fire-and-forget: callers log failures and move on.
#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn send_text(&self, chat: ChatId, text: String) -> Result<()>;
    async fn send_photo(&self, chat: ChatId, image: Vec<u8>) -> Result<()>;
}

/// In-place edit of one previously sent message. The `Err` side is the
/// one signal an animation task uses to stop.
#[async_trait]
pub trait MessageEditor: Send + Sync {
    async fn edit_text(&self, target: MessageTarget, text: String) -> Result<()>;
}

/// Single-use access credentials for the private group.
#[async_trait]
pub trait GroupAccess: Send + Sync {
    async fn single_use_invite(&self, group: ChatId) -> Result<String>;
}

/// The external payment processor.
#[async_trait]
pub trait ChargeGateway: Send + Sync {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge>;
}
