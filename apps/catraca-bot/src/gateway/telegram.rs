use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};

use super::{GroupAccess, MessageEditor, MessageTarget, NotifySink};

/// Adapts the live [`Bot`] to the sink, editor and invite seams.
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl NotifySink for TelegramGateway {
    async fn send_text(&self, chat: ChatId, text: String) -> Result<()> {
        self.bot
            .send_message(chat, text)
            .parse_mode(ParseMode::Html)
            .await
            .context("send_message failed")?;
        Ok(())
    }

    async fn send_photo(&self, chat: ChatId, image: Vec<u8>) -> Result<()> {
        self.bot
            .send_photo(chat, InputFile::memory(image))
            .await
            .context("send_photo failed")?;
        Ok(())
    }
}

#[async_trait]
impl MessageEditor for TelegramGateway {
    async fn edit_text(&self, target: MessageTarget, text: String) -> Result<()> {
        self.bot
            .edit_message_text(target.chat, target.message, text)
            .parse_mode(ParseMode::Html)
            .await
            .context("edit_message_text failed")?;
        Ok(())
    }
}

#[async_trait]
impl GroupAccess for TelegramGateway {
    async fn single_use_invite(&self, group: ChatId) -> Result<String> {
        let link = self
            .bot
            .create_chat_invite_link(group)
            .member_limit(1)
            .await
            .context("create_chat_invite_link failed")?;
        Ok(link.invite_link)
    }
}
