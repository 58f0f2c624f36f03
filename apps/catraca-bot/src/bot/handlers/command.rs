use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, error, info};

use crate::bot::keyboards::offers_keyboard;
use crate::gateway::MessageTarget;
use crate::models::offer::FLASH_OFFER_KEY;
use crate::presentation::{CountdownConfig, RampConfig};
use crate::state::AppState;

const WELCOME_TEXT: &str = "👋 <b>Bem-vindo à comunidade VIP!</b>\n\n\
Grupo privado, conteúdo exclusivo e suporte direto.\n\
Para manter tudo no ar cobramos apenas um valor simbólico.\n\n\
Escolha um plano abaixo ou use um código promocional:";

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let chat = msg.chat.id;
    let user_id = msg
        .from
        .as_ref()
        .map(|user| user.id.0 as i64)
        .unwrap_or(chat.0);

    if let Some(text) = msg.text() {
        if text.starts_with("/start") {
            info!("User {} started a session", user_id);
            start_session(&bot, chat, user_id, &state).await;
            return Ok(());
        }

        // Free text only means something while a promo prompt is open;
        // the flag comes off before the attempt, whatever its outcome.
        if state.sessions.take_awaiting_promo(user_id).await {
            state.promo_service.redeem(chat, user_id, text).await;
        } else {
            debug!("Ignoring free text from user {}", user_id);
        }
    }

    Ok(())
}

async fn start_session(bot: &Bot, chat: ChatId, user_id: i64, state: &AppState) {
    state.sessions.begin_session(user_id).await;

    let stale = state.animations.cancel_chat(chat).await;
    if stale > 0 {
        debug!("Cancelled {} stale animations for chat {}", stale, chat);
    }

    let _ = bot
        .send_message(chat, WELCOME_TEXT)
        .parse_mode(ParseMode::Html)
        .reply_markup(offers_keyboard(&state.catalog))
        .await
        .map_err(|e| error!("Failed to send welcome message: {}", e));

    let ramp = RampConfig::members_counter();
    match bot
        .send_message(chat, ramp.initial_text())
        .parse_mode(ParseMode::Html)
        .await
    {
        Ok(sent) => {
            let target = MessageTarget {
                chat,
                message: sent.id,
            };
            state
                .animations
                .spawn_ramp(state.telegram.clone(), target, ramp)
                .await;
        }
        Err(e) => error!("Failed to send counter message: {}", e),
    }

    if state.catalog.get(FLASH_OFFER_KEY).is_some() {
        let countdown = CountdownConfig::flash_offer();
        match bot
            .send_message(chat, countdown.initial_text())
            .parse_mode(ParseMode::Html)
            .await
        {
            Ok(sent) => {
                let target = MessageTarget {
                    chat,
                    message: sent.id,
                };
                state
                    .animations
                    .spawn_countdown(state.telegram.clone(), target, countdown)
                    .await;
            }
            Err(e) => error!("Failed to send countdown banner: {}", e),
        }
    }
}
