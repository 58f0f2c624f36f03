use teloxide::prelude::*;
use tracing::{info, warn};

use crate::state::AppState;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let callback_id = q.id.clone();
    let user_id = q.from.id.0 as i64;

    if let Some(data) = q.data {
        match data.as_str() {
            "promo" => {
                let _ = bot.answer_callback_query(callback_id).await;
                state.sessions.set_awaiting_promo(user_id, true).await;
                if let Some(msg) = q.message {
                    let _ = bot
                        .send_message(msg.chat().id, "🎟️ Envie seu código promocional:")
                        .await;
                }
            }

            buy if buy.starts_with("buy_") => {
                let _ = bot.answer_callback_query(callback_id).await;
                let offer_key = buy.trim_start_matches("buy_");
                if let Some(msg) = q.message {
                    info!("User {} picked offer {}", user_id, offer_key);
                    state
                        .sessions
                        .annotate(user_id, "last_offer", serde_json::Value::from(offer_key))
                        .await;
                    let _ = state
                        .pay_service
                        .process(msg.chat().id, user_id, offer_key)
                        .await;
                }
            }

            other => {
                warn!("Unknown callback payload: {}", other);
                let _ = bot.answer_callback_query(callback_id).await;
            }
        }
    }

    Ok(())
}
