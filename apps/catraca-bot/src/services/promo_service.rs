use std::sync::Arc;

use teloxide::types::ChatId;
use tracing::{error, info};

use crate::gateway::{GroupAccess, NotifySink};
use crate::models::promo::{PromoCatalog, PromoKind};
use crate::services::pay_service::PayService;

/// Resolves codes typed while a promo prompt is open: free codes become a
/// single-use group invite, the redirect code routes into the discounted
/// paid flow, everything else is rejected.
#[derive(Clone)]
pub struct PromoService {
    codes: PromoCatalog,
    group: ChatId,
    access: Arc<dyn GroupAccess>,
    sink: Arc<dyn NotifySink>,
    payments: PayService,
}

impl PromoService {
    pub fn new(
        codes: PromoCatalog,
        group: ChatId,
        access: Arc<dyn GroupAccess>,
        sink: Arc<dyn NotifySink>,
        payments: PayService,
    ) -> Self {
        Self {
            codes,
            group,
            access,
            sink,
            payments,
        }
    }

    /// One attempt per prompt; the caller has already cleared the
    /// awaiting flag before this runs.
    pub async fn redeem(&self, chat: ChatId, user_id: i64, input: &str) {
        match self.codes.classify(input) {
            PromoKind::FreeAccess => match self.access.single_use_invite(self.group).await {
                Ok(link) => {
                    info!("User {} redeemed a free-access code", user_id);
                    let _ = self
                        .sink
                        .send_text(chat, "🎉 Código aceito! Aqui está seu acesso:".to_string())
                        .await;
                    let _ = self.sink.send_text(chat, link).await;
                }
                Err(err) => {
                    error!("Invite creation failed for user {}: {:#}", user_id, err);
                    let _ = self
                        .sink
                        .send_text(
                            chat,
                            "⚠️ Não foi possível gerar seu convite agora. Tente novamente em instantes."
                                .to_string(),
                        )
                        .await;
                }
            },
            PromoKind::PaidRedirect(offer_key) => {
                info!(
                    "User {} redeemed a redirect code into offer {}",
                    user_id, offer_key
                );
                let _ = self
                    .sink
                    .send_text(
                        chat,
                        "🎟️ Código aplicado! Preparando sua oferta exclusiva...".to_string(),
                    )
                    .await;
                let _ = self.payments.process(chat, user_id, &offer_key).await;
            }
            PromoKind::Unknown => {
                let _ = self
                    .sink
                    .send_text(chat, "❌ Código inválido.".to_string())
                    .await;
            }
        }
    }
}
