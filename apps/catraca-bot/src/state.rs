use std::sync::Arc;

use crate::gateway::telegram::TelegramGateway;
use crate::models::offer::OfferCatalog;
use crate::presentation::AnimationRegistry;
use crate::services::pay_service::PayService;
use crate::services::promo_service::PromoService;
use crate::services::session_service::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<OfferCatalog>,
    pub sessions: SessionService,
    pub pay_service: PayService,
    pub promo_service: PromoService,
    pub animations: AnimationRegistry,
    pub telegram: Arc<TelegramGateway>,
}
