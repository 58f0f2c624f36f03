use std::sync::Arc;

use dotenvy::dotenv;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod bot;
mod config;
mod error;
mod gateway;
mod models;
mod presentation;
mod services;
mod state;

use crate::config::Config;
use crate::gateway::pix::PixClient;
use crate::gateway::telegram::TelegramGateway;
use crate::models::offer::OfferCatalog;
use crate::presentation::AnimationRegistry;
use crate::services::pay_service::PayService;
use crate::services::promo_service::PromoService;
use crate::services::session_service::SessionService;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting Catraca Bot...");

    let config = Config::from_env()?;

    let pool = catraca_db::connect(&config.database_url).await?;
    let payments = catraca_db::repositories::PaymentRepository::new(pool);

    let bot = Bot::new(config.telegram_token.clone());
    let telegram = Arc::new(TelegramGateway::new(bot.clone()));
    let pix = Arc::new(PixClient::new(
        config.mp_base_url.clone(),
        config.mp_access_token.clone(),
    ));

    let catalog = Arc::new(OfferCatalog::standard());
    let sessions = SessionService::new(config.session_ttl);
    let animations = AnimationRegistry::new();

    let pay_service = PayService::new(catalog.clone(), payments, pix, telegram.clone());
    let promo_service = PromoService::new(
        config.promo_codes.clone(),
        ChatId(config.group_chat_id),
        telegram.clone(),
        telegram.clone(),
        pay_service.clone(),
    );

    let evictor = sessions.clone();
    let evictor_interval = config.evictor_interval;
    tokio::spawn(async move {
        evictor.run_evictor(evictor_interval).await;
    });

    let state = AppState {
        catalog,
        sessions,
        pay_service,
        promo_service,
        animations,
        telegram,
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    bot::run_bot(bot, shutdown_rx, state).await;

    Ok(())
}
