use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::models::promo::PromoCatalog;

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(6 * 60 * 60);
const EVICTOR_INTERVAL: Duration = Duration::from_secs(600);

/// Process configuration, read once from the environment (.env supported).
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub mp_access_token: String,
    pub mp_base_url: String,
    pub group_chat_id: i64,
    pub database_url: String,
    pub session_ttl: Duration,
    pub evictor_interval: Duration,
    pub promo_codes: PromoCatalog,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let telegram_token =
            env::var("TELEGRAM_TOKEN").context("TELEGRAM_TOKEN is not set")?;
        let mp_access_token =
            env::var("MP_ACCESS_TOKEN").context("MP_ACCESS_TOKEN is not set")?;
        let group_chat_id = env::var("GROUP_CHAT_ID")
            .context("GROUP_CHAT_ID is not set")?
            .trim()
            .parse::<i64>()
            .context("GROUP_CHAT_ID must be a numeric chat id")?;

        let mp_base_url = env::var("MP_BASE_URL")
            .unwrap_or_else(|_| "https://api.mercadopago.com".to_string())
            .trim_end_matches('/')
            .to_string();
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://payments.db".to_string());

        let session_ttl = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SESSION_TTL);

        let promo_codes = PromoCatalog::from_config(
            env::var("PROMO_CODES").ok().as_deref(),
            env::var("PROMO_REDIRECT").ok().as_deref(),
        );

        Ok(Self {
            telegram_token,
            mp_access_token,
            mp_base_url,
            group_chat_id,
            database_url,
            session_ttl,
            evictor_interval: EVICTOR_INTERVAL,
            promo_codes,
        })
    }
}
