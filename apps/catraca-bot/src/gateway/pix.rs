use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use super::ChargeGateway;
use crate::models::charge::{Charge, ChargeRequest};

/// REST client for the PIX payment processor.
#[derive(Clone)]
pub struct PixClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl PixClient {
    pub fn new(base_url: String, access_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            access_token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: i64,
    #[serde(default)]
    point_of_interaction: Option<PointOfInteraction>,
}

#[derive(Debug, Deserialize)]
struct PointOfInteraction {
    #[serde(default)]
    transaction_data: Option<TransactionData>,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    #[serde(default)]
    qr_code: Option<String>,
    #[serde(default)]
    qr_code_base64: Option<String>,
}

#[async_trait]
impl ChargeGateway for PixClient {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge> {
        let url = format!("{}/v1/payments", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .header("X-Idempotency-Key", Uuid::new_v4().to_string())
            .json(request)
            .send()
            .await
            .context("Processor request could not be sent")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Processor rejected the charge: {} {}",
                status,
                body
            ));
        }

        let payment: PaymentResponse = resp
            .json()
            .await
            .context("Processor returned a malformed payment body")?;

        let data = payment
            .point_of_interaction
            .and_then(|poi| poi.transaction_data);
        let (code, qr_image_b64) = match data {
            Some(data) => (data.qr_code, data.qr_code_base64),
            None => (None, None),
        };

        Ok(Charge {
            payment_id: payment.id.to_string(),
            code,
            qr_image_b64,
        })
    }
}
