use serde::Serialize;

/// Outbound charge submission in the processor's wire shape.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
    pub transaction_amount: f64,
    pub description: String,
    pub payment_method_id: String,
    pub payer: ChargePayer,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargePayer {
    pub email: String,
}

impl ChargeRequest {
    pub fn pix(amount: f64, description: String, payer_email: String) -> Self {
        Self {
            transaction_amount: amount,
            description,
            payment_method_id: "pix".to_string(),
            payer: ChargePayer { email: payer_email },
        }
    }
}

/// What the orchestrator needs back from the processor. `code` is the
/// redeemable copy-paste token, `qr_image_b64` the optional rendered QR.
#[derive(Debug, Clone)]
pub struct Charge {
    pub payment_id: String,
    pub code: Option<String>,
    pub qr_image_b64: Option<String>,
}
