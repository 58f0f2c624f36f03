use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use catraca_db::models::payment::PaymentRecord;
use catraca_db::repositories::PaymentRepository;
use teloxide::types::ChatId;
use tracing::{error, info, warn};

use crate::error::PayError;
use crate::gateway::{ChargeGateway, NotifySink};
use crate::models::charge::ChargeRequest;
use crate::models::offer::OfferCatalog;

/// Turns an offer selection into a pending PIX charge: validates the key,
/// submits the charge, persists the attempt, then hands the copy-paste
/// code (and QR image, when present) to the user.
#[derive(Clone)]
pub struct PayService {
    catalog: Arc<OfferCatalog>,
    store: PaymentRepository,
    processor: Arc<dyn ChargeGateway>,
    sink: Arc<dyn NotifySink>,
}

impl PayService {
    pub fn new(
        catalog: Arc<OfferCatalog>,
        store: PaymentRepository,
        processor: Arc<dyn ChargeGateway>,
        sink: Arc<dyn NotifySink>,
    ) -> Self {
        Self {
            catalog,
            store,
            processor,
            sink,
        }
    }

    /// Run the full charge flow. Failures are logged in full here and
    /// surfaced to the user as a single generic message; the typed error
    /// still comes back for callers that care.
    pub async fn process(
        &self,
        chat: ChatId,
        user_id: i64,
        offer_key: &str,
    ) -> Result<(), PayError> {
        match self.create_and_deliver(chat, user_id, offer_key).await {
            Ok(()) => Ok(()),
            Err(err) => {
                match &err {
                    PayError::Processor(cause) => error!(
                        "Payment flow failed for user {} (offer {}): {:#}",
                        user_id, offer_key, cause
                    ),
                    other => warn!(
                        "Payment flow rejected for user {} (offer {}): {}",
                        user_id, offer_key, other
                    ),
                }
                let _ = self
                    .sink
                    .send_text(chat, err.user_message().to_string())
                    .await;
                Err(err)
            }
        }
    }

    async fn create_and_deliver(
        &self,
        chat: ChatId,
        user_id: i64,
        offer_key: &str,
    ) -> Result<(), PayError> {
        let offer = self
            .catalog
            .get(offer_key)
            .ok_or_else(|| PayError::UnknownOffer(offer_key.to_string()))?;

        let request = ChargeRequest::pix(
            offer.amount,
            format!("{} user:{}", offer.label, user_id),
            format!("user{}@mail.com", user_id),
        );
        let charge = self
            .processor
            .create_charge(&request)
            .await
            .map_err(PayError::Processor)?;

        let code = match charge.code {
            Some(code) if !code.trim().is_empty() => code,
            _ => return Err(PayError::MissingCode),
        };

        // Persist before notifying. A storage outage alone must not hold
        // the code hostage, so the write is logged rather than fatal.
        let record =
            PaymentRecord::pending(charge.payment_id.clone(), user_id.to_string(), offer.amount);
        if let Err(err) = self.store.upsert(&record).await {
            error!(
                "Could not persist payment {} for user {}: {:#}",
                charge.payment_id, user_id, err
            );
        }

        info!(
            "Payment {} created for user {} (offer {}, R$ {:.2})",
            charge.payment_id, user_id, offer.key, offer.amount
        );

        let text = format!(
            "🔥 <b>{}</b>\n💰 Valor: <b>R$ {:.2}</b>\n\n🪙 <b>PIX Copia e Cola:</b>\n<code>{}</code>",
            offer.label, offer.amount, code
        );
        if let Err(err) = self.sink.send_text(chat, text).await {
            warn!("Could not deliver payment code to user {}: {:#}", user_id, err);
        }

        if let Some(encoded) = charge.qr_image_b64 {
            match BASE64.decode(encoded.as_bytes()) {
                Ok(image) => {
                    if let Err(err) = self.sink.send_photo(chat, image).await {
                        warn!("Could not deliver QR image to user {}: {:#}", user_id, err);
                    }
                }
                Err(err) => warn!(
                    "Undecodable QR image for payment {}: {}",
                    charge.payment_id, err
                ),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;
    use crate::gateway::testing::{RecordingSink, ScriptedProcessor, SinkEvent};
    use crate::models::charge::Charge;

    const CHAT: ChatId = ChatId(777);

    async fn store() -> PaymentRepository {
        PaymentRepository::new(catraca_db::connect_memory().await.unwrap())
    }

    fn pix_charge() -> Charge {
        Charge {
            payment_id: "123456789".to_string(),
            code: Some("00020126580014br.gov.bcb.pix".to_string()),
            qr_image_b64: Some(BASE64.encode(b"fake png bytes")),
        }
    }

    fn service(
        store: PaymentRepository,
        processor: Arc<dyn ChargeGateway>,
        sink: Arc<dyn NotifySink>,
    ) -> PayService {
        PayService::new(Arc::new(OfferCatalog::standard()), store, processor, sink)
    }

    #[tokio::test]
    async fn unknown_offer_makes_no_processor_call_and_persists_nothing() {
        let store = store().await;
        let processor = Arc::new(ScriptedProcessor::ok(pix_charge()));
        let sink = Arc::new(RecordingSink::default());
        let pay = service(store.clone(), processor.clone(), sink.clone());

        let err = pay.process(CHAT, 777, "bogus").await.unwrap_err();

        assert!(matches!(err, PayError::UnknownOffer(_)));
        assert!(processor.requests.lock().unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(sink.texts(), vec!["❌ Plano inválido.".to_string()]);
    }

    #[tokio::test]
    async fn happy_path_delivers_code_then_qr_photo() {
        let store = store().await;
        let processor = Arc::new(ScriptedProcessor::ok(pix_charge()));
        let sink = Arc::new(RecordingSink::default());
        let pay = service(store.clone(), processor.clone(), sink.clone());

        pay.process(CHAT, 777, "30").await.unwrap();

        let request = processor.requests.lock().unwrap()[0].clone();
        assert!((request.transaction_amount - 10.0).abs() < f64::EPSILON);
        assert_eq!(request.payer.email, "user777@mail.com");
        assert!(request.description.contains("user:777"));

        let stored = store.get("123456789").await.unwrap().unwrap();
        assert_eq!(stored.user_id, "777");
        assert!((stored.amount - 10.0).abs() < f64::EPSILON);

        let events = sink.events.lock().unwrap().clone();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            SinkEvent::Text(text) if text.contains("00020126580014br.gov.bcb.pix")
        ));
        assert_eq!(events[1], SinkEvent::Photo(b"fake png bytes".len()));
    }

    /// Snapshots the store row count at every send, which pins down the
    /// persist-then-notify order.
    struct CountingSink {
        store: PaymentRepository,
        counts_at_send: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl NotifySink for CountingSink {
        async fn send_text(&self, _chat: ChatId, _text: String) -> Result<()> {
            let count = self.store.count().await.unwrap();
            self.counts_at_send.lock().unwrap().push(count);
            Ok(())
        }

        async fn send_photo(&self, _chat: ChatId, _image: Vec<u8>) -> Result<()> {
            let count = self.store.count().await.unwrap();
            self.counts_at_send.lock().unwrap().push(count);
            Ok(())
        }
    }

    #[tokio::test]
    async fn record_is_persisted_before_the_user_hears_anything() {
        let store = store().await;
        let sink = Arc::new(CountingSink {
            store: store.clone(),
            counts_at_send: Mutex::new(Vec::new()),
        });
        let pay = service(
            store,
            Arc::new(ScriptedProcessor::ok(pix_charge())),
            sink.clone(),
        );

        pay.process(CHAT, 777, "life").await.unwrap();

        let counts = sink.counts_at_send.lock().unwrap().clone();
        assert!(!counts.is_empty());
        assert!(counts.iter().all(|&count| count == 1));
    }

    #[tokio::test]
    async fn missing_code_is_an_error_and_persists_nothing() {
        let store = store().await;
        let charge = Charge {
            payment_id: "55".to_string(),
            code: None,
            qr_image_b64: None,
        };
        let sink = Arc::new(RecordingSink::default());
        let pay = service(
            store.clone(),
            Arc::new(ScriptedProcessor::ok(charge)),
            sink.clone(),
        );

        let err = pay.process(CHAT, 777, "30").await.unwrap_err();

        assert!(matches!(err, PayError::MissingCode));
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(sink.texts().len(), 1);
        assert!(sink.texts()[0].contains("Erro ao gerar o pagamento"));
    }

    #[tokio::test]
    async fn processor_failure_sends_one_generic_message() {
        let store = store().await;
        let sink = Arc::new(RecordingSink::default());
        let pay = service(
            store.clone(),
            Arc::new(ScriptedProcessor::failing()),
            sink.clone(),
        );

        let err = pay.process(CHAT, 777, "flash").await.unwrap_err();

        assert!(matches!(err, PayError::Processor(_)));
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(sink.texts().len(), 1);
        assert!(sink.texts()[0].contains("Erro ao gerar o pagamento"));
    }

    #[tokio::test]
    async fn storage_outage_does_not_block_code_delivery() {
        let pool = catraca_db::connect_memory().await.unwrap();
        catraca_db::sqlx::query("DROP TABLE payments")
            .execute(&pool)
            .await
            .unwrap();
        let broken = PaymentRepository::new(pool);

        let sink = Arc::new(RecordingSink::default());
        let pay = service(
            broken,
            Arc::new(ScriptedProcessor::ok(pix_charge())),
            sink.clone(),
        );

        pay.process(CHAT, 777, "30").await.unwrap();

        assert_eq!(sink.texts().len(), 1);
        assert!(sink.texts()[0].contains("PIX Copia e Cola"));
    }
}
