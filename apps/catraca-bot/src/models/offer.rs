/// Key of the time-limited offer that gets the countdown banner.
pub const FLASH_OFFER_KEY: &str = "flash";

/// A purchasable access plan.
#[derive(Debug, Clone)]
pub struct OfferDefinition {
    pub key: String,
    pub label: String,
    pub amount: f64,
}

/// Ordered, read-only plan table shared by every session. Swapping keys,
/// labels or prices must not touch any handler.
#[derive(Debug, Clone)]
pub struct OfferCatalog {
    offers: Vec<OfferDefinition>,
}

impl OfferCatalog {
    pub fn new(offers: Vec<OfferDefinition>) -> Self {
        Self { offers }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            OfferDefinition {
                key: "30".into(),
                label: "✨ Acesso 30 dias".into(),
                amount: 10.00,
            },
            OfferDefinition {
                key: "life".into(),
                label: "👑 Acesso vitalício".into(),
                amount: 29.90,
            },
            OfferDefinition {
                key: FLASH_OFFER_KEY.into(),
                label: "⚡ Oferta relâmpago".into(),
                amount: 4.99,
            },
        ])
    }

    pub fn get(&self, key: &str) -> Option<&OfferDefinition> {
        self.offers.iter().find(|offer| offer.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OfferDefinition> {
        self.offers.iter()
    }
}
