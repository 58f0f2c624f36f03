use std::collections::{HashMap, HashSet};

/// Outcome of classifying one promo attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoKind {
    /// Grants a free single-use group invite.
    FreeAccess,
    /// Drops the user into the discounted paid flow for the named offer.
    PaidRedirect(String),
    Unknown,
}

/// The promo-code table. Codes compare case-insensitively after trimming.
#[derive(Debug, Clone)]
pub struct PromoCatalog {
    free: HashSet<String>,
    redirects: HashMap<String, String>,
}

impl PromoCatalog {
    pub fn new(free: HashSet<String>, redirects: HashMap<String, String>) -> Self {
        Self {
            free: free.into_iter().map(|code| code.to_uppercase()).collect(),
            redirects: redirects
                .into_iter()
                .map(|(code, offer)| (code.to_uppercase(), offer))
                .collect(),
        }
    }

    pub fn standard() -> Self {
        Self::new(
            ["THG100", "FLP100"].iter().map(|s| s.to_string()).collect(),
            HashMap::from([("VIP50".to_string(), "flash".to_string())]),
        )
    }

    /// Build from optional overrides: `free_csv` is a comma list of codes,
    /// `redirect` is `CODE:offer_key`. Missing or empty pieces fall back to
    /// the shipped table.
    pub fn from_config(free_csv: Option<&str>, redirect: Option<&str>) -> Self {
        let standard = Self::standard();

        let free = free_csv
            .map(|raw| {
                raw.split(',')
                    .map(|code| code.trim().to_uppercase())
                    .filter(|code| !code.is_empty())
                    .collect::<HashSet<_>>()
            })
            .filter(|codes| !codes.is_empty())
            .unwrap_or(standard.free);

        let redirects = redirect
            .and_then(|raw| {
                let (code, offer) = raw.split_once(':')?;
                let code = code.trim().to_uppercase();
                let offer = offer.trim().to_string();
                if code.is_empty() || offer.is_empty() {
                    None
                } else {
                    Some(HashMap::from([(code, offer)]))
                }
            })
            .unwrap_or(standard.redirects);

        Self { free, redirects }
    }

    /// Normalize raw input and classify it. Redirect codes win over the
    /// free set so a misconfigured overlap stays deterministic.
    pub fn classify(&self, input: &str) -> PromoKind {
        let code = input.trim().to_uppercase();
        if let Some(offer_key) = self.redirects.get(&code) {
            return PromoKind::PaidRedirect(offer_key.clone());
        }
        if self.free.contains(&code) {
            return PromoKind::FreeAccess;
        }
        PromoKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_trims_and_ignores_case() {
        let codes = PromoCatalog::standard();
        assert_eq!(codes.classify("  thg100  "), PromoKind::FreeAccess);
        assert_eq!(codes.classify("FLP100"), PromoKind::FreeAccess);
        assert_eq!(
            codes.classify("vip50"),
            PromoKind::PaidRedirect("flash".to_string())
        );
        assert_eq!(codes.classify("HACK123"), PromoKind::Unknown);
        assert_eq!(codes.classify(""), PromoKind::Unknown);
    }

    #[test]
    fn config_overrides_replace_the_shipped_table() {
        let codes = PromoCatalog::from_config(Some("abc, def"), Some("half:life"));
        assert_eq!(codes.classify("ABC"), PromoKind::FreeAccess);
        assert_eq!(codes.classify("THG100"), PromoKind::Unknown);
        assert_eq!(
            codes.classify("HALF"),
            PromoKind::PaidRedirect("life".to_string())
        );
    }

    #[test]
    fn empty_overrides_fall_back_to_the_shipped_table() {
        let codes = PromoCatalog::from_config(Some("  ,  "), Some("broken"));
        assert_eq!(codes.classify("THG100"), PromoKind::FreeAccess);
        assert_eq!(
            codes.classify("VIP50"),
            PromoKind::PaidRedirect("flash".to_string())
        );
    }
}
