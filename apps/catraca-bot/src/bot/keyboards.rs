use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::models::offer::OfferCatalog;

/// One row per offer, then the promo-code entry row.
pub fn offers_keyboard(catalog: &OfferCatalog) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = catalog
        .iter()
        .map(|offer| {
            vec![InlineKeyboardButton::callback(
                format!("{} por R$ {:.2}", offer.label, offer.amount),
                format!("buy_{}", offer.key),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        "🎟️ Tenho um código promocional",
        "promo",
    )]);
    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    #[test]
    fn one_row_per_offer_plus_the_promo_row() {
        let catalog = OfferCatalog::standard();
        let offers = catalog.iter().count();
        let keyboard = offers_keyboard(&catalog);

        assert_eq!(keyboard.inline_keyboard.len(), offers + 1);

        let first = &keyboard.inline_keyboard[0][0];
        assert!(first.text.contains("R$ 10.00"));
        assert!(matches!(
            &first.kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == "buy_30"
        ));

        let last = &keyboard.inline_keyboard[offers][0];
        assert!(matches!(
            &last.kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == "promo"
        ));
    }
}
