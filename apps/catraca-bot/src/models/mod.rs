pub mod charge;
pub mod offer;
pub mod promo;
