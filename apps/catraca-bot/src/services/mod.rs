pub mod pay_service;
pub mod promo_service;
pub mod session_service;
