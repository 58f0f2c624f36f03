pub mod payment;

pub use payment::{PaymentRecord, PaymentStatus};
