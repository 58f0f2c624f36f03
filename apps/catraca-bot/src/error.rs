use thiserror::Error;

/// What can go wrong between a plan button press and a delivered PIX
/// code. Every variant maps to one generic user-facing message; the full
/// cause chain only ever reaches the logs.
#[derive(Debug, Error)]
pub enum PayError {
    #[error("unknown offer key: {0}")]
    UnknownOffer(String),

    /// The processor accepted the charge but returned no copy-paste code.
    #[error("processor response carried no payable code")]
    MissingCode,

    #[error("payment processor call failed")]
    Processor(#[source] anyhow::Error),
}

impl PayError {
    /// The one message the end user is allowed to see for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            PayError::UnknownOffer(_) => "❌ Plano inválido.",
            PayError::MissingCode | PayError::Processor(_) => {
                "⚠️ Erro ao gerar o pagamento. Tente novamente em instantes."
            }
        }
    }
}
