//! User-facing error taxonomy.
//!
//! Every variant is recoverable and renders straight into a chat reply; the
//! handler never aborts on these. `Display` carries the Portuguese message
//! shown to the user.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("❌ *Valor inválido*\n\nInforme um valor numérico maior que zero")]
    InvalidValue,

    #[error("❌ *Comando não reconhecido*\n\nDigite `/ajuda` para ver os comandos disponíveis")]
    UnknownCommand,

    #[error("❌ *Operação cancelada*\n\nNenhuma alteração foi feita")]
    ConfirmationFailed,

    #[error("ℹ️ *Nenhum registro encontrado para {0}*")]
    NotFound(String),

    #[error("❌ *{0} insuficiente para realizar esta operação*")]
    InsufficientBalance(String),

    #[error("❌ *Operação não permitida ou inexistente*")]
    OperationNotAllowed,

    #[error("⚠️ *Defina seu saldo inicial primeiro!*\n\nUse: `/saldo 1000`")]
    InitialBalanceRequired,
}

impl ChatError {
    /// The reply body for this error.
    pub fn reply(&self) -> String {
        self.to_string()
    }
}
