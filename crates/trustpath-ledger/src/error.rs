/// Failures reaching or querying the ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The ledger could not be reached, or the exchange failed at the
    /// protocol level.
    #[error("ledger unreachable: {cause}")]
    Transport { cause: String },

    /// The ledger answered and rejected the request.
    #[error("ledger rejected the request ({code}): {message}")]
    Remote { code: String, message: String },

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid ledger snapshot: {0}")]
    Snapshot(String),
}

impl LedgerError {
    pub fn transport(cause: impl Into<String>) -> Self {
        Self::Transport {
            cause: cause.into(),
        }
    }

    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// The machine-readable code of a remote rejection.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Remote { code, .. } => Some(code),
            _ => None,
        }
    }
}
