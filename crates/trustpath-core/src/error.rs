/// Core model errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid asset name: {0}")]
    InvalidAssetName(String),

    #[error("invalid asset scale: {0}")]
    InvalidScale(String),

    #[error("invalid asset pair: {0}")]
    InvalidPair(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("configuration error: {0}")]
    Config(String),
}
