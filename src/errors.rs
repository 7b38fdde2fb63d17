use thiserror::Error;

use crate::orders::OrderType;

/// Rejections surfaced before the book mutates anything. These are boundary
/// errors, not matching outcomes; a fill-or-kill that cannot complete is an
/// ordinary [`crate::orders::OrderStatus::Rejected`] outcome instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("price required for {0:?} orders")]
    PriceRequired(OrderType),

    #[error("quantity must be > 0")]
    ZeroQuantity,

    #[error("price must be > 0")]
    ZeroPrice,

    #[error("order id {0} is already resting")]
    DuplicateOrderId(String),
}

/// Failures of the demo market-maker client, wrapped for upstream handling.
#[derive(Debug, Error)]
pub enum MarketMakerError {
    #[error("websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
