use std::time::SystemTime;

use crate::orders::Side;

/// A trade is one match between two orders.
///
/// - The price comes from the maker's order (i.e. the resting order).
/// - `qty` is the amount filled.
/// - The taker is the incoming order that triggered the trade.
///
/// Trades are never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub trade_id: String,
    pub symbol: String,
    /// Execution price in integer ticks; always the maker's price.
    pub price: u64,
    pub qty: u64,
    pub aggressor_side: Side,
    pub maker_order_id: String,
    pub taker_order_id: String,
    pub timestamp: SystemTime,
}
