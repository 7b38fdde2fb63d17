use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,  //bid
    Sell, //ask
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
    /// Immediate-or-cancel: fill what crosses now, discard the rest.
    Ioc,
    /// Fill-or-kill: fill completely now or reject with no book change.
    Fok,
}

/// Terminal classification of a submit, returned to the caller and
/// serialized on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Filled,
    Partial,
    Resting,
    Cancelled,
    Unfilled,
    Rejected,
}

/// What a caller asks the book to do. The book stamps the timestamp and
/// tracks `remaining` itself; see [`Order`].
#[derive(Debug, Clone)]
pub struct OrderIntent {
    pub id: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price in integer ticks. `None` for market orders.
    pub price: Option<u64>,
    pub qty: u64,
}

/// An order inside the book: either the incoming aggressor during a match,
/// or a resting entry in a price-level queue.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Option<u64>,
    pub qty: u64,
    /// Unfilled quantity; starts at `qty`, never grows.
    pub remaining: u64,
    /// Monotonic nanoseconds assigned at book entry; FIFO tie-breaker.
    pub ts: u64,
}

impl Order {
    /// Whether this order may trade against the opposite side's best price.
    /// Market orders cross anything; limit-style orders must meet the price.
    pub fn crosses(&self, best: u64) -> bool {
        match self.price {
            None => true,
            Some(limit) => match self.side {
                Side::Buy => limit >= best,
                Side::Sell => limit <= best,
            },
        }
    }
}
