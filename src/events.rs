use tokio::sync::broadcast;
use tracing::trace;

use crate::orderbook::BboSnapshot;
use crate::trade::Trade;

/// Market-data events produced by a book, in emission order: one `Trade`
/// per fill, then a single `Bbo` reflecting the post-submit top-of-book.
#[derive(Debug, Clone)]
pub enum MarketEvent {
    Trade(Trade),
    Bbo { symbol: String, bbo: BboSnapshot },
}

impl MarketEvent {
    pub fn symbol(&self) -> &str {
        match self {
            MarketEvent::Trade(t) => &t.symbol,
            MarketEvent::Bbo { symbol, .. } => symbol,
        }
    }
}

/// Consumer of market-data events. `publish` runs synchronously on the
/// matching path, so implementations must hand off quickly; whether a slow
/// downstream drops or buffers is the sink's problem, not the book's.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: MarketEvent);
}

/// Discards everything. Useful where nobody is listening.
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: MarketEvent) {}
}

/// Fans events out to websocket subscribers through a bounded tokio
/// broadcast channel. Sending never blocks; subscribers that fall behind
/// observe a lag error on their receiver and skip ahead.
pub struct BroadcastSink {
    tx: broadcast::Sender<MarketEvent>,
}

impl BroadcastSink {
    pub fn new(tx: broadcast::Sender<MarketEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, event: MarketEvent) {
        // send only errors when there are no subscribers
        if self.tx.send(event).is_err() {
            trace!("no event subscribers connected");
        }
    }
}
