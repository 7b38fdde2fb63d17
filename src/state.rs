use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use crate::{
    events::{BroadcastSink, MarketEvent},
    instrument::Pair,
    orderbook::OrderBook,
};

/// Event channel capacity; subscribers that fall further behind than this
/// observe a lag and skip ahead.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Registry of per-symbol books plus the event channel every websocket
/// subscriber taps. Books share nothing with each other; the write lock
/// keeps each book single-writer, and queries take the read lock so they
/// always observe a settled book.
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<RwLock<HashMap<Pair, OrderBook>>>,
    pub events: broadcast::Sender<MarketEvent>,
}

impl AppState {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let mut books = HashMap::new();
        for pair in Pair::supported() {
            books.insert(
                pair.clone(),
                OrderBook::new(pair.code(), Box::new(BroadcastSink::new(events.clone()))),
            );
        }
        Self {
            books: Arc::new(RwLock::new(books)),
            events,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new()
    }
}
