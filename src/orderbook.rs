use std::collections::{HashMap, VecDeque};
use std::time::SystemTime;

use tracing::{debug, info, trace, warn};

use crate::{
    clock::{MonotonicClock, next_trade_id},
    errors::EngineError,
    events::{EventSink, MarketEvent},
    ladder::PriceLadder,
    orders::{Order, OrderIntent, OrderStatus, OrderType, Side},
    trade::Trade,
};

/// Oldest trades are dropped once the log grows past this.
const TRADE_LOG_CAP: usize = 10_000;

/// Where a resting order lives: which side's ladder, at which price. The
/// order itself is owned by exactly one level queue.
#[derive(Debug, Clone, Copy)]
struct Locator {
    side: Side,
    price: u64,
}

/// Result of a submit: terminal status plus the fills it produced, in match
/// order.
#[derive(Debug)]
pub struct OrderOutcome {
    pub status: OrderStatus,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BboLevel {
    pub price: u64,
    pub qty: u64,
}

/// Top-of-book: best price and the aggregate resting quantity at it, per
/// side. A side with no liquidity contributes an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BboSnapshot {
    pub bids: Vec<BboLevel>,
    pub asks: Vec<BboLevel>,
}

/// Aggregated `(price, qty)` levels per side, best first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepthSnapshot {
    pub bids: Vec<(u64, u64)>,
    pub asks: Vec<(u64, u64)>,
}

/// A single symbol's central limit order book.
///
/// Two price ladders hold the resting liquidity, an id index locates resting
/// orders for cancellation, and a bounded log keeps the recent trade tail.
/// One submit or cancel runs at a time; market-data events go to the
/// [`EventSink`] synchronously, so per-submit event order is deterministic:
/// trades in match order, then one BBO update.
pub struct OrderBook {
    symbol: String,
    bids: PriceLadder,
    asks: PriceLadder,
    orders: HashMap<String, Locator>,
    trade_log: VecDeque<Trade>,
    clock: MonotonicClock,
    sink: Box<dyn EventSink>,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>, sink: Box<dyn EventSink>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: PriceLadder::new(Side::Buy),
            asks: PriceLadder::new(Side::Sell),
            orders: HashMap::new(),
            trade_log: VecDeque::new(),
            clock: MonotonicClock::new(),
            sink,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Submit an order for matching.
    ///
    /// Matches against the opposite ladder best-price-first, FIFO within a
    /// level, executing every fill at the maker's price. What happens to a
    /// residual depends on the order type: a limit order rests, market and
    /// immediate-or-cancel residuals are discarded, and a fill-or-kill that
    /// cannot complete is rejected up front without touching the book.
    pub fn submit(&mut self, intent: OrderIntent) -> Result<OrderOutcome, EngineError> {
        self.validate(&intent)?;
        debug!(
            id = %intent.id,
            side = ?intent.side,
            order_type = ?intent.order_type,
            price = ?intent.price,
            qty = intent.qty,
            "submit"
        );

        let mut order = Order {
            id: intent.id,
            side: intent.side,
            order_type: intent.order_type,
            // market orders carry no price even if the caller sent one
            price: match intent.order_type {
                OrderType::Market => None,
                _ => intent.price,
            },
            qty: intent.qty,
            remaining: intent.qty,
            ts: self.clock.now_ns(),
        };

        if order.order_type == OrderType::Fok && !self.fok_fillable(&order) {
            debug!(id = %order.id, "fill-or-kill rejected: not enough crossing liquidity");
            return Ok(OrderOutcome {
                status: OrderStatus::Rejected,
                trades: Vec::new(),
            });
        }

        let trades = self.match_incoming(&mut order);

        let status = if order.remaining == 0 {
            OrderStatus::Filled
        } else {
            match order.order_type {
                OrderType::Limit => {
                    self.rest(order);
                    OrderStatus::Resting
                }
                OrderType::Ioc if trades.is_empty() => OrderStatus::Cancelled,
                OrderType::Ioc => OrderStatus::Partial,
                OrderType::Market if trades.is_empty() => OrderStatus::Unfilled,
                OrderType::Market => OrderStatus::Partial,
                OrderType::Fok => unreachable!("fill-or-kill passed its precheck but did not fill"),
            }
        };

        self.publish_bbo();
        #[cfg(debug_assertions)]
        self.check_invariants();

        Ok(OrderOutcome { status, trades })
    }

    /// Cancel a resting order by id. Returns false if the id is not resting.
    pub fn cancel(&mut self, id: &str) -> bool {
        let Some(loc) = self.orders.remove(id) else {
            return false;
        };
        let removed = self.ladder_mut(loc.side).remove_by_id(loc.price, id);
        debug_assert!(removed.is_some(), "indexed order missing from its level");
        info!(id, side = ?loc.side, price = loc.price, "order cancelled");

        self.publish_bbo();
        #[cfg(debug_assertions)]
        self.check_invariants();
        true
    }

    pub fn bbo(&self) -> BboSnapshot {
        let top = |ladder: &PriceLadder| -> Vec<BboLevel> {
            ladder
                .best_price()
                .map(|price| BboLevel {
                    price,
                    qty: ladder.qty_at(price),
                })
                .into_iter()
                .collect()
        };
        BboSnapshot {
            bids: top(&self.bids),
            asks: top(&self.asks),
        }
    }

    pub fn depth(&self, levels: usize) -> DepthSnapshot {
        DepthSnapshot {
            bids: self.bids.depth(levels),
            asks: self.asks.depth(levels),
        }
    }

    /// The last `limit` trades in insertion order.
    pub fn recent_trades(&self, limit: usize) -> Vec<Trade> {
        let skip = self.trade_log.len().saturating_sub(limit);
        self.trade_log.iter().skip(skip).cloned().collect()
    }

    fn validate(&self, intent: &OrderIntent) -> Result<(), EngineError> {
        if intent.qty == 0 {
            return Err(EngineError::ZeroQuantity);
        }
        match intent.order_type {
            OrderType::Market => {}
            order_type => match intent.price {
                None => return Err(EngineError::PriceRequired(order_type)),
                Some(0) => return Err(EngineError::ZeroPrice),
                Some(_) => {}
            },
        }
        if self.orders.contains_key(&intent.id) {
            return Err(EngineError::DuplicateOrderId(intent.id.clone()));
        }
        Ok(())
    }

    /// Fill-or-kill precheck: walk the opposite ladder best-first, summing
    /// remaining quantity at every price the limit can cross, stopping as
    /// soon as the target is reached. Read-only; runs before any mutation.
    fn fok_fillable(&self, order: &Order) -> bool {
        let opp = self.ladder(order.side.opposite());
        let mut available: u64 = 0;
        'levels: for (price, queue) in opp.iter_from_best() {
            if !order.crosses(price) {
                break;
            }
            for resting in queue {
                available += resting.remaining;
                if available >= order.qty {
                    break 'levels;
                }
            }
        }
        available >= order.qty
    }

    /// Core matching loop. Consumes the opposite ladder best-price-first and
    /// FIFO within each level, emitting one trade per fill at the maker's
    /// price. Fully filled makers leave the queue and the id index; drained
    /// levels leave the ladder.
    fn match_incoming(&mut self, taker: &mut Order) -> Vec<Trade> {
        let mut trades = Vec::new();
        let opp = match taker.side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };

        while taker.remaining > 0 {
            let Some((best, queue)) = opp.best_level_mut() else {
                break;
            };
            if !taker.crosses(best) {
                break;
            }

            while let Some(maker) = queue.front_mut() {
                let fill = taker.remaining.min(maker.remaining);
                let trade = Trade {
                    trade_id: next_trade_id(),
                    symbol: self.symbol.clone(),
                    price: best,
                    qty: fill,
                    aggressor_side: taker.side,
                    maker_order_id: maker.id.clone(),
                    taker_order_id: taker.id.clone(),
                    timestamp: SystemTime::now(),
                };

                taker.remaining -= fill;
                maker.remaining -= fill;

                if maker.remaining == 0 {
                    let maker_id = maker.id.clone();
                    queue.pop_front();
                    self.orders.remove(&maker_id);
                }

                trace!(
                    price = trade.price,
                    qty = trade.qty,
                    maker = %trade.maker_order_id,
                    "fill"
                );
                self.trade_log.push_back(trade.clone());
                if self.trade_log.len() > TRADE_LOG_CAP {
                    self.trade_log.pop_front();
                }
                self.sink.publish(MarketEvent::Trade(trade.clone()));
                trades.push(trade);

                if taker.remaining == 0 {
                    break;
                }
            }

            if queue.is_empty() {
                opp.remove_level(best);
            }
        }
        trades
    }

    /// Park a residual limit order on its own side and index it.
    fn rest(&mut self, order: Order) {
        if let Some(price) = order.price {
            self.orders.insert(
                order.id.clone(),
                Locator {
                    side: order.side,
                    price,
                },
            );
            self.ladder_mut(order.side).insert(price, order);
        } else {
            warn!(id = %order.id, "refusing to rest an unpriced order");
        }
    }

    fn ladder(&self, side: Side) -> &PriceLadder {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn ladder_mut(&mut self, side: Side) -> &mut PriceLadder {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn publish_bbo(&self) {
        self.sink.publish(MarketEvent::Bbo {
            symbol: self.symbol.clone(),
            bbo: self.bbo(),
        });
    }

    /// Structural checks run after every mutation in debug and test builds.
    /// A failure here is a bug in the engine, so it panics rather than
    /// returning an error.
    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        if let (Some(bid), Some(ask)) = (self.bids.best_price(), self.asks.best_price()) {
            assert!(bid < ask, "book crossed at rest: bid {bid} >= ask {ask}");
        }

        let mut queued = 0usize;
        for ladder in [&self.bids, &self.asks] {
            for (price, queue) in ladder.iter_from_best() {
                assert!(!queue.is_empty(), "empty level left at {price}");
                for order in queue {
                    assert!(order.remaining > 0, "zero-remaining order {} resting", order.id);
                    assert!(order.remaining <= order.qty);
                    let Some(loc) = self.orders.get(&order.id) else {
                        panic!("resting order {} missing from the id index", order.id);
                    };
                    assert_eq!(loc.price, price, "index price mismatch for {}", order.id);
                    assert_eq!(loc.side, ladder.side(), "index side mismatch for {}", order.id);
                    queued += 1;
                }
            }
        }
        assert_eq!(queued, self.orders.len(), "id index out of sync with ladders");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use std::sync::{Arc, Mutex};

    /// Sink that records events so tests can assert emission order.
    struct RecordingSink(Arc<Mutex<Vec<MarketEvent>>>);

    impl EventSink for RecordingSink {
        fn publish(&self, event: MarketEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn book() -> OrderBook {
        OrderBook::new("BTC-USD", Box::new(NullSink))
    }

    fn recorded_book() -> (OrderBook, Arc<Mutex<Vec<MarketEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let ob = OrderBook::new("BTC-USD", Box::new(RecordingSink(events.clone())));
        (ob, events)
    }

    fn limit(id: &str, side: Side, price: u64, qty: u64) -> OrderIntent {
        OrderIntent {
            id: id.into(),
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            qty,
        }
    }

    fn market(id: &str, side: Side, qty: u64) -> OrderIntent {
        OrderIntent {
            id: id.into(),
            side,
            order_type: OrderType::Market,
            price: None,
            qty,
        }
    }

    fn ioc(id: &str, side: Side, price: u64, qty: u64) -> OrderIntent {
        OrderIntent {
            order_type: OrderType::Ioc,
            ..limit(id, side, price, qty)
        }
    }

    fn fok(id: &str, side: Side, price: u64, qty: u64) -> OrderIntent {
        OrderIntent {
            order_type: OrderType::Fok,
            ..limit(id, side, price, qty)
        }
    }

    /// A market buy sweeps two ask levels and leaves the residual depth.
    #[test]
    fn market_order_sweeps_two_levels() {
        let mut ob = book();
        ob.submit(limit("s1", Side::Sell, 100, 2)).unwrap();
        ob.submit(limit("s2", Side::Sell, 101, 3)).unwrap();

        let outcome = ob.submit(market("b1", Side::Buy, 4)).unwrap();

        assert_eq!(outcome.status, OrderStatus::Filled);
        assert_eq!(outcome.trades.len(), 2);
        assert_eq!((outcome.trades[0].price, outcome.trades[0].qty), (100, 2));
        assert_eq!((outcome.trades[1].price, outcome.trades[1].qty), (101, 2));
        assert_eq!(ob.depth(5).asks, vec![(101, 1)]);
        assert!(ob.depth(5).bids.is_empty());
    }

    /// A limit order with nothing to cross rests on its own side.
    #[test]
    fn limit_order_rests_on_empty_book() {
        let mut ob = book();
        let outcome = ob.submit(limit("b1", Side::Buy, 99, 5)).unwrap();

        assert_eq!(outcome.status, OrderStatus::Resting);
        assert!(outcome.trades.is_empty());
        assert_eq!(
            ob.bbo().bids,
            vec![BboLevel { price: 99, qty: 5 }]
        );
        assert!(ob.bbo().asks.is_empty());
    }

    /// An immediate-or-cancel fills what it can and leaves no residual.
    #[test]
    fn ioc_partial_fill_leaves_no_residual() {
        let mut ob = book();
        ob.submit(limit("s1", Side::Sell, 100, 3)).unwrap();

        let outcome = ob.submit(ioc("b1", Side::Buy, 101, 5)).unwrap();

        assert_eq!(outcome.status, OrderStatus::Partial);
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!((outcome.trades[0].price, outcome.trades[0].qty), (100, 3));
        assert!(ob.bbo().bids.is_empty());
        assert!(ob.bbo().asks.is_empty());
    }

    #[test]
    fn ioc_with_no_cross_is_cancelled() {
        let mut ob = book();
        ob.submit(limit("s1", Side::Sell, 105, 3)).unwrap();

        let outcome = ob.submit(ioc("b1", Side::Buy, 101, 5)).unwrap();

        assert_eq!(outcome.status, OrderStatus::Cancelled);
        assert!(outcome.trades.is_empty());
        assert!(ob.bbo().bids.is_empty(), "cancelled residual must not rest");
    }

    /// A fill-or-kill short of liquidity is rejected with the book untouched.
    #[test]
    fn fok_reject_leaves_book_untouched() {
        let mut ob = book();
        ob.submit(limit("s1", Side::Sell, 100, 3)).unwrap();
        let before_depth = ob.depth(usize::MAX);
        let before_trades = ob.recent_trades(usize::MAX);

        let outcome = ob.submit(fok("b1", Side::Buy, 101, 5)).unwrap();

        assert_eq!(outcome.status, OrderStatus::Rejected);
        assert!(outcome.trades.is_empty());
        assert_eq!(ob.depth(usize::MAX), before_depth);
        assert_eq!(ob.recent_trades(usize::MAX), before_trades);
        assert_eq!(
            ob.bbo().asks,
            vec![BboLevel { price: 100, qty: 3 }]
        );
    }

    #[test]
    fn fok_fills_completely_across_levels() {
        let mut ob = book();
        ob.submit(limit("s1", Side::Sell, 100, 2)).unwrap();
        ob.submit(limit("s2", Side::Sell, 101, 2)).unwrap();
        ob.submit(limit("s3", Side::Sell, 102, 2)).unwrap();

        let outcome = ob.submit(fok("b1", Side::Buy, 101, 4)).unwrap();

        assert_eq!(outcome.status, OrderStatus::Filled);
        assert_eq!(outcome.trades.len(), 2);
        assert_eq!(ob.depth(5).asks, vec![(102, 2)]);
    }

    /// The precheck must not count liquidity beyond the limit price.
    #[test]
    fn fok_ignores_liquidity_past_its_limit() {
        let mut ob = book();
        ob.submit(limit("s1", Side::Sell, 100, 2)).unwrap();
        ob.submit(limit("s2", Side::Sell, 110, 10)).unwrap();

        let outcome = ob.submit(fok("b1", Side::Buy, 101, 4)).unwrap();

        assert_eq!(outcome.status, OrderStatus::Rejected);
        assert_eq!(ob.depth(5).asks, vec![(100, 2), (110, 10)]);
    }

    #[test]
    fn cancel_removes_resting_order_then_misses() {
        let mut ob = book();
        ob.submit(limit("x", Side::Buy, 100, 1)).unwrap();

        assert!(ob.cancel("x"));
        assert!(ob.bbo().bids.is_empty());
        assert!(!ob.cancel("x"), "second cancel must be a no-op");
    }

    #[test]
    fn cancel_of_unknown_id_returns_false() {
        let mut ob = book();
        assert!(!ob.cancel("ghost"));
    }

    /// Price-time priority: at equal price the earliest maker fills first.
    #[test]
    fn earliest_order_at_a_price_matches_first() {
        let mut ob = book();
        ob.submit(limit("a", Side::Sell, 100, 1)).unwrap();
        ob.submit(limit("b", Side::Sell, 100, 1)).unwrap();

        let outcome = ob.submit(market("t", Side::Buy, 1)).unwrap();

        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].maker_order_id, "a");
        assert_eq!(ob.depth(5).asks, vec![(100, 1)]);
    }

    #[test]
    fn better_price_matches_before_earlier_time() {
        let mut ob = book();
        ob.submit(limit("worse_but_older", Side::Sell, 102, 1)).unwrap();
        ob.submit(limit("better_but_newer", Side::Sell, 101, 1)).unwrap();

        let outcome = ob.submit(market("t", Side::Buy, 1)).unwrap();
        assert_eq!(outcome.trades[0].maker_order_id, "better_but_newer");
    }

    #[test]
    fn market_order_on_empty_side_is_unfilled() {
        let mut ob = book();
        let outcome = ob.submit(market("m", Side::Buy, 10)).unwrap();

        assert_eq!(outcome.status, OrderStatus::Unfilled);
        assert!(outcome.trades.is_empty());
        assert!(ob.bbo().bids.is_empty(), "market orders never rest");
    }

    #[test]
    fn market_partial_discards_residual() {
        let mut ob = book();
        ob.submit(limit("s1", Side::Sell, 100, 4)).unwrap();

        let outcome = ob.submit(market("m", Side::Buy, 10)).unwrap();

        assert_eq!(outcome.status, OrderStatus::Partial);
        assert_eq!(outcome.trades[0].qty, 4);
        assert!(ob.bbo().bids.is_empty());
        assert!(ob.bbo().asks.is_empty());
    }

    /// Every fill executes at the resting order's price, not the taker's.
    #[test]
    fn trades_execute_at_maker_price() {
        let mut ob = book();
        ob.submit(limit("maker", Side::Sell, 105, 5)).unwrap();

        let outcome = ob.submit(limit("taker", Side::Buy, 110, 3)).unwrap();

        assert_eq!(outcome.status, OrderStatus::Filled);
        assert_eq!(outcome.trades[0].price, 105);
        assert_eq!(outcome.trades[0].aggressor_side, Side::Buy);
        assert_eq!(ob.depth(5).asks, vec![(105, 2)]);
    }

    #[test]
    fn crossing_limit_rests_its_remainder() {
        let mut ob = book();
        ob.submit(limit("s1", Side::Sell, 100, 5)).unwrap();

        let outcome = ob.submit(limit("b1", Side::Buy, 101, 10)).unwrap();

        assert_eq!(outcome.status, OrderStatus::Resting);
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].qty, 5);
        assert_eq!(
            ob.bbo().bids,
            vec![BboLevel { price: 101, qty: 5 }]
        );
        assert!(ob.bbo().asks.is_empty());
    }

    /// Filled quantity equals what was available inside the limit, and the
    /// book's aggregate depth drops by exactly that amount.
    #[test]
    fn quantity_is_conserved_across_a_sweep() {
        let mut ob = book();
        ob.submit(limit("s1", Side::Sell, 100, 2)).unwrap();
        ob.submit(limit("s2", Side::Sell, 101, 3)).unwrap();
        ob.submit(limit("s3", Side::Sell, 103, 4)).unwrap();
        let before: u64 = ob.depth(usize::MAX).asks.iter().map(|(_, q)| q).sum();

        let outcome = ob.submit(limit("b1", Side::Buy, 101, 20)).unwrap();

        let filled: u64 = outcome.trades.iter().map(|t| t.qty).sum();
        assert_eq!(filled, 5, "everything at or under 101 and nothing more");
        let after: u64 = ob.depth(usize::MAX).asks.iter().map(|(_, q)| q).sum();
        assert_eq!(before - after, filled);
    }

    #[test]
    fn zero_quantity_is_rejected_before_mutation() {
        let mut ob = book();
        let err = ob.submit(market("m", Side::Buy, 0)).unwrap_err();
        assert_eq!(err, EngineError::ZeroQuantity);
    }

    #[test]
    fn priced_types_require_a_price() {
        let mut ob = book();
        for order_type in [OrderType::Limit, OrderType::Ioc, OrderType::Fok] {
            let err = ob
                .submit(OrderIntent {
                    id: format!("{order_type:?}"),
                    side: Side::Buy,
                    order_type,
                    price: None,
                    qty: 1,
                })
                .unwrap_err();
            assert_eq!(err, EngineError::PriceRequired(order_type));
        }
    }

    #[test]
    fn id_colliding_with_a_resting_order_is_rejected() {
        let mut ob = book();
        ob.submit(limit("dup", Side::Buy, 99, 1)).unwrap();

        let err = ob.submit(limit("dup", Side::Buy, 98, 1)).unwrap_err();
        assert_eq!(err, EngineError::DuplicateOrderId("dup".into()));
    }

    #[test]
    fn trade_events_precede_the_bbo_event() {
        let (mut ob, events) = recorded_book();
        ob.submit(limit("s1", Side::Sell, 100, 2)).unwrap();
        ob.submit(limit("s2", Side::Sell, 101, 2)).unwrap();
        events.lock().unwrap().clear();

        ob.submit(market("b1", Side::Buy, 4)).unwrap();

        let seen = events.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(matches!(seen[0], MarketEvent::Trade(ref t) if t.price == 100));
        assert!(matches!(seen[1], MarketEvent::Trade(ref t) if t.price == 101));
        match &seen[2] {
            MarketEvent::Bbo { symbol, bbo } => {
                assert_eq!(symbol, "BTC-USD");
                assert!(bbo.asks.is_empty());
            }
            other => panic!("expected a bbo event last, got {other:?}"),
        }
    }

    #[test]
    fn rejected_fok_emits_no_events() {
        let (mut ob, events) = recorded_book();
        ob.submit(limit("s1", Side::Sell, 100, 3)).unwrap();
        events.lock().unwrap().clear();

        ob.submit(fok("b1", Side::Buy, 101, 5)).unwrap();

        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn recent_trades_returns_the_tail_in_order() {
        let mut ob = book();
        for i in 0..4 {
            ob.submit(limit(&format!("s{i}"), Side::Sell, 100 + i, 1)).unwrap();
        }
        ob.submit(market("sweep", Side::Buy, 4)).unwrap();

        let tail = ob.recent_trades(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].price, 102);
        assert_eq!(tail[1].price, 103);
    }

    #[test]
    fn full_fill_removes_maker_from_index() {
        let mut ob = book();
        ob.submit(limit("maker", Side::Sell, 100, 2)).unwrap();
        ob.submit(market("taker", Side::Buy, 2)).unwrap();

        assert!(!ob.cancel("maker"), "filled maker must leave the index");
        assert!(ob.bbo().asks.is_empty());
    }
}
