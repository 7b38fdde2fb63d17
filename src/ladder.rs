use std::collections::{BTreeMap, VecDeque, btree_map};

use crate::orders::{Order, Side};

/// One side of the book: a price-ordered mapping to per-price FIFO queues.
///
/// Keys are integer tick prices in a [`BTreeMap`], so inserting or removing a
/// level is O(log n) and the best price is one end of the map: the highest
/// key for bids, the lowest for asks. Each level holds a [`VecDeque`] to keep
/// **price-time** priority within the level.
pub struct PriceLadder {
    side: Side,
    levels: BTreeMap<u64, VecDeque<Order>>,
}

/// Unifies forward and reverse BTreeMap iteration so best-first traversal
/// works for both sides.
///
/// - [`BestFirst::Fwd`] walks prices ascending (asks).
/// - [`BestFirst::Rev`] walks prices descending (bids).
enum BestFirst<'a> {
    Fwd(btree_map::Iter<'a, u64, VecDeque<Order>>),
    Rev(std::iter::Rev<btree_map::Iter<'a, u64, VecDeque<Order>>>),
}

impl<'a> Iterator for BestFirst<'a> {
    type Item = (u64, &'a VecDeque<Order>);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            BestFirst::Fwd(iter) => iter.next().map(|(p, q)| (*p, q)),
            BestFirst::Rev(iter) => iter.next().map(|(p, q)| (*p, q)),
        }
    }
}

impl PriceLadder {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of populated price levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// The side's best price: max key for bids, min key for asks.
    pub fn best_price(&self) -> Option<u64> {
        match self.side {
            Side::Buy => self.levels.last_key_value().map(|(p, _)| *p),
            Side::Sell => self.levels.first_key_value().map(|(p, _)| *p),
        }
    }

    /// The best level and its price, for the matching loop.
    pub fn best_level_mut(&mut self) -> Option<(u64, &mut VecDeque<Order>)> {
        match self.side {
            Side::Buy => self.levels.last_entry().map(|e| (*e.key(), e.into_mut())),
            Side::Sell => self.levels.first_entry().map(|e| (*e.key(), e.into_mut())),
        }
    }

    /// Append `order` to the FIFO at `price`, creating the level if absent.
    pub fn insert(&mut self, price: u64, order: Order) {
        debug_assert_eq!(order.side, self.side);
        self.levels.entry(price).or_default().push_back(order);
    }

    /// Delete a drained level. Empty queues must never linger in the map.
    pub fn remove_level(&mut self, price: u64) -> Option<VecDeque<Order>> {
        self.levels.remove(&price)
    }

    /// Remove one order from its level by id, pruning the level if it is
    /// left empty. Linear scan within the level; levels are typically short.
    pub fn remove_by_id(&mut self, price: u64, id: &str) -> Option<Order> {
        let queue = self.levels.get_mut(&price)?;
        let pos = queue.iter().position(|o| o.id == id)?;
        let order = queue.remove(pos);
        if queue.is_empty() {
            self.levels.remove(&price);
        }
        order
    }

    /// Walk `(price, queue)` pairs in priority order: descending prices for
    /// bids, ascending for asks.
    pub fn iter_from_best(&self) -> impl Iterator<Item = (u64, &VecDeque<Order>)> {
        match self.side {
            Side::Buy => BestFirst::Rev(self.levels.iter().rev()),
            Side::Sell => BestFirst::Fwd(self.levels.iter()),
        }
    }

    /// Sum of `remaining` across the queue at `price`; 0 if the level is absent.
    pub fn qty_at(&self, price: u64) -> u64 {
        self.levels
            .get(&price)
            .map(|q| q.iter().map(|o| o.remaining).sum())
            .unwrap_or(0)
    }

    /// Up to `levels` best `(price, aggregate_qty)` pairs.
    pub fn depth(&self, levels: usize) -> Vec<(u64, u64)> {
        self.iter_from_best()
            .take(levels)
            .map(|(price, queue)| (price, queue.iter().map(|o| o.remaining).sum()))
            .collect()
    }
}
