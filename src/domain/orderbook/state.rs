//! Orderbook state containers: app-owned, SDK-provided update logic.

use super::OrderBookSnapshot;
use crate::shared::Symbol;

/// Whether any snapshot has arrived for the active symbol.
///
/// `Loaded` with an empty snapshot means "no orders"; `NotLoaded` means
/// "no data yet".
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BookState {
    #[default]
    NotLoaded,
    Loaded(OrderBookSnapshot),
}

/// Latest full order book for the active symbol.
///
/// Every accepted snapshot replaces the previous one wholesale; there is no
/// delta merge and no sequence check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBookView {
    symbol: Option<Symbol>,
    state: BookState,
}

impl OrderBookView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the view at `symbol` and forget the held snapshot.
    pub fn reset(&mut self, symbol: Symbol) {
        self.symbol = Some(symbol);
        self.state = BookState::NotLoaded;
    }

    /// Replace the held snapshot if it belongs to the view's symbol.
    ///
    /// Returns `false` (and leaves the view untouched) for any other symbol,
    /// including when the view has not been pointed at a symbol yet.
    pub fn apply(&mut self, snapshot: OrderBookSnapshot) -> bool {
        if self.symbol.as_ref() != Some(&snapshot.symbol) {
            return false;
        }
        self.state = BookState::Loaded(snapshot);
        true
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn state(&self) -> &BookState {
        &self.state
    }

    /// The held snapshot, or `None` while not loaded.
    pub fn snapshot(&self) -> Option<&OrderBookSnapshot> {
        match &self.state {
            BookState::Loaded(snapshot) => Some(snapshot),
            BookState::NotLoaded => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, BookState::Loaded(_))
    }
}
