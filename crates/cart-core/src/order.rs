use serde::Serialize;

use crate::ids::{ArticleId, OrderKey, UserId};

/// Whether an in-memory order has a backing row.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistState {
    Transient,
    Persisted,
}

/// One user's quantity selection for one article.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Order {
    #[serde(flatten)]
    key: OrderKey,
    quantity: i64,
    state: PersistState,
}

impl Order {
    /// Quantity given to an order synthesized for a key with no stored row.
    pub const INITIAL_QUANTITY: i64 = 1;

    /// A not-yet-stored order with the initial quantity.
    pub fn transient(key: OrderKey) -> Self {
        Self::new(key, Self::INITIAL_QUANTITY)
    }

    /// A not-yet-stored order with an explicit quantity.
    pub fn new(key: OrderKey, quantity: i64) -> Self {
        Self {
            key,
            quantity,
            state: PersistState::Transient,
        }
    }

    /// An order mirroring an existing row.
    pub fn persisted(key: OrderKey, quantity: i64) -> Self {
        Self {
            key,
            quantity,
            state: PersistState::Persisted,
        }
    }

    pub fn key(&self) -> OrderKey {
        self.key
    }

    pub fn user(&self) -> UserId {
        self.key.user
    }

    pub fn article(&self) -> ArticleId {
        self.key.article
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }

    pub fn state(&self) -> PersistState {
        self.state
    }

    pub fn is_persisted(&self) -> bool {
        self.state == PersistState::Persisted
    }

    /// Record that a row now exists for this order. There is no way back to
    /// `Transient`.
    pub fn mark_persisted(&mut self) {
        self.state = PersistState::Persisted;
    }

    /// Quantity after adding one unit. The order itself is unchanged.
    pub fn plus_one(&self) -> i64 {
        self.quantity.saturating_add(1)
    }

    /// Quantity after removing one unit. The order itself is unchanged.
    pub fn minus_one(&self) -> i64 {
        self.quantity.saturating_sub(1)
    }
}
