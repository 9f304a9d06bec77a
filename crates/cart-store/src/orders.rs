use std::collections::BTreeMap;

use rusqlite::types::Value;
use tracing::{debug, instrument};

use cart_core::{ArticleId, Order, OrderKey, UserId};

use crate::database::Database;
use crate::error::StoreError;
use crate::gateway::StorageGateway;
use crate::row::{self, Row};

const TABLE: &str = "t_order";
const COL_USER: &str = "ord_usr";
const COL_ARTICLE: &str = "ord_art";
const COL_QUANTITY: &str = "ord_qt";

const SELECT_ONE: &str =
    "SELECT ord_usr, ord_art, ord_qt FROM t_order WHERE ord_usr = ?1 AND ord_art = ?2";
const SELECT_FOR_USER: &str =
    "SELECT ord_usr, ord_art, ord_qt FROM t_order WHERE ord_usr = ?1 ORDER BY ord_art";

/// Maps `t_order` rows to [`Order`] records.
///
/// Each call is a single statement against the gateway. Quantity changes made
/// by [`add_item`](Self::add_item) and [`remove_item`](Self::remove_item) are
/// computed from the in-memory order and written as absolute values, so two
/// callers working on the same key can overwrite each other. The order is only
/// changed once its statement has succeeded.
pub struct OrderRepo<G = Database> {
    gateway: G,
}

impl<G: StorageGateway> OrderRepo<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Get the stored order for a key, or a transient one with quantity 1.
    #[instrument(skip(self), fields(key = %key))]
    pub fn find_or_create(&self, key: OrderKey) -> Result<Order, StoreError> {
        let params = [Value::Integer(key.user.get()), Value::Integer(key.article.get())];
        match self.gateway.fetch_one(SELECT_ONE, &params)? {
            Some(row) => order_from_row(&row),
            None => {
                debug!("no stored order, starting a new one");
                Ok(Order::transient(key))
            }
        }
    }

    /// All stored orders of a user, keyed and ordered by article.
    #[instrument(skip(self), fields(user = %user))]
    pub fn find_all_for_user(&self, user: UserId) -> Result<BTreeMap<ArticleId, Order>, StoreError> {
        let rows = self
            .gateway
            .fetch_all(SELECT_FOR_USER, &[Value::Integer(user.get())])?;

        let mut orders = BTreeMap::new();
        for row in &rows {
            let order = order_from_row(row)?;
            orders.insert(order.article(), order);
        }
        debug!(count = orders.len(), "loaded orders");
        Ok(orders)
    }

    /// Add one unit. A stored order is written with one more unit;
    /// a transient one is inserted with its current quantity.
    #[instrument(skip(self, order), fields(key = %order.key(), quantity = order.quantity()))]
    pub fn add_item(&self, order: &mut Order) -> Result<(), StoreError> {
        if order.is_persisted() {
            let quantity = order.plus_one();
            self.write_quantity(order.key(), quantity)?;
            order.set_quantity(quantity);
            Ok(())
        } else {
            self.insert(order)
        }
    }

    /// Remove one unit from a stored order, deleting its row once the
    /// quantity drops below 1. Transient orders are left alone.
    #[instrument(skip(self, order), fields(key = %order.key(), quantity = order.quantity()))]
    pub fn remove_item(&self, order: &mut Order) -> Result<(), StoreError> {
        if !order.is_persisted() {
            debug!("order not stored, nothing to remove");
            return Ok(());
        }

        let quantity = order.minus_one();
        if quantity < 1 {
            self.delete(order.key())?;
        } else {
            self.write_quantity(order.key(), quantity)?;
        }
        order.set_quantity(quantity);
        Ok(())
    }

    /// Write the order with its exact current quantity.
    #[instrument(skip(self, order), fields(key = %order.key(), quantity = order.quantity()))]
    pub fn save(&self, order: &mut Order) -> Result<(), StoreError> {
        if order.is_persisted() {
            self.write_quantity(order.key(), order.quantity())
        } else {
            self.insert(order)
        }
    }

    /// Delete the row for a key. Deleting a missing key is not an error.
    #[instrument(skip(self), fields(key = %key))]
    pub fn delete(&self, key: OrderKey) -> Result<(), StoreError> {
        let deleted = self.gateway.delete(TABLE, &key_columns(key))?;
        debug!(deleted, "order deleted");
        Ok(())
    }

    fn insert(&self, order: &mut Order) -> Result<(), StoreError> {
        let key = order.key();
        self.gateway.insert(
            TABLE,
            &[
                (COL_USER, Value::Integer(key.user.get())),
                (COL_ARTICLE, Value::Integer(key.article.get())),
                (COL_QUANTITY, Value::Integer(order.quantity())),
            ],
        )?;
        order.mark_persisted();
        debug!(quantity = order.quantity(), "order inserted");
        Ok(())
    }

    fn write_quantity(&self, key: OrderKey, quantity: i64) -> Result<(), StoreError> {
        let matched = self.gateway.update(
            TABLE,
            &[(COL_QUANTITY, Value::Integer(quantity))],
            &key_columns(key),
        )?;
        debug!(quantity, matched, "order updated");
        Ok(())
    }
}

fn key_columns(key: OrderKey) -> [(&'static str, Value); 2] {
    [
        (COL_USER, Value::Integer(key.user.get())),
        (COL_ARTICLE, Value::Integer(key.article.get())),
    ]
}

fn order_from_row(row: &Row) -> Result<Order, StoreError> {
    let user = row::get_i64(row, TABLE, COL_USER)?;
    let article = row::get_i64(row, TABLE, COL_ARTICLE)?;
    let quantity = row::get_i64(row, TABLE, COL_QUANTITY)?;
    Ok(Order::persisted(OrderKey::new(user, article), quantity))
}
