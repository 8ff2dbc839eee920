//! redb-based storage layer for orders and rider availability
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` (JSON) | Order aggregate (items embedded) |
//! | `riders` | `rider_id` | `RiderProfile` (JSON) | Availability + contact |
//! | `counters` | name | `u64` | Order-number counter |
//!
//! # Concurrency
//!
//! Every order mutation goes through [`OrderStorage::update_order_guarded`]:
//! a single write transaction that re-reads the order and compares its
//! status against the status the caller loaded. redb admits one writer at a
//! time, so the guard makes each order a single-writer resource - two
//! actors racing on the same order see exactly one winner, the loser gets
//! a `StatusConflict`.
//!
//! Orders embed their items, so order + items + add-on selections commit
//! atomically in one insert.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::{GeoPoint, Order, OrderStatus, RiderProfile};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for riders: key = rider_id, value = JSON-serialized RiderProfile
const RIDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("riders");

/// Table for counters: key = counter name, value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_COUNT_KEY: &str = "order_count";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order already exists: {0}")]
    OrderExists(String),

    #[error("Rider not found: {0}")]
    RiderNotFound(String),

    #[error("Order {order_id} status changed concurrently: expected {expected}, found {actual}")]
    StatusConflict {
        order_id: String,
        expected: OrderStatus,
        actual: OrderStatus,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::error::AppError {
    fn from(err: StorageError) -> Self {
        use shared::error::{AppError, ErrorCode};
        match err {
            StorageError::OrderNotFound(id) => AppError::with_message(
                ErrorCode::OrderNotFound,
                format!("order {} not found", id),
            ),
            StorageError::RiderNotFound(id) => AppError::with_message(
                ErrorCode::RiderNotFound,
                format!("rider {} not found", id),
            ),
            StorageError::StatusConflict {
                order_id,
                expected,
                actual,
            } => AppError::conflict(format!(
                "order {} status changed concurrently (expected {}, found {})",
                order_id, expected, actual
            ))
            .with_detail("currentStatus", actual.to_string()),
            StorageError::OrderExists(id) => AppError::with_message(
                ErrorCode::AlreadyExists,
                format!("order {} already exists", id),
            ),
            other => {
                tracing::error!(error = %other, "Storage error surfaced");
                AppError::storage(other.to_string())
            }
        }
    }
}

/// Filter for role-scoped order queries
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub vendor_id: Option<String>,
    pub customer_id: Option<String>,
    pub rider_id: Option<String>,
    /// Single value or set; `None` matches every status
    pub statuses: Option<Vec<OrderStatus>>,
    /// Inclusive created_at lower bound (unix millis)
    pub created_from: Option<i64>,
    /// Inclusive created_at upper bound (unix millis)
    pub created_to: Option<i64>,
}

impl OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        if let Some(v) = &self.vendor_id
            && order.vendor_id != *v
        {
            return false;
        }
        if let Some(c) = &self.customer_id
            && order.customer_id != *c
        {
            return false;
        }
        if let Some(r) = &self.rider_id
            && order.rider_id.as_deref() != Some(r.as_str())
        {
            return false;
        }
        if let Some(statuses) = &self.statuses
            && !statuses.contains(&order.status)
        {
            return false;
        }
        if let Some(from) = self.created_from
            && order.created_at < from
        {
            return false;
        }
        if let Some(to) = self.created_to
            && order.created_at > to
        {
            return false;
        }
        true
    }
}

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").finish_non_exhaustive()
    }
}

impl OrderStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate`: once `commit()` returns,
    /// the transition survives power loss and the file is always readable.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, ephemeral deployments)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(RIDERS_TABLE)?;
            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(ORDER_COUNT_KEY)?.is_none() {
                counters.insert(ORDER_COUNT_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    // ========== Order Operations ==========

    /// Atomically persist a new order (items and add-on selections embedded)
    pub fn create_order(&self, order: &Order) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            if table.get(order.id.as_str())?.is_some() {
                return Err(StorageError::OrderExists(order.id.clone()));
            }
            let bytes = serde_json::to_vec(order)?;
            table.insert(order.id.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Load an order by id
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Guarded read-modify-write: the single-writer path for order mutation
    ///
    /// Re-reads the order inside the write transaction and rejects with
    /// [`StorageError::StatusConflict`] when its status no longer matches
    /// `expected` - the caller raced another writer and must re-read.
    /// `mutate` runs on the fresh copy; `updated_at` is stamped here.
    pub fn update_order_guarded<F>(
        &self,
        order_id: &str,
        expected: OrderStatus,
        mutate: F,
    ) -> StorageResult<Order>
    where
        F: FnOnce(&mut Order),
    {
        let txn = self.db.begin_write()?;
        let updated = {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            let mut order: Order = match table.get(order_id)? {
                Some(guard) => serde_json::from_slice(guard.value())?,
                None => return Err(StorageError::OrderNotFound(order_id.to_string())),
            };

            if order.status != expected {
                return Err(StorageError::StatusConflict {
                    order_id: order_id.to_string(),
                    expected,
                    actual: order.status,
                });
            }

            mutate(&mut order);
            order.updated_at = shared::util::now_millis();

            let bytes = serde_json::to_vec(&order)?;
            table.insert(order_id, bytes.as_slice())?;
            order
        };
        txn.commit()?;
        Ok(updated)
    }

    /// Role-scoped query: filter, newest-first, page/limit
    ///
    /// Returns the page plus the total match count.
    pub fn query_orders(
        &self,
        filter: &OrderFilter,
        page: usize,
        limit: usize,
    ) -> StorageResult<(Vec<Order>, usize)> {
        let mut matched = self.scan_orders(|o| filter.matches(o))?;
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len();
        let start = page.saturating_sub(1) * limit;
        let orders = matched.into_iter().skip(start).take(limit).collect();
        Ok((orders, total))
    }

    /// All READY_FOR_PICKUP orders with no assigned rider, oldest first
    /// (the backlog sweep works through the longest-waiting orders first)
    pub fn ready_unassigned_orders(&self) -> StorageResult<Vec<Order>> {
        let mut orders = self.scan_orders(|o| {
            o.status == OrderStatus::ReadyForPickup && o.rider_id.is_none()
        })?;
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(orders)
    }

    fn scan_orders<P>(&self, predicate: P) -> StorageResult<Vec<Order>>
    where
        P: Fn(&Order) -> bool,
    {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let order: Order = serde_json::from_slice(value.value())?;
            if predicate(&order) {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    /// Generate the next human-readable order number (crash-safe counter)
    pub fn next_order_number(&self) -> StorageResult<String> {
        let txn = self.db.begin_write()?;
        let count = {
            let mut table = txn.open_table(COUNTERS_TABLE)?;
            let current = table
                .get(ORDER_COUNT_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0);
            let next = current + 1;
            table.insert(ORDER_COUNT_KEY, next)?;
            next
        };
        txn.commit()?;

        let date_str = chrono::Utc::now().format("%Y%m%d").to_string();
        Ok(format!("PEL{}{}", date_str, 10000 + count))
    }

    // ========== Rider Operations ==========

    /// Insert or replace a rider record
    pub fn upsert_rider(&self, rider: &RiderProfile) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(RIDERS_TABLE)?;
            let bytes = serde_json::to_vec(rider)?;
            table.insert(rider.id.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Load a rider by id
    pub fn get_rider(&self, rider_id: &str) -> StorageResult<Option<RiderProfile>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(RIDERS_TABLE)?;
        match table.get(rider_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Flip the availability flag (false while the rider has an active job)
    pub fn set_rider_available(&self, rider_id: &str, available: bool) -> StorageResult<()> {
        self.mutate_rider(rider_id, |r| r.available = available)
    }

    /// Update online flag and optionally the last known location
    pub fn set_rider_online(
        &self,
        rider_id: &str,
        online: bool,
        location: Option<GeoPoint>,
    ) -> StorageResult<()> {
        self.mutate_rider(rider_id, |r| {
            r.online = online;
            if location.is_some() {
                r.location = location;
            }
        })
    }

    fn mutate_rider<F>(&self, rider_id: &str, mutate: F) -> StorageResult<()>
    where
        F: FnOnce(&mut RiderProfile),
    {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(RIDERS_TABLE)?;
            let mut rider: RiderProfile = match table.get(rider_id)? {
                Some(guard) => serde_json::from_slice(guard.value())?,
                None => return Err(StorageError::RiderNotFound(rider_id.to_string())),
            };
            mutate(&mut rider);
            rider.updated_at = shared::util::now_millis();
            let bytes = serde_json::to_vec(&rider)?;
            table.insert(rider_id, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Availability probe: riders that are online, free, and located
    pub fn count_dispatchable_riders(&self) -> StorageResult<usize> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(RIDERS_TABLE)?;
        let mut count = 0;
        for entry in table.iter()? {
            let (_, value) = entry?;
            let rider: RiderProfile = serde_json::from_slice(value.value())?;
            if rider.is_dispatchable() {
                count += 1;
            }
        }
        Ok(count)
    }
}
