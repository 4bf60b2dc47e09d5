//! Unit of Work pattern implementation.
//!
//! The Unit of Work:
//! - Centralizes access to all stores
//! - Manages database transactions (begin, commit, rollback)
//! - Lets a composite write (parent row, images, relation rows,
//!   singleton child) succeed or fail as one
//!
//! Stores are thin borrowing views over a connection. The same store
//! code runs against the pool for plain reads (`ReadContext`) and
//! against an open transaction for writes (`TransactionContext`).

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, IsolationLevel,
    TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::repositories::{
    AccountStore, AreaStore, EngagementStore, InsightStore, PropertyStore, UserRepository,
    UserStore,
};
use crate::errors::{AppError, AppResult};

/// Boxed body of a transactional closure.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Note: This trait is not mockable directly due to generic methods.
/// Services are tested against SQLite with the real migrations.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Account lookups used by authentication, outside any transaction
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Stores bound to the connection pool, for reads
    fn reader(&self) -> ReadContext<'_>;

    /// Execute a closure within a transaction.
    ///
    /// Committed when the closure returns `Ok`, rolled back otherwise.
    /// Uses ReadCommitted isolation.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;

    /// Execute a closure within a serializable transaction.
    ///
    /// Used for read-then-write aggregate recomputation.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Store access over a borrowed connection or transaction.
pub struct Context<'a, C: ConnectionTrait> {
    conn: &'a C,
}

/// All operations through this context share one database transaction.
pub type TransactionContext<'a> = Context<'a, DatabaseTransaction>;

/// Operations through this context run directly on the pool.
pub type ReadContext<'a> = Context<'a, DatabaseConnection>;

impl<'a, C: ConnectionTrait> Context<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub fn accounts(&self) -> AccountStore<'a, C> {
        AccountStore::new(self.conn)
    }

    pub fn areas(&self) -> AreaStore<'a, C> {
        AreaStore::new(self.conn)
    }

    pub fn properties(&self) -> PropertyStore<'a, C> {
        PropertyStore::new(self.conn)
    }

    pub fn engagement(&self) -> EngagementStore<'a, C> {
        EngagementStore::new(self.conn)
    }

    pub fn insights(&self) -> InsightStore<'a, C> {
        InsightStore::new(self.conn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        Self { db, user_repo }
    }

    /// Internal transaction execution with configurable isolation level
    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = Context::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn reader(&self) -> ReadContext<'_> {
        Context::new(&self.db)
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f).await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f).await
    }
}

/// Run a single-statement body in a ReadCommitted transaction.
///
/// Captured values move into the transaction, as with `transaction`.
///
/// ```ignore
/// let deleted = with_transaction!(self.uow, |tx| tx.areas().delete(id).await)?;
/// ```
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(move |$ctx| Box::pin(async move { $body })).await
    };
}
