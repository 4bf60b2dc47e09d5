//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and stores
//! - Blob storage for uploaded media
//! - Unit of Work for transaction management

pub mod blob_store;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use blob_store::{store_all, BlobStore, LocalBlobStore, Upload};
pub use db::{Database, Migrator};
pub use repositories::{NewAccount, UserRepository, UserStore};
pub use unit_of_work::{
    Context, Persistence, ReadContext, TransactionContext, TxFuture, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use blob_store::MockBlobStore;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
