//! # Storage Module
//!
//! Persistence for pets, care events, expenses, necessities, inventory and the
//! user profile.
//!
//! The domain layer talks to storage only through the traits in [`traits`].
//! [`SqliteRepository`] implements all of them against one [`DbConnection`],
//! which is opened once at startup and injected; there is no global handle.
//!
//! ## Guarantees
//!
//! - **Single writer**: the connection pool holds exactly one connection
//! - **Atomic writes**: each store, update and delete is its own transaction
//! - **Cascade**: deleting a pet removes its events, expenses and necessities
//! - **Ordering**: lists come back newest first

pub mod connection;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use connection::DbConnection;
pub use sqlite::SqliteRepository;
pub use traits::{
    CareEventStorage, ExpenseStorage, InventoryStorage, NecessityStorage, PetStorage, UserProfileStorage,
};
