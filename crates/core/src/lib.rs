//! Core business logic for tobaeki.
//!
//! The [`RelationshipEngine`] owns the rules between users and trip posts:
//! blocks, friend requests, friendships, participation requests and
//! participants. It reads and writes the ledgers through a [`LedgerStore`],
//! one transaction per operation.

pub mod engine;
pub mod ledger;
pub mod services;

pub use engine::RelationshipEngine;
pub use ledger::{DatabaseStore, LedgerStore, LedgerTxn, MemoryStore, Page};
pub use services::*;
