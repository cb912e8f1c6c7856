//! Relationship engine.

use std::sync::Arc;

use crate::ledger::LedgerStore;
use crate::services::{BlockingService, FriendshipService, ParticipationService};

/// Entry point for every relationship and participation operation.
///
/// The engine holds no state of its own; all services share one store.
pub struct RelationshipEngine<S> {
    blocking: BlockingService<S>,
    friendships: FriendshipService<S>,
    participation: ParticipationService<S>,
}

impl<S> Clone for RelationshipEngine<S> {
    fn clone(&self) -> Self {
        Self {
            blocking: self.blocking.clone(),
            friendships: self.friendships.clone(),
            participation: self.participation.clone(),
        }
    }
}

impl<S: LedgerStore> RelationshipEngine<S> {
    /// Build the engine over a ledger store.
    #[must_use]
    pub fn new(store: S) -> Self {
        let store = Arc::new(store);
        let blocking = BlockingService::new(Arc::clone(&store));
        Self {
            friendships: FriendshipService::new(Arc::clone(&store), blocking.clone()),
            participation: ParticipationService::new(store),
            blocking,
        }
    }

    /// Block ledger operations.
    #[must_use]
    pub const fn blocking(&self) -> &BlockingService<S> {
        &self.blocking
    }

    /// Friend request and friendship operations.
    #[must_use]
    pub const fn friendships(&self) -> &FriendshipService<S> {
        &self.friendships
    }

    /// Trip participation operations.
    #[must_use]
    pub const fn participation(&self) -> &ParticipationService<S> {
        &self.participation
    }
}
