//! Business logic services.

mod guards;

pub mod blocking;
pub mod friendship;
pub mod participation;

pub use blocking::BlockingService;
pub use friendship::{Friend, FriendshipService};
pub use participation::ParticipationService;
