//! Repositories.
//!
//! Each repository borrows a connection, so the same code runs against the
//! pool or inside a [`sea_orm::DatabaseTransaction`].

mod friend_request;
mod friendship;
mod participant;
mod participation_request;
mod post;
mod user_block;

pub use friend_request::FriendRequestRepository;
pub use friendship::FriendshipRepository;
pub use participant::ParticipantRepository;
pub use participation_request::ParticipationRequestRepository;
pub use post::PostRepository;
pub use user_block::UserBlockRepository;
