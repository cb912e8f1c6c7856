//! Database entities.

pub mod friend_request;
pub mod friendship;
pub mod participant;
pub mod participation_request;
pub mod post;
pub mod user_block;

pub use friend_request::Entity as FriendRequest;
pub use friendship::Entity as Friendship;
pub use participant::Entity as Participant;
pub use participation_request::Entity as ParticipationRequest;
pub use post::Entity as Post;
pub use user_block::Entity as UserBlock;
