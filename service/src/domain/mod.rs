//! Domain definitions.

pub mod playlist;
pub mod user;
pub mod video;

pub use self::{playlist::Playlist, user::User, video::Video};
