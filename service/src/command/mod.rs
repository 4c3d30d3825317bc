//! [`Command`] definition.

pub mod add_playlist_video;
pub mod authorize_user_session;
pub mod create_playlist;
pub mod delete_playlist;
pub mod remove_playlist_video;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_playlist_video::AddPlaylistVideo,
    authorize_user_session::AuthorizeUserSession,
    create_playlist::CreatePlaylist, delete_playlist::DeletePlaylist,
    remove_playlist_video::RemovePlaylistVideo,
};
