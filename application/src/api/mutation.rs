//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, Command as _};

use crate::{
    api::{self, playlist::PlaylistError},
    AsError, Context, Error,
};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `Playlist` owned by the authenticated `User`.
    ///
    /// Surrounding whitespace of the `name` is ignored.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `INVALID_PLAYLIST_NAME` - the `name` is empty or too long.
    #[tracing::instrument(
        skip_all,
        fields(
            description = ?description,
            gql.name = "createPlaylist",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_playlist(
        name: String,
        description: Option<String>,
        ctx: &Context,
    ) -> Result<api::Playlist, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let name = api::playlist::name(&name)
            .map_err(Into::into)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreatePlaylist {
                owner_id: my_id.into(),
                name,
                description: description
                    .filter(|d| !d.trim().is_empty())
                    .map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Playlist` with the specified ID along with all its
    /// `PlaylistMembership`s.
    ///
    /// Returns the deleted `Playlist`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `PLAYLIST_NOT_EXISTS` - the `Playlist` does not exist;
    /// - `PLAYLIST_NOT_OWNED` - the `Playlist` is owned by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deletePlaylist",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_playlist(
        id: api::playlist::Id,
        ctx: &Context,
    ) -> Result<api::Playlist, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeletePlaylist {
                playlist_id: id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Adds the `Video` with the specified ID to the `Playlist` with the
    /// specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `PLAYLIST_NOT_EXISTS` - the `Playlist` does not exist;
    /// - `PLAYLIST_NOT_OWNED` - the `Playlist` is owned by another `User`;
    /// - `VIDEO_NOT_EXISTS` - the `Video` does not exist;
    /// - `VIDEO_ALREADY_IN_PLAYLIST` - the `Video` is in the `Playlist`
    ///                                 already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "addPlaylistVideo",
            otel.name = Self::SPAN_NAME,
            playlist_id = %playlist_id,
            video_id = %video_id,
        ),
    )]
    pub async fn add_playlist_video(
        playlist_id: api::playlist::Id,
        video_id: api::video::Id,
        ctx: &Context,
    ) -> Result<api::playlist::Membership, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::AddPlaylistVideo {
                playlist_id: playlist_id.into(),
                video_id: video_id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Removes the `Video` with the specified ID from the `Playlist` with the
    /// specified ID.
    ///
    /// Returns the removed `PlaylistMembership`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `PLAYLIST_NOT_EXISTS` - the `Playlist` does not exist;
    /// - `PLAYLIST_NOT_OWNED` - the `Playlist` is owned by another `User`;
    /// - `VIDEO_NOT_EXISTS` - the `Video` does not exist;
    /// - `VIDEO_NOT_IN_PLAYLIST` - the `Video` is not in the `Playlist`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "removePlaylistVideo",
            otel.name = Self::SPAN_NAME,
            playlist_id = %playlist_id,
            video_id = %video_id,
        ),
    )]
    pub async fn remove_playlist_video(
        playlist_id: api::playlist::Id,
        video_id: api::video::Id,
        ctx: &Context,
    ) -> Result<api::playlist::Membership, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::RemovePlaylistVideo {
                playlist_id: playlist_id.into(),
                video_id: video_id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::delete_playlist::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PlaylistNotExists(_) => Some(PlaylistError::NotExists.into()),
            Self::PlaylistNotOwned(_) => Some(PlaylistError::NotOwned.into()),
        }
    }
}

impl AsError for command::add_playlist_video::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PlaylistNotExists(_) => Some(PlaylistError::NotExists.into()),
            Self::PlaylistNotOwned(_) => Some(PlaylistError::NotOwned.into()),
            Self::VideoNotExists(_) => {
                Some(PlaylistError::VideoNotExists.into())
            }
            Self::VideoAlreadyInPlaylist(_) => {
                Some(PlaylistError::VideoAlreadyIn.into())
            }
        }
    }
}

impl AsError for command::remove_playlist_video::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PlaylistNotExists(_) => Some(PlaylistError::NotExists.into()),
            Self::PlaylistNotOwned(_) => Some(PlaylistError::NotOwned.into()),
            Self::VideoNotExists(_) => {
                Some(PlaylistError::VideoNotExists.into())
            }
            Self::VideoNotInPlaylist(_) => {
                Some(PlaylistError::VideoNotIn.into())
            }
        }
    }
}
