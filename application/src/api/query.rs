//! GraphQL [`Query`]s definitions.

use common::pagination::Arguments;
use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Playlist` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PLAYLIST_NOT_EXISTS` - the `Playlist` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "playlist",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn playlist(
        id: api::playlist::Id,
        ctx: &Context,
    ) -> Result<api::Playlist, Error> {
        ctx.service()
            .execute(query::playlist::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::playlist::PlaylistError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Playlist`s owned by the authenticated `User`,
    /// most recently modified first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `INVALID_LIMIT` - the `limit` is out of `1..=100` range;
    /// - `INVALID_CURSOR` - the `after` cursor is malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            gql.name = "playlists",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn playlists(
        limit: Option<i32>,
        after: Option<api::Cursor>,
        ctx: &Context,
    ) -> Result<api::playlist::list::Page, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let arguments = Arguments::new(
            api::limit(limit, ctx).map_err(ctx.error())?,
            after
                .as_ref()
                .map(api::Cursor::decode)
                .transpose()
                .map_err(ctx.error())?,
        );

        ctx.service()
            .execute(query::playlists::List::by(
                read::playlist::list::Selector {
                    arguments,
                    filter: read::playlist::list::Filter {
                        owner_id: my_id.into(),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .try_into()
            .map_err(ctx.error())
    }

    /// Fetches the page of `Playlist`s owned by the authenticated `User` to
    /// pick a destination for the `Video` with the specified ID, most
    /// recently modified first.
    ///
    /// No `Playlist` is marked as containing the `Video`, if `videoId` is
    /// omitted.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `INVALID_LIMIT` - the `limit` is out of `1..=100` range;
    /// - `INVALID_CURSOR` - the `after` cursor is malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            gql.name = "playlistsForVideo",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
            video_id = ?video_id,
        ),
    )]
    pub async fn playlists_for_video(
        video_id: Option<api::video::Id>,
        limit: Option<i32>,
        after: Option<api::Cursor>,
        ctx: &Context,
    ) -> Result<api::playlist::for_video::Page, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let arguments = Arguments::new(
            api::limit(limit, ctx).map_err(ctx.error())?,
            after
                .as_ref()
                .map(api::Cursor::decode)
                .transpose()
                .map_err(ctx.error())?,
        );

        ctx.service()
            .execute(query::playlists::ForVideo::by(
                read::playlist::for_video::Selector {
                    arguments,
                    filter: read::playlist::for_video::Filter {
                        owner_id: my_id.into(),
                        video_id: video_id.map(Into::into),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .try_into()
            .map_err(ctx.error())
    }

    /// Fetches the page of public `Video`s in the `Playlist` with the
    /// specified ID, most recently modified first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_LIMIT` - the `limit` is out of `1..=100` range;
    /// - `INVALID_CURSOR` - the `after` cursor is malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            gql.name = "playlistVideos",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
            playlist_id = %playlist_id,
        ),
    )]
    pub async fn playlist_videos(
        playlist_id: api::playlist::Id,
        limit: Option<i32>,
        after: Option<api::Cursor>,
        ctx: &Context,
    ) -> Result<api::video::in_playlist::Page, Error> {
        let arguments = Arguments::new(
            api::limit(limit, ctx).map_err(ctx.error())?,
            after
                .as_ref()
                .map(api::Cursor::decode)
                .transpose()
                .map_err(ctx.error())?,
        );

        ctx.service()
            .execute(query::videos::InPlaylist::by(
                read::video::in_playlist::Selector {
                    arguments,
                    filter: read::video::in_playlist::Filter {
                        playlist_id: playlist_id.into(),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .try_into()
            .map_err(ctx.error())
    }

    /// Fetches the page of public `Video`s watched by the authenticated
    /// `User`, most recently watched first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `INVALID_LIMIT` - the `limit` is out of `1..=100` range;
    /// - `INVALID_CURSOR` - the `after` cursor is malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            gql.name = "watchHistory",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn watch_history(
        limit: Option<i32>,
        after: Option<api::Cursor>,
        ctx: &Context,
    ) -> Result<api::video::history::Page, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let arguments = Arguments::new(
            api::limit(limit, ctx).map_err(ctx.error())?,
            after
                .as_ref()
                .map(api::Cursor::decode)
                .transpose()
                .map_err(ctx.error())?,
        );

        ctx.service()
            .execute(query::videos::History::by(
                read::video::history::Selector {
                    arguments,
                    filter: read::video::history::Filter {
                        viewer_id: my_id.into(),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .try_into()
            .map_err(ctx.error())
    }

    /// Fetches the page of public `Video`s liked by the authenticated
    /// `User`, most recently liked first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `INVALID_LIMIT` - the `limit` is out of `1..=100` range;
    /// - `INVALID_CURSOR` - the `after` cursor is malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            gql.name = "likedVideos",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn liked_videos(
        limit: Option<i32>,
        after: Option<api::Cursor>,
        ctx: &Context,
    ) -> Result<api::video::liked::Page, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let arguments = Arguments::new(
            api::limit(limit, ctx).map_err(ctx.error())?,
            after
                .as_ref()
                .map(api::Cursor::decode)
                .transpose()
                .map_err(ctx.error())?,
        );

        ctx.service()
            .execute(query::videos::Liked::by(read::video::liked::Selector {
                arguments,
                filter: read::video::liked::Filter {
                    user_id: my_id.into(),
                },
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .try_into()
            .map_err(ctx.error())
    }
}
