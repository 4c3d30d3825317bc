//! [`Video`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, read};
use uuid::Uuid;

use crate::{api, Context};

/// A [`Video`] as listed, along with its author and statistics.
#[derive(Clone, Debug, From)]
pub struct Video(read::video::Card);

/// A `Video` as listed, along with its author and statistics.
#[graphql_object(context = Context)]
impl Video {
    /// Unique identifier of this `Video`.
    pub fn id(&self) -> Id {
        self.0.video.id.into()
    }

    /// Title of this `Video`.
    pub fn title(&self) -> &str {
        self.0.video.title.as_ref()
    }

    /// Description of this `Video`, if any.
    pub fn description(&self) -> Option<&str> {
        self.0.video.description.as_ref().map(AsRef::as_ref)
    }

    /// URL of this `Video`'s thumbnail, if any.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.0.video.thumbnail_url.as_ref().map(AsRef::as_ref)
    }

    /// Visibility of this `Video`.
    pub fn visibility(&self) -> Visibility {
        self.0.video.visibility.into()
    }

    /// `User` who uploaded this `Video`.
    pub fn author(&self) -> api::User {
        self.0.author.clone().into()
    }

    /// Number of `User`s who have watched this `Video`.
    pub fn view_count(&self) -> i32 {
        self.0.stats.views.into()
    }

    /// Number of likes of this `Video`.
    pub fn like_count(&self) -> i32 {
        self.0.stats.likes.into()
    }

    /// Number of dislikes of this `Video`.
    pub fn dislike_count(&self) -> i32 {
        self.0.stats.dislikes.into()
    }

    /// `DateTime` when this `Video` was uploaded.
    pub fn created_at(&self) -> DateTime {
        self.0.video.created_at.coerce()
    }

    /// `DateTime` when this `Video` was last modified.
    pub fn updated_at(&self) -> DateTime {
        self.0.video.updated_at.coerce()
    }
}

/// Unique identifier of a `Video`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::video::Id)]
#[into(domain::video::Id)]
#[graphql(name = "VideoId", transparent)]
pub struct Id(Uuid);

/// Visibility of a `Video`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "VideoVisibility")]
pub enum Visibility {
    /// Visible to its owner only.
    Private,

    /// Visible to anyone.
    Public,
}

impl From<domain::video::Visibility> for Visibility {
    fn from(visibility: domain::video::Visibility) -> Self {
        use domain::video::Visibility as V;

        match visibility {
            V::Private => Self::Private,
            V::Public => Self::Public,
        }
    }
}

pub mod in_playlist {
    //! Definitions related to a list of [`Video`]s in a playlist.

    use juniper::GraphQLObject;
    use service::read;

    use crate::{api, Context, Error};

    use super::Video;

    /// Page of the public `Video`s in a `Playlist`.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "PlaylistVideoPage")]
    pub struct Page {
        /// `Video`s of this page, most recently modified first.
        pub items: Vec<Video>,

        /// Cursor to request the next page with, if there is one.
        pub next_cursor: Option<api::Cursor>,
    }

    impl TryFrom<read::video::in_playlist::Page> for Page {
        type Error = Error;

        fn try_from(
            page: read::video::in_playlist::Page,
        ) -> Result<Self, Self::Error> {
            Ok(Self {
                next_cursor: page
                    .next_cursor
                    .as_ref()
                    .map(api::Cursor::encode)
                    .transpose()?,
                items: page.items.into_iter().map(Into::into).collect(),
            })
        }
    }
}

pub mod history {
    //! Definitions related to a watch history.

    use common::DateTime;
    use juniper::GraphQLObject;
    use service::read;

    use crate::{api, Context, Error};

    use super::Video;

    /// `Video` watched by the authenticated `User`.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "WatchedVideo")]
    pub struct Node {
        /// Watched `Video`.
        pub video: Video,

        /// `DateTime` when the `Video` was watched last time.
        pub viewed_at: DateTime,
    }

    /// Page of the watch history.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "WatchedVideoPage")]
    pub struct Page {
        /// `WatchedVideo`s of this page, most recently watched first.
        pub items: Vec<Node>,

        /// Cursor to request the next page with, if there is one.
        pub next_cursor: Option<api::Cursor>,
    }

    impl TryFrom<read::video::history::Page> for Page {
        type Error = Error;

        fn try_from(
            page: read::video::history::Page,
        ) -> Result<Self, Self::Error> {
            Ok(Self {
                next_cursor: page
                    .next_cursor
                    .as_ref()
                    .map(api::Cursor::encode)
                    .transpose()?,
                items: page
                    .items
                    .into_iter()
                    .map(|n| Node {
                        video: n.card.into(),
                        viewed_at: n.viewed_at.coerce(),
                    })
                    .collect(),
            })
        }
    }
}

pub mod liked {
    //! Definitions related to a list of liked [`Video`]s.

    use common::DateTime;
    use juniper::GraphQLObject;
    use service::read;

    use crate::{api, Context, Error};

    use super::Video;

    /// `Video` liked by the authenticated `User`.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "LikedVideo")]
    pub struct Node {
        /// Liked `Video`.
        pub video: Video,

        /// `DateTime` when the `Video` was liked.
        pub liked_at: DateTime,
    }

    /// Page of the liked `Video`s.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "LikedVideoPage")]
    pub struct Page {
        /// `LikedVideo`s of this page, most recently liked first.
        pub items: Vec<Node>,

        /// Cursor to request the next page with, if there is one.
        pub next_cursor: Option<api::Cursor>,
    }

    impl TryFrom<read::video::liked::Page> for Page {
        type Error = Error;

        fn try_from(
            page: read::video::liked::Page,
        ) -> Result<Self, Self::Error> {
            Ok(Self {
                next_cursor: page
                    .next_cursor
                    .as_ref()
                    .map(api::Cursor::encode)
                    .transpose()?,
                items: page
                    .items
                    .into_iter()
                    .map(|n| Node {
                        video: n.card.into(),
                        liked_at: n.liked_at.coerce(),
                    })
                    .collect(),
            })
        }
    }
}
