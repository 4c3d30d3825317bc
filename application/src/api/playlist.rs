//! [`Playlist`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLObject, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, define_error, Context};

/// A [`Playlist`] of `Video`s curated by a [`api::User`].
#[derive(Clone, Debug)]
pub struct Playlist {
    /// [`domain::Playlist`] representing this [`Playlist`].
    playlist: domain::Playlist,

    /// [`api::User`] owning this [`Playlist`].
    owner: api::User,
}

impl From<domain::Playlist> for Playlist {
    fn from(playlist: domain::Playlist) -> Self {
        // Playlist references its owner with a foreign key.
        #[expect(unsafe_code, reason = "owner always exists")]
        let owner = unsafe { api::User::new_unchecked(playlist.owner_id) };
        Self { playlist, owner }
    }
}

impl From<(domain::Playlist, domain::User)> for Playlist {
    fn from((playlist, owner): (domain::Playlist, domain::User)) -> Self {
        Self {
            playlist,
            owner: owner.into(),
        }
    }
}

/// A `Playlist` of `Video`s curated by a `User`.
#[graphql_object(context = Context)]
impl Playlist {
    /// Unique identifier of this `Playlist`.
    pub fn id(&self) -> Id {
        self.playlist.id.into()
    }

    /// Name of this `Playlist`.
    pub fn name(&self) -> &str {
        self.playlist.name.as_ref()
    }

    /// Description of this `Playlist`, if any.
    pub fn description(&self) -> Option<&str> {
        self.playlist.description.as_ref().map(AsRef::as_ref)
    }

    /// `User` owning this `Playlist`.
    pub fn owner(&self) -> api::User {
        self.owner.clone()
    }

    /// `DateTime` when this `Playlist` was created.
    pub fn created_at(&self) -> DateTime {
        self.playlist.created_at.coerce()
    }

    /// `DateTime` when this `Playlist` was last modified.
    pub fn updated_at(&self) -> DateTime {
        self.playlist.updated_at.coerce()
    }
}

/// Unique identifier of a `Playlist`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::playlist::Id)]
#[into(domain::playlist::Id)]
#[graphql(name = "PlaylistId", transparent)]
pub struct Id(Uuid);

/// Inclusion of a `Video` into a `Playlist`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context, name = "PlaylistMembership")]
pub struct Membership {
    /// ID of the `Playlist` the `Video` is included into.
    pub playlist_id: Id,

    /// ID of the included `Video`.
    pub video_id: api::video::Id,

    /// `DateTime` when the `Video` was included.
    pub created_at: DateTime,

    /// `DateTime` when the inclusion was last modified.
    pub updated_at: DateTime,
}

impl From<domain::playlist::Membership> for Membership {
    fn from(membership: domain::playlist::Membership) -> Self {
        Self {
            playlist_id: membership.playlist_id.into(),
            video_id: membership.video_id.into(),
            created_at: membership.created_at.coerce(),
            updated_at: membership.updated_at.coerce(),
        }
    }
}

pub mod list {
    //! Definitions related to a `Playlist`s library.

    use juniper::GraphQLObject;
    use service::read;

    use crate::{api, Context, Error};

    use super::Playlist;

    /// `Playlist` as shown in its owner's library.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "PlaylistSummary")]
    pub struct Node {
        /// Summarized `Playlist`.
        pub playlist: Playlist,

        /// Number of `Video`s in the `Playlist`.
        pub video_count: i32,

        /// Thumbnail of the `Video` most recently added to the `Playlist`.
        pub thumbnail_url: Option<String>,
    }

    impl From<read::playlist::Summary> for Node {
        fn from(summary: read::playlist::Summary) -> Self {
            let read::playlist::Summary {
                playlist,
                owner,
                video_count,
                thumbnail_url,
            } = summary;
            Self {
                playlist: (playlist, owner).into(),
                video_count: video_count.into(),
                thumbnail_url: thumbnail_url.map(|url| url.to_string()),
            }
        }
    }

    /// Page of the `Playlist`s owned by the authenticated `User`.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "PlaylistSummaryPage")]
    pub struct Page {
        /// `PlaylistSummary`s of this page, most recently modified first.
        pub items: Vec<Node>,

        /// Cursor to request the next page with, if there is one.
        pub next_cursor: Option<api::Cursor>,
    }

    impl TryFrom<read::playlist::list::Page> for Page {
        type Error = Error;

        fn try_from(
            page: read::playlist::list::Page,
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

pub mod for_video {
    //! Definitions related to `Playlist`s offered as destinations for a
    //! `Video`.

    use juniper::GraphQLObject;
    use service::read;

    use crate::{api, Context, Error};

    use super::Playlist;

    /// `Playlist` offered as a destination for a `Video`.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "PlaylistCandidate")]
    pub struct Node {
        /// Offered `Playlist`.
        pub playlist: Playlist,

        /// Number of `Video`s in the `Playlist`.
        pub video_count: i32,

        /// Indicator whether the `Playlist` already contains the `Video`.
        pub contains_video: bool,
    }

    impl From<read::playlist::Candidate> for Node {
        fn from(candidate: read::playlist::Candidate) -> Self {
            Self {
                playlist: candidate.playlist.into(),
                video_count: candidate.video_count.into(),
                contains_video: candidate.contains_video,
            }
        }
    }

    /// Page of the `PlaylistCandidate`s.
    #[derive(Clone, Debug, GraphQLObject)]
    #[graphql(context = Context, name = "PlaylistCandidatePage")]
    pub struct Page {
        /// `PlaylistCandidate`s of this page, most recently modified first.
        pub items: Vec<Node>,

        /// Cursor to request the next page with, if there is one.
        pub next_cursor: Option<api::Cursor>,
    }

    impl TryFrom<read::playlist::for_video::Page> for Page {
        type Error = Error;

        fn try_from(
            page: read::playlist::for_video::Page,
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

/// Resolves the provided `name` into a [`domain::playlist::Name`].
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// With `INVALID_PLAYLIST_NAME` code, if the `name` is empty or too long.
pub fn name(name: &str) -> Result<domain::playlist::Name, PlaylistError> {
    domain::playlist::Name::new(name.trim())
        .ok_or(PlaylistError::InvalidName)
}

define_error! {
    enum PlaylistError {
        #[code = "PLAYLIST_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Playlist` with the specified ID does not exist"]
        NotExists,

        #[code = "PLAYLIST_NOT_OWNED"]
        #[status = FORBIDDEN]
        #[message = "`Playlist` is not owned by the authenticated `User`"]
        NotOwned,

        #[code = "INVALID_PLAYLIST_NAME"]
        #[status = BAD_REQUEST]
        #[message = "`Playlist` name must be non-empty and at most 512 \
                     characters long"]
        InvalidName,

        #[code = "VIDEO_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Video` with the specified ID does not exist"]
        VideoNotExists,

        #[code = "VIDEO_ALREADY_IN_PLAYLIST"]
        #[status = CONFLICT]
        #[message = "`Video` is already in the `Playlist`"]
        VideoAlreadyIn,

        #[code = "VIDEO_NOT_IN_PLAYLIST"]
        #[status = CONFLICT]
        #[message = "`Video` is not in the `Playlist`"]
        VideoNotIn,
    }
}

#[cfg(test)]
mod spec {
    use super::{name, PlaylistError};

    #[test]
    fn trims_playlist_name() {
        assert_eq!(name("  Road trip \n").unwrap().to_string(), "Road trip");
        assert!(matches!(name(" \t "), Err(PlaylistError::InvalidName)));
        assert!(matches!(
            name(&"x".repeat(513)),
            Err(PlaylistError::InvalidName),
        ));
    }
}
