//! [`Playlist`] read models definitions.

use crate::{
    domain::{video, Playlist, User},
    read::Count,
};
#[cfg(doc)]
use crate::domain::Video;

/// [`Playlist`] as shown in its owner's library.
#[derive(Clone, Debug)]
pub struct Summary {
    /// Summarized [`Playlist`].
    pub playlist: Playlist,

    /// [`User`] owning the [`Playlist`].
    pub owner: User,

    /// Number of [`Video`]s in the [`Playlist`].
    pub video_count: Count,

    /// Thumbnail of the [`Video`] most recently added to the [`Playlist`].
    ///
    /// [`None`] if the [`Playlist`] is empty or that [`Video`] has no
    /// thumbnail.
    pub thumbnail_url: Option<video::ThumbnailUrl>,
}

impl Summary {
    /// Returns the [`list::Cursor`] pointing to this [`Summary`].
    #[must_use]
    pub fn cursor(&self) -> list::Cursor {
        list::Cursor::new(self.playlist.updated_at, self.playlist.id)
    }
}

/// [`Playlist`] offered as a destination for a [`Video`].
#[derive(Clone, Debug)]
pub struct Candidate {
    /// Offered [`Playlist`].
    pub playlist: Playlist,

    /// Number of [`Video`]s in the [`Playlist`].
    pub video_count: Count,

    /// Indicator whether the [`Playlist`] already contains the [`Video`].
    pub contains_video: bool,
}

impl Candidate {
    /// Returns the [`for_video::Cursor`] pointing to this [`Candidate`].
    #[must_use]
    pub fn cursor(&self) -> for_video::Cursor {
        for_video::Cursor::new(self.playlist.updated_at, self.playlist.id)
    }
}

pub mod list {
    //! [`Summary`]s list definitions.
    //!
    //! [`Summary`]: super::Summary

    use common::define_pagination;

    use crate::domain::{playlist, user};

    define_pagination!(playlist::ModificationDateTime, playlist::Id);

    /// Node in a [`Page`].
    pub type Node = super::Summary;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`User`] owning the listed playlists.
        ///
        /// [`User`]: crate::domain::User
        pub owner_id: user::Id,
    }
}

pub mod for_video {
    //! [`Candidate`]s list definitions.
    //!
    //! [`Candidate`]: super::Candidate

    use common::define_pagination;

    use crate::domain::{playlist, user, video};

    define_pagination!(playlist::ModificationDateTime, playlist::Id);

    /// Node in a [`Page`].
    pub type Node = super::Candidate;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`User`] owning the listed playlists.
        ///
        /// [`User`]: crate::domain::User
        pub owner_id: user::Id,

        /// ID of the [`Video`] to check containment of.
        ///
        /// If [`None`], no [`Candidate`] contains it.
        ///
        /// [`Candidate`]: super::Candidate
        /// [`Video`]: crate::domain::Video
        pub video_id: Option<video::Id>,
    }
}
