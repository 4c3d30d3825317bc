//! [`Video`] read models definitions.

use crate::{
    domain::{User, Video},
    read::Count,
};

/// Statistics of a [`Video`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of [`User`]s who have watched the [`Video`].
    pub views: Count,

    /// Number of like reactions to the [`Video`].
    pub likes: Count,

    /// Number of dislike reactions to the [`Video`].
    pub dislikes: Count,
}

/// [`Video`] as shown in lists: along with its author and [`Stats`].
#[derive(Clone, Debug)]
pub struct Card {
    /// Listed [`Video`].
    pub video: Video,

    /// [`User`] who uploaded the [`Video`].
    pub author: User,

    /// [`Stats`] of the [`Video`].
    pub stats: Stats,
}

impl Card {
    /// Returns the [`in_playlist::Cursor`] pointing to this [`Card`].
    #[must_use]
    pub fn cursor(&self) -> in_playlist::Cursor {
        in_playlist::Cursor::new(self.video.updated_at, self.video.id)
    }
}

pub mod in_playlist {
    //! [`Video`]s of a [`Playlist`] list definitions.
    //!
    //! [`Playlist`]: crate::domain::Playlist
    //! [`Video`]: crate::domain::Video

    use common::define_pagination;

    use crate::domain::{playlist, video};

    define_pagination!(video::ModificationDateTime, video::Id);

    /// Node in a [`Page`].
    pub type Node = super::Card;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`Playlist`] to list public [`Video`]s of.
        ///
        /// [`Playlist`]: crate::domain::Playlist
        /// [`Video`]: crate::domain::Video
        pub playlist_id: playlist::Id,
    }
}

pub mod history {
    //! Watch history list definitions.

    use common::define_pagination;

    use crate::domain::{user, video};

    define_pagination!(video::view::ModificationDateTime, video::Id);

    /// [`super::Card`] watched by a [`User`].
    ///
    /// [`User`]: crate::domain::User
    #[derive(Clone, Debug)]
    pub struct Node {
        /// Watched [`super::Card`].
        pub card: super::Card,

        /// When the [`User`] watched the [`super::Card`] for the last time.
        ///
        /// [`User`]: crate::domain::User
        pub viewed_at: video::view::ModificationDateTime,
    }

    impl Node {
        /// Returns the [`Cursor`] pointing to this [`Node`].
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            Cursor::new(self.viewed_at, self.card.video.id)
        }
    }

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`User`] whose history is listed.
        ///
        /// [`User`]: crate::domain::User
        pub viewer_id: user::Id,
    }
}

pub mod liked {
    //! Liked videos list definitions.

    use common::define_pagination;

    use crate::domain::{user, video};

    define_pagination!(video::reaction::ModificationDateTime, video::Id);

    /// [`super::Card`] liked by a [`User`].
    ///
    /// [`User`]: crate::domain::User
    #[derive(Clone, Debug)]
    pub struct Node {
        /// Liked [`super::Card`].
        pub card: super::Card,

        /// When the [`User`] liked the [`super::Card`].
        ///
        /// [`User`]: crate::domain::User
        pub liked_at: video::reaction::ModificationDateTime,
    }

    impl Node {
        /// Returns the [`Cursor`] pointing to this [`Node`].
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            Cursor::new(self.liked_at, self.card.video.id)
        }
    }

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`User`] whose likes are listed.
        ///
        /// [`User`]: crate::domain::User
        pub user_id: user::Id,
    }
}
