//! [`Membership`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};

use crate::domain::{playlist, video};
#[cfg(doc)]
use crate::domain::{Playlist, Video};

/// Inclusion of a [`Video`] into a [`Playlist`].
///
/// Unique per [`Playlist`] and [`Video`] pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Membership {
    /// ID of the [`Playlist`] the [`Video`] is included into.
    pub playlist_id: playlist::Id,

    /// ID of the included [`Video`].
    pub video_id: video::Id,

    /// [`DateTime`] when this [`Membership`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Membership`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl Membership {
    /// Creates a new [`Membership`] of the provided [`Video`] in the provided
    /// [`Playlist`] happening right now.
    #[must_use]
    pub fn new(playlist_id: playlist::Id, video_id: video::Id) -> Self {
        let now = common::DateTime::now();
        Self {
            playlist_id,
            video_id,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }

    /// Returns the [`Key`] identifying this [`Membership`].
    #[must_use]
    pub const fn key(&self) -> Key {
        Key {
            playlist_id: self.playlist_id,
            video_id: self.video_id,
        }
    }
}

/// Unique key of a [`Membership`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    /// ID of the [`Playlist`].
    pub playlist_id: playlist::Id,

    /// ID of the [`Video`].
    pub video_id: video::Id,
}

/// [`DateTime`] when a [`Membership`] was created.
pub type CreationDateTime = DateTimeOf<(Membership, unit::Creation)>;

/// [`DateTime`] when a [`Membership`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Membership, unit::Modification)>;
