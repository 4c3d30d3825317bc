//! [`Reaction`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};

use crate::domain::{user, video};
#[cfg(doc)]
use crate::domain::{User, Video};

/// Reaction of a [`User`] to a [`Video`].
#[derive(Clone, Copy, Debug)]
pub struct Reaction {
    /// ID of the reacting [`User`].
    pub user_id: user::Id,

    /// ID of the [`Video`] being reacted to.
    pub video_id: video::Id,

    /// [`Kind`] of this [`Reaction`].
    pub kind: Kind,

    /// [`DateTime`] when this [`Reaction`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Reaction`] was last modified.
    pub updated_at: ModificationDateTime,
}

define_kind! {
    #[doc = "Kind of a [`Reaction`]."]
    enum Kind {
        #[doc = "[`Video`] is liked."]
        Like = 1,

        #[doc = "[`Video`] is disliked."]
        Dislike = 2,
    }
}

/// [`DateTime`] when a [`Reaction`] was created.
pub type CreationDateTime = DateTimeOf<(Reaction, unit::Creation)>;

/// [`DateTime`] when a [`Reaction`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Reaction, unit::Modification)>;
