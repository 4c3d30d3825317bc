//! [`View`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};

use crate::domain::{user, video};
#[cfg(doc)]
use crate::domain::{User, Video};

/// Fact of a [`User`] watching a [`Video`].
///
/// There is at most one [`View`] per [`User`] and [`Video`]: watching the
/// [`Video`] again only bumps its [`View::updated_at`].
#[derive(Clone, Copy, Debug)]
pub struct View {
    /// ID of the [`User`] who watched the [`Video`].
    pub user_id: user::Id,

    /// ID of the watched [`Video`].
    pub video_id: video::Id,

    /// [`DateTime`] when the [`Video`] was watched for the first time.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when the [`Video`] was watched for the last time.
    pub updated_at: ModificationDateTime,
}

/// [`DateTime`] when a [`View`] was created.
pub type CreationDateTime = DateTimeOf<(View, unit::Creation)>;

/// [`DateTime`] when a [`View`] was last modified.
pub type ModificationDateTime = DateTimeOf<(View, unit::Modification)>;
