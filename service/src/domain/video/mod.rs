//! [`Video`] definitions.

pub mod reaction;
pub mod view;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

pub use self::{reaction::Reaction, view::View};

/// Video uploaded by a [`User`].
#[derive(Clone, Debug)]
pub struct Video {
    /// ID of this [`Video`].
    pub id: Id,

    /// ID of the [`User`] who uploaded this [`Video`].
    pub owner_id: user::Id,

    /// [`Title`] of this [`Video`].
    pub title: Title,

    /// [`Description`] of this [`Video`], if any.
    pub description: Option<Description>,

    /// [`ThumbnailUrl`] of this [`Video`], if any.
    pub thumbnail_url: Option<ThumbnailUrl>,

    /// [`Visibility`] of this [`Video`].
    pub visibility: Visibility,

    /// [`DateTime`] when this [`Video`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Video`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl Video {
    /// Indicates whether this [`Video`] may be listed to anyone.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// ID of a [`Video`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Title of a [`Video`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

/// Description of a [`Video`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

/// URL of a [`Video`]'s thumbnail image.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ThumbnailUrl(String);

define_kind! {
    #[doc = "Visibility of a [`Video`]."]
    enum Visibility {
        #[doc = "Visible to its owner only."]
        Private = 1,

        #[doc = "Visible to anyone."]
        Public = 2,
    }
}

/// [`DateTime`] when a [`Video`] was created.
pub type CreationDateTime = DateTimeOf<(Video, unit::Creation)>;

/// [`DateTime`] when a [`Video`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Video, unit::Modification)>;
