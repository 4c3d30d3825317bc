//! [`Playlist`] definitions.

pub mod membership;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::{User, Video};

pub use self::membership::Membership;

/// Named collection of [`Video`]s curated by a [`User`].
#[derive(Clone, Debug)]
pub struct Playlist {
    /// ID of this [`Playlist`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Playlist`].
    pub owner_id: user::Id,

    /// [`Name`] of this [`Playlist`].
    pub name: Name,

    /// [`Description`] of this [`Playlist`], if any.
    pub description: Option<Description>,

    /// [`DateTime`] when this [`Playlist`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Playlist`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl Playlist {
    /// Indicates whether this [`Playlist`] is owned by the [`User`] with the
    /// provided ID.
    #[must_use]
    pub fn is_owned_by(&self, user_id: user::Id) -> bool {
        self.owner_id == user_id
    }
}

/// ID of a [`Playlist`].
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

/// Name of a [`Playlist`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Maximum length of a [`Name`] in characters.
    pub const MAX_LEN: usize = 512;

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name
            && !name.is_empty()
            && name.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Description of a [`Playlist`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

/// [`DateTime`] when a [`Playlist`] was created.
pub type CreationDateTime = DateTimeOf<(Playlist, unit::Creation)>;

/// [`DateTime`] when a [`Playlist`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Playlist, unit::Modification)>;

#[cfg(test)]
mod spec {
    use super::Name;

    #[test]
    fn name_is_trimmed_and_bounded() {
        assert!(Name::new("Favourites").is_some());
        assert!(Name::new("Lo-fi & chill 🎧").is_some());
        assert!(Name::new("ä".repeat(Name::MAX_LEN)).is_some());

        assert!(Name::new("").is_none());
        assert!(Name::new(" padded").is_none());
        assert!(Name::new("padded\n").is_none());
        assert!(Name::new("a".repeat(Name::MAX_LEN + 1)).is_none());
    }
}
