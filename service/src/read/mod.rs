//! Read entities definitions.

pub mod playlist;
pub mod video;

use derive_more::{Display, From, Into};

/// Number of entities, computed on read and never persisted.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub struct Count(i32);
