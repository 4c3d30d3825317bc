//! In-memory [`Database`] implementation.
//!
//! Mirrors the semantics of the [`Postgres`] implementation (including the
//! uniqueness of [`Membership`]s and the cascading removal of a [`Playlist`]'s
//! [`Membership`]s) without any external storage.
//!
//! [`Postgres`]: super::Postgres

use std::{
    cmp::Reverse,
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use common::{
    operations::{By, Delete, Insert, Select},
    pagination::{Arguments, Page},
    Keyset,
};
use derive_more::{Display, Error as StdError};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracerr::Traced;

use crate::{
    domain::{
        playlist::{self, membership, Membership},
        user,
        video::{self, reaction, Reaction, View},
        Playlist, User, Video,
    },
    infra::{database, Database},
    read::{self, Count},
};

/// Name of the constraint keeping [`Membership`]s unique.
const MEMBERSHIP_KEY_CONSTRAINT: &str = "playlist_videos_pkey";

/// In-memory [`Database`].
///
/// Clones share the same underlying storage.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored entities.
    storage: Arc<RwLock<Storage>>,

    /// Indicator whether this [`Memory`] pretends to be unreachable.
    unavailable: Arc<AtomicBool>,
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following operation on this [`Memory`] fail with
    /// [`Error::Unavailable`], or stop failing.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Ensures this [`Memory`] is reachable.
    fn ensure_available(&self) -> Result<(), Traced<database::Error>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(tracerr::new!(database::Error::from(
                Error::Unavailable
            )));
        }
        Ok(())
    }

    /// Acquires the [`Storage`] for reading.
    async fn read(
        &self,
    ) -> Result<RwLockReadGuard<'_, Storage>, Traced<database::Error>> {
        self.ensure_available().map_err(tracerr::wrap!())?;
        Ok(self.storage.read().await)
    }

    /// Acquires the [`Storage`] for writing.
    async fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, Storage>, Traced<database::Error>> {
        self.ensure_available().map_err(tracerr::wrap!())?;
        Ok(self.storage.write().await)
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Storage is unreachable.
    #[display("storage is unavailable")]
    Unavailable,

    /// Inserted entity violates a uniqueness constraint.
    #[display("unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(c) => constraint.map_or(true, |n| n == *c),
            Self::Unavailable => false,
        }
    }

    /// Checks if the error is caused by the storage being unreachable.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// Entities stored in a [`Memory`] database.
#[derive(Debug, Default)]
struct Storage {
    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,

    /// Stored [`Video`]s.
    videos: HashMap<video::Id, Video>,

    /// Stored [`View`]s, one per [`User`] and [`Video`].
    views: HashMap<(user::Id, video::Id), View>,

    /// Stored [`Reaction`]s, one per [`User`] and [`Video`].
    reactions: HashMap<(user::Id, video::Id), Reaction>,

    /// Stored [`Playlist`]s.
    playlists: HashMap<playlist::Id, Playlist>,

    /// Stored [`Membership`]s.
    memberships: HashMap<membership::Key, Membership>,
}

impl Storage {
    /// Computes [`read::video::Stats`] of the [`Video`] with the provided ID.
    fn stats(&self, video_id: video::Id) -> read::video::Stats {
        let reactions = |kind: reaction::Kind| {
            count(self.reactions.values().filter(|r| {
                r.video_id == video_id && r.kind == kind
            }))
        };

        read::video::Stats {
            views: count(
                self.views.values().filter(|v| v.video_id == video_id),
            ),
            likes: reactions(reaction::Kind::Like),
            dislikes: reactions(reaction::Kind::Dislike),
        }
    }

    /// Builds a [`read::video::Card`] of the public [`Video`] with the
    /// provided ID.
    ///
    /// [`None`] is returned if there is no such public [`Video`] or its author.
    fn public_card(&self, video_id: video::Id) -> Option<read::video::Card> {
        let video = self.videos.get(&video_id).filter(|v| v.is_public())?;
        let author = self.users.get(&video.owner_id)?;

        Some(read::video::Card {
            video: video.clone(),
            author: author.clone(),
            stats: self.stats(video_id),
        })
    }

    /// Counts [`Membership`]s of the [`Playlist`] with the provided ID.
    fn video_count(&self, playlist_id: playlist::Id) -> Count {
        count(
            self.memberships
                .values()
                .filter(|m| m.playlist_id == playlist_id),
        )
    }

    /// Returns the thumbnail of the [`Video`] most recently added to the
    /// [`Playlist`] with the provided ID.
    fn thumbnail_url(
        &self,
        playlist_id: playlist::Id,
    ) -> Option<video::ThumbnailUrl> {
        self.memberships
            .values()
            .filter(|m| m.playlist_id == playlist_id)
            .filter_map(|m| Some((m, self.videos.get(&m.video_id)?)))
            .max_by_key(|(m, _)| (m.updated_at, m.video_id))
            .and_then(|(_, v)| v.thumbnail_url.clone())
    }
}

/// Counts the provided items.
fn count<T>(items: impl Iterator<Item = T>) -> Count {
    Count::from(i32::try_from(items.count()).unwrap_or(i32::MAX))
}

/// Paginates the provided `nodes` the same way an SQL query ordered by
/// `(value DESC, id DESC)` and bounded by the [`Arguments::after`] cursor does.
fn paginate<V, I, N>(
    arguments: &Arguments<Keyset<V, I>>,
    nodes: impl IntoIterator<Item = N>,
    cursor: impl Fn(&N) -> Keyset<V, I>,
) -> Page<Keyset<V, I>, N>
where
    V: Ord,
    I: Ord,
{
    let mut nodes = nodes
        .into_iter()
        .filter(|n| {
            arguments
                .after
                .as_ref()
                .map_or(true, |after| after.is_followed_by(&cursor(n)))
        })
        .collect::<Vec<_>>();
    nodes.sort_by_key(|n| Reverse(cursor(n)));

    Page::from_fetched(arguments, nodes, cursor)
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self
            .write()
            .await
            .map_err(tracerr::wrap!())?
            .users
            .insert(user.id, user);
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .read()
            .await
            .map_err(tracerr::wrap!())?
            .users
            .get(by.as_inner())
            .cloned())
    }
}

impl Database<Insert<Video>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(video): Insert<Video>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self
            .write()
            .await
            .map_err(tracerr::wrap!())?
            .videos
            .insert(video.id, video);
        Ok(())
    }
}

impl Database<Select<By<Option<Video>, video::Id>>> for Memory {
    type Ok = Option<Video>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Video>, video::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .read()
            .await
            .map_err(tracerr::wrap!())?
            .videos
            .get(by.as_inner())
            .cloned())
    }
}

impl Database<Insert<View>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(view): Insert<View>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self
            .write()
            .await
            .map_err(tracerr::wrap!())?
            .views
            .insert((view.user_id, view.video_id), view);
        Ok(())
    }
}

impl Database<Insert<Reaction>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(reaction): Insert<Reaction>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self
            .write()
            .await
            .map_err(tracerr::wrap!())?
            .reactions
            .insert((reaction.user_id, reaction.video_id), reaction);
        Ok(())
    }
}

impl Database<Insert<Playlist>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(playlist): Insert<Playlist>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self
            .write()
            .await
            .map_err(tracerr::wrap!())?
            .playlists
            .insert(playlist.id, playlist);
        Ok(())
    }
}

impl Database<Select<By<Option<Playlist>, playlist::Id>>> for Memory {
    type Ok = Option<Playlist>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Playlist>, playlist::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .read()
            .await
            .map_err(tracerr::wrap!())?
            .playlists
            .get(by.as_inner())
            .cloned())
    }
}

impl Database<Delete<By<Option<Playlist>, playlist::Id>>> for Memory {
    type Ok = Option<Playlist>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Option<Playlist>, playlist::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let mut storage = self.write().await.map_err(tracerr::wrap!())?;
        let deleted = storage.playlists.remove(&id);
        if deleted.is_some() {
            storage.memberships.retain(|key, _| key.playlist_id != id);
        }
        Ok(deleted)
    }
}

impl Database<Insert<Membership>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(membership): Insert<Membership>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut storage = self.write().await.map_err(tracerr::wrap!())?;
        if storage.memberships.contains_key(&membership.key()) {
            return Err(tracerr::new!(database::Error::from(
                Error::UniqueViolation(MEMBERSHIP_KEY_CONSTRAINT)
            )));
        }
        _ = storage.memberships.insert(membership.key(), membership);
        Ok(())
    }
}

impl Database<Select<By<Option<Membership>, membership::Key>>> for Memory {
    type Ok = Option<Membership>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Membership>, membership::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .read()
            .await
            .map_err(tracerr::wrap!())?
            .memberships
            .get(by.as_inner())
            .copied())
    }
}

impl Database<Delete<By<Option<Membership>, membership::Key>>> for Memory {
    type Ok = Option<Membership>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Option<Membership>, membership::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .write()
            .await
            .map_err(tracerr::wrap!())?
            .memberships
            .remove(by.as_inner()))
    }
}

impl
    Database<
        Select<
            By<read::playlist::list::Page, read::playlist::list::Selector>,
        >,
    > for Memory
{
    type Ok = read::playlist::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::playlist::list::Page, read::playlist::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::playlist::list::Selector {
            arguments,
            filter: read::playlist::list::Filter { owner_id },
        } = by.into_inner();

        let storage = self.read().await.map_err(tracerr::wrap!())?;
        let summaries = storage
            .playlists
            .values()
            .filter(|p| p.is_owned_by(owner_id))
            .filter_map(|p| {
                Some(read::playlist::Summary {
                    owner: storage.users.get(&p.owner_id)?.clone(),
                    video_count: storage.video_count(p.id),
                    thumbnail_url: storage.thumbnail_url(p.id),
                    playlist: p.clone(),
                })
            });

        Ok(paginate(&arguments, summaries, read::playlist::Summary::cursor))
    }
}

impl
    Database<
        Select<
            By<
                read::playlist::for_video::Page,
                read::playlist::for_video::Selector,
            >,
        >,
    > for Memory
{
    type Ok = read::playlist::for_video::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::playlist::for_video::Page,
                read::playlist::for_video::Selector,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::playlist::for_video::Selector {
            arguments,
            filter:
                read::playlist::for_video::Filter {
                    owner_id,
                    video_id,
                },
        } = by.into_inner();

        let storage = self.read().await.map_err(tracerr::wrap!())?;
        let candidates = storage
            .playlists
            .values()
            .filter(|p| p.is_owned_by(owner_id))
            .map(|p| read::playlist::Candidate {
                video_count: storage.video_count(p.id),
                contains_video: video_id.is_some_and(|video_id| {
                    storage.memberships.contains_key(&membership::Key {
                        playlist_id: p.id,
                        video_id,
                    })
                }),
                playlist: p.clone(),
            });

        Ok(paginate(
            &arguments,
            candidates,
            read::playlist::Candidate::cursor,
        ))
    }
}

impl
    Database<
        Select<
            By<
                read::video::in_playlist::Page,
                read::video::in_playlist::Selector,
            >,
        >,
    > for Memory
{
    type Ok = read::video::in_playlist::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::video::in_playlist::Page,
                read::video::in_playlist::Selector,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::video::in_playlist::Selector {
            arguments,
            filter: read::video::in_playlist::Filter { playlist_id },
        } = by.into_inner();

        let storage = self.read().await.map_err(tracerr::wrap!())?;
        let cards = storage
            .memberships
            .values()
            .filter(|m| m.playlist_id == playlist_id)
            .filter_map(|m| storage.public_card(m.video_id));

        Ok(paginate(&arguments, cards, read::video::Card::cursor))
    }
}

impl
    Database<
        Select<
            By<read::video::history::Page, read::video::history::Selector>,
        >,
    > for Memory
{
    type Ok = read::video::history::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::video::history::Page, read::video::history::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::video::history::Selector {
            arguments,
            filter: read::video::history::Filter { viewer_id },
        } = by.into_inner();

        let storage = self.read().await.map_err(tracerr::wrap!())?;
        let nodes = storage
            .views
            .values()
            .filter(|v| v.user_id == viewer_id)
            .filter_map(|v| {
                Some(read::video::history::Node {
                    card: storage.public_card(v.video_id)?,
                    viewed_at: v.updated_at,
                })
            });

        Ok(paginate(&arguments, nodes, read::video::history::Node::cursor))
    }
}

impl
    Database<
        Select<By<read::video::liked::Page, read::video::liked::Selector>>,
    > for Memory
{
    type Ok = read::video::liked::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::video::liked::Page, read::video::liked::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::video::liked::Selector {
            arguments,
            filter: read::video::liked::Filter { user_id },
        } = by.into_inner();

        let storage = self.read().await.map_err(tracerr::wrap!())?;
        let nodes = storage
            .reactions
            .values()
            .filter(|r| r.user_id == user_id && r.kind == reaction::Kind::Like)
            .filter_map(|r| {
                Some(read::video::liked::Node {
                    card: storage.public_card(r.video_id)?,
                    liked_at: r.updated_at,
                })
            });

        Ok(paginate(&arguments, nodes, read::video::liked::Node::cursor))
    }
}
