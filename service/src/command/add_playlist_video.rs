//! [`Command`] for adding a [`Video`] to a [`Playlist`].

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        playlist::{self, membership, Membership},
        user, video, Playlist, Video,
    },
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::User;

use super::Command;

/// [`Command`] for adding a [`Video`] to a [`Playlist`].
#[derive(Clone, Copy, Debug)]
pub struct AddPlaylistVideo {
    /// ID of the [`Playlist`] to add the [`Video`] to.
    pub playlist_id: playlist::Id,

    /// ID of the [`Video`] to be added.
    pub video_id: video::Id,

    /// ID of the [`User`] who adds the [`Video`].
    pub initiator_id: user::Id,
}

impl<Db> Command<AddPlaylistVideo> for Service<Db>
where
    Db: Database<
            Select<By<Option<Playlist>, playlist::Id>>,
            Ok = Option<Playlist>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Video>, video::Id>>,
            Ok = Option<Video>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Membership>, membership::Key>>,
            Ok = Option<Membership>,
            Err = Traced<database::Error>,
        > + Database<Insert<Membership>, Err = Traced<database::Error>>,
{
    type Ok = Membership;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AddPlaylistVideo,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddPlaylistVideo {
            playlist_id,
            video_id,
            initiator_id,
        } = cmd;

        let playlist = self
            .database()
            .execute(Select(By::<Option<Playlist>, _>::new(playlist_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PlaylistNotExists(playlist_id))
            .map_err(tracerr::wrap!())?;

        if !playlist.is_owned_by(initiator_id) {
            tracing::debug!(
                %playlist_id,
                %initiator_id,
                "rejected adding a `Video` to a foreign `Playlist`",
            );
            return Err(tracerr::new!(E::PlaylistNotOwned(playlist_id)));
        }

        self.database()
            .execute(Select(By::<Option<Video>, _>::new(video_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VideoNotExists(video_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let membership = Membership::new(playlist_id, video_id);

        let existing = self
            .database()
            .execute(Select(By::<Option<Membership>, _>::new(
                membership.key(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            tracing::debug!(
                %playlist_id,
                %video_id,
                "rejected adding a `Video` already in the `Playlist`",
            );
            return Err(tracerr::new!(E::VideoAlreadyInPlaylist(video_id)));
        }

        // The check above may race with a concurrent addition, so the storage
        // uniqueness constraint has the final say.
        self.database()
            .execute(Insert(membership))
            .await
            .map_err(|e| {
                if e.as_ref().is_unique_violation(None) {
                    tracing::debug!(
                        %playlist_id,
                        %video_id,
                        "concurrent addition of the same `Video` detected",
                    );
                    tracerr::new!(E::VideoAlreadyInPlaylist(video_id))
                } else {
                    tracerr::map_from(e)
                }
            })
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(membership)
    }
}

/// Error of [`AddPlaylistVideo`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Playlist`] with the provided ID does not exist.
    #[display("`Playlist(id: {_0})` does not exist")]
    PlaylistNotExists(#[error(not(source))] playlist::Id),

    /// [`Playlist`] is owned by another [`User`].
    #[display("`Playlist(id: {_0})` is not owned by the initiator")]
    PlaylistNotOwned(#[error(not(source))] playlist::Id),

    /// [`Video`] is already in the [`Playlist`].
    #[display("`Video(id: {_0})` is already in the `Playlist`")]
    VideoAlreadyInPlaylist(#[error(not(source))] video::Id),

    /// [`Video`] with the provided ID does not exist.
    #[display("`Video(id: {_0})` does not exist")]
    VideoNotExists(#[error(not(source))] video::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        pagination::Arguments,
        Limit,
    };
    use tracerr::Traced;

    use crate::{
        domain::{
            playlist::{self, membership, Membership},
            video, Playlist, Video,
        },
        fixture,
        infra::{database, Database, Memory},
        read, Command as _, Service,
    };

    use super::{AddPlaylistVideo, ExecutionError};

    async fn members(db: &Memory, playlist_id: playlist::Id) -> usize {
        let page = db
            .execute(Select(By::<read::video::in_playlist::Page, _>::new(
                read::video::in_playlist::Selector {
                    arguments: Arguments::new(Limit::new(100).unwrap(), None),
                    filter: read::video::in_playlist::Filter { playlist_id },
                },
            )))
            .await
            .unwrap();
        page.items.len()
    }

    #[tokio::test]
    async fn adds_video_once() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        let video = fixture::public_video(db, owner.id).await;
        let playlist = fixture::playlist(db, owner.id).await;
        let add = AddPlaylistVideo {
            playlist_id: playlist.id,
            video_id: video.id,
            initiator_id: owner.id,
        };

        let added = svc.execute(add).await.unwrap();
        assert_eq!(added.playlist_id, playlist.id);
        assert_eq!(added.video_id, video.id);

        let err = svc.execute(add).await.unwrap_err();
        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::VideoAlreadyInPlaylist(id) if *id == video.id,
            ),
            "{err}",
        );
        assert_eq!(members(db, playlist.id).await, 1);
    }

    #[tokio::test]
    async fn rejects_foreign_playlist_without_adding() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        let stranger = fixture::user(db).await;
        let video = fixture::public_video(db, stranger.id).await;
        let playlist = fixture::playlist(db, owner.id).await;

        let err = svc
            .execute(AddPlaylistVideo {
                playlist_id: playlist.id,
                video_id: video.id,
                initiator_id: stranger.id,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::PlaylistNotOwned(_)),
            "{err}",
        );
        assert_eq!(members(db, playlist.id).await, 0);
    }

    #[tokio::test]
    async fn checks_playlist_before_video() {
        let svc = fixture::service();
        let owner = fixture::user(svc.database()).await;

        let err = svc
            .execute(AddPlaylistVideo {
                playlist_id: playlist::Id::new(),
                video_id: video::Id::new(),
                initiator_id: owner.id,
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::PlaylistNotExists(_)),
            "{err}",
        );

        let playlist = fixture::playlist(svc.database(), owner.id).await;
        let err = svc
            .execute(AddPlaylistVideo {
                playlist_id: playlist.id,
                video_id: video::Id::new(),
                initiator_id: owner.id,
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::VideoNotExists(_)),
            "{err}",
        );
    }

    /// [`Memory`] never seeing existing [`Membership`]s, as if they were added
    /// concurrently right after the check.
    #[derive(Clone, Debug)]
    struct Racing(Memory);

    impl Database<Select<By<Option<Playlist>, playlist::Id>>> for Racing {
        type Ok = Option<Playlist>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            op: Select<By<Option<Playlist>, playlist::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.execute(op).await
        }
    }

    impl Database<Select<By<Option<Video>, video::Id>>> for Racing {
        type Ok = Option<Video>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            op: Select<By<Option<Video>, video::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.execute(op).await
        }
    }

    impl Database<Select<By<Option<Membership>, membership::Key>>> for Racing {
        type Ok = Option<Membership>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Select<By<Option<Membership>, membership::Key>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(None)
        }
    }

    impl Database<Insert<Membership>> for Racing {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            op: Insert<Membership>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.execute(op).await
        }
    }

    #[tokio::test]
    async fn reports_concurrent_addition_as_conflict() {
        let memory = Memory::new();
        let owner = fixture::user(&memory).await;
        let video = fixture::public_video(&memory, owner.id).await;
        let playlist = fixture::playlist(&memory, owner.id).await;
        fixture::add(&memory, playlist.id, video.id).await;

        let svc = Service::new(fixture::config(), Racing(memory.clone()));
        let err = svc
            .execute(AddPlaylistVideo {
                playlist_id: playlist.id,
                video_id: video.id,
                initiator_id: owner.id,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::VideoAlreadyInPlaylist(_)),
            "{err}",
        );
        assert_eq!(members(&memory, playlist.id).await, 1);
    }
}
