//! [`Command`] for removing a [`Video`] from a [`Playlist`].

use common::operations::{By, Delete, Select};
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

/// [`Command`] for removing a [`Video`] from a [`Playlist`].
#[derive(Clone, Copy, Debug)]
pub struct RemovePlaylistVideo {
    /// ID of the [`Playlist`] to remove the [`Video`] from.
    pub playlist_id: playlist::Id,

    /// ID of the [`Video`] to be removed.
    pub video_id: video::Id,

    /// ID of the [`User`] who removes the [`Video`].
    pub initiator_id: user::Id,
}

impl<Db> Command<RemovePlaylistVideo> for Service<Db>
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
        > + Database<
            Delete<By<Option<Membership>, membership::Key>>,
            Ok = Option<Membership>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Membership;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RemovePlaylistVideo,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RemovePlaylistVideo {
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
                "rejected removing a `Video` from a foreign `Playlist`",
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

        let key = membership::Key {
            playlist_id,
            video_id,
        };

        let existing = self
            .database()
            .execute(Select(By::<Option<Membership>, _>::new(key)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_none() {
            tracing::debug!(
                %playlist_id,
                %video_id,
                "rejected removing a `Video` absent in the `Playlist`",
            );
            return Err(tracerr::new!(E::VideoNotInPlaylist(video_id)));
        }

        // Concurrent removal leaves nothing to delete here.
        self.database()
            .execute(Delete(By::<Option<Membership>, _>::new(key)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VideoNotInPlaylist(video_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`RemovePlaylistVideo`] [`Command`] execution.
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

    /// [`Video`] with the provided ID does not exist.
    #[display("`Video(id: {_0})` does not exist")]
    VideoNotExists(#[error(not(source))] video::Id),

    /// [`Video`] is not in the [`Playlist`].
    #[display("`Video(id: {_0})` is not in the `Playlist`")]
    VideoNotInPlaylist(#[error(not(source))] video::Id),
}

#[cfg(test)]
mod spec {
    use crate::{fixture, Command as _};

    use super::{ExecutionError, RemovePlaylistVideo};

    #[tokio::test]
    async fn removes_video_once() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        let video = fixture::public_video(db, owner.id).await;
        let playlist = fixture::playlist(db, owner.id).await;
        fixture::add(db, playlist.id, video.id).await;
        let remove = RemovePlaylistVideo {
            playlist_id: playlist.id,
            video_id: video.id,
            initiator_id: owner.id,
        };

        let removed = svc.execute(remove).await.unwrap();
        assert_eq!(removed.playlist_id, playlist.id);
        assert_eq!(removed.video_id, video.id);

        let err = svc.execute(remove).await.unwrap_err();
        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::VideoNotInPlaylist(id) if *id == video.id,
            ),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_foreign_playlist_without_removing() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        let stranger = fixture::user(db).await;
        let video = fixture::public_video(db, owner.id).await;
        let playlist = fixture::playlist(db, owner.id).await;
        fixture::add(db, playlist.id, video.id).await;

        let err = svc
            .execute(RemovePlaylistVideo {
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

        _ = svc
            .execute(RemovePlaylistVideo {
                playlist_id: playlist.id,
                video_id: video.id,
                initiator_id: owner.id,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn surfaces_unavailable_storage() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        let video = fixture::public_video(db, owner.id).await;
        let playlist = fixture::playlist(db, owner.id).await;
        db.set_unavailable(true);

        let err = svc
            .execute(RemovePlaylistVideo {
                playlist_id: playlist.id,
                video_id: video.id,
                initiator_id: owner.id,
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::Db(e) if e.is_transient()),
            "{err}",
        );
    }
}
