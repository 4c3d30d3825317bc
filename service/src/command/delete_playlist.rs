//! [`Command`] for deleting a [`Playlist`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{playlist, user, Playlist},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::{playlist::Membership, User};

use super::Command;

/// [`Command`] for deleting a [`Playlist`] along with all its [`Membership`]s.
#[derive(Clone, Copy, Debug)]
pub struct DeletePlaylist {
    /// ID of the [`Playlist`] to be deleted.
    pub playlist_id: playlist::Id,

    /// ID of the [`User`] who deletes the [`Playlist`].
    pub initiator_id: user::Id,
}

impl<Db> Command<DeletePlaylist> for Service<Db>
where
    Db: Database<
            Select<By<Option<Playlist>, playlist::Id>>,
            Ok = Option<Playlist>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Option<Playlist>, playlist::Id>>,
            Ok = Option<Playlist>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Playlist;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeletePlaylist,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeletePlaylist {
            playlist_id,
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
                "rejected deletion of a foreign `Playlist`",
            );
            return Err(tracerr::new!(E::PlaylistNotOwned(playlist_id)));
        }

        // Concurrently deleted `Playlist` is indistinguishable from a missing
        // one.
        self.database()
            .execute(Delete(By::<Option<Playlist>, _>::new(playlist_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PlaylistNotExists(playlist_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`DeletePlaylist`] [`Command`] execution.
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
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::playlist::{membership, Membership},
        fixture, Command as _,
    };

    use super::{DeletePlaylist, ExecutionError};

    #[tokio::test]
    async fn removes_playlist_with_its_videos() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        let video = fixture::public_video(db, owner.id).await;
        let playlist = fixture::playlist(db, owner.id).await;
        fixture::add(db, playlist.id, video.id).await;

        let deleted = svc
            .execute(DeletePlaylist {
                playlist_id: playlist.id,
                initiator_id: owner.id,
            })
            .await
            .unwrap();
        assert_eq!(deleted.id, playlist.id);

        let membership = db
            .execute(Select(By::<Option<Membership>, _>::new(
                membership::Key {
                    playlist_id: playlist.id,
                    video_id: video.id,
                },
            )))
            .await
            .unwrap();
        assert!(membership.is_none());
    }

    #[tokio::test]
    async fn rejects_foreign_playlist() {
        let svc = fixture::service();
        let db = svc.database();
        let owner = fixture::user(db).await;
        let stranger = fixture::user(db).await;
        let playlist = fixture::playlist(db, owner.id).await;

        let err = svc
            .execute(DeletePlaylist {
                playlist_id: playlist.id,
                initiator_id: stranger.id,
            })
            .await
            .unwrap_err();
        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::PlaylistNotOwned(id) if *id == playlist.id,
            ),
            "{err}",
        );
        assert!(fixture::find_playlist(db, playlist.id).await.is_some());
    }

    #[tokio::test]
    async fn reports_missing_playlist() {
        let svc = fixture::service();
        let owner = fixture::user(svc.database()).await;
        let playlist = fixture::playlist(svc.database(), owner.id).await;

        let delete = DeletePlaylist {
            playlist_id: playlist.id,
            initiator_id: owner.id,
        };
        _ = svc.execute(delete).await.unwrap();

        let err = svc.execute(delete).await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::PlaylistNotExists(_)),
            "{err}",
        );
    }
}
