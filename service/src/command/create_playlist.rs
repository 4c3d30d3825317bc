//! [`Command`] for creating a new [`Playlist`].

use common::{operations::Insert, DateTime};
use tracerr::Traced;

use crate::{
    domain::{playlist, user, Playlist},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::User;

use super::Command;

/// [`Command`] for creating a new [`Playlist`].
#[derive(Clone, Debug)]
pub struct CreatePlaylist {
    /// ID of the [`User`] owning the new [`Playlist`].
    pub owner_id: user::Id,

    /// [`playlist::Name`] of the new [`Playlist`].
    pub name: playlist::Name,

    /// [`playlist::Description`] of the new [`Playlist`], if any.
    pub description: Option<playlist::Description>,
}

impl<Db> Command<CreatePlaylist> for Service<Db>
where
    Db: Database<Insert<Playlist>, Err = Traced<database::Error>>,
{
    type Ok = Playlist;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePlaylist,
    ) -> Result<Self::Ok, Self::Err> {
        let CreatePlaylist {
            owner_id,
            name,
            description,
        } = cmd;

        let now = DateTime::now();
        let playlist = Playlist {
            id: playlist::Id::new(),
            owner_id,
            name,
            description,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        self.database()
            .execute(Insert(playlist.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(playlist)
    }
}

/// Error of [`CreatePlaylist`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{playlist, Playlist},
        fixture, Command as _,
    };

    use super::CreatePlaylist;

    #[tokio::test]
    async fn stores_playlist_owned_by_caller() {
        let svc = fixture::service();
        let owner = fixture::user(svc.database()).await;

        let created = svc
            .execute(CreatePlaylist {
                owner_id: owner.id,
                name: playlist::Name::new("Watch later").unwrap(),
                description: Some("queued".into()),
            })
            .await
            .unwrap();

        assert!(created.is_owned_by(owner.id));
        assert_eq!(
            created.created_at.coerce::<()>(),
            created.updated_at.coerce(),
        );

        let stored = svc
            .database()
            .execute(Select(By::<Option<Playlist>, _>::new(created.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, created.name);
        assert_eq!(stored.description, created.description);
    }
}
