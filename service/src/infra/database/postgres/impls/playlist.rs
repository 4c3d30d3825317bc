//! [`Playlist`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        playlist::{self, membership, Membership},
        Playlist,
    },
    infra::{
        database::{
            self,
            postgres::{
                keyset::{self, aggregate, Order, Statement},
                Connection,
            },
            Postgres,
        },
        Database,
    },
    read,
};

use super::user;

/// Columns of a [`Playlist`] stored in `playlists`, parsed by [`from_row()`].
const COLUMNS: &str = "\
    playlists.id AS playlist_id, \
    playlists.user_id AS playlist_owner_id, \
    playlists.name AS playlist_name, \
    playlists.description AS playlist_description, \
    playlists.created_at AS playlist_created_at, \
    playlists.updated_at AS playlist_updated_at";

/// [`Order`] of [`Playlist`] lists: most recently modified first.
const ORDER: Order = Order {
    value: "playlists.updated_at",
    value_type: "TIMESTAMPTZ",
    id: "playlists.id",
};

/// Parses a [`Playlist`] selected via [`COLUMNS`] out of the provided [`Row`].
fn from_row(row: &Row) -> Playlist {
    Playlist {
        id: row.get("playlist_id"),
        owner_id: row.get("playlist_owner_id"),
        name: row.get("playlist_name"),
        description: row.get("playlist_description"),
        created_at: row.get("playlist_created_at"),
        updated_at: row.get("playlist_updated_at"),
    }
}

/// Parses a [`Membership`] out of the provided [`Row`] of `playlist_videos`.
fn membership_from_row(row: &Row) -> Membership {
    Membership {
        playlist_id: row.get("playlist_id"),
        video_id: row.get("video_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Playlist>, playlist::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Playlist>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Playlist>, playlist::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM playlists \
             WHERE playlists.id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Playlist>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(playlist): Insert<Playlist>,
    ) -> Result<Self::Ok, Self::Err> {
        let Playlist {
            id,
            owner_id,
            name,
            description,
            created_at,
            updated_at,
        } = playlist;

        const SQL: &str = "\
            INSERT INTO playlists (id, user_id, name, description, \
                                   created_at, updated_at) \
            VALUES ($1::UUID, $2::UUID, $3::VARCHAR, $4::VARCHAR, \
                    $5::TIMESTAMPTZ, $6::TIMESTAMPTZ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                description = EXCLUDED.description, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &name,
                &description,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Option<Playlist>, playlist::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Playlist>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Option<Playlist>, playlist::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        // Memberships are removed by `ON DELETE CASCADE`.
        let sql = format!(
            "DELETE FROM playlists \
             WHERE playlists.id = $1::UUID \
             RETURNING {COLUMNS}",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Membership>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(membership): Insert<Membership>,
    ) -> Result<Self::Ok, Self::Err> {
        let Membership {
            playlist_id,
            video_id,
            created_at,
            updated_at,
        } = membership;

        // No `ON CONFLICT` clause: a duplicate must surface as a unique
        // violation of `playlist_videos_pkey`.
        const SQL: &str = "\
            INSERT INTO playlist_videos (playlist_id, video_id, \
                                         created_at, updated_at) \
            VALUES ($1::UUID, $2::UUID, $3::TIMESTAMPTZ, $4::TIMESTAMPTZ)";
        self.exec(SQL, &[&playlist_id, &video_id, &created_at, &updated_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Option<Membership>, membership::Key>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Membership>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Membership>, membership::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        let membership::Key {
            playlist_id,
            video_id,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT playlist_id, video_id, created_at, updated_at \
            FROM playlist_videos \
            WHERE playlist_id = $1::UUID \
              AND video_id = $2::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&playlist_id, &video_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(membership_from_row))
    }
}

impl<C> Database<Delete<By<Option<Membership>, membership::Key>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Membership>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Option<Membership>, membership::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        let membership::Key {
            playlist_id,
            video_id,
        } = by.into_inner();

        const SQL: &str = "\
            DELETE FROM playlist_videos \
            WHERE playlist_id = $1::UUID \
              AND video_id = $2::UUID \
            RETURNING playlist_id, video_id, created_at, updated_at";
        Ok(self
            .query_opt(SQL, &[&playlist_id, &video_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(membership_from_row))
    }
}

/// Builds a [`Statement`] selecting a page of [`read::playlist::Summary`]s.
fn list_statement<'a>(
    arguments: &'a read::playlist::list::Arguments,
    filter: &'a read::playlist::list::Filter,
    limit: &'a i64,
) -> (String, Vec<&'a (dyn ToSql + Sync)>) {
    let mut stmt = Statement::new(ORDER);
    let owner = stmt.bind(&filter.owner_id);
    stmt.filter(format!("playlists.user_id = ${owner}::UUID"));
    stmt.after(arguments.after.as_ref());
    stmt.build(
        &format!(
            "SELECT {COLUMNS}, \
                    {user}, \
                    {count}, \
                    {thumbnail} \
             FROM playlists \
             INNER JOIN users ON users.id = playlists.user_id",
            user = user::COLUMNS,
            count = aggregate::VIDEO_COUNT,
            thumbnail = aggregate::THUMBNAIL_URL,
        ),
        limit,
    )
}

/// Builds a [`Statement`] selecting a page of [`read::playlist::Candidate`]s.
fn for_video_statement<'a>(
    arguments: &'a read::playlist::for_video::Arguments,
    filter: &'a read::playlist::for_video::Filter,
    limit: &'a i64,
) -> (String, Vec<&'a (dyn ToSql + Sync)>) {
    let mut stmt = Statement::new(ORDER);
    let video = filter.video_id.as_ref().map(|id| stmt.bind(id));
    let owner = stmt.bind(&filter.owner_id);
    stmt.filter(format!("playlists.user_id = ${owner}::UUID"));
    stmt.after(arguments.after.as_ref());
    stmt.build(
        &format!(
            "SELECT {COLUMNS}, \
                    {count}, \
                    {contains} \
             FROM playlists",
            count = aggregate::VIDEO_COUNT,
            contains = aggregate::contains_video(video),
        ),
        limit,
    )
}

impl<C>
    Database<
        Select<
            By<read::playlist::list::Page, read::playlist::list::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::playlist::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::playlist::list::Page, read::playlist::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::playlist::list::Selector { arguments, filter } =
            by.into_inner();
        let limit = keyset::fetch_limit(&arguments);

        let (sql, params) = list_statement(&arguments, &filter, &limit);
        let rows = self
            .query(&sql, &params)
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::playlist::list::Page::from_fetched(
            &arguments,
            rows.iter().map(|row| read::playlist::Summary {
                playlist: from_row(row),
                owner: user::from_row(row),
                video_count: row.get::<_, i32>("video_count").into(),
                thumbnail_url: row.get("thumbnail_url"),
            }),
            read::playlist::Summary::cursor,
        ))
    }
}

impl<C>
    Database<
        Select<
            By<
                read::playlist::for_video::Page,
                read::playlist::for_video::Selector,
            >,
        >,
    > for Postgres<C>
where
    C: Connection,
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
        let read::playlist::for_video::Selector { arguments, filter } =
            by.into_inner();
        let limit = keyset::fetch_limit(&arguments);

        let (sql, params) = for_video_statement(&arguments, &filter, &limit);
        let rows = self
            .query(&sql, &params)
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::playlist::for_video::Page::from_fetched(
            &arguments,
            rows.iter().map(|row| read::playlist::Candidate {
                playlist: from_row(row),
                video_count: row.get::<_, i32>("video_count").into(),
                contains_video: row.get("contains_video"),
            }),
            read::playlist::Candidate::cursor,
        ))
    }
}

#[cfg(test)]
mod spec {
    use common::{DateTime, Keyset, Limit};

    use crate::{
        domain::{playlist, user, video},
        read::playlist::{for_video, list},
    };

    use super::{for_video_statement, list_statement};

    fn arguments<C>(after: Option<C>) -> common::pagination::Arguments<C> {
        common::pagination::Arguments::new(Limit::new(10).unwrap(), after)
    }

    #[test]
    fn lists_owned_playlists_with_aggregates() {
        let args: list::Arguments = arguments(None);
        let filter = list::Filter {
            owner_id: user::Id::new(),
        };

        let limit = 11;

        let (sql, params) = list_statement(&args, &filter, &limit);

        assert!(sql.contains("AS video_count"), "{sql}");
        assert!(sql.contains("AS thumbnail_url"), "{sql}");
        assert!(sql.contains("WHERE playlists.user_id = $1::UUID"), "{sql}");
        assert!(sql.ends_with("LIMIT $2::INT8"), "{sql}");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn checks_containment_only_with_video() {
        let owner_id = user::Id::new();
        let cursor = Keyset::new(DateTime::now().coerce(), playlist::Id::new());
        let args: for_video::Arguments = arguments(Some(cursor));
        let limit = 11;

        let without = for_video::Filter {
            owner_id,
            video_id: None,
        };
        let (sql, params) = for_video_statement(&args, &without, &limit);
        assert!(sql.contains("FALSE AS contains_video"), "{sql}");
        assert!(!sql.contains("EXISTS"), "{sql}");
        assert!(sql.contains("playlists.user_id = $1::UUID"), "{sql}");
        assert!(sql.contains("playlists.id < $3::UUID"), "{sql}");
        assert_eq!(params.len(), 4);

        let with = for_video::Filter {
            owner_id,
            video_id: Some(video::Id::new()),
        };
        let (sql, params) = for_video_statement(&args, &with, &limit);
        assert!(sql.contains("pv.video_id = $1::UUID"), "{sql}");
        assert!(sql.contains("playlists.user_id = $2::UUID"), "{sql}");
        assert!(sql.contains("playlists.id < $4::UUID"), "{sql}");
        assert!(sql.ends_with("LIMIT $5::INT8"), "{sql}");
        assert_eq!(params.len(), 5);
    }
}
