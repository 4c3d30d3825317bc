//! [`Video`]-related [`Database`] implementations.

use common::operations::{By, Select};
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{video, Video},
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

/// Columns of a [`Video`] joined as `videos`, parsed by [`from_row()`].
const COLUMNS: &str = "\
    videos.id AS video_id, \
    videos.user_id AS video_owner_id, \
    videos.title AS video_title, \
    videos.description AS video_description, \
    videos.thumbnail_url AS video_thumbnail_url, \
    videos.visibility AS video_visibility, \
    videos.created_at AS video_created_at, \
    videos.updated_at AS video_updated_at";

/// Parses a [`Video`] selected via [`COLUMNS`] out of the provided [`Row`].
fn from_row(row: &Row) -> Video {
    Video {
        id: row.get("video_id"),
        owner_id: row.get("video_owner_id"),
        title: row.get("video_title"),
        description: row.get("video_description"),
        thumbnail_url: row.get("video_thumbnail_url"),
        visibility: row.get("video_visibility"),
        created_at: row.get("video_created_at"),
        updated_at: row.get("video_updated_at"),
    }
}

/// Returns the `SELECT ... FROM ...` part of a statement listing
/// [`read::video::Card`]s, extended with the provided `extra_columns` and
/// `join` clause.
fn cards_source(extra_columns: &str, join: &str) -> String {
    format!(
        "SELECT {COLUMNS}, \
                {user}, \
                {stats} \
                {extra_columns} \
         FROM videos \
         INNER JOIN users ON users.id = videos.user_id \
         {join}",
        user = user::COLUMNS,
        stats = aggregate::video_stats(),
    )
}

/// Condition leaving public [`Video`]s only.
fn public_only() -> String {
    format!("videos.visibility = {}::INT2", video::Visibility::Public.u8())
}

/// Parses a [`read::video::Card`] selected via [`cards_source()`] out of the
/// provided [`Row`].
fn card_from_row(row: &Row) -> read::video::Card {
    read::video::Card {
        video: from_row(row),
        author: user::from_row(row),
        stats: read::video::Stats {
            views: row.get::<_, i32>("view_count").into(),
            likes: row.get::<_, i32>("like_count").into(),
            dislikes: row.get::<_, i32>("dislike_count").into(),
        },
    }
}

/// Builds a [`Statement`] selecting a page of public [`read::video::Card`]s
/// of a playlist.
fn in_playlist_statement<'a>(
    arguments: &'a read::video::in_playlist::Arguments,
    filter: &'a read::video::in_playlist::Filter,
    limit: &'a i64,
) -> (String, Vec<&'a (dyn ToSql + Sync)>) {
    let mut stmt = Statement::new(Order {
        value: "videos.updated_at",
        value_type: "TIMESTAMPTZ",
        id: "videos.id",
    });
    let idx = stmt.bind(&filter.playlist_id);
    stmt.filter(format!("playlist_videos.playlist_id = ${idx}::UUID"));
    stmt.filter(public_only());
    stmt.after(arguments.after.as_ref());
    stmt.build(
        &cards_source(
            "",
            "INNER JOIN playlist_videos \
                     ON playlist_videos.video_id = videos.id",
        ),
        limit,
    )
}

/// Builds a [`Statement`] selecting a page of a watch history.
fn history_statement<'a>(
    arguments: &'a read::video::history::Arguments,
    filter: &'a read::video::history::Filter,
    limit: &'a i64,
) -> (String, Vec<&'a (dyn ToSql + Sync)>) {
    let mut stmt = Statement::new(Order {
        value: "video_views.updated_at",
        value_type: "TIMESTAMPTZ",
        id: "videos.id",
    });
    let idx = stmt.bind(&filter.viewer_id);
    stmt.filter(format!("video_views.user_id = ${idx}::UUID"));
    stmt.filter(public_only());
    stmt.after(arguments.after.as_ref());
    stmt.build(
        &cards_source(
            ", video_views.updated_at AS viewed_at",
            "INNER JOIN video_views \
                     ON video_views.video_id = videos.id",
        ),
        limit,
    )
}

/// Builds a [`Statement`] selecting a page of liked videos.
fn liked_statement<'a>(
    arguments: &'a read::video::liked::Arguments,
    filter: &'a read::video::liked::Filter,
    limit: &'a i64,
) -> (String, Vec<&'a (dyn ToSql + Sync)>) {
    // Aliased to keep it apart from the reactions counted in stats.
    let mut stmt = Statement::new(Order {
        value: "liked.updated_at",
        value_type: "TIMESTAMPTZ",
        id: "videos.id",
    });
    let idx = stmt.bind(&filter.user_id);
    stmt.filter(format!("liked.user_id = ${idx}::UUID"));
    stmt.filter(format!(
        "liked.kind = {}::INT2",
        video::reaction::Kind::Like.u8(),
    ));
    stmt.filter(public_only());
    stmt.after(arguments.after.as_ref());
    stmt.build(
        &cards_source(
            ", liked.updated_at AS liked_at",
            "INNER JOIN video_reactions liked \
                     ON liked.video_id = videos.id",
        ),
        limit,
    )
}

impl<C> Database<Select<By<Option<Video>, video::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Video>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Video>, video::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM videos \
             WHERE videos.id = $1::UUID \
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

impl<C>
    Database<
        Select<
            By<
                read::video::in_playlist::Page,
                read::video::in_playlist::Selector,
            >,
        >,
    > for Postgres<C>
where
    C: Connection,
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
        let read::video::in_playlist::Selector { arguments, filter } =
            by.into_inner();
        let limit = keyset::fetch_limit(&arguments);

        let (sql, params) = in_playlist_statement(&arguments, &filter, &limit);
        let rows = self
            .query(&sql, &params)
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::video::in_playlist::Page::from_fetched(
            &arguments,
            rows.iter().map(card_from_row),
            read::video::Card::cursor,
        ))
    }
}

impl<C>
    Database<
        Select<
            By<read::video::history::Page, read::video::history::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::video::history::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::video::history::Page, read::video::history::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::video::history::Selector { arguments, filter } =
            by.into_inner();
        let limit = keyset::fetch_limit(&arguments);

        let (sql, params) = history_statement(&arguments, &filter, &limit);
        let rows = self
            .query(&sql, &params)
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::video::history::Page::from_fetched(
            &arguments,
            rows.iter().map(|row| read::video::history::Node {
                card: card_from_row(row),
                viewed_at: row.get("viewed_at"),
            }),
            read::video::history::Node::cursor,
        ))
    }
}

impl<C>
    Database<
        Select<By<read::video::liked::Page, read::video::liked::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::video::liked::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::video::liked::Page, read::video::liked::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::video::liked::Selector { arguments, filter } =
            by.into_inner();
        let limit = keyset::fetch_limit(&arguments);

        let (sql, params) = liked_statement(&arguments, &filter, &limit);
        let rows = self
            .query(&sql, &params)
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::video::liked::Page::from_fetched(
            &arguments,
            rows.iter().map(|row| read::video::liked::Node {
                card: card_from_row(row),
                liked_at: row.get("liked_at"),
            }),
            read::video::liked::Node::cursor,
        ))
    }
}

#[cfg(test)]
mod spec {
    use common::{DateTime, Keyset, Limit};

    use crate::{
        domain::{playlist, user, video},
        read::video::{history, in_playlist, liked},
    };

    use super::{history_statement, in_playlist_statement, liked_statement};

    fn arguments<C>(after: Option<C>) -> common::pagination::Arguments<C> {
        common::pagination::Arguments::new(Limit::new(10).unwrap(), after)
    }

    #[test]
    fn lists_public_playlist_videos() {
        let filter = in_playlist::Filter {
            playlist_id: playlist::Id::new(),
        };
        let limit = 11;

        let args: in_playlist::Arguments = arguments(None);
        let (sql, params) = in_playlist_statement(&args, &filter, &limit);
        assert!(sql.contains("AS like_count"), "{sql}");
        assert!(
            sql.contains("WHERE playlist_videos.playlist_id = $1::UUID"),
            "{sql}",
        );
        assert!(sql.contains("AND videos.visibility = 2::INT2"), "{sql}");
        assert!(
            sql.contains("ORDER BY videos.updated_at DESC, videos.id DESC"),
            "{sql}",
        );
        assert!(sql.ends_with("LIMIT $2::INT8"), "{sql}");
        assert_eq!(params.len(), 2);

        let cursor = Keyset::new(DateTime::now().coerce(), video::Id::new());
        let args: in_playlist::Arguments = arguments(Some(cursor));
        let (sql, params) = in_playlist_statement(&args, &filter, &limit);
        assert!(
            sql.contains("videos.updated_at < $2::TIMESTAMPTZ"),
            "{sql}",
        );
        assert!(sql.contains("videos.id < $3::UUID"), "{sql}");
        assert!(sql.ends_with("LIMIT $4::INT8"), "{sql}");
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn lists_watch_history_by_view_time() {
        let filter = history::Filter {
            viewer_id: user::Id::new(),
        };
        let limit = 11;

        let args: history::Arguments = arguments(None);
        let (sql, params) = history_statement(&args, &filter, &limit);
        assert!(sql.contains("video_views.updated_at AS viewed_at"), "{sql}");
        assert!(sql.contains("WHERE video_views.user_id = $1::UUID"), "{sql}");
        assert!(sql.contains("AND videos.visibility = 2::INT2"), "{sql}");
        assert!(
            sql.contains(
                "ORDER BY video_views.updated_at DESC, videos.id DESC",
            ),
            "{sql}",
        );
        assert!(sql.ends_with("LIMIT $2::INT8"), "{sql}");
        assert_eq!(params.len(), 2);

        let cursor = Keyset::new(DateTime::now().coerce(), video::Id::new());
        let args: history::Arguments = arguments(Some(cursor));
        let (sql, params) = history_statement(&args, &filter, &limit);
        assert!(
            sql.contains("video_views.updated_at < $2::TIMESTAMPTZ"),
            "{sql}",
        );
        assert!(sql.contains("videos.id < $3::UUID"), "{sql}");
        assert!(sql.ends_with("LIMIT $4::INT8"), "{sql}");
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn lists_liked_videos_by_reaction_time() {
        let filter = liked::Filter {
            user_id: user::Id::new(),
        };
        let limit = 11;

        let args: liked::Arguments = arguments(None);
        let (sql, params) = liked_statement(&args, &filter, &limit);
        assert!(sql.contains("liked.updated_at AS liked_at"), "{sql}");
        assert!(sql.contains("WHERE liked.user_id = $1::UUID"), "{sql}");
        assert!(sql.contains("AND liked.kind = 1::INT2"), "{sql}");
        assert!(sql.contains("AND videos.visibility = 2::INT2"), "{sql}");
        assert!(
            sql.contains("ORDER BY liked.updated_at DESC, videos.id DESC"),
            "{sql}",
        );
        assert!(sql.ends_with("LIMIT $2::INT8"), "{sql}");
        assert_eq!(params.len(), 2);

        let cursor = Keyset::new(DateTime::now().coerce(), video::Id::new());
        let args: liked::Arguments = arguments(Some(cursor));
        let (sql, params) = liked_statement(&args, &filter, &limit);
        assert!(sql.contains("liked.updated_at < $2::TIMESTAMPTZ"), "{sql}");
        assert!(sql.contains("videos.id < $3::UUID"), "{sql}");
        assert!(sql.ends_with("LIMIT $4::INT8"), "{sql}");
        assert_eq!(params.len(), 4);
    }
}
