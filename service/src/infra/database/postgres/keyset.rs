//! Keyset-paginated `SELECT` statements.

use common::{pagination::Arguments, Keyset};
use itertools::Itertools as _;
use postgres_types::ToSql;

/// Columns a list is ordered by: a single sort value and an identifier, both
/// descending.
#[derive(Clone, Copy, Debug)]
pub(super) struct Order {
    /// Expression of the sort value.
    pub(super) value: &'static str,

    /// SQL type of the sort value.
    pub(super) value_type: &'static str,

    /// Expression of the identifier.
    pub(super) id: &'static str,
}

/// Builder of a keyset-paginated `SELECT` statement.
///
/// Rows are filtered by the added conditions, bounded by the cursor (if any),
/// ordered by `(value DESC, id DESC)` and limited to one row more than
/// requested, so the caller is able to detect whether a next page exists.
#[derive(Debug)]
pub(super) struct Statement<'a> {
    /// [`Order`] of the selected rows.
    order: Order,

    /// Conditions the selected rows must satisfy.
    conditions: Vec<String>,

    /// Parameters bound to the statement.
    params: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Statement<'a> {
    /// Creates a new [`Statement`] selecting rows in the provided [`Order`].
    pub(super) fn new(order: Order) -> Self {
        Self {
            order,
            conditions: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Binds the provided parameter, returning its placeholder index.
    pub(super) fn bind(&mut self, param: &'a (dyn ToSql + Sync)) -> usize {
        self.params.push(param);
        self.params.len()
    }

    /// Adds the provided condition.
    ///
    /// Its placeholders must be obtained via [`Statement::bind()`].
    pub(super) fn filter(&mut self, condition: impl Into<String>) {
        self.conditions.push(condition.into());
    }

    /// Restricts the selected rows to the ones going after the provided
    /// `cursor`.
    pub(super) fn after<V, I>(&mut self, cursor: Option<&'a Keyset<V, I>>)
    where
        V: ToSql + Sync,
        I: ToSql + Sync,
    {
        let Some(cursor) = cursor else {
            return;
        };

        let Order {
            value,
            value_type,
            id,
        } = self.order;
        let v = self.bind(&cursor.value);
        let i = self.bind(&cursor.id);

        self.filter(format!(
            "({value} < ${v}::{value_type} \
              OR ({value} = ${v}::{value_type} AND {id} < ${i}::UUID))",
        ));
    }

    /// Builds the SQL of this [`Statement`] selecting from the provided
    /// `source` (a `SELECT ... FROM ...` part without any conditions), along
    /// with its parameters.
    ///
    /// `fetch_limit` should be [`Arguments::fetch_limit()`].
    pub(super) fn build(
        mut self,
        source: &str,
        fetch_limit: &'a i64,
    ) -> (String, Vec<&'a (dyn ToSql + Sync)>) {
        let limit = self.bind(fetch_limit);
        let Order { value, id, .. } = self.order;

        let sql = format!(
            "{source} \
             {conditions} \
             ORDER BY {value} DESC, {id} DESC \
             LIMIT ${limit}::INT8",
            conditions =
                self.conditions.iter().enumerate().format_with(
                    " ",
                    |(n, cond), f| {
                        let keyword = if n == 0 { "WHERE" } else { "AND" };
                        f(&format_args!("{keyword} {cond}"))
                    },
                ),
        );
        (sql, self.params)
    }
}

/// Returns [`Arguments::fetch_limit()`] in the form bindable to a
/// [`Statement`].
pub(super) fn fetch_limit<C>(arguments: &Arguments<C>) -> i64 {
    // Never exceeds `Limit::MAX + 1`.
    i64::try_from(arguments.fetch_limit()).unwrap_or(i64::MAX)
}

/// Expressions of correlated aggregates attached to a row in the same query.
pub(super) mod aggregate {
    use crate::domain::video::reaction;

    /// Columns of [`Stats`] of the video referenced as `videos.id`.
    ///
    /// [`Stats`]: crate::read::video::Stats
    pub(in super::super) fn video_stats() -> String {
        format!(
            "(SELECT COUNT(*)::INT4 \
              FROM video_views \
              WHERE video_views.video_id = videos.id) AS view_count, \
             {likes} AS like_count, \
             {dislikes} AS dislike_count",
            likes = reactions(reaction::Kind::Like),
            dislikes = reactions(reaction::Kind::Dislike),
        )
    }

    /// Counts reactions of the provided `kind` to the video referenced as
    /// `videos.id`.
    fn reactions(kind: reaction::Kind) -> String {
        format!(
            "(SELECT COUNT(*)::INT4 \
              FROM video_reactions \
              WHERE video_reactions.video_id = videos.id \
                AND video_reactions.kind = {}::INT2)",
            kind.u8(),
        )
    }

    /// Number of videos in the playlist referenced as `playlists.id`.
    pub(in super::super) const VIDEO_COUNT: &str = "\
        (SELECT COUNT(*)::INT4 \
         FROM playlist_videos \
         WHERE playlist_videos.playlist_id = playlists.id) AS video_count";

    /// Thumbnail of the video most recently added to the playlist referenced
    /// as `playlists.id`.
    pub(in super::super) const THUMBNAIL_URL: &str = "\
        (SELECT v.thumbnail_url \
         FROM playlist_videos pv \
         JOIN videos v ON v.id = pv.video_id \
         WHERE pv.playlist_id = playlists.id \
         ORDER BY pv.updated_at DESC, pv.video_id DESC \
         LIMIT 1) AS thumbnail_url";

    /// Indicator whether the playlist referenced as `playlists.id` contains
    /// the video bound at the provided placeholder index.
    ///
    /// No subquery is issued at all, if there is no video to check.
    pub(in super::super) fn contains_video(video: Option<usize>) -> String {
        video.map_or_else(
            || "FALSE AS contains_video".to_owned(),
            |idx| {
                format!(
                    "EXISTS(SELECT 1 \
                            FROM playlist_videos pv \
                            WHERE pv.playlist_id = playlists.id \
                              AND pv.video_id = ${idx}::UUID) \
                     AS contains_video",
                )
            },
        )
    }
}

#[cfg(test)]
mod spec {
    use common::{pagination::Arguments, DateTime, Keyset, Limit};
    use uuid::Uuid;

    use super::{aggregate, fetch_limit, Order, Statement};

    const ORDER: Order = Order {
        value: "playlists.updated_at",
        value_type: "TIMESTAMPTZ",
        id: "playlists.id",
    };

    #[test]
    fn selects_first_page() {
        let owner = Uuid::new_v4();
        let limit = 11;

        let mut stmt = Statement::new(ORDER);
        let idx = stmt.bind(&owner);
        stmt.filter(format!("playlists.user_id = ${idx}::UUID"));
        stmt.after::<DateTime, Uuid>(None);
        let (sql, params) = stmt.build("SELECT * FROM playlists", &limit);

        assert_eq!(
            sql,
            "SELECT * FROM playlists \
             WHERE playlists.user_id = $1::UUID \
             ORDER BY playlists.updated_at DESC, playlists.id DESC \
             LIMIT $2::INT8",
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn bounds_by_cursor() {
        let owner = Uuid::new_v4();
        let cursor = Keyset::new(DateTime::now(), Uuid::new_v4());
        let limit = 3;

        let mut stmt = Statement::new(ORDER);
        let idx = stmt.bind(&owner);
        stmt.filter(format!("playlists.user_id = ${idx}::UUID"));
        stmt.after(Some(&cursor));
        let (sql, params) = stmt.build("SELECT * FROM playlists", &limit);

        assert_eq!(
            sql,
            "SELECT * FROM playlists \
             WHERE playlists.user_id = $1::UUID \
             AND (playlists.updated_at < $2::TIMESTAMPTZ \
              OR (playlists.updated_at = $2::TIMESTAMPTZ \
             AND playlists.id < $3::UUID)) \
             ORDER BY playlists.updated_at DESC, playlists.id DESC \
             LIMIT $4::INT8",
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn fetches_one_extra_row() {
        let args = Arguments::<()>::new(Limit::new(20).unwrap(), None);

        assert_eq!(fetch_limit(&args), 21);
    }

    #[test]
    fn omits_containment_subquery_without_video() {
        assert_eq!(aggregate::contains_video(None), "FALSE AS contains_video");
        assert!(!aggregate::contains_video(None).contains("EXISTS"));

        let sql = aggregate::contains_video(Some(2));
        assert!(sql.starts_with("EXISTS(SELECT 1"), "{sql}");
        assert!(sql.contains("pv.video_id = $2::UUID"), "{sql}");
    }

    #[test]
    fn counts_reactions_by_kind() {
        let sql = aggregate::video_stats();

        assert!(sql.contains("video_reactions.kind = 1::INT2"), "{sql}");
        assert!(sql.contains("video_reactions.kind = 2::INT2"), "{sql}");
        assert!(sql.ends_with("AS dislike_count"), "{sql}");
    }
}
