//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of a [`User`] joined as `users`, parsed by [`from_row()`].
pub(super) const COLUMNS: &str = "\
    users.id AS user_id, \
    users.name AS user_name, \
    users.image_url AS user_image_url, \
    users.created_at AS user_created_at, \
    users.updated_at AS user_updated_at";

/// Parses a [`User`] selected via [`COLUMNS`] out of the provided [`Row`].
pub(super) fn from_row(row: &Row) -> User {
    User {
        id: row.get("user_id"),
        name: row.get("user_name"),
        image_url: row.get("user_image_url"),
        created_at: row.get("user_created_at"),
        updated_at: row.get("user_updated_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE users.id = $1::UUID \
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
