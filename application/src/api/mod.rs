//! GraphQL API definitions.

mod mutation;
pub mod playlist;
mod query;
pub mod user;
pub mod video;

use common::{pagination::token, Keyset, Limit};
use derive_more::{AsRef, Display, From, Into};
use juniper::{EmptySubscription, GraphQLScalar};
use serde::{de::DeserializeOwned, Serialize};

use crate::{define_error, Context, Error};

pub use self::{
    mutation::Mutation, playlist::Playlist, query::Query, user::User,
    video::Video,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

/// Opaque cursor pointing to an item of a list, to continue the list after.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[as_ref(str)]
#[graphql(name = "ListCursor", transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Encodes the provided [`Keyset`] into a [`Cursor`].
    ///
    /// # Errors
    ///
    /// If the [`Keyset`] fails to serialize.
    pub fn encode<V, I>(keyset: &Keyset<V, I>) -> Result<Self, Error>
    where
        V: Serialize,
        I: Serialize,
    {
        token::encode(keyset)
            .map(Self)
            .map_err(|e| Error::internal(&e))
    }

    /// Decodes a [`Keyset`] out of this [`Cursor`].
    ///
    /// # Errors
    ///
    /// With `INVALID_CURSOR` code, if this [`Cursor`] is malformed or was
    /// issued for another version of the API.
    pub fn decode<V, I>(&self) -> Result<Keyset<V, I>, Error>
    where
        V: DeserializeOwned,
        I: DeserializeOwned,
    {
        token::decode(&self.0).map_err(|e| {
            tracing::debug!("rejected `Cursor`: {e}");
            PaginationError::InvalidCursor.into()
        })
    }
}

/// Resolves the requested page `limit` into a [`Limit`].
///
/// # Errors
///
/// With `INVALID_LIMIT` code, if the `limit` is out of `1..=100` range.
pub fn limit(limit: Option<i32>, ctx: &Context) -> Result<Limit, Error> {
    limit.map_or_else(
        || Ok(ctx.service().config().default_page_size),
        |l| {
            Limit::new(l)
                .ok_or_else(|| PaginationError::InvalidLimit.into())
        },
    )
}

define_error! {
    enum PaginationError {
        #[code = "INVALID_LIMIT"]
        #[status = BAD_REQUEST]
        #[message = "Page limit must be within 1..=100 range"]
        InvalidLimit,

        #[code = "INVALID_CURSOR"]
        #[status = BAD_REQUEST]
        #[message = "Cursor is malformed or expired"]
        InvalidCursor,
    }
}

#[cfg(test)]
mod spec {
    use common::Keyset;

    use super::Cursor;

    #[test]
    fn decodes_issued_cursor() {
        let keyset = Keyset::new(1_700_000_000_000_000_i64, 42_u32);

        let cursor = Cursor::encode(&keyset).unwrap();

        assert!(cursor.as_ref().starts_with("1."), "{cursor}");
        assert_eq!(cursor.decode::<i64, u32>().unwrap(), keyset);
    }

    #[test]
    fn rejects_malformed_cursor() {
        for token in ["", "garbage", "2.eyJ2IjoxLCJpIjoxfQ", "1.!!!"] {
            let err = Cursor::from(token.to_owned())
                .decode::<i64, u32>()
                .unwrap_err();

            assert_eq!(err.code, "INVALID_CURSOR", "{token}");
            assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        }
    }
}
