//! Postgres [`Database`] implementation.

pub mod client;
pub mod connection;
mod impls;
mod keyset;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::{error::SqlState, NoTls};
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{client::NonTx, connection::Connection};

pub use deadpool_postgres::Config;

/// Postgres [`Database`] client.
#[derive(Clone, Copy, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Creates a new [`Postgres`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to create a new [`Postgres`] client.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self(NonTx::from_pool(pool)))
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// [`Connection`] error.
    #[display("`Connection` error: {_0}")]
    Connection(connection::Error),

    /// Error of creating a new [`connection::Pool`] client.
    #[display("Failed to create a new `connection::Pool`: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// [`connection::Pool`] error.
    #[display("`connection::Pool` error: {_0}")]
    PoolError(connection::PoolError),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::Connection(e) => {
                e.code() == Some(&SqlState::UNIQUE_VIOLATION)
                    && constraint.map_or(true, |c| {
                        e.as_db_error().and_then(|e| e.constraint()) == Some(c)
                    })
            }
            Self::PoolError(..) | Self::PoolCreationError(..) => false,
        }
    }

    /// Checks if the error is caused by the database being unreachable or
    /// overloaded at the moment.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        use connection::PoolError as E;

        match self {
            Self::Connection(e) | Self::PoolError(E::Backend(e)) => {
                is_unavailable(e)
            }
            Self::PoolError(E::Timeout(_)) => true,
            Self::PoolError(
                E::Closed | E::NoRuntimeSpecified | E::PostCreateHook(_),
            )
            | Self::PoolCreationError(..) => false,
        }
    }
}

/// Checks if the provided [`connection::Error`] means the database cannot be
/// reached or cannot serve requests at the moment.
fn is_unavailable(e: &connection::Error) -> bool {
    e.is_closed()
        || std::error::Error::source(e)
            .is_some_and(|s| s.is::<std::io::Error>())
        || e.code().is_some_and(|c| TRANSIENT_STATES.contains(c))
}

/// [`SqlState`]s reported when the database cannot serve a request at the
/// moment, regardless of the request itself.
const TRANSIENT_STATES: &[SqlState] = &[
    SqlState::CONNECTION_EXCEPTION,
    SqlState::CONNECTION_FAILURE,
    SqlState::SQLCLIENT_UNABLE_TO_ESTABLISH_SQLCONNECTION,
    SqlState::ADMIN_SHUTDOWN,
    SqlState::CRASH_SHUTDOWN,
    SqlState::CANNOT_CONNECT_NOW,
    SqlState::TOO_MANY_CONNECTIONS,
    SqlState::QUERY_CANCELED,
];

#[cfg(test)]
mod spec {
    use deadpool_postgres::TimeoutType;

    use super::{connection::PoolError, Error};

    #[test]
    fn pool_timeouts_are_transient() {
        for kind in [TimeoutType::Wait, TimeoutType::Create] {
            assert!(Error::PoolError(PoolError::Timeout(kind)).is_transient());
        }
    }

    #[test]
    fn misconfigured_pool_is_not_transient() {
        assert!(!Error::PoolError(PoolError::Closed).is_transient());
        assert!(
            !Error::PoolError(PoolError::NoRuntimeSpecified).is_transient(),
        );
    }
}
