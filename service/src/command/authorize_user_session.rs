//! [`Command`] for authorizing a [`User`] by a [`Session`] token.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a [`Session`] token.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        // `exp` claim is required and validated by default.
        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        self.database()
            .execute(Select(By::<Option<User>, _>::new(session.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(session.user_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use jsonwebtoken::{EncodingKey, Header};

    use crate::{
        domain::user::{self, session, Session},
        fixture, Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    fn token(
        user_id: user::Id,
        ttl: Duration,
        secret: &[u8],
    ) -> AuthorizeUserSession {
        let session = Session {
            user_id,
            expires_at: (DateTime::now() + ttl).coerce(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &session,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();
        #[expect(unsafe_code, reason = "freshly encoded")]
        let token = unsafe { session::Token::new_unchecked(token) };
        AuthorizeUserSession { token }
    }

    #[tokio::test]
    async fn authorizes_existing_user() {
        let svc = fixture::service();
        let user = fixture::user(svc.database()).await;

        let session = svc
            .execute(token(user.id, Duration::from_secs(60), fixture::SECRET))
            .await
            .unwrap();

        assert_eq!(session.user_id, user.id);
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let svc = fixture::service();

        let err = svc
            .execute(token(
                user::Id::new(),
                Duration::from_secs(60),
                fixture::SECRET,
            ))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::UserNotExists(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_foreign_signature() {
        let svc = fixture::service();
        let user = fixture::user(svc.database()).await;

        let err = svc
            .execute(token(user.id, Duration::from_secs(60), b"forged"))
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::JsonWebTokenDecodeError(_)),
            "{err}",
        );
    }
}
