//! [`Command`] for signing in with credentials.

use common::operations::Insert;
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::{domain::Session, Config};
use crate::{
    domain::{
        account::{Email, Password},
        Account,
    },
    infra::{storage, Storage},
    SessionManager,
};

use super::Command;

/// [`Command`] for signing in with credentials.
#[derive(Clone, Debug)]
pub struct Login {
    /// [`Email`] of the [`Account`] to sign in.
    pub email: Email,

    /// [`Password`] of the [`Account`] to sign in.
    pub password: SecretBox<Password>,
}

impl<St> Command<Login> for SessionManager<St>
where
    St: Storage<
        Insert<(storage::Key, String)>,
        Ok = (),
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Account;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: Login) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Login { email, password } = cmd;

        let _loading = self.start_loading();
        self.round_trip().await;

        let config = self.config();
        if !email.matches(&config.account.email)
            || password.expose_secret() != config.password.expose_secret()
        {
            log::info!("rejected sign-in attempt of `{email}`");
            return Err(tracerr::new!(E::InvalidCredentials));
        }

        let account = config.account.clone();
        self.persist(&account)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        self.publish(Some(account.clone()));

        log::info!("`Account(id: {})` signed in", account.id);
        Ok(account)
    }
}

/// Error of [`Login`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Credentials do not match the [`Config`]ured ones.
    #[display("Invalid email or password")]
    InvalidCredentials,

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),
}
