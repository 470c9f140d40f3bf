//! [`Command`] for signing in with a Google account.

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::Config;
use crate::{
    domain::Account,
    infra::{storage, Storage},
    SessionManager,
};

use super::Command;

/// [`Command`] for signing in with a Google account.
///
/// Simulates the OAuth round trip, always yielding the [`Config`]ured
/// Google [`Account`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GoogleLogin;

impl<St> Command<GoogleLogin> for SessionManager<St>
where
    St: Storage<
        Insert<(storage::Key, String)>,
        Ok = (),
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Account;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: GoogleLogin) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let _loading = self.start_loading();
        self.round_trip().await;

        let account = self.config().google_account.clone();
        self.persist(&account)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        self.publish(Some(account.clone()));

        log::info!("`Account(id: {})` signed in with Google", account.id);
        Ok(account)
    }
}

/// Error of [`GoogleLogin`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),
}

#[cfg(test)]
mod spec {
    use crate::command::{spec::manager, Command as _};

    use super::GoogleLogin;

    #[tokio::test]
    async fn always_yields_mock_account() {
        let manager = manager();

        let account = manager.execute(GoogleLogin).await.unwrap();

        assert_eq!(account.email.as_ref(), "user@gmail.com");
        assert_eq!(account.name.as_ref(), "Google User");
        assert_eq!(manager.session().user(), Some(&account));
        assert!(!manager.session().is_loading());
    }
}
