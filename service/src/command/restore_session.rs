//! [`Command`] for restoring the persisted [`Session`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Session;
use crate::{
    domain::Account,
    infra::{storage, Storage},
    SessionManager,
};

use super::Command;

/// [`Command`] for restoring the persisted [`Session`] at startup.
///
/// Malformed persisted data (either the slot itself or the whole
/// [`Storage`] contents) is discarded and its slot cleared. Whatever happens,
/// the [`Session`] leaves its loading phase.
#[derive(Clone, Copy, Debug, Default)]
pub struct RestoreSession;

impl<St> Command<RestoreSession> for SessionManager<St>
where
    St: Storage<
            Select<By<Option<String>, storage::Key>>,
            Ok = Option<String>,
            Err = Traced<storage::Error>,
        > + Storage<Delete<storage::Key>, Ok = (), Err = Traced<storage::Error>>,
{
    type Ok = Option<Account>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: RestoreSession) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let _loading = self.start_loading();

        let loaded = self
            .load()
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E));
        let raw = match loaded {
            Ok(raw) => raw,
            Err(e)
                if matches!(e.as_ref(), E::Storage(storage::Error::Json(_))) =>
            {
                log::warn!("discarding malformed `Storage` contents: {e}");
                self.clear().await;
                None
            }
            Err(e) => {
                self.publish(None);
                return Err(e);
            }
        };

        let parsed = raw.map(|json| serde_json::from_str::<Account>(&json));
        let account = match parsed {
            None => None,
            Some(Ok(account)) => Some(account),
            Some(Err(e)) => {
                log::warn!("discarding malformed persisted `Session`: {e}");
                self.clear().await;
                None
            }
        };
        self.publish(account.clone());

        match &account {
            Some(a) => {
                log::info!("restored `Session` of `Account(id: {})`", a.id);
            }
            None => log::debug!("no `Session` to restore"),
        }
        Ok(account)
    }
}

/// Error of [`RestoreSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),
}
