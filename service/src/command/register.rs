//! [`Command`] for registering a new [`Account`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use secrecy::SecretBox;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        account::{self, Email, Name, Password},
        Account,
    },
    infra::{storage, Storage},
    SessionManager,
};

use super::Command;

/// [`Command`] for registering a new [`Account`] and signing it in.
///
/// Registration is never refused: no duplicate [`Email`] check is performed.
#[derive(Clone, Debug)]
pub struct Register {
    /// Display [`Name`] of the new [`Account`].
    pub name: Name,

    /// [`Email`] of the new [`Account`].
    pub email: Email,

    /// [`Password`] of the new [`Account`].
    pub password: SecretBox<Password>,
}

impl<St> Command<Register> for SessionManager<St>
where
    St: Storage<
        Insert<(storage::Key, String)>,
        Ok = (),
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Account;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: Register) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Register { name, email, .. } = cmd;

        let _loading = self.start_loading();
        self.round_trip().await;

        let account = Account {
            id: account::Id::new(),
            email,
            name,
        };
        self.persist(&account)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        self.publish(Some(account.clone()));

        log::info!("`Account(id: {})` registered", account.id);
        Ok(account)
    }
}

/// Error of [`Register`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{spec::manager, Command as _},
        domain::account::{Email, Name, Password},
    };

    use super::Register;

    fn register(name: &str, email: &str) -> Register {
        Register {
            name: Name::new(name).unwrap(),
            email: Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(Password::new("secret").unwrap())),
        }
    }

    #[tokio::test]
    async fn signs_in_registered_account() {
        let manager = manager();

        let account = manager
            .execute(register("Jane Doe", "jane@example.com"))
            .await
            .unwrap();

        assert_eq!(account.name.as_ref(), "Jane Doe");
        assert_eq!(account.email.as_ref(), "jane@example.com");
        assert_eq!(manager.session().user(), Some(&account));
    }

    #[tokio::test]
    async fn issues_fresh_ids_for_same_email() {
        let manager = manager();

        let first = manager
            .execute(register("Jane Doe", "jane@example.com"))
            .await
            .unwrap();
        let second = manager
            .execute(register("Jane Doe", "jane@example.com"))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
    }
}
