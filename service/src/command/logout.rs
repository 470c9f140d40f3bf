//! [`Command`] for signing out.

use std::convert::Infallible;

use common::operations::Delete;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Session;
use crate::{
    infra::{storage, Storage},
    SessionManager,
};

use super::Command;

/// [`Command`] for signing out of the current [`Session`].
///
/// Idempotent: signing out without a signed-in account is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logout;

impl<St> Command<Logout> for SessionManager<St>
where
    St: Storage<Delete<storage::Key>, Ok = (), Err = Traced<storage::Error>>,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(&self, _: Logout) -> Result<Self::Ok, Self::Err> {
        let user = self.session().user().map(|u| u.id.clone());
        self.publish(None);

        // Failing to clear the slot must not keep the user signed in.
        self.clear().await;

        if let Some(id) = user {
            log::info!("`Account(id: {id})` signed out");
        }
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        command::{
            spec::{login, manager},
            Command as _,
        },
        domain::session::Phase,
        infra::storage::{Key, Storage as _},
    };

    use super::Logout;

    #[tokio::test]
    async fn clears_state_and_slot() {
        let manager = manager();
        _ = manager
            .execute(login("admin@example.com", "admin123"))
            .await
            .unwrap();

        manager.execute(Logout).await.unwrap();

        assert_eq!(manager.session().phase(), Phase::Unauthenticated);
        let persisted = manager
            .storage()
            .execute(Select(By::<Option<String>, _>::new(Key::from("user"))))
            .await
            .unwrap();
        assert_eq!(persisted, None);
    }

    #[tokio::test]
    async fn is_idempotent() {
        let manager = manager();

        manager.execute(Logout).await.unwrap();
        manager.execute(Logout).await.unwrap();

        assert!(!manager.session().is_authenticated());
    }
}
