//! [`Query`] definition.

use std::convert::Infallible;

use crate::{domain::Session, SessionManager};

/// [`Query`] of the [`SessionManager`].
pub use common::Handler as Query;

/// [`Query`] of the current [`Session`] snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentSession;

impl<St> Query<CurrentSession> for SessionManager<St> {
    type Ok = Session;
    type Err = Infallible;

    async fn execute(&self, _: CurrentSession) -> Result<Self::Ok, Self::Err> {
        Ok(self.session())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{
            spec::{login, manager},
            Command as _, RestoreSession,
        },
        domain::session::Phase,
    };

    use super::{CurrentSession, Query as _};

    #[tokio::test]
    async fn reflects_latest_session() {
        let manager = manager();
        let session = manager.execute(CurrentSession).await.unwrap();
        assert_eq!(session.phase(), Phase::Loading);

        _ = manager.execute(RestoreSession).await.unwrap();
        _ = manager
            .execute(login("admin@example.com", "admin123"))
            .await
            .unwrap();

        let session = manager.execute(CurrentSession).await.unwrap();
        assert_eq!(session.phase(), Phase::Authenticated);
    }
}
