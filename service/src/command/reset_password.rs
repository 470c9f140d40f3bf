//! [`Command`] for setting a new password by a reset token.

use derive_more::{Display, Error};
use secrecy::SecretBox;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::{domain::Session, Config};
use crate::{
    domain::account::{Password, ResetToken},
    SessionManager,
};

use super::Command;

/// [`Command`] for setting a new [`Password`] by a [`ResetToken`].
///
/// Never touches the current [`Session`].
#[derive(Clone, Debug)]
pub struct ResetPassword {
    /// [`ResetToken`] from the reset link.
    pub token: ResetToken,

    /// New [`Password`].
    pub password: SecretBox<Password>,
}

impl<St> Command<ResetPassword> for SessionManager<St> {
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ResetPassword,
    ) -> Result<Self::Ok, Self::Err> {
        let _loading = self.start_loading();
        self.round_trip().await;

        if cmd.token != self.config().reset_token {
            log::info!("rejected password reset by unknown token");
            return Err(tracerr::new!(ExecutionError::InvalidOrExpiredToken));
        }

        log::info!("password has been reset");
        Ok(())
    }
}

/// Error of [`ResetPassword`] [`Command`] execution.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ExecutionError {
    /// [`ResetToken`] is not the [`Config`]ured one.
    #[display("Invalid or expired reset token")]
    InvalidOrExpiredToken,
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{
            spec::{login, manager},
            Command as _,
        },
        domain::account::Password,
    };

    use super::{ExecutionError, ResetPassword};

    fn reset(token: &str) -> ResetPassword {
        ResetPassword {
            token: token.into(),
            password: SecretBox::new(Box::new(Password::new("new-secret").unwrap())),
        }
    }

    #[tokio::test]
    async fn accepts_only_valid_token() {
        let manager = manager();

        assert!(manager.execute(reset("valid-token")).await.is_ok());

        let err = manager.execute(reset("expired")).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidOrExpiredToken,
        ));
        assert_eq!(err.to_string(), "Invalid or expired reset token");
    }

    #[tokio::test]
    async fn keeps_session() {
        let manager = manager();
        let account = manager
            .execute(login("admin@example.com", "admin123"))
            .await
            .unwrap();

        _ = manager.execute(reset("valid-token")).await.unwrap();
        _ = manager.execute(reset("nope")).await.unwrap_err();

        assert_eq!(manager.session().user(), Some(&account));
    }
}
