//! [`Command`] for requesting a password reset.

use std::convert::Infallible;

use tracing as log;

use crate::{domain::account::Email, SessionManager};

use super::Command;

/// [`Command`] for requesting a password reset link to be sent.
///
/// Always succeeds, so whether an account exists is never revealed.
#[derive(Clone, Debug)]
pub struct ForgotPassword {
    /// [`Email`] to send the reset link to.
    pub email: Email,
}

impl<St> Command<ForgotPassword> for SessionManager<St> {
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        cmd: ForgotPassword,
    ) -> Result<Self::Ok, Self::Err> {
        let _loading = self.start_loading();
        self.round_trip().await;

        log::info!("password reset requested for `{}`", cmd.email);
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{spec::manager, Command as _},
        domain::account::Email,
    };

    use super::ForgotPassword;

    #[tokio::test]
    async fn succeeds_for_any_email() {
        let manager = manager();

        for email in ["admin@example.com", "nobody@example.com"] {
            let res = manager
                .execute(ForgotPassword {
                    email: Email::new(email).unwrap(),
                })
                .await;

            assert!(res.is_ok());
        }
        assert!(!manager.session().is_authenticated());
    }
}
