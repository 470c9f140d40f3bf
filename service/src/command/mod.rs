//! [`Command`] definition.

pub mod forgot_password;
pub mod google_login;
pub mod login;
pub mod logout;
pub mod register;
pub mod reset_password;
pub mod restore_session;

use std::{error::Error as StdError, fmt};

use tokio_util::sync::CancellationToken;

use crate::SessionManager;

/// [`Command`] of the [`SessionManager`].
pub use common::Handler as Command;

pub use self::{
    forgot_password::ForgotPassword, google_login::GoogleLogin, login::Login,
    logout::Logout, register::Register, reset_password::ResetPassword,
    restore_session::RestoreSession,
};

/// [`Command`] which may be cancelled via its [`CancellationToken`].
///
/// A cancelled [`Command`] is dropped at its current suspension point.
#[derive(Clone, Debug)]
pub struct Cancellable<C> {
    /// Wrapped [`Command`].
    pub command: C,

    /// [`CancellationToken`] interrupting the [`Cancellable::command`].
    pub token: CancellationToken,
}

impl<C> Cancellable<C> {
    /// Wraps the provided `command` to be interrupted by the provided
    /// [`CancellationToken`].
    #[must_use]
    pub const fn new(command: C, token: CancellationToken) -> Self {
        Self { command, token }
    }
}

impl<St, C> Command<Cancellable<C>> for SessionManager<St>
where
    Self: Command<C>,
{
    type Ok = <Self as Command<C>>::Ok;
    type Err = Interrupted<<Self as Command<C>>::Err>;

    async fn execute(
        &self,
        cmd: Cancellable<C>,
    ) -> Result<Self::Ok, Self::Err> {
        let Cancellable { command, token } = cmd;

        tokio::select! {
            biased;
            () = token.cancelled() => Err(Interrupted::Cancelled),
            res = <Self as Command<C>>::execute(self, command) => {
                res.map_err(Interrupted::Failed)
            }
        }
    }
}

/// Error of a [`Cancellable`] [`Command`] execution.
#[derive(Debug)]
pub enum Interrupted<E> {
    /// [`Command`] failed on its own.
    Failed(E),

    /// [`Command`] was cancelled before completion.
    Cancelled,
}

impl<E: fmt::Display> fmt::Display for Interrupted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(e) => fmt::Display::fmt(e, f),
            Self::Cancelled => f.write_str("Operation was cancelled"),
        }
    }
}

impl<E: StdError + 'static> StdError for Interrupted<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Cancelled => None,
        }
    }
}

impl<E> From<E> for Interrupted<E> {
    fn from(e: E) -> Self {
        Self::Failed(e)
    }
}
