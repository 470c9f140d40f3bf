//! Authentication intents of a [`Dashboard`].

use std::sync::LazyLock;

use common::operations::{By, Delete, Insert, Select};
use secrecy::SecretBox;
use service::{
    command::{self, login, reset_password},
    domain::account::{Email, Name, Password, ResetToken},
    guard::Route,
    infra::{storage, Storage},
    validation::{Field, FieldErrors, Form, Schema, Valid, Value},
};
use tracerr::Traced;

use crate::{define_error, AsError, Error};

use super::Dashboard;

/// Sign-in form.
static LOGIN: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new([Field::email("email").required(), password("password")])
});

/// Registration form.
static REGISTER: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new([
        Field::text("name").length(Some(2), Some(100)).required(),
        Field::email("email").required(),
        password("password"),
        Field::text("confirm_password")
            .label("Password confirmation")
            .verbatim()
            .required(),
    ])
});

/// Password reset request form.
static FORGOT_PASSWORD: LazyLock<Schema> =
    LazyLock::new(|| Schema::new([Field::email("email").required()]));

/// New password form.
static RESET_PASSWORD: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new([
        password("password"),
        Field::text("confirm_password")
            .label("Password confirmation")
            .verbatim()
            .required(),
    ])
});

/// Declares a required password [`Field`], taken untrimmed.
fn password(name: &'static str) -> Field {
    Field::text(name).length(Some(6), Some(128)).verbatim().required()
}

impl<St, Dir> Dashboard<St, Dir>
where
    St: Storage<
            Select<By<Option<String>, storage::Key>>,
            Ok = Option<String>,
            Err = Traced<storage::Error>,
        > + Storage<
            Insert<(storage::Key, String)>,
            Ok = (),
            Err = Traced<storage::Error>,
        > + Storage<Delete<storage::Key>, Ok = (), Err = Traced<storage::Error>>,
{
    /// Restores the persisted session and re-evaluates the current location.
    ///
    /// Returns `false` if the persisted session could not be read, in which
    /// case the dashboard proceeds signed out.
    pub async fn restore(&mut self) -> bool {
        let restored = match self.run(command::RestoreSession).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("failed to restore `Session`: {e}");
                false
            }
        };
        let location = self.location.clone();
        _ = self.go(location);
        restored
    }

    /// Signs in with the provided credentials.
    ///
    /// Navigates to the originally requested page (or the dashboard home) on
    /// success.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        let form = Form::new().with("email", email).with("password", password);
        let cmd = LOGIN.validate(&form).and_then(|mut v| {
            Ok(command::Login {
                email: email_of(&mut v)?,
                password: password_of(&mut v)?,
            })
        });
        let cmd = match cmd {
            Ok(cmd) => cmd,
            Err(e) => return self.fail(e),
        };

        match self.run(cmd).await {
            Ok(account) => self.enter(format!("Welcome back, {}", account.name)),
            Err(e) => self.fail(e),
        }
    }

    /// Signs in with the mock Google account.
    pub async fn google_login(&mut self) -> bool {
        match self.run(command::GoogleLogin).await {
            Ok(account) => self.enter(format!("Welcome, {}", account.name)),
            Err(e) => self.fail(e),
        }
    }

    /// Registers a new account and signs it in.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> bool {
        let form = Form::new()
            .with("name", name)
            .with("email", email)
            .with("password", password)
            .with("confirm_password", confirm_password);
        let cmd = REGISTER.validate(&form).and_then(|mut v| {
            confirmed(&mut v)?;
            Ok(command::Register {
                name: name_of(&mut v)?,
                email: email_of(&mut v)?,
                password: password_of(&mut v)?,
            })
        });
        let cmd = match cmd {
            Ok(cmd) => cmd,
            Err(e) => return self.fail(e),
        };

        match self.run(cmd).await {
            Ok(account) => self.enter(format!("Welcome, {}", account.name)),
            Err(e) => self.fail(e),
        }
    }

    /// Signs out and navigates to the sign-in page.
    pub async fn logout(&mut self) -> bool {
        match self.run(command::Logout).await {
            Ok(()) => {
                self.return_to = None;
                _ = self.go(Route::Login);
                self.succeed("Signed out")
            }
            Err(e) => self.fail(e),
        }
    }

    /// Requests a password reset link for the provided `email`.
    pub async fn forgot_password(&mut self, email: &str) -> bool {
        let form = Form::new().with("email", email);
        let cmd = FORGOT_PASSWORD.validate(&form).and_then(|mut v| {
            Ok(command::ForgotPassword {
                email: email_of(&mut v)?,
            })
        });
        let cmd = match cmd {
            Ok(cmd) => cmd,
            Err(e) => return self.fail(e),
        };

        match self.run(cmd).await {
            Ok(()) => self.succeed(
                "If an account exists for this email, a reset link has been \
                 sent",
            ),
            Err(e) => self.fail(e),
        }
    }

    /// Sets a new password by the reset token of the current location, or
    /// the provided `token` if any.
    ///
    /// Navigates to the sign-in page on success.
    pub async fn reset_password(
        &mut self,
        token: Option<&str>,
        password: &str,
        confirm_password: &str,
    ) -> bool {
        let token = match (token, &self.location) {
            (Some(t), _) => Some(ResetToken::from(t)),
            (None, Route::ResetPassword { token }) => token.clone(),
            (None, _) => None,
        };
        let Some(token) = token else {
            return self
                .fail(reset_password::ExecutionError::InvalidOrExpiredToken);
        };

        let form = Form::new()
            .with("password", password)
            .with("confirm_password", confirm_password);
        let cmd = RESET_PASSWORD.validate(&form).and_then(|mut v| {
            confirmed(&mut v)?;
            Ok(command::ResetPassword {
                token,
                password: password_of(&mut v)?,
            })
        });
        let cmd = match cmd {
            Ok(cmd) => cmd,
            Err(e) => return self.fail(e),
        };

        match self.run(cmd).await {
            Ok(()) => {
                _ = self.go(Route::Login);
                self.succeed("Password has been reset, sign in with it")
            }
            Err(e) => self.fail(e),
        }
    }

    /// Navigates to the page requested before signing in, reporting the
    /// provided `message`.
    fn enter(&mut self, message: String) -> bool {
        let target = self.return_to.take().unwrap_or(Route::Home);
        _ = self.go(target);
        self.succeed(message)
    }
}

/// Takes the validated `email` out of the provided [`Valid`] values.
fn email_of(valid: &mut Valid) -> Result<Email, FieldErrors> {
    Email::new(valid.required::<String>("email")?).ok_or_else(|| {
        FieldErrors::single("email", "Email must be a valid email address")
    })
}

/// Takes the validated `name` out of the provided [`Valid`] values.
fn name_of(valid: &mut Valid) -> Result<Name, FieldErrors> {
    Name::new(valid.required::<String>("name")?)
        .ok_or_else(|| FieldErrors::single("name", "Name is invalid"))
}

/// Takes the validated `password` out of the provided [`Valid`] values.
fn password_of(
    valid: &mut Valid,
) -> Result<SecretBox<Password>, FieldErrors> {
    let password = Password::new(valid.required::<String>("password")?)
        .ok_or_else(|| {
            FieldErrors::single(
                "password",
                "Password must be between 6 and 128 characters",
            )
        })?;
    Ok(SecretBox::new(Box::new(password)))
}

/// Checks the `confirm_password` of the provided [`Valid`] values matches
/// their `password`.
fn confirmed(valid: &mut Valid) -> Result<(), FieldErrors> {
    let confirmation = valid.required::<String>("confirm_password")?;
    let password = valid.get("password");
    if matches!(password, Some(Value::Text(p)) if *p == confirmation) {
        Ok(())
    } else {
        Err(FieldErrors::single(
            "confirm_password",
            "Passwords do not match",
        ))
    }
}

impl AsError for login::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_CREDENTIALS"]
                #[message = "Invalid email or password"]
                InvalidCredentials,
            }
        }

        match self {
            Self::InvalidCredentials => Some(Error::InvalidCredentials.into()),
            Self::Storage(e) => e.try_as_error(),
        }
    }
}

impl AsError for reset_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_RESET_TOKEN"]
                #[message = "Invalid or expired reset token"]
                InvalidOrExpiredToken,
            }
        }

        match self {
            Self::InvalidOrExpiredToken => {
                Some(Error::InvalidOrExpiredToken.into())
            }
        }
    }
}

impl AsError for command::google_login::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Storage(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::register::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Storage(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::restore_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Storage(e) => e.try_as_error(),
        }
    }
}
