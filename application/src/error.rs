//! [`Error`]-related definitions.

use std::{convert::Infallible, fmt};

use derive_more::Error as StdError;
use itertools::Itertools as _;
use service::{
    command::Interrupted,
    guard,
    infra::{directory, storage},
    store,
    validation::FieldErrors,
};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            message: $message.to_owned(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// User-facing [`Error`] shown as a notification.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Code of an unexpected [`Error`].
    pub const INTERNAL: Code = "INTERNAL";

    /// Creates a new [`Error`] representing an unexpected failure.
    ///
    /// Details are never shown to the user, so the message is generic.
    #[must_use]
    pub fn internal() -> Self {
        Self {
            code: Self::INTERNAL,
            message: "Something went wrong".to_owned(),
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] with the provided `code` and `message`.
    #[must_use]
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            backtrace: None,
        }
    }

    /// Indicates whether this [`Error`] represents an unexpected failure.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.code == Self::INTERNAL
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error {
        self.try_as_error().unwrap_or_else(Error::internal)
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl<E: AsError> AsError for Interrupted<E> {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CANCELLED"]
                #[message = "Operation was cancelled"]
                Cancelled,
            }
        }

        match self {
            Self::Failed(e) => e.try_as_error(),
            Self::Cancelled => Some(Error::Cancelled.into()),
        }
    }
}

impl AsError for Infallible {
    fn try_as_error(&self) -> Option<Error> {
        match *self {}
    }
}

impl AsError for FieldErrors {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new("INVALID_INPUT", self.to_string()))
    }
}

impl AsError for store::NotFound {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new("NOT_FOUND", format!("Record #{} does not exist", self.0)))
    }
}

impl AsError for store::SubmitError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Invalid(e) => e.try_as_error(),
            Self::NotFound(e) => e.try_as_error(),
            Self::Exhausted(e) => e.try_as_error(),
        }
    }
}

impl AsError for store::Exhausted {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new(
            "RECORDS_EXHAUSTED",
            "No more records can be created",
        ))
    }
}

impl AsError for guard::ParseError {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for storage::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for directory::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use service::{command::Interrupted, store::NotFound, validation::FieldErrors};

    use super::{AsError as _, Error};

    #[test]
    fn maps_expected_failures() {
        let err = NotFound(7_u64.into()).as_error();
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.message, "Record #7 does not exist");

        let err = FieldErrors::single("name", "Name is required").as_error();
        assert_eq!(err.code, "INVALID_INPUT");
        assert_eq!(err.message, "Name is required");

        let err = Interrupted::<FieldErrors>::Cancelled.as_error();
        assert_eq!(err.code, "CANCELLED");
    }

    #[test]
    fn hides_unexpected_failures() {
        let io = std::io::Error::other("disk on fire");
        let err = service::infra::storage::Error::from(io).as_error();

        assert!(err.is_internal());
        assert_eq!(err.message, "Something went wrong");
        assert_eq!(err.to_string(), "[INTERNAL]: Something went wrong");
        assert_eq!(Error::internal().message, err.message);
    }
}
