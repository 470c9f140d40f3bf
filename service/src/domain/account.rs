//! [`Account`] definitions.

use derive_more::{AsRef, Display, From, Into};
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation;

/// Account of the person signed into the dashboard.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Account {
    /// ID of this [`Account`].
    pub id: Id,

    /// [`Email`] of this [`Account`].
    pub email: Email,

    /// Display [`Name`] of this [`Account`].
    pub name: Name,
}

/// Opaque ID of an [`Account`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, From, Hash, PartialEq, Serialize,
)]
#[as_ref(str)]
#[from(&str, String)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

/// Email address of an [`Account`].
#[derive(AsRef, Clone, Debug, Deserialize, Display, Eq, Into, PartialEq, Serialize)]
#[as_ref(str)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    ///
    /// Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into().trim().to_owned();
        validation::is_email(&address).then_some(Self(address))
    }

    /// Compares this [`Email`] with the `other` one ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl TryFrom<String> for Email {
    type Error = &'static str;

    fn try_from(address: String) -> Result<Self, Self::Error> {
        Self::new(address).ok_or("invalid `Email`")
    }
}

impl std::str::FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Display name of an [`Account`].
#[derive(AsRef, Clone, Debug, Deserialize, Display, Eq, Into, PartialEq, Serialize)]
#[as_ref(str)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: &str) -> bool {
        name.trim() == name && !name.is_empty() && name.chars().count() <= 100
    }
}

impl TryFrom<String> for Name {
    type Error = &'static str;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name).ok_or("invalid `Name`")
    }
}

impl std::str::FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Password of an [`Account`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: &str) -> bool {
        (6..=128).contains(&password.chars().count())
    }
}

impl std::str::FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`: expected 6 to 128 characters")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Token authorizing a password reset.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(&str, String)]
pub struct ResetToken(String);

#[cfg(test)]
mod spec {
    use super::{Account, Email, Name, Password};

    #[test]
    fn persists_as_flat_json() {
        let account = Account {
            id: "1".into(),
            email: Email::new("admin@example.com").unwrap(),
            name: Name::new("Admin User").unwrap(),
        };

        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(
            json,
            r#"{"id":"1","email":"admin@example.com","name":"Admin User"}"#,
        );
        assert_eq!(serde_json::from_str::<Account>(&json).unwrap(), account);
    }

    #[test]
    fn rejects_malformed_persisted_fields() {
        assert!(serde_json::from_str::<Account>(
            r#"{"id":"1","email":"not-an-email","name":"Admin"}"#,
        )
        .is_err());
        assert!(serde_json::from_str::<Account>(
            r#"{"id":"1","email":"a@b.co","name":""}"#,
        )
        .is_err());
        assert!(serde_json::from_str::<Account>(r#"{"id":"1"}"#).is_err());
    }

    #[test]
    fn compares_emails_ignoring_case() {
        let a = Email::new(" Admin@Example.com ").unwrap();
        let b = Email::new("admin@example.com").unwrap();

        assert!(a.matches(&b));
        assert_eq!(a.as_ref(), "Admin@Example.com");
    }

    #[test]
    fn checks_password_length() {
        assert!(Password::new("12345").is_none());
        assert!(Password::new("123456").is_some());
        assert!(Password::new("x".repeat(129)).is_none());
    }
}
