//! [`Directory`] of the platform users fetched from a remote source.

#[cfg(feature = "http")]
pub mod http;

use common::Date;
use derive_more::{Display, Error as StdError, From};
use serde::Deserialize;
use tracerr::Traced;

#[cfg(feature = "http")]
pub use self::http::Http;
use crate::domain::{
    record::{self, Activity},
    user::Role,
    Record, User,
};

/// Directory operation.
pub use common::Handler as Directory;

/// Listing of every user known to a [`Directory`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Listing;

/// User entry as listed by a [`Directory`].
///
/// Fields besides the listed ones are ignored.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Entry {
    /// ID of this [`Entry`] in the [`Directory`].
    pub id: u64,

    /// Full name of the user.
    pub name: String,

    /// Email address of the user.
    pub email: String,
}

impl Entry {
    /// Remaps this [`Entry`] into a [`User`] [`Record`] registered on the
    /// provided `day`.
    ///
    /// Imported users are always active customers.
    #[must_use]
    pub fn into_record(self, day: Date) -> Record<User> {
        Record {
            id: record::Id::from(self.id),
            fields: User {
                name: self.name,
                email: self.email,
                role: Role::Customer,
                registered_on: day.coerce(),
                status: Activity::Active,
            },
        }
    }
}

/// Parses a JSON array of [`Entry`]s out of the provided `body`.
///
/// # Errors
///
/// If the `body` is not a JSON array of [`Entry`]s.
pub fn parse_listing(body: &[u8]) -> Result<Vec<Entry>, Traced<Error>> {
    serde_json::from_slice(body).map_err(tracerr::from_and_wrap!(=> Error))
}

/// [`Directory`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Http`] request failed.
    #[cfg(feature = "http")]
    #[display("HTTP request failed: {_0}")]
    Http(reqwest::Error),

    /// Listing is not a JSON array of [`Entry`]s.
    #[display("Malformed listing: {_0}")]
    Malformed(serde_json::Error),
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::domain::{
        record::{self, Activity},
        user::Role,
    };

    use super::{parse_listing, Entry, Error};

    #[test]
    fn remaps_entries_into_active_customers() {
        let entries: Vec<Entry> = serde_json::from_str(
            r#"[{
                "id": 3,
                "name": "Clementine Bauch",
                "username": "Samantha",
                "email": "Nathan@yesenia.net",
                "address": {"city": "McKenziehaven"}
            }]"#,
        )
        .unwrap();
        let day = Date::from_ymd(2024, 3, 15).unwrap();

        let records = entries
            .into_iter()
            .map(|e| e.into_record(day))
            .collect::<Vec<_>>();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record::Id::from(3_u64));
        assert_eq!(records[0].name, "Clementine Bauch");
        assert_eq!(records[0].email, "Nathan@yesenia.net");
        assert_eq!(records[0].role, Role::Customer);
        assert_eq!(records[0].status, Activity::Active);
        assert_eq!(records[0].registered_on.to_string(), "2024-03-15");
    }

    #[test]
    fn reports_malformed_listing() {
        let err = parse_listing(br#"{"users": []}"#).unwrap_err();
        assert!(matches!(err.as_ref(), Error::Malformed(_)));

        let entries = parse_listing(
            br#"[{"id": 1, "name": "Leanne Graham", "email": "a@b.io"}]"#,
        )
        .unwrap();
        assert_eq!(entries[0].id, 1);
    }
}
