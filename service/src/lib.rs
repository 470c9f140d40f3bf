//! Service contains the core of the administration dashboard: session
//! lifecycle, resource stores, form validation and route guarding.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod guard;
pub mod infra;
pub mod query;
pub mod store;
pub mod validation;

use std::{sync::Arc, time::Duration};

use common::operations::{By, Delete, Insert, Select};
use secrecy::SecretBox;
use smart_default::SmartDefault;
use tokio::sync::watch;
use tracerr::Traced;
use tracing as log;

use self::{
    domain::{
        account::{self, Email, Name, Password, ResetToken},
        Account, Session,
    },
    infra::storage,
};

pub use self::{
    command::Command, guard::RouteGuard, query::Query,
    store::ResourceListStore,
};

/// [`SessionManager`] configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// [`Account`] signing in with the [`Config::password`].
    #[default(account("1", "admin@example.com", "Admin User"))]
    pub account: Account,

    /// The only [`Password`] accepted for the [`Config::account`].
    #[default(SecretBox::new(Box::new(password("admin123"))))]
    pub password: SecretBox<Password>,

    /// The only [`ResetToken`] considered valid and unexpired.
    #[default(ResetToken::from("valid-token"))]
    pub reset_token: ResetToken,

    /// [`Account`] yielded by a Google sign-in.
    #[default(account("google-user", "user@gmail.com", "Google User"))]
    pub google_account: Account,

    /// Simulated latency of every authentication round trip.
    #[default(Duration::from_secs(1))]
    pub latency: Duration,

    /// [`storage::Key`] of the persisted [`Session`] slot.
    #[default(storage::Key::from("user"))]
    pub storage_key: storage::Key,
}

/// Builds a default [`Account`] out of literals known to be valid.
fn account(id: &str, email: &str, name: &str) -> Account {
    Account {
        id: account::Id::from(id),
        email: Email::new(email)
            .unwrap_or_else(|| unreachable!("valid `Email` literal")),
        name: Name::new(name)
            .unwrap_or_else(|| unreachable!("valid `Name` literal")),
    }
}

/// Builds a default [`Password`] out of a literal known to be valid.
fn password(password: &str) -> Password {
    Password::new(password)
        .unwrap_or_else(|| unreachable!("valid `Password` literal"))
}

/// Owner of the authentication [`Session`] and the only writer of its
/// persisted slot.
#[derive(Clone, Debug)]
pub struct SessionManager<St> {
    /// Configuration of this [`SessionManager`].
    config: Arc<Config>,

    /// [`infra::Storage`] of the persisted [`Session`] slot.
    storage: St,

    /// Current [`Session`] published to the subscribers.
    state: Arc<watch::Sender<Session>>,
}

impl<St> SessionManager<St> {
    /// Creates a new [`SessionManager`] with a [`Session`] still being
    /// restored.
    #[must_use]
    pub fn new(config: Config, storage: St) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            state: Arc::new(watch::Sender::new(Session::restoring())),
        }
    }

    /// Returns [`Config`] of this [`SessionManager`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`infra::Storage`] of this [`SessionManager`].
    #[must_use]
    pub fn storage(&self) -> &St {
        &self.storage
    }

    /// Returns a snapshot of the current [`Session`].
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Subscribes to the [`Session`] changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Marks an authentication operation as in flight until the returned
    /// [`Loading`] guard is dropped.
    fn start_loading(&self) -> Loading<'_> {
        self.state.send_modify(|s| s.set_loading(true));
        Loading(&self.state)
    }

    /// Publishes the provided [`Account`] (or its absence) as the current
    /// [`Session`] user.
    fn publish(&self, user: Option<Account>) {
        self.state.send_modify(|s| s.resolve(user));
    }

    /// Simulates a round trip to the authentication backend.
    async fn round_trip(&self) {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
    }

    /// Persists the provided [`Account`] into the [`Session`] slot.
    async fn persist(
        &self,
        account: &Account,
    ) -> Result<(), Traced<storage::Error>>
    where
        St: infra::Storage<
            Insert<(storage::Key, String)>,
            Ok = (),
            Err = Traced<storage::Error>,
        >,
    {
        let json = serde_json::to_string(account)
            .map_err(tracerr::from_and_wrap!(=> storage::Error))?;
        self.storage
            .execute(Insert((self.config.storage_key.clone(), json)))
            .await
            .map_err(tracerr::wrap!())?;
        log::debug!("persisted `Session` of `Account(id: {})`", account.id);
        Ok(())
    }

    /// Clears the persisted [`Session`] slot, logging a failure instead of
    /// returning it.
    async fn clear(&self)
    where
        St: infra::Storage<
            Delete<storage::Key>,
            Ok = (),
            Err = Traced<storage::Error>,
        >,
    {
        if let Err(e) = self
            .storage
            .execute(Delete(self.config.storage_key.clone()))
            .await
        {
            log::error!("failed to clear persisted `Session`: {e}");
        }
    }

    /// Reads the raw persisted [`Session`] slot, if any.
    async fn load(&self) -> Result<Option<String>, Traced<storage::Error>>
    where
        St: infra::Storage<
            Select<By<Option<String>, storage::Key>>,
            Ok = Option<String>,
            Err = Traced<storage::Error>,
        >,
    {
        self.storage
            .execute(Select(By::new(self.config.storage_key.clone())))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Guard resetting the loading flag of a [`Session`] once dropped, so an
/// interrupted operation never leaves it loading.
#[derive(Debug)]
struct Loading<'s>(&'s watch::Sender<Session>);

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.send_modify(Session::settle);
    }
}
