//! [`Session`] definitions.

use crate::domain::Account;

/// Snapshot of the authentication state.
///
/// The signed-in [`Account`] is either fully present or absent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    /// Signed-in [`Account`], if any.
    user: Option<Account>,

    /// Indicator whether an authentication operation is in flight.
    loading: bool,

    /// Indicator whether the persisted session has been consulted.
    restored: bool,
}

/// [`Phase`] of a [`Session`] lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Persisted session is still being consulted at startup.
    Loading,

    /// Authentication operation is in flight.
    Authenticating,

    /// [`Account`] is signed in.
    Authenticated,

    /// No [`Account`] is signed in.
    Unauthenticated,
}

impl Session {
    /// Initial [`Session`] of a process, before the persisted one is
    /// restored.
    #[must_use]
    pub const fn restoring() -> Self {
        Self {
            user: None,
            loading: true,
            restored: false,
        }
    }

    /// Resolved [`Session`] without a signed-in [`Account`].
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            user: None,
            loading: false,
            restored: true,
        }
    }

    /// Resolved [`Session`] of the provided [`Account`].
    #[must_use]
    pub const fn authenticated(account: Account) -> Self {
        Self {
            user: Some(account),
            loading: false,
            restored: true,
        }
    }

    /// Returns the signed-in [`Account`], if any.
    #[must_use]
    pub fn user(&self) -> Option<&Account> {
        self.user.as_ref()
    }

    /// Indicates whether an [`Account`] is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Indicates whether this [`Session`] is being restored or an
    /// authentication operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns the current [`Phase`] of this [`Session`].
    #[must_use]
    pub fn phase(&self) -> Phase {
        if !self.restored {
            Phase::Loading
        } else if self.loading {
            Phase::Authenticating
        } else if self.user.is_some() {
            Phase::Authenticated
        } else {
            Phase::Unauthenticated
        }
    }

    /// Marks an authentication operation as started or finished.
    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Resolves this [`Session`] to the provided [`Account`] (or its
    /// absence).
    pub(crate) fn resolve(&mut self, user: Option<Account>) {
        self.user = user;
        self.restored = true;
    }

    /// Finishes any in-flight operation, keeping the current [`Account`].
    ///
    /// An unresolved [`Session`] becomes resolved to the current [`Account`].
    pub(crate) fn settle(&mut self) {
        self.loading = false;
        self.restored = true;
    }
}
