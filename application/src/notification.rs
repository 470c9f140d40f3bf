//! [`Notification`]-related definitions.

use std::collections::VecDeque;

use common::define_kind;
use derive_more::Display;
use tracing as log;

use crate::Error;

define_kind! {
    /// Kind of a [`Notification`].
    enum Level {
        /// Operation succeeded.
        Success,

        /// Operation failed.
        Error,
    }
}

/// Transient message shown to the user after an intent.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display("#{id} [{level}] {message}")]
pub struct Notification {
    /// ID of this [`Notification`] to dismiss it by.
    pub id: u64,

    /// [`Level`] of this [`Notification`].
    pub level: Level,

    /// Human-readable message.
    pub message: String,
}

/// Queue of the [`Notification`]s not dismissed yet.
#[derive(Debug, Default)]
pub struct Notifications {
    /// ID of the last pushed [`Notification`].
    last_id: u64,

    /// Pending [`Notification`]s, oldest first.
    queue: VecDeque<Notification>,
}

impl Notifications {
    /// Maximum number of [`Notification`]s kept; older ones are dropped.
    pub const CAPACITY: usize = 20;

    /// Pushes a new [`Notification`] and returns its ID.
    pub fn push(&mut self, level: Level, message: impl Into<String>) -> u64 {
        self.last_id += 1;
        let notification = Notification {
            id: self.last_id,
            level,
            message: message.into(),
        };
        log::debug!("notification {notification}");

        if self.queue.len() == Self::CAPACITY {
            drop(self.queue.pop_front());
        }
        self.queue.push_back(notification);
        self.last_id
    }

    /// Pushes a [`Level::Success`] [`Notification`].
    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(Level::Success, message)
    }

    /// Pushes a [`Level::Error`] [`Notification`] with the message of the
    /// provided [`Error`].
    pub fn error(&mut self, error: &Error) -> u64 {
        self.push(Level::Error, error.message.clone())
    }

    /// Dismisses the [`Notification`] with the provided `id`.
    ///
    /// Returns `false` if there is no such [`Notification`].
    pub fn dismiss(&mut self, id: u64) -> bool {
        let len = self.queue.len();
        self.queue.retain(|n| n.id != id);
        self.queue.len() != len
    }

    /// Returns the most recent [`Notification`], if any.
    #[must_use]
    pub fn latest(&self) -> Option<&Notification> {
        self.queue.back()
    }

    /// Iterates over the pending [`Notification`]s, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    /// Returns the number of pending [`Notification`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Indicates whether there are no pending [`Notification`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod spec {
    use crate::Error;

    use super::{Level, Notifications};

    #[test]
    fn dismisses_by_id() {
        let mut notifications = Notifications::default();
        let first = notifications.success("Category created");
        let second = notifications.error(&Error::internal());

        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications.latest().unwrap().level, Level::Error);
        assert_eq!(
            notifications.latest().unwrap().message,
            "Something went wrong",
        );

        assert!(notifications.dismiss(first));
        assert!(!notifications.dismiss(first));
        assert_eq!(notifications.iter().map(|n| n.id).collect::<Vec<_>>(), [second]);
    }

    #[test]
    fn drops_oldest_over_capacity() {
        let mut notifications = Notifications::default();
        for i in 0..=Notifications::CAPACITY {
            _ = notifications.success(format!("#{i}"));
        }

        assert_eq!(notifications.len(), Notifications::CAPACITY);
        assert_eq!(notifications.iter().next().unwrap().message, "#1");
    }
}
