//! [`Dashboard`] view boundary.

mod resource;
mod session;

use std::fmt;

use service::{
    command::{Cancellable, Interrupted},
    domain::Session,
    guard::{Decision, Route},
    Command, RouteGuard, SessionManager,
};
use tokio_util::sync::CancellationToken;
use tracing as log;

pub use self::resource::{Listed, Stores};
use crate::{notification::Notifications, AsError};

/// View boundary of the administration dashboard.
///
/// Receives user intents, drives the [`SessionManager`] and the resource
/// stores, and reports every outcome as a boolean (or a view value) along
/// with a [`Notifications`] entry. Errors never escape it.
#[derive(Debug)]
pub struct Dashboard<St, Dir> {
    /// [`SessionManager`] owning the authentication [`Session`].
    sessions: SessionManager<St>,

    /// Directory the users are imported from.
    directory: Dir,

    /// Resource stores, one per resource page.
    stores: Stores,

    /// Currently requested [`Route`].
    location: Route,

    /// [`Route`] to return to after signing in.
    return_to: Option<Route>,

    /// Pending [`Notifications`].
    notifications: Notifications,

    /// [`CancellationToken`] interrupting every in-flight operation.
    shutdown: CancellationToken,
}

impl<St, Dir> Dashboard<St, Dir> {
    /// Creates a new [`Dashboard`] on the dashboard home, with empty resource
    /// stores.
    #[must_use]
    pub fn new(sessions: SessionManager<St>, directory: Dir) -> Self {
        Self {
            sessions,
            directory,
            stores: Stores::default(),
            location: Route::Home,
            return_to: None,
            notifications: Notifications::default(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Returns a snapshot of the current [`Session`].
    #[must_use]
    pub fn session(&self) -> Session {
        self.sessions.session()
    }

    /// Returns the [`SessionManager`] of this [`Dashboard`].
    #[must_use]
    pub fn sessions(&self) -> &SessionManager<St> {
        &self.sessions
    }

    /// Returns the currently requested [`Route`].
    #[must_use]
    pub fn location(&self) -> &Route {
        &self.location
    }

    /// Returns the resource [`Stores`].
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Returns the pending [`Notifications`].
    #[must_use]
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Dismisses the notification with the provided `id`.
    pub fn dismiss(&mut self, id: u64) -> bool {
        self.notifications.dismiss(id)
    }

    /// Returns the [`CancellationToken`] interrupting every in-flight
    /// operation of this [`Dashboard`] once cancelled.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Decides what is rendered for the current location.
    #[must_use]
    pub fn view(&self) -> Decision {
        RouteGuard.decide(&self.session(), self.location.clone())
    }

    /// Navigates to the provided `location`.
    ///
    /// Unparsable locations render as [`Route::NotFound`].
    pub fn navigate(&mut self, location: &str) -> Decision {
        let route = Route::parse(location).unwrap_or_else(|e| {
            log::debug!("cannot navigate to `{location}`: {e}");
            Route::NotFound
        });
        self.go(route)
    }

    /// Navigates to the provided [`Route`], following the [`RouteGuard`]
    /// redirects.
    fn go(&mut self, route: Route) -> Decision {
        let decision = RouteGuard.decide(&self.session(), route.clone());
        match &decision {
            Decision::Wait | Decision::Render(_) => self.location = route,
            Decision::Redirect { to, from } => {
                if from.is_some() {
                    self.return_to.clone_from(from);
                }
                self.location = to.clone();
            }
        }
        log::debug!("navigated to `{}`: {decision:?}", self.location.path());
        decision
    }

    /// Executes the provided `command`, interrupting it on shutdown.
    async fn run<C>(
        &self,
        command: C,
    ) -> Result<
        <SessionManager<St> as Command<C>>::Ok,
        Interrupted<<SessionManager<St> as Command<C>>::Err>,
    >
    where
        SessionManager<St>: Command<C>,
    {
        <SessionManager<St> as Command<Cancellable<C>>>::execute(
            &self.sessions,
            Cancellable::new(command, self.shutdown.child_token()),
        )
        .await
    }

    /// Reports the provided `message` as a success.
    fn succeed(&mut self, message: impl Into<String>) -> bool {
        _ = self.notifications.success(message);
        true
    }

    /// Reports the provided error as a failure.
    fn fail<E: AsError + fmt::Display>(&mut self, err: E) -> bool {
        let error = err.as_error();
        if error.is_internal() {
            log::error!("intent failed: {err}");
        } else {
            log::info!("intent refused: {err}");
        }
        _ = self.notifications.error(&error);
        false
    }
}

#[cfg(test)]
pub(crate) mod spec {
    use std::time::Duration;

    use common::operations::{By, Select};
    use service::{
        guard::{Decision, Page, Route},
        infra::{
            directory::{Entry, Listing},
            storage::Memory,
            Directory,
        },
        Config, SessionManager,
    };
    use tracerr::Traced;

    use super::Dashboard;

    /// [`Directory`] serving a fixed list of entries, or failing if none.
    #[derive(Clone, Debug, Default)]
    pub(crate) struct Fixed(pub(crate) Option<Vec<Entry>>);

    impl Directory<Select<By<Vec<Entry>, Listing>>> for Fixed {
        type Ok = Vec<Entry>;
        type Err = Traced<FixedError>;

        async fn execute(
            &self,
            _: Select<By<Vec<Entry>, Listing>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.clone().ok_or_else(|| tracerr::new!(FixedError))
        }
    }

    /// Error of an unavailable [`Fixed`] directory.
    #[derive(Clone, Copy, Debug, derive_more::Display, derive_more::Error)]
    #[display("directory is unavailable")]
    pub(crate) struct FixedError;

    impl crate::AsError for FixedError {
        fn try_as_error(&self) -> Option<crate::Error> {
            None
        }
    }

    /// Creates a [`Dashboard`] without simulated latency.
    pub(crate) fn dashboard(directory: Fixed) -> Dashboard<Memory, Fixed> {
        let sessions = SessionManager::new(
            Config {
                latency: Duration::ZERO,
                ..Config::default()
            },
            Memory::new(),
        );
        Dashboard::new(sessions, directory)
    }

    /// Creates a restored and signed-in [`Dashboard`].
    pub(crate) async fn signed_in(directory: Fixed) -> Dashboard<Memory, Fixed> {
        let mut dashboard = dashboard(directory);
        assert!(dashboard.restore().await);
        assert!(dashboard.login("admin@example.com", "admin123").await);
        dashboard
    }

    #[tokio::test]
    async fn waits_until_restored() {
        let mut dashboard = dashboard(Fixed::default());

        assert_eq!(dashboard.navigate("/products"), Decision::Wait);
        assert!(dashboard.restore().await);

        assert_eq!(dashboard.location(), &Route::Login);
        assert_eq!(dashboard.view(), Decision::Render(Route::Login));
        assert_eq!(dashboard.return_to, Some(Route::Page(Page::Products)));
    }

    #[tokio::test]
    async fn returns_to_requested_page_after_login() {
        let mut dashboard = dashboard(Fixed::default());
        assert!(dashboard.restore().await);

        _ = dashboard.navigate("/dashboard/coupons");
        assert_eq!(dashboard.location(), &Route::Login);

        assert!(dashboard.login("admin@example.com", "admin123").await);
        assert_eq!(dashboard.location(), &Route::Page(Page::Coupons));
        assert_eq!(
            dashboard.view(),
            Decision::Render(Route::Page(Page::Coupons)),
        );
    }

    #[tokio::test]
    async fn renders_unknown_locations_as_not_found() {
        let mut dashboard = signed_in(Fixed::default()).await;

        assert_eq!(
            dashboard.navigate("/nowhere"),
            Decision::Render(Route::NotFound),
        );
    }

    #[tokio::test]
    async fn keeps_importing_users_failures_inside() {
        let mut dashboard = signed_in(Fixed(None)).await;

        assert!(!dashboard.import_users().await);
        assert_eq!(
            dashboard.notifications().latest().unwrap().message,
            "Something went wrong",
        );
    }

    #[tokio::test]
    async fn interrupts_intents_on_shutdown() {
        let mut dashboard = dashboard(Fixed::default());
        assert!(dashboard.restore().await);

        dashboard.shutdown_token().cancel();

        assert!(!dashboard.login("admin@example.com", "admin123").await);
        assert_eq!(dashboard.session().user(), None);
        assert_eq!(
            dashboard.notifications().latest().unwrap().message,
            "Operation was cancelled",
        );
    }
}
