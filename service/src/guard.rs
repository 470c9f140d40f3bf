//! [`RouteGuard`] deciding which [`Route`]s may be rendered.

use derive_more::{Display, Error};
use url::Url;

use crate::domain::{account::ResetToken, session::Phase, Session};

/// Client-side route of the dashboard.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Route {
    /// Sign-in page.
    Login,

    /// Registration page.
    Register,

    /// Page requesting a password reset email.
    ForgotPassword,

    /// Page setting a new password by a reset token.
    ResetPassword {
        /// Token from the reset link, if present.
        token: Option<ResetToken>,
    },

    /// Dashboard home with the overview widgets.
    Home,

    /// Guarded resource page.
    Page(Page),

    /// Unknown location.
    NotFound,
}

/// Guarded page of the dashboard.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Page {
    /// Products list.
    #[display("products")]
    Products,

    /// Categories list.
    #[display("categories")]
    Categories,

    /// Subcategories list.
    #[display("subcategories")]
    Subcategories,

    /// Brands list.
    #[display("brands")]
    Brands,

    /// Suppliers list.
    #[display("suppliers")]
    Suppliers,

    /// Taxes list.
    #[display("taxes")]
    Taxes,

    /// Coupons list.
    #[display("coupons")]
    Coupons,

    /// Reviews list.
    #[display("reviews")]
    Reviews,

    /// Users list.
    #[display("users")]
    Users,

    /// Orders list.
    #[display("orders")]
    Orders,

    /// Customers list.
    #[display("customers")]
    Customers,

    /// Sales analytics.
    #[display("analytics")]
    Analytics,

    /// Store settings.
    #[display("settings")]
    Settings,
}

impl Page {
    /// Every [`Page`] in navigation order.
    pub const ALL: [Self; 13] = [
        Self::Products,
        Self::Categories,
        Self::Subcategories,
        Self::Brands,
        Self::Suppliers,
        Self::Taxes,
        Self::Coupons,
        Self::Reviews,
        Self::Users,
        Self::Orders,
        Self::Customers,
        Self::Analytics,
        Self::Settings,
    ];
}

impl Route {
    /// Parses a [`Route`] out of the provided `location`, either a path with
    /// an optional query (`/reset-password?token=...`) or an absolute URL.
    ///
    /// # Errors
    ///
    /// If the `location` is not a valid URL or path.
    pub fn parse(location: &str) -> Result<Self, ParseError> {
        /// Base the relative locations are resolved against.
        const BASE: &str = "http://dashboard.local/";

        let url = Url::parse(BASE)
            .and_then(|base| base.join(location.trim()))
            .map_err(ParseError)?;
        let segments = url
            .path_segments()
            .map(|s| s.filter(|s| !s.is_empty()).collect::<Vec<_>>())
            .unwrap_or_default();

        Ok(match segments.as_slice() {
            [] | ["dashboard"] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["forgot-password"] => Self::ForgotPassword,
            ["reset-password"] => Self::ResetPassword {
                token: url
                    .query_pairs()
                    .find(|(k, _)| k == "token")
                    .map(|(_, v)| ResetToken::from(v.into_owned())),
            },
            [page] | ["dashboard", page] => Page::ALL
                .into_iter()
                .find(|p| p.to_string() == *page)
                .map_or(Self::NotFound, Self::Page),
            _ => Self::NotFound,
        })
    }

    /// Indicates whether this [`Route`] requires an authenticated
    /// [`Session`].
    #[must_use]
    pub fn is_guarded(&self) -> bool {
        matches!(self, Self::Home | Self::Page(_))
    }

    /// Returns the path of this [`Route`].
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::ForgotPassword => "/forgot-password".to_owned(),
            Self::ResetPassword { token: None } => "/reset-password".to_owned(),
            Self::ResetPassword { token: Some(token) } => {
                let mut url = Url::parse("http://dashboard.local/reset-password")
                    .unwrap_or_else(|_| unreachable!("valid URL"));
                _ = url.query_pairs_mut().append_pair("token", token.as_ref());
                format!("{}?{}", url.path(), url.query().unwrap_or_default())
            }
            Self::Home => "/".to_owned(),
            Self::Page(page) => format!("/{page}"),
            Self::NotFound => "/404".to_owned(),
        }
    }
}

/// Error of parsing a [`Route`].
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid location: {_0}")]
pub struct ParseError(url::ParseError);

/// Decision of a [`RouteGuard`] about a requested [`Route`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Decision {
    /// [`Session`] is not resolved yet: render a neutral waiting state.
    Wait,

    /// Render the requested [`Route`].
    Render(Route),

    /// Navigate elsewhere instead.
    Redirect {
        /// [`Route`] to navigate to.
        to: Route,

        /// Originally requested [`Route`] to return to afterwards, if any.
        from: Option<Route>,
    },
}

/// Single point deciding whether a [`Route`] is reachable.
///
/// Holds no state: the decision is re-evaluated on every navigation.
#[derive(Clone, Copy, Debug, Default)]
pub struct RouteGuard;

impl RouteGuard {
    /// Decides what to render for the requested [`Route`] in the provided
    /// [`Session`].
    #[must_use]
    pub fn decide(self, session: &Session, requested: Route) -> Decision {
        if session.phase() == Phase::Loading {
            return Decision::Wait;
        }

        // An in-flight operation keeps the current account in effect.
        let signed_in = session.is_authenticated();
        if !signed_in && requested.is_guarded() {
            Decision::Redirect {
                to: Route::Login,
                from: Some(requested),
            }
        } else if signed_in && matches!(requested, Route::Login | Route::Register)
        {
            Decision::Redirect {
                to: Route::Home,
                from: None,
            }
        } else {
            Decision::Render(requested)
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{
        account::{Email, Name},
        Account, Session,
    };

    use super::{Decision, Page, Route, RouteGuard};

    fn admin() -> Account {
        Account {
            id: "1".into(),
            email: Email::new("admin@example.com").unwrap(),
            name: Name::new("Admin User").unwrap(),
        }
    }

    #[test]
    fn parses_routes() {
        assert_eq!(Route::parse("/").unwrap(), Route::Home);
        assert_eq!(Route::parse("/login").unwrap(), Route::Login);
        assert_eq!(Route::parse("/register/").unwrap(), Route::Register);
        assert_eq!(
            Route::parse("/categories").unwrap(),
            Route::Page(Page::Categories),
        );
        assert_eq!(
            Route::parse("/dashboard/taxes").unwrap(),
            Route::Page(Page::Taxes),
        );
        assert_eq!(
            Route::parse("/reset-password?token=valid-token").unwrap(),
            Route::ResetPassword {
                token: Some("valid-token".into()),
            },
        );
        assert_eq!(
            Route::parse("/reset-password").unwrap(),
            Route::ResetPassword { token: None },
        );
        assert_eq!(Route::parse("/nowhere").unwrap(), Route::NotFound);
    }

    #[test]
    fn paths_parse_back() {
        let routes = [
            Route::Login,
            Route::ForgotPassword,
            Route::ResetPassword {
                token: Some("a b&c".into()),
            },
            Route::Home,
            Route::Page(Page::Coupons),
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()).unwrap(), route);
        }
    }

    #[test]
    fn waits_while_loading() {
        let guard = RouteGuard;

        assert_eq!(
            guard.decide(&Session::restoring(), Route::Page(Page::Users)),
            Decision::Wait,
        );
    }

    #[test]
    fn decides_by_account_while_operation_is_in_flight() {
        let mut signed_in = Session::authenticated(admin());
        signed_in.set_loading(true);
        let mut anonymous = Session::unauthenticated();
        anonymous.set_loading(true);

        assert_eq!(
            RouteGuard.decide(&signed_in, Route::Page(Page::Users)),
            Decision::Render(Route::Page(Page::Users)),
        );
        assert_eq!(
            RouteGuard.decide(&anonymous, Route::Page(Page::Users)),
            Decision::Redirect {
                to: Route::Login,
                from: Some(Route::Page(Page::Users)),
            },
        );
    }

    #[test]
    fn redirects_anonymous_to_login() {
        let requested = Route::Page(Page::Reviews);

        assert_eq!(
            RouteGuard.decide(&Session::unauthenticated(), requested.clone()),
            Decision::Redirect {
                to: Route::Login,
                from: Some(requested),
            },
        );
        assert_eq!(
            RouteGuard.decide(&Session::unauthenticated(), Route::ForgotPassword),
            Decision::Render(Route::ForgotPassword),
        );
    }

    #[test]
    fn renders_for_authenticated() {
        let session = Session::authenticated(admin());

        assert_eq!(
            RouteGuard.decide(&session, Route::Page(Page::Brands)),
            Decision::Render(Route::Page(Page::Brands)),
        );
        assert_eq!(
            RouteGuard.decide(&session, Route::Login),
            Decision::Redirect {
                to: Route::Home,
                from: None,
            },
        );
    }
}
