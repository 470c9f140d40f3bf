//! [`Shell`] driving a [`Dashboard`] with textual commands.

use std::{fmt::Write as _, str::FromStr};

use clap::{Parser, Subcommand, ValueEnum};
use common::operations::{By, Delete, Insert, Select};
use derive_more::{Display, Error};
use itertools::Itertools as _;
use service::{
    domain::{
        record, Brand, Category, Coupon, Product, Record, Review, Subcategory,
        Supplier, Tax, User,
    },
    guard::Decision,
    infra::{
        directory::{Entry, Listing},
        storage, Directory, Storage,
    },
    validation::Form,
};
use tracerr::Traced;

use crate::{
    dashboard::{Dashboard, Listed},
    AsError,
};

/// Single line of [`Shell`] input.
#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
pub struct Line {
    /// [`Input`] of this [`Line`].
    #[command(subcommand)]
    pub input: Input,
}

/// Intent typed into a [`Shell`].
#[derive(Debug, Subcommand)]
pub enum Input {
    /// Sign in with email and password.
    Login {
        /// Email of the account.
        email: String,

        /// Password of the account.
        password: String,
    },

    /// Sign in with the Google account.
    GoogleLogin,

    /// Register a new account and sign in.
    Register {
        /// Display name of the account.
        name: String,

        /// Email of the account.
        email: String,

        /// Password of the account.
        password: String,

        /// Same password again.
        confirm_password: String,
    },

    /// Sign out.
    Logout,

    /// Request a password reset link.
    ForgotPassword {
        /// Email to send the link to.
        email: String,
    },

    /// Set a new password by the reset token of the current location.
    ResetPassword {
        /// New password.
        password: String,

        /// Same password again.
        confirm_password: String,

        /// Reset token overriding the one of the current location.
        #[arg(long)]
        token: Option<String>,
    },

    /// Navigate to a location, like `/products` or `/login`.
    Go {
        /// Path of the location.
        location: String,
    },

    /// Show what the current location renders.
    Where,

    /// Show the signed-in account.
    Whoami,

    /// List the records of a resource.
    List {
        /// Resource to list.
        resource: ResourceName,

        /// Free-text search term.
        #[arg(long, short, default_value = "")]
        search: String,

        /// Status to narrow the records to.
        #[arg(long)]
        status: Option<String>,
    },

    /// Create a record out of `field=value` pairs.
    Create {
        /// Resource to create a record of.
        resource: ResourceName,

        /// Field values as `field=value`.
        fields: Vec<Assignment>,
    },

    /// Update a record with `field=value` pairs.
    Update {
        /// Resource the record belongs to.
        resource: ResourceName,

        /// ID of the record.
        id: u64,

        /// Field values as `field=value`.
        fields: Vec<Assignment>,
    },

    /// Delete a record.
    Delete {
        /// Resource the record belongs to.
        resource: ResourceName,

        /// ID of the record.
        id: u64,
    },

    /// Replace the users with the ones of the remote directory.
    ImportUsers,

    /// Show the pending notifications.
    Notifications,

    /// Dismiss a notification.
    Dismiss {
        /// ID of the notification.
        id: u64,
    },

    /// Leave the shell.
    Exit,
}

/// Name of a resource accepted by the [`Shell`].
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ResourceName {
    /// [`Category`] records.
    Categories,

    /// [`Subcategory`] records.
    Subcategories,

    /// [`Brand`] records.
    Brands,

    /// [`Supplier`] records.
    Suppliers,

    /// [`Tax`] records.
    Taxes,

    /// [`Coupon`] records.
    Coupons,

    /// [`Review`] records.
    Reviews,

    /// [`User`] records.
    Users,

    /// [`Product`] records.
    Products,
}

/// Calls the generic `$call` with the resource type named by `$name`.
macro_rules! with_resource {
    ($name:expr, $t:ident => $call:expr) => {
        match $name {
            ResourceName::Categories => { type $t = Category; $call }
            ResourceName::Subcategories => { type $t = Subcategory; $call }
            ResourceName::Brands => { type $t = Brand; $call }
            ResourceName::Suppliers => { type $t = Supplier; $call }
            ResourceName::Taxes => { type $t = Tax; $call }
            ResourceName::Coupons => { type $t = Coupon; $call }
            ResourceName::Reviews => { type $t = Review; $call }
            ResourceName::Users => { type $t = User; $call }
            ResourceName::Products => { type $t = Product; $call }
        }
    };
}

/// `field=value` assignment of a form field.
#[derive(Clone, Debug)]
pub struct Assignment {
    /// Name of the field.
    pub field: String,

    /// Raw value of the field.
    pub value: String,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected `field=value`, got `{s}`"))?;
        Ok(Self {
            field: field.trim().to_owned(),
            value: value.to_owned(),
        })
    }
}

/// Outcome of a [`Shell`] line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Keep reading lines, printing the provided output.
    Continue(String),

    /// Leave the [`Shell`].
    Exit,
}

/// Error of splitting a line into words.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("unterminated quote")]
pub struct UnterminatedQuote;

/// Splits the provided `line` into whitespace-separated words, keeping
/// double-quoted words intact.
///
/// # Errors
///
/// If a double quote is not closed.
pub fn split(line: &str) -> Result<Vec<String>, UnterminatedQuote> {
    let mut words = Vec::new();
    let mut word: Option<String> = None;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                _ = word.get_or_insert_with(String::new);
            }
            c if c.is_whitespace() && !quoted => words.extend(word.take()),
            c => word.get_or_insert_with(String::new).push(c),
        }
    }
    if quoted {
        return Err(UnterminatedQuote);
    }
    words.extend(word);
    Ok(words)
}

/// Interactive shell of a [`Dashboard`].
#[derive(Debug)]
pub struct Shell<St, Dir> {
    /// Driven [`Dashboard`].
    dashboard: Dashboard<St, Dir>,
}

impl<St, Dir> Shell<St, Dir> {
    /// Wraps the provided [`Dashboard`] into a [`Shell`].
    #[must_use]
    pub fn new(dashboard: Dashboard<St, Dir>) -> Self {
        Self { dashboard }
    }

    /// Returns the driven [`Dashboard`].
    #[must_use]
    pub fn dashboard(&self) -> &Dashboard<St, Dir> {
        &self.dashboard
    }

    /// Returns the driven [`Dashboard`] mutably.
    pub fn dashboard_mut(&mut self) -> &mut Dashboard<St, Dir> {
        &mut self.dashboard
    }

    /// Returns the prompt reflecting the current location.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("{}> ", self.dashboard.location().path())
    }

    /// Renders the [`Decision`] of the current location.
    fn view(&self) -> String {
        match self.dashboard.view() {
            Decision::Wait => "loading...".to_owned(),
            Decision::Render(route) => format!("showing {}", route.path()),
            Decision::Redirect { to, .. } => {
                format!("redirected to {}", to.path())
            }
        }
    }

    /// Renders the latest notification, if any.
    fn outcome(&self, ok: bool) -> String {
        let status = if ok { "ok" } else { "failed" };
        match self.dashboard.notifications().latest() {
            Some(n) => format!("{status}: {n}"),
            None => status.to_owned(),
        }
    }
}

impl<St, Dir> Shell<St, Dir>
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
    Dir: Directory<Select<By<Vec<Entry>, Listing>>, Ok = Vec<Entry>>,
    Dir::Err: AsError + std::fmt::Display,
{
    /// Executes the provided `line` of input.
    pub async fn execute(&mut self, line: &str) -> Flow {
        let words = match split(line) {
            Ok(words) if words.is_empty() => return Flow::Continue(String::new()),
            Ok(words) => words,
            Err(e) => return Flow::Continue(e.to_string()),
        };
        let input = match Line::try_parse_from(words) {
            Ok(Line { input }) => input,
            Err(e) => return Flow::Continue(e.render().to_string()),
        };

        let d = &mut self.dashboard;
        let out = match input {
            Input::Login { email, password } => {
                let ok = d.login(&email, &password).await;
                self.outcome(ok)
            }
            Input::GoogleLogin => {
                let ok = d.google_login().await;
                self.outcome(ok)
            }
            Input::Register {
                name,
                email,
                password,
                confirm_password,
            } => {
                let ok = d
                    .register(&name, &email, &password, &confirm_password)
                    .await;
                self.outcome(ok)
            }
            Input::Logout => {
                let ok = d.logout().await;
                self.outcome(ok)
            }
            Input::ForgotPassword { email } => {
                let ok = d.forgot_password(&email).await;
                self.outcome(ok)
            }
            Input::ResetPassword {
                password,
                confirm_password,
                token,
            } => {
                let ok = d
                    .reset_password(
                        token.as_deref(),
                        &password,
                        &confirm_password,
                    )
                    .await;
                self.outcome(ok)
            }
            Input::Go { location } => {
                _ = d.navigate(&location);
                self.view()
            }
            Input::Where => self.view(),
            Input::Whoami => match d.session().user() {
                Some(a) => format!("{} <{}> (id: {})", a.name, a.email, a.id),
                None => "not signed in".to_owned(),
            },
            Input::List {
                resource,
                search,
                status,
            } => with_resource!(resource, T => {
                match d.search::<T>(&search, status.as_deref()) {
                    Some(records) => table(&records),
                    None => self.outcome(false),
                }
            }),
            Input::Create { resource, fields } => {
                let form = form(fields);
                let ok = with_resource!(resource, T => d.create::<T>(&form));
                self.outcome(ok)
            }
            Input::Update {
                resource,
                id,
                fields,
            } => {
                let form = form(fields);
                let id = record::Id::from(id);
                let ok =
                    with_resource!(resource, T => d.update::<T>(id, &form));
                self.outcome(ok)
            }
            Input::Delete { resource, id } => {
                let id = record::Id::from(id);
                let ok = with_resource!(resource, T => d.delete::<T>(id));
                self.outcome(ok)
            }
            Input::ImportUsers => {
                let ok = d.import_users().await;
                self.outcome(ok)
            }
            Input::Notifications => {
                d.notifications().iter().join("\n")
            }
            Input::Dismiss { id } => {
                if d.dismiss(id) {
                    format!("dismissed #{id}")
                } else {
                    format!("no notification #{id}")
                }
            }
            Input::Exit => return Flow::Exit,
        };
        Flow::Continue(out)
    }
}

/// Collects the provided [`Assignment`]s into a [`Form`].
fn form(fields: Vec<Assignment>) -> Form {
    fields.into_iter().map(|a| (a.field, a.value)).collect()
}

/// Renders the provided [`Record`]s one per line, fields in form order.
fn table<T: Listed>(records: &[Record<T>]) -> String {
    if records.is_empty() {
        return format!("no {} records", T::NAME.to_lowercase());
    }

    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let form = record.to_form();
        _ = write!(
            out,
            "#{} {}",
            record.id,
            T::schema()
                .fields()
                .iter()
                .filter_map(|f| form.get(f.name()).map(|v| (f.name(), v)))
                .filter(|(_, value)| !value.is_empty())
                .format_with(" ", |(name, value), f| {
                    if value.contains(char::is_whitespace) {
                        f(&format_args!("{name}=\"{value}\""))
                    } else {
                        f(&format_args!("{name}={value}"))
                    }
                }),
        );
    }
    out
}

#[cfg(test)]
mod spec {
    use crate::dashboard::spec::{dashboard, Fixed};

    use super::{split, Flow, Shell};

    #[test]
    fn splits_quoted_words() {
        assert_eq!(
            split(r#"create categories name="Home decor" status=active"#)
                .unwrap(),
            ["create", "categories", "name=Home decor", "status=active"],
        );
        assert_eq!(split(r#"login "" x"#).unwrap(), ["login", "", "x"]);
        assert!(split(r#"go "/login"#).is_err());
    }

    #[tokio::test]
    async fn drives_dashboard_by_lines() {
        let mut shell = Shell::new(dashboard(Fixed::default()));
        assert!(shell.dashboard_mut().restore().await);
        assert_eq!(shell.prompt(), "/login> ");

        let Flow::Continue(out) = shell.execute("list categories").await else {
            panic!("expected to continue");
        };
        assert!(out.starts_with("failed:"), "{out}");

        _ = shell.execute("login admin@example.com admin123").await;
        assert_eq!(shell.prompt(), "/> ");

        let out = shell
            .execute(r#"create categories name="Home decor" status=active"#)
            .await;
        assert_eq!(
            out,
            Flow::Continue("ok: #3 [Success] Category #1 created".to_owned()),
        );

        let out = shell.execute("list categories --search decor").await;
        assert_eq!(
            out,
            Flow::Continue(
                r#"#1 name="Home decor" status=Active"#.to_owned(),
            ),
        );

        assert_eq!(
            shell.execute("go /dashboard/brands").await,
            Flow::Continue("showing /brands".to_owned()),
        );
        assert_eq!(shell.execute("exit").await, Flow::Exit);
    }
}
