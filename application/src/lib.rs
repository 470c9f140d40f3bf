//! Application drives the store administration [`Dashboard`] from a shell.
//!
//! [`Dashboard`]: dashboard::Dashboard

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

pub mod args;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod notification;
pub mod shell;

use service::infra::{directory::http::Http, storage};
// Used in binary.
use tokio as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    dashboard::Dashboard,
    error::{AsError, Error},
    notification::Notifications,
    shell::Shell,
};

/// [`Dashboard`] backed by the configured session storage and the HTTP user
/// directory.
pub type App = Dashboard<storage::Backend, Http>;
