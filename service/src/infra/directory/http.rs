//! HTTP [`Directory`] implementation.

use std::time::Duration;

use common::operations::{By, Select};
use smart_default::SmartDefault;
use tracerr::Traced;
use tracing as log;
use url::Url;

#[cfg(doc)]
use crate::infra::Directory;
use crate::infra::directory::{self, Entry, Listing};

/// [`Http`] configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// [`Url`] responding with a JSON array of [`Entry`]s.
    #[default(Url::parse("https://jsonplaceholder.typicode.com/users")
        .unwrap_or_else(|_| unreachable!("valid URL")))]
    pub url: Url,

    /// Maximum [`Duration`] of a whole request.
    #[default(Duration::from_secs(10))]
    pub timeout: Duration,
}

/// [`Directory`] fetching [`Entry`]s over HTTP.
#[derive(Clone, Debug)]
pub struct Http {
    /// Client performing the requests.
    client: reqwest::Client,

    /// [`Url`] the [`Entry`]s are fetched from.
    url: Url,
}

impl Http {
    /// Creates a new [`Http`] [`Directory`] with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the underlying HTTP client cannot be initialized.
    pub fn new(config: Config) -> Result<Self, Traced<directory::Error>> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> directory::Error))?;
        Ok(Self {
            client,
            url: config.url,
        })
    }
}

impl directory::Directory<Select<By<Vec<Entry>, Listing>>> for Http {
    type Ok = Vec<Entry>;
    type Err = Traced<directory::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Entry>, Listing>>,
    ) -> Result<Self::Ok, Self::Err> {
        log::debug!("fetching users from {}", self.url);

        let body = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(tracerr::from_and_wrap!(=> directory::Error))?
            .bytes()
            .await
            .map_err(tracerr::from_and_wrap!(=> directory::Error))?;
        let entries =
            directory::parse_listing(&body).map_err(tracerr::wrap!())?;

        log::debug!("fetched {} users", entries.len());
        Ok(entries)
    }
}
