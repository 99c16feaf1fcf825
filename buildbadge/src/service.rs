// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Transport-agnostic badge endpoint.
//!
//! [`BadgeService`] turns a request path such as `/linux.svg` and its query
//! string into a complete [`BadgeResponse`]. Any HTTP server can forward to
//! it; the service itself never touches sockets.

use std::sync::Arc;

use tracing::{error, info};

use crate::{
    config::RequestOverrides,
    error::Error,
    render::{BadgeFormat, BadgeRenderer},
    status::classify,
    store::StatusSource
};

const CACHE_CONTROL: &str = "no-cache";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// A parsed badge path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Builder name or numeric id.
    pub identifier: String,
    /// Requested output format.
    pub format:     BadgeFormat
}

impl Route {
    /// Parses `/{identifier}.svg` or `/{identifier}.png`.
    ///
    /// The identifier is everything between the leading slash and the final
    /// extension, so builder names may contain dots and slashes. It is
    /// percent-decoded after the extension is split off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Route`] for any other path.
    ///
    /// # Examples
    ///
    /// ```
    /// use buildbadge::{BadgeFormat, Route};
    ///
    /// let route = Route::parse("/runtests.png").unwrap();
    /// assert_eq!(route.identifier, "runtests");
    /// assert_eq!(route.format, BadgeFormat::Png);
    /// ```
    pub fn parse(path: &str) -> Result<Self, Error> {
        let unmatched = || Error::Route {
            path: path.to_owned()
        };
        let trimmed = path.strip_prefix('/').ok_or_else(unmatched)?;
        let (encoded, extension) = trimmed.rsplit_once('.').ok_or_else(unmatched)?;
        let format = extension.parse::<BadgeFormat>().map_err(|_| unmatched())?;
        let identifier = urlencoding::decode(encoded).map_err(|_| unmatched())?;
        if identifier.is_empty() {
            return Err(unmatched());
        }

        Ok(Self {
            identifier: identifier.into_owned(),
            format
        })
    }
}

/// A rendered response ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeResponse {
    /// HTTP status code.
    pub status:  u16,
    /// Response headers in emission order.
    pub headers: Vec<(&'static str, String)>,
    /// Response body.
    pub body:    Vec<u8>
}

impl BadgeResponse {
    fn new(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![
                ("Content-Type", content_type.to_owned()),
                ("Cache-Control", CACHE_CONTROL.to_owned()),
            ],
            body
        }
    }

    /// Returns the value of the first header named `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn from_error(error: &Error) -> Self {
        let status = error.status_code();
        let body = match status {
            400 | 404 => error.to_display_string(),
            _ => "badge rendering failed".to_owned()
        };
        Self::new(status, TEXT_PLAIN, body.into_bytes())
    }
}

/// Badge endpoint over a renderer and a status source.
#[derive(Debug)]
pub struct BadgeService<S> {
    renderer: Arc<BadgeRenderer>,
    source:   S
}

impl<S: StatusSource> BadgeService<S> {
    /// Creates a service rendering with `renderer` and asking `source` for
    /// build outcomes.
    pub fn new(renderer: Arc<BadgeRenderer>, source: S) -> Self {
        Self {
            renderer,
            source
        }
    }

    /// Renders the badge for `path` with overrides from `query`.
    ///
    /// The configuration is resolved before the status lookup, so invalid
    /// options are reported without contacting the build status source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Route`] for an unmatched path, [`Error::Config`] for
    /// invalid options, and lookup or rendering errors otherwise.
    pub async fn render(&self, path: &str, query: &str) -> Result<BadgeResponse, Error> {
        let route = Route::parse(path)?;
        let config = self.renderer.resolve(&RequestOverrides::from_query(query))?;

        let outcome = self.source.find_status(&route.identifier).await?;
        let status = classify(&outcome);
        let body = self.renderer.render(status, &config, route.format)?;

        info!(
            identifier = %route.identifier,
            %status,
            format = %route.format,
            bytes = body.len(),
            "rendered badge"
        );
        Ok(BadgeResponse::new(200, route.format.content_type(), body))
    }

    /// Renders the badge for `path`, mapping every failure to an error
    /// response.
    ///
    /// Client errors carry their message; server errors are logged and
    /// answered with a generic body.
    pub async fn handle(&self, path: &str, query: &str) -> BadgeResponse {
        match self.render(path, query).await {
            Ok(response) => response,
            Err(failure) => {
                if failure.status_code() >= 500 {
                    error!(path, error = %failure, "badge request failed");
                } else {
                    info!(path, error = %failure, "rejected badge request");
                }
                BadgeResponse::from_error(&failure)
            }
        }
    }
}
