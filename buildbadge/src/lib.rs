// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Build status badges rendered as SVG and PNG.
//!
//! A request names a builder and optionally overrides badge options. The
//! options are layered over deployment settings and built-in defaults, the
//! builder's latest outcome is classified into a canonical status, and the
//! status is drawn as a two-segment badge whose widths come from real font
//! metrics. The markup can be rasterized to PNG with the same fonts.
//!
//! ```
//! use buildbadge::{BadgeConfig, BadgeOptions, RequestOverrides, resolve};
//!
//! let request = RequestOverrides::from_query("left_text=Nightly&style=flat");
//! let config = resolve(&BadgeConfig::default(), &BadgeOptions::default(), &request).unwrap();
//! assert_eq!(config.left_text, "Nightly");
//! assert_eq!(config.template(), "flat.svg");
//! ```

mod badge;
mod batch;
mod config;
mod error;
mod metrics;
mod raster;
mod render;
mod retry;
mod service;
mod status;
mod store;
mod template;

pub use badge::{Badge, Segment, compose};
pub use batch::{BadgeArtifact, BatchReport, MANIFEST_FILE, render_all};
pub use config::{
    BadgeConfig, BadgeOptions, DEFAULT_FONT_FACE, MAX_DIMENSION, RequestOverrides, escape_xml,
    load_options, parse_options, resolve, unescape_xml
};
pub use error::{Error, badge_io_error, io_error};
pub use metrics::{FontMetrics, TextMeasure, TextMetrics};
pub use raster::{RasterOptions, Rasterizer};
pub use render::{BadgeFormat, BadgeRenderer};
pub use retry::{RetryConfig, RetryingSource, retry_with_backoff};
pub use service::{BadgeResponse, BadgeService, Route};
pub use status::{BuildOutcome, BuildStatus, ColorScheme, classify};
pub use store::{BuildRecord, BuilderRecord, FileStatusStore, StatusDocument, StatusSource};
pub use template::{RenderContext, Template, TemplateSet};
