// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Shared badge renderer.
//!
//! [`BadgeRenderer`] owns everything a render needs that does not change
//! between requests: built-in defaults, deployment options, the template set,
//! the text metrics backend and the rasterizer. It is built once at startup
//! and shared read-only, typically behind an [`Arc`].

use std::{fmt, str::FromStr, sync::Arc};

use tracing::{debug, info};

use crate::{
    badge,
    config::{self, BadgeConfig, BadgeOptions, RequestOverrides},
    error::Error,
    metrics::{FontMetrics, TextMetrics},
    raster::{RasterOptions, Rasterizer},
    status::BuildStatus,
    template::TemplateSet
};

/// Output encoding of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeFormat {
    /// Vector markup.
    Svg,
    /// Raster image rendered from the vector markup.
    Png
}

impl BadgeFormat {
    /// Returns the file extension, which is also the route suffix.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png"
        }
    }

    /// Returns the response content type.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Svg => "text/xml+svg",
            Self::Png => "image/png"
        }
    }
}

impl fmt::Display for BadgeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for BadgeFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            other => Err(Error::config(format!(
                "format must be 'svg' or 'png', got '{other}'"
            )))
        }
    }
}

/// Read-only rendering state shared by all requests.
pub struct BadgeRenderer {
    defaults:   BadgeConfig,
    options:    BadgeOptions,
    templates:  TemplateSet,
    metrics:    Arc<dyn TextMetrics>,
    rasterizer: Rasterizer
}

impl fmt::Debug for BadgeRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BadgeRenderer")
            .field("defaults", &self.defaults)
            .field("options", &self.options)
            .field("templates", &self.templates.names().collect::<Vec<_>>())
            .field("rasterizer", &self.rasterizer)
            .finish_non_exhaustive()
    }
}

impl BadgeRenderer {
    /// Assembles a renderer from explicit parts.
    pub fn new(
        options: BadgeOptions,
        templates: TemplateSet,
        metrics: Arc<dyn TextMetrics>,
        rasterizer: Rasterizer
    ) -> Self {
        Self {
            defaults: BadgeConfig::default(),
            options,
            templates,
            metrics,
            rasterizer
        }
    }

    /// Builds a renderer from deployment options.
    ///
    /// Loads the built-in templates plus `templates_dir`, the system fonts
    /// plus `fonts_dir`, and shares the font database between measurement
    /// and rasterization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Render`] when `templates_dir`
    /// cannot be loaded.
    pub fn from_options(options: BadgeOptions) -> Result<Self, Error> {
        let mut templates = TemplateSet::builtin()?;
        if let Some(dir) = options.templates_dir.as_deref() {
            let loaded = templates.load_dir(dir)?;
            info!(dir = %dir.display(), loaded, "loaded custom badge templates");
        }

        let metrics = FontMetrics::system(options.fonts_dir.as_deref());
        if metrics.is_empty() {
            info!("no fonts installed, badge rendering will fail until fonts are available");
        }
        let rasterizer = Rasterizer::new(metrics.database());

        Ok(Self::new(options, templates, Arc::new(metrics), rasterizer))
    }

    /// Replaces the raster options, for example to change the output scale.
    pub fn with_raster_options(mut self, options: RasterOptions) -> Self {
        self.rasterizer = self.rasterizer.with_options(options);
        self
    }

    /// Returns the template set.
    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Resolves the configuration for one request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid numeric overrides.
    pub fn resolve(&self, request: &RequestOverrides) -> Result<BadgeConfig, Error> {
        config::resolve(&self.defaults, &self.options, request)
    }

    /// Composes markup for arbitrary texts and colors.
    ///
    /// # Errors
    ///
    /// See [`badge::compose`].
    pub fn compose(
        &self,
        left_text: &str,
        right_text: &str,
        left_color: &str,
        right_color: &str,
        config: &BadgeConfig
    ) -> Result<String, Error> {
        badge::compose(
            self.metrics.as_ref(),
            &self.templates,
            left_text,
            right_text,
            left_color,
            right_color,
            config
        )
    }

    /// Composes the status badge: the configured label on the left and the
    /// status label on the right, colored by the scheme unless an explicit
    /// right color is configured.
    ///
    /// # Errors
    ///
    /// See [`badge::compose`].
    pub fn render_status(&self, status: BuildStatus, config: &BadgeConfig) -> Result<String, Error> {
        let right_color = config
            .right_color
            .as_deref()
            .unwrap_or_else(|| config.color_scheme.color_for(status));
        debug!(%status, template = %config.template(), "composing status badge");
        self.compose(
            &config.left_text,
            status.as_str(),
            &config.left_color,
            right_color,
            config
        )
    }

    /// Converts markup to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rasterization`] on conversion failure.
    pub fn rasterize(&self, svg: &str) -> Result<Vec<u8>, Error> {
        self.rasterizer.rasterize(svg)
    }

    /// Renders the status badge in the requested format.
    ///
    /// # Errors
    ///
    /// Propagates composition and rasterization errors.
    pub fn render(
        &self,
        status: BuildStatus,
        config: &BadgeConfig,
        format: BadgeFormat
    ) -> Result<Vec<u8>, Error> {
        let svg = self.render_status(status, config)?;
        match format {
            BadgeFormat::Svg => Ok(svg.into_bytes()),
            BadgeFormat::Png => self.rasterize(&svg)
        }
    }
}
