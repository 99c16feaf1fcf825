// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Badge geometry and composition.
//!
//! A badge is two [`Segment`]s side by side. Each segment is as wide as its
//! measured text plus the configured paddings; the composed geometry is
//! handed to a named template which decides corner treatment, shading and
//! stroke. Text is drawn at a tenth scale so sub-pixel centers stay integral.

use crate::{
    config::{BadgeConfig, escape_xml, unescape_xml},
    error::Error,
    metrics::TextMetrics,
    template::{RenderContext, TemplateSet}
};

/// Vertical space added to the font size to obtain the badge height.
const VERTICAL_PADDING: u32 = 9;
/// Distance between the text baseline and the bottom edge.
const BASELINE_OFFSET: u32 = 6;

/// One colored, padded text block of a badge.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Markup-safe text drawn in the segment.
    pub text:       String,
    /// Fill color.
    pub color:      String,
    /// Total width in pixels: rounded text width plus both paddings.
    pub width:      u32,
    /// Measured text width in pixels before rounding.
    pub text_width: f32
}

impl Segment {
    /// Measures `text` and derives the segment width.
    ///
    /// `text` must already be escaped; the unescaped form is measured so the
    /// width matches what is displayed. Returns the segment together with the
    /// font family the backend used.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::RenderBackend`] from the metrics provider.
    pub fn measure(
        metrics: &dyn TextMetrics,
        text: &str,
        color: &str,
        config: &BadgeConfig
    ) -> Result<(Self, String), Error> {
        let font_face = unescape_xml(&config.font_face);
        let measure = metrics.measure(&unescape_xml(text), &font_face, config.font_size)?;
        let text_width = measure.width.max(0.0);
        let width = (text_width.ceil() as u32)
            .saturating_add(config.left_pad)
            .saturating_add(config.right_pad);

        Ok((
            Self {
                text: text.to_owned(),
                color: color.to_owned(),
                width,
                text_width
            },
            measure.family
        ))
    }
}

/// Left and right segments plus the shared geometry parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    /// Label segment.
    pub left:          Segment,
    /// Value segment.
    pub right:         Segment,
    /// Padding before segment text.
    pub left_pad:      u32,
    /// Corner radius.
    pub border_radius: u32,
    /// Markup-safe family name used for drawing.
    pub font_family:   String,
    /// Font size in pixels.
    pub font_size:     u32
}

impl Badge {
    /// Total badge width.
    pub fn width(&self) -> u32 {
        self.left.width.saturating_add(self.right.width)
    }

    /// Badge height derived from the font size.
    pub fn height(&self) -> u32 {
        self.font_size.saturating_add(VERTICAL_PADDING)
    }

    /// Builds the template context.
    pub fn context(&self) -> RenderContext {
        let height = self.height();
        let baseline = u64::from(height.saturating_sub(BASELINE_OFFSET));
        let mut context = RenderContext::new();
        let mut put = |key: &str, value: String| {
            context.insert(key.to_owned(), value);
        };

        put("width", self.width().to_string());
        put("height", height.to_string());
        put("inner_height", height.saturating_sub(1).to_string());
        put("baseline10", (baseline * 10).to_string());
        put("shadow10", ((baseline + 1) * 10).to_string());
        put("radius", self.border_radius.to_string());
        put("title", format!("{}: {}", self.left.text, self.right.text));
        put("font.family", self.font_family.clone());
        put("font.size", self.font_size.to_string());
        put("font.size10", (u64::from(self.font_size) * 10).to_string());

        for (prefix, segment, x) in [
            ("left", &self.left, 0),
            ("right", &self.right, self.left.width)
        ] {
            let text_box = u64::from(segment.text_width.ceil() as u32);
            let center10 = (u64::from(x) + u64::from(self.left_pad)) * 10 + text_box * 5;
            put(&format!("{prefix}.text"), segment.text.clone());
            put(&format!("{prefix}.color"), segment.color.clone());
            put(&format!("{prefix}.width"), segment.width.to_string());
            put(
                &format!("{prefix}.inner_width"),
                segment.width.saturating_sub(1).to_string()
            );
            put(&format!("{prefix}.x"), x.to_string());
            put(&format!("{prefix}.center10"), center10.to_string());
            put(
                &format!("{prefix}.text_length10"),
                ((segment.text_width * 10.0).round() as u64).to_string()
            );
        }

        context
    }
}

/// Composes the badge markup.
///
/// Both texts and colors must be markup-safe. The template is looked up
/// before any measurement so a missing style fails fast.
///
/// # Errors
///
/// Returns [`Error::TemplateNotFound`] for an unknown template,
/// [`Error::Render`] when the template cannot be rendered and
/// [`Error::RenderBackend`] when no font face is usable.
pub fn compose(
    metrics: &dyn TextMetrics,
    templates: &TemplateSet,
    left_text: &str,
    right_text: &str,
    left_color: &str,
    right_color: &str,
    config: &BadgeConfig
) -> Result<String, Error> {
    let template = templates.get(&config.template())?;

    let (left, family) = Segment::measure(metrics, left_text, left_color, config)?;
    let (right, _) = Segment::measure(metrics, right_text, right_color, config)?;

    let badge = Badge {
        left,
        right,
        left_pad: config.left_pad,
        border_radius: config.border_radius,
        font_family: escape_xml(&family).into_owned(),
        font_size: config.font_size
    };

    template.render(&badge.context())
}
