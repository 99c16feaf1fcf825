// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Layered badge configuration.
//!
//! Three layers feed a render: the built-in defaults, the deployment options
//! loaded once from YAML, and the per-request overrides taken from the query
//! string. [`resolve`] merges them field by field with request values taking
//! precedence, merges color schemes entry by entry, and escapes every text
//! value so it can be embedded into markup verbatim.

use std::{
    borrow::Cow,
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf}
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{self, Error},
    retry::RetryConfig,
    status::{BuildStatus, ColorScheme}
};

/// Font face used when the configured face cannot be resolved.
pub const DEFAULT_FONT_FACE: &str = "DejaVu Sans";
const DEFAULT_LEFT_TEXT: &str = "Build Status";
const DEFAULT_LEFT_COLOR: &str = "#555";
const DEFAULT_STYLE: &str = "plastic";
const DEFAULT_TEMPLATE_NAME: &str = "{style}.svg";
const DEFAULT_PAD: u32 = 5;
const DEFAULT_BORDER_RADIUS: u32 = 5;
const DEFAULT_FONT_SIZE: u32 = 11;
const STYLE_PLACEHOLDER: &str = "{style}";

/// Largest accepted padding, corner radius or font size, in pixels.
pub const MAX_DIMENSION: u32 = 1024;

/// Fully resolved rendering options for one badge.
///
/// Text fields (`left_text`, colors, `style`, `font_face`) hold XML-escaped
/// values. Use [`BadgeConfig::display_left_text`] to obtain the string the
/// reader actually sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeConfig {
    /// Horizontal padding before the text of each segment.
    pub left_pad:      u32,
    /// Horizontal padding after the text of each segment.
    pub right_pad:     u32,
    /// Label rendered in the left segment.
    pub left_text:     String,
    /// Fill color of the left segment.
    pub left_color:    String,
    /// Explicit fill color of the right segment; the status color otherwise.
    pub right_color:   Option<String>,
    /// Corner radius of the badge outline.
    pub border_radius: u32,
    /// Visual style, substituted into `template_name`.
    pub style:         String,
    /// Template name pattern containing a `{style}` placeholder.
    pub template_name: String,
    /// Font family used for measurement and drawing.
    pub font_face:     String,
    /// Font size in pixels.
    pub font_size:     u32,
    /// Colors per build status.
    pub color_scheme:  ColorScheme
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            left_pad:      DEFAULT_PAD,
            right_pad:     DEFAULT_PAD,
            left_text:     DEFAULT_LEFT_TEXT.to_owned(),
            left_color:    DEFAULT_LEFT_COLOR.to_owned(),
            right_color:   None,
            border_radius: DEFAULT_BORDER_RADIUS,
            style:         DEFAULT_STYLE.to_owned(),
            template_name: DEFAULT_TEMPLATE_NAME.to_owned(),
            font_face:     DEFAULT_FONT_FACE.to_owned(),
            font_size:     DEFAULT_FONT_SIZE,
            color_scheme:  ColorScheme::default()
        }
    }
}

impl BadgeConfig {
    /// Returns the template name with the configured style substituted.
    ///
    /// # Examples
    ///
    /// ```
    /// use buildbadge::BadgeConfig;
    ///
    /// let config = BadgeConfig::default();
    /// assert_eq!(config.template(), "plastic.svg");
    /// ```
    pub fn template(&self) -> String {
        self.template_name.replace(STYLE_PLACEHOLDER, &self.style)
    }

    /// Returns the left label as displayed, with markup escapes undone.
    pub fn display_left_text(&self) -> Cow<'_, str> {
        unescape_xml(&self.left_text)
    }
}

/// Deployment-level badge options loaded from YAML.
///
/// Every field is optional; missing fields inherit the built-in defaults.
///
/// # Examples
///
/// ```
/// use buildbadge::parse_options;
///
/// let options = parse_options("style: flat\ncolor_scheme:\n  failure: '#f00'\n")
///     .expect("valid options");
/// assert_eq!(options.style.as_deref(), Some("flat"));
/// assert_eq!(options.color_scheme.len(), 1);
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BadgeOptions {
    /// Padding before segment text.
    #[serde(default, deserialize_with = "deserialize_optional_dimension")]
    pub left_pad:      Option<u32>,
    /// Padding after segment text.
    #[serde(default, deserialize_with = "deserialize_optional_dimension")]
    pub right_pad:     Option<u32>,
    /// Label of the left segment.
    #[serde(default)]
    pub left_text:     Option<String>,
    /// Fill color of the left segment.
    #[serde(default)]
    pub left_color:    Option<String>,
    /// Fill color of the right segment regardless of status.
    #[serde(default)]
    pub right_color:   Option<String>,
    /// Corner radius of the badge outline.
    #[serde(default, deserialize_with = "deserialize_optional_dimension")]
    pub border_radius: Option<u32>,
    /// Default visual style.
    #[serde(default)]
    pub style:         Option<String>,
    /// Template name pattern.
    #[serde(default, deserialize_with = "deserialize_optional_template_name")]
    pub template_name: Option<String>,
    /// Font family.
    #[serde(default)]
    pub font_face:     Option<String>,
    /// Font size in pixels.
    #[serde(default, deserialize_with = "deserialize_optional_dimension")]
    pub font_size:     Option<u32>,
    /// Per-status colors merged into the default scheme.
    #[serde(default)]
    pub color_scheme:  BTreeMap<BuildStatus, String>,
    /// Directory holding additional `*.svg` templates.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
    /// Directory holding additional font files.
    #[serde(default)]
    pub fonts_dir:     Option<PathBuf>,
    /// Retry policy for build status lookups.
    #[serde(default)]
    pub retry:         RetryConfig
}

fn deserialize_optional_template_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    if let Some(name) = value.as_deref()
        && name.trim().is_empty()
    {
        return Err(serde::de::Error::custom("template_name must not be empty"));
    }
    Ok(value)
}

fn deserialize_optional_dimension<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>
{
    let value: Option<u32> = Option::deserialize(deserializer)?;
    if let Some(dimension) = value
        && dimension > MAX_DIMENSION
    {
        return Err(serde::de::Error::custom(format!(
            "dimension must not exceed {MAX_DIMENSION}, got {dimension}"
        )));
    }
    Ok(value)
}

/// Loads deployment options from the provided YAML file path.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and [`Error::Parse`]
/// when the YAML is invalid or contains unknown keys.
pub fn load_options(path: &Path) -> Result<BadgeOptions, Error> {
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    parse_options(&contents)
}

/// Parses deployment options from a YAML document. An empty document yields
/// the default options.
///
/// # Errors
///
/// Propagates [`Error::Parse`] when the YAML cannot be decoded.
pub fn parse_options(contents: &str) -> Result<BadgeOptions, Error> {
    if contents.trim().is_empty() {
        return Ok(BadgeOptions::default());
    }
    Ok(serde_yaml::from_str(contents)?)
}

/// Option keys accepted from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionKey {
    LeftPad,
    RightPad,
    LeftText,
    LeftColor,
    RightColor,
    BorderRadius,
    Style,
    FontFace,
    FontSize,
    Color(BuildStatus)
}

impl OptionKey {
    fn parse(key: &str) -> Option<Self> {
        let parsed = match key {
            "left_pad" => Self::LeftPad,
            "right_pad" => Self::RightPad,
            "left_text" => Self::LeftText,
            "left_color" => Self::LeftColor,
            "right_color" => Self::RightColor,
            "border_radius" => Self::BorderRadius,
            "style" => Self::Style,
            "font_face" => Self::FontFace,
            "font_size" => Self::FontSize,
            other => {
                let status = other.strip_prefix("color_scheme.")?;
                Self::Color(status.parse().ok()?)
            }
        };
        Some(parsed)
    }
}

/// Raw per-request overrides, restricted to the recognised option keys.
///
/// Values are kept as received; validation and escaping happen in
/// [`resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOverrides {
    /// Raw `left_pad` value.
    pub left_pad:      Option<String>,
    /// Raw `right_pad` value.
    pub right_pad:     Option<String>,
    /// Raw `left_text` value.
    pub left_text:     Option<String>,
    /// Raw `left_color` value.
    pub left_color:    Option<String>,
    /// Raw `right_color` value.
    pub right_color:   Option<String>,
    /// Raw `border_radius` value.
    pub border_radius: Option<String>,
    /// Raw `style` value.
    pub style:         Option<String>,
    /// Raw `font_face` value.
    pub font_face:     Option<String>,
    /// Raw `font_size` value.
    pub font_size:     Option<String>,
    /// Raw `color_scheme.<status>` values.
    pub color_scheme:  BTreeMap<BuildStatus, String>
}

impl RequestOverrides {
    /// Parses overrides from a URL query string (without the leading `?`).
    ///
    /// Percent-escapes and `+` are decoded. Unknown keys are dropped and, for
    /// repeated keys, the first value wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use buildbadge::RequestOverrides;
    ///
    /// let overrides = RequestOverrides::from_query("left_text=Custom%20Label&utm_source=x");
    /// assert_eq!(overrides.left_text.as_deref(), Some("Custom Label"));
    /// ```
    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Collects overrides from already decoded key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref();
            match OptionKey::parse(key) {
                Some(option) => overrides.insert(option, value.into()),
                None => debug!(key, "ignoring unrecognised badge option")
            }
        }
        overrides
    }

    /// Returns `true` when no override was supplied.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn insert(&mut self, key: OptionKey, value: String) {
        let slot = match key {
            OptionKey::LeftPad => &mut self.left_pad,
            OptionKey::RightPad => &mut self.right_pad,
            OptionKey::LeftText => &mut self.left_text,
            OptionKey::LeftColor => &mut self.left_color,
            OptionKey::RightColor => &mut self.right_color,
            OptionKey::BorderRadius => &mut self.border_radius,
            OptionKey::Style => &mut self.style,
            OptionKey::FontFace => &mut self.font_face,
            OptionKey::FontSize => &mut self.font_size,
            OptionKey::Color(status) => {
                self.color_scheme.entry(status).or_insert(value);
                return;
            }
        };
        slot.get_or_insert(value);
    }
}

/// Merges the three configuration layers into a [`BadgeConfig`].
///
/// Precedence, lowest to highest: `defaults`, `deployment`, `request`. Color
/// schemes are merged per status. Text values from both override layers are
/// XML-escaped before they are stored.
///
/// # Errors
///
/// Returns [`Error::Config`] when a numeric request override is not a
/// non-negative integer.
///
/// # Examples
///
/// ```
/// use buildbadge::{BadgeConfig, BadgeOptions, RequestOverrides, resolve};
///
/// let request = RequestOverrides::from_query("left_pad=-3");
/// let error = resolve(&BadgeConfig::default(), &BadgeOptions::default(), &request);
/// assert!(matches!(error, Err(buildbadge::Error::Config { .. })));
/// ```
pub fn resolve(
    defaults: &BadgeConfig,
    deployment: &BadgeOptions,
    request: &RequestOverrides
) -> Result<BadgeConfig, Error> {
    let mut config = defaults.clone();
    apply_deployment(&mut config, deployment);
    apply_request(&mut config, request)?;
    Ok(config)
}

fn apply_deployment(config: &mut BadgeConfig, options: &BadgeOptions) {
    if let Some(value) = options.left_pad {
        config.left_pad = value;
    }
    if let Some(value) = options.right_pad {
        config.right_pad = value;
    }
    if let Some(value) = options.border_radius {
        config.border_radius = value;
    }
    if let Some(value) = options.font_size {
        config.font_size = value;
    }
    if let Some(value) = options.template_name.as_deref() {
        config.template_name = value.to_owned();
    }
    assign_escaped(&mut config.left_text, options.left_text.as_deref());
    assign_escaped(&mut config.left_color, options.left_color.as_deref());
    assign_escaped(&mut config.style, options.style.as_deref());
    assign_escaped(&mut config.font_face, options.font_face.as_deref());
    if let Some(value) = options.right_color.as_deref() {
        config.right_color = Some(escape_xml(value).into_owned());
    }
    config.color_scheme.merge(&escape_colors(&options.color_scheme));
}

fn apply_request(config: &mut BadgeConfig, request: &RequestOverrides) -> Result<(), Error> {
    if let Some(value) = request.left_pad.as_deref() {
        config.left_pad = parse_dimension("left_pad", value)?;
    }
    if let Some(value) = request.right_pad.as_deref() {
        config.right_pad = parse_dimension("right_pad", value)?;
    }
    if let Some(value) = request.border_radius.as_deref() {
        config.border_radius = parse_dimension("border_radius", value)?;
    }
    if let Some(value) = request.font_size.as_deref() {
        config.font_size = parse_dimension("font_size", value)?;
    }
    assign_escaped(&mut config.left_text, request.left_text.as_deref());
    assign_escaped(&mut config.left_color, request.left_color.as_deref());
    assign_escaped(&mut config.style, request.style.as_deref());
    assign_escaped(&mut config.font_face, request.font_face.as_deref());
    if let Some(value) = request.right_color.as_deref() {
        config.right_color = Some(escape_xml(value).into_owned());
    }
    config.color_scheme.merge(&escape_colors(&request.color_scheme));
    Ok(())
}

fn assign_escaped(target: &mut String, value: Option<&str>) {
    if let Some(value) = value {
        *target = escape_xml(value).into_owned();
    }
}

fn escape_colors(colors: &BTreeMap<BuildStatus, String>) -> BTreeMap<BuildStatus, String> {
    colors
        .iter()
        .map(|(status, color)| (*status, escape_xml(color).into_owned()))
        .collect()
}

fn parse_dimension(option: &str, value: &str) -> Result<u32, Error> {
    let dimension = value.trim().parse::<u32>().map_err(|_| {
        Error::config(format!("{option} must be a non-negative integer, got '{value}'"))
    })?;
    if dimension > MAX_DIMENSION {
        return Err(Error::config(format!(
            "{option} must not exceed {MAX_DIMENSION}, got {dimension}"
        )));
    }
    Ok(dimension)
}

/// Escapes the five XML special characters.
///
/// Returns the input unchanged (borrowed) when nothing needs escaping.
pub fn escape_xml(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len());
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}

/// Reverses [`escape_xml`].
///
/// Only the five entities produced by [`escape_xml`] are decoded; any other
/// `&` sequence is kept as is.
pub fn unescape_xml(value: &str) -> Cow<'_, str> {
    const ENTITIES: [(&str, char); 5] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '\"'),
        ("&apos;", '\'')
    ];

    if !value.contains('&') {
        return Cow::Borrowed(value);
    }

    let mut decoded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(position) = rest.find('&') {
        decoded.push_str(&rest[..position]);
        rest = &rest[position..];
        match ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some((entity, character)) => {
                decoded.push(*character);
                rest = &rest[entity.len()..];
            }
            None => {
                decoded.push('&');
                rest = &rest[1..];
            }
        }
    }
    decoded.push_str(rest);
    Cow::Owned(decoded)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use proptest::prelude::*;

    use super::*;

    fn resolve_query(deployment: &BadgeOptions, query: &str) -> Result<BadgeConfig, Error> {
        resolve(
            &BadgeConfig::default(),
            deployment,
            &RequestOverrides::from_query(query)
        )
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = BadgeConfig::default();
        assert_eq!(config.left_pad, 5);
        assert_eq!(config.right_pad, 5);
        assert_eq!(config.left_text, "Build Status");
        assert_eq!(config.left_color, "#555");
        assert_eq!(config.border_radius, 5);
        assert_eq!(config.style, "plastic");
        assert_eq!(config.font_face, "DejaVu Sans");
        assert_eq!(config.font_size, 11);
        assert_eq!(config.template(), "plastic.svg");
    }

    #[test]
    fn request_overrides_deployment_overrides_defaults() {
        let deployment = BadgeOptions {
            left_pad: Some(8),
            left_text: Some("CI".to_owned()),
            style: Some("flat".to_owned()),
            ..BadgeOptions::default()
        };

        let config =
            resolve_query(&deployment, "left_pad=12&style=social").expect("expected success");
        assert_eq!(config.left_pad, 12);
        assert_eq!(config.style, "social");
        assert_eq!(config.left_text, "CI");
        assert_eq!(config.right_pad, 5);
    }

    #[test]
    fn percent_encoded_text_is_decoded() {
        let config = resolve_query(&BadgeOptions::default(), "left_text=Custom%20Label")
            .expect("expected success");
        assert_eq!(config.left_text, "Custom Label");
        assert_eq!(config.display_left_text(), "Custom Label");
    }

    #[test]
    fn request_text_is_escaped_before_storage() {
        let config = resolve_query(
            &BadgeOptions::default(),
            "left_text=%3Cscript%3E%26&left_color=%22red"
        )
        .expect("expected success");
        assert_eq!(config.left_text, "&lt;script&gt;&amp;");
        assert_eq!(config.left_color, "&quot;red");
        assert_eq!(config.display_left_text(), "<script>&");
    }

    #[test]
    fn negative_padding_is_rejected() {
        let error = resolve_query(&BadgeOptions::default(), "left_pad=-3")
            .expect_err("expected config error");
        match error {
            Error::Config {
                message
            } => {
                assert!(message.contains("left_pad"));
            }
            other => panic!("expected config error, got {other:?}")
        }
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        for query in ["font_size=large", "border_radius=", "right_pad=1.5"] {
            let result = resolve_query(&BadgeOptions::default(), query);
            assert!(matches!(result, Err(Error::Config { .. })), "{query}");
        }
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        for (query, option) in [
            ("left_pad=500000000", "left_pad"),
            ("right_pad=3000000000", "right_pad"),
            ("font_size=1025", "font_size"),
            ("border_radius=99999", "border_radius")
        ] {
            match resolve_query(&BadgeOptions::default(), query) {
                Err(Error::Config {
                    message
                }) => {
                    assert!(message.contains(option), "{message}");
                    assert!(message.contains("must not exceed"), "{message}");
                }
                other => panic!("expected config error for {query}, got {other:?}")
            }
        }
    }

    #[test]
    fn largest_dimension_is_accepted() {
        let config = resolve_query(&BadgeOptions::default(), "left_pad=1024&font_size=1024")
            .expect("expected valid configuration");
        assert_eq!(config.left_pad, MAX_DIMENSION);
        assert_eq!(config.font_size, MAX_DIMENSION);
    }

    #[test]
    fn parse_options_rejects_oversized_dimensions() {
        let result = parse_options("right_pad: 4000000000\n");
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let overrides = RequestOverrides::from_query("foo=bar&color_scheme.cancelled=%23000");
        assert!(overrides.is_empty());
    }

    #[test]
    fn first_value_of_repeated_key_wins() {
        let overrides = RequestOverrides::from_query("style=flat&style=social");
        assert_eq!(overrides.style.as_deref(), Some("flat"));
    }

    #[test]
    fn color_scheme_layers_merge_per_status() {
        let deployment = BadgeOptions {
            color_scheme: BTreeMap::from([
                (BuildStatus::Failure, "#a00".to_owned()),
                (BuildStatus::Warnings, "#aa0".to_owned())
            ]),
            ..BadgeOptions::default()
        };

        let config = resolve_query(&deployment, "color_scheme.failure=%23f00")
            .expect("expected success");
        let scheme = &config.color_scheme;
        assert_eq!(scheme.color_for(BuildStatus::Failure), "#f00");
        assert_eq!(scheme.color_for(BuildStatus::Warnings), "#aa0");
        assert_eq!(scheme.color_for(BuildStatus::Success), "#4c1");
    }

    #[test]
    fn right_color_override_is_optional() {
        let config = resolve_query(&BadgeOptions::default(), "").expect("expected success");
        assert!(config.right_color.is_none());

        let config =
            resolve_query(&BadgeOptions::default(), "right_color=%23123").expect("expected success");
        assert_eq!(config.right_color.as_deref(), Some("#123"));
    }

    #[test]
    fn template_name_pattern_uses_style() {
        let deployment = BadgeOptions {
            template_name: Some("badges/{style}.svg".to_owned()),
            ..BadgeOptions::default()
        };
        let config = resolve_query(&deployment, "style=flat-square").expect("expected success");
        assert_eq!(config.template(), "badges/flat-square.svg");
    }

    #[test]
    fn parse_options_accepts_empty_document() {
        let options = parse_options("  \n").expect("expected defaults");
        assert_eq!(options, BadgeOptions::default());
    }

    #[test]
    fn parse_options_rejects_unknown_fields() {
        let result = parse_options("left_paddding: 3\n");
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn parse_options_rejects_unknown_statuses() {
        let result = parse_options("color_scheme:\n  cancelled: '#000'\n");
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn parse_options_rejects_blank_template_name() {
        let error = parse_options("template_name: '  '\n").expect_err("expected failure");
        assert!(error.to_string().contains("template_name must not be empty"));
    }

    #[test]
    fn load_options_reads_configuration_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("expected temp file");
        write!(file, "left_text: Nightly\nfont_size: 12\n").expect("expected write to succeed");

        let options = load_options(file.path()).expect("expected load to succeed");
        assert_eq!(options.left_text.as_deref(), Some("Nightly"));
        assert_eq!(options.font_size, Some(12));
    }

    #[test]
    fn load_options_reports_io_errors() {
        let path = Path::new("/nonexistent/badges.yaml");
        let error = load_options(path).expect_err("expected io error");
        assert!(matches!(error, Error::Io { .. }));
    }

    #[test]
    fn escape_xml_handles_all_special_characters() {
        assert_eq!(escape_xml("&<>\"'normal"), "&amp;&lt;&gt;&quot;&apos;normal");
    }

    #[test]
    fn escape_xml_returns_borrowed_when_no_escaping_needed() {
        match escape_xml("no special characters") {
            Cow::Borrowed(value) => assert_eq!(value, "no special characters"),
            Cow::Owned(_) => panic!("expected borrowed variant")
        }
    }

    #[test]
    fn unescape_xml_keeps_unknown_entities() {
        assert_eq!(unescape_xml("a &nbsp; b &amp; c &"), "a &nbsp; b & c &");
    }

    proptest! {
        #[test]
        fn unescape_reverses_escape(input in "\\PC{0,32}") {
            let escaped = escape_xml(&input);
            prop_assert_eq!(unescape_xml(&escaped), input.as_str());
        }

        #[test]
        fn merge_precedence_holds_per_field(
            deployment_pad in proptest::option::of(0u32..64),
            request_pad in proptest::option::of(0u32..64),
            deployment_color in proptest::option::of("#[0-9a-f]{3}"),
            request_color in proptest::option::of("#[0-9a-f]{3}")
        ) {
            let deployment = BadgeOptions {
                left_pad: deployment_pad,
                color_scheme: deployment_color
                    .clone()
                    .map(|color| BTreeMap::from([(BuildStatus::Failure, color)]))
                    .unwrap_or_default(),
                ..BadgeOptions::default()
            };
            let request = RequestOverrides {
                left_pad: request_pad.map(|pad| pad.to_string()),
                color_scheme: request_color
                    .clone()
                    .map(|color| BTreeMap::from([(BuildStatus::Failure, color)]))
                    .unwrap_or_default(),
                ..RequestOverrides::default()
            };

            let config = resolve(&BadgeConfig::default(), &deployment, &request).unwrap();
            let expected_pad = request_pad.or(deployment_pad).unwrap_or(5);
            prop_assert_eq!(config.left_pad, expected_pad);

            let expected_color = request_color
                .or(deployment_color)
                .unwrap_or_else(|| "#e05d44".to_owned());
            prop_assert_eq!(config.color_scheme.color_for(BuildStatus::Failure), expected_color.as_str());
            prop_assert_eq!(config.color_scheme.color_for(BuildStatus::Success), "#4c1");
        }
    }
}
