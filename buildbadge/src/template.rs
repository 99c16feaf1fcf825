// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Parameterized SVG templates.
//!
//! Templates are plain SVG documents with `{{ key }}` placeholders. They are
//! parsed once into literal and placeholder parts, so malformed placeholders
//! surface at load time and rendering is a single pass over the parts.

use std::{
    collections::BTreeMap,
    fs,
    path::Path,
    sync::LazyLock
};

use regex::Regex;
use tracing::debug;

use crate::error::{self, Error};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\s*\}\}")
        .expect("placeholder pattern is valid")
});

/// Built-in styles and their template sources.
const BUILTIN_TEMPLATES: [(&str, &str); 4] = [
    ("flat.svg", include_str!("../templates/flat.svg")),
    ("flat-square.svg", include_str!("../templates/flat-square.svg")),
    ("plastic.svg", include_str!("../templates/plastic.svg")),
    ("social.svg", include_str!("../templates/social.svg"))
];

/// Values substituted into a template, keyed by placeholder name.
pub type RenderContext = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Placeholder(String)
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name:  String,
    parts: Vec<Part>
}

impl Template {
    /// Parses `source` into a template named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] when a `{{` or `}}` is left outside a valid
    /// placeholder.
    ///
    /// # Examples
    ///
    /// ```
    /// use buildbadge::{RenderContext, Template};
    ///
    /// let template = Template::parse("demo.svg", "<svg width=\"{{ width }}\"/>").unwrap();
    /// let context = RenderContext::from([("width".to_owned(), "42".to_owned())]);
    /// assert_eq!(template.render(&context).unwrap(), "<svg width=\"42\"/>");
    /// ```
    pub fn parse(name: &str, source: &str) -> Result<Self, Error> {
        let mut parts = Vec::new();
        let mut cursor = 0;

        for captures in PLACEHOLDER.captures_iter(source) {
            let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            push_literal(&mut parts, name, &source[cursor..whole.start()])?;
            parts.push(Part::Placeholder(key.as_str().to_owned()));
            cursor = whole.end();
        }
        push_literal(&mut parts, name, &source[cursor..])?;

        Ok(Self {
            name: name.to_owned(),
            parts
        })
    }

    /// Returns the template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the placeholder keys referenced by the template.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Placeholder(key) => Some(key.as_str()),
            Part::Literal(_) => None
        })
    }

    /// Renders the template with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] when a placeholder has no value in
    /// `context`. Nothing is returned in that case.
    pub fn render(&self, context: &RenderContext) -> Result<String, Error> {
        let mut output = String::with_capacity(1024);
        for part in &self.parts {
            match part {
                Part::Literal(text) => output.push_str(text),
                Part::Placeholder(key) => {
                    let value = context.get(key).ok_or_else(|| {
                        Error::render(format!(
                            "template '{}' references unknown value '{key}'",
                            self.name
                        ))
                    })?;
                    output.push_str(value);
                }
            }
        }
        Ok(output)
    }
}

fn push_literal(parts: &mut Vec<Part>, name: &str, literal: &str) -> Result<(), Error> {
    if literal.contains("{{") || literal.contains("}}") {
        return Err(Error::render(format!("template '{name}' contains a malformed placeholder")));
    }
    if !literal.is_empty() {
        parts.push(Part::Literal(literal.to_owned()));
    }
    Ok(())
}

/// Named templates available to the composer.
///
/// The set is built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: BTreeMap<String, Template>
}

impl TemplateSet {
    /// Returns the built-in `flat`, `flat-square`, `plastic` and `social`
    /// templates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if a built-in template is malformed.
    pub fn builtin() -> Result<Self, Error> {
        let mut set = Self::default();
        for (name, source) in BUILTIN_TEMPLATES {
            set.insert(Template::parse(name, source)?);
        }
        Ok(set)
    }

    /// Adds `template`, replacing any template with the same name.
    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Loads every `*.svg` file of `dir` as a template named after the file.
    ///
    /// Returns the number of templates loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the directory or a file cannot be read and
    /// [`Error::Render`] when a file is not a valid template.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, Error> {
        let entries = fs::read_dir(dir).map_err(|source| error::io_error(dir, source))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|source| error::io_error(dir, source))?.path();
            if path.extension().is_some_and(|extension| extension == "svg") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            let Some(name) = path.file_name().and_then(|value| value.to_str()) else {
                continue;
            };
            let source =
                fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
            debug!(template = name, "loaded badge template");
            self.insert(Template::parse(name, &source)?);
        }
        Ok(paths.len())
    }

    /// Looks up a template by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] when no template has that name.
    pub fn get(&self, name: &str) -> Result<&Template, Error> {
        self.templates
            .get(name)
            .ok_or_else(|| Error::template_not_found(name))
    }

    /// Returns the names of all templates in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}
