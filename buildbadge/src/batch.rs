// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Offline rendering of every builder in a status snapshot.
//!
//! Badges are rendered in parallel and written as `<stem>.<ext>` files next
//! to an `index.json` manifest listing what was produced.

use std::{
    collections::HashSet,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf}
};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::BadgeConfig,
    error::{self, Error},
    render::{BadgeFormat, BadgeRenderer},
    status::{BuildStatus, classify},
    store::{BuilderRecord, FileStatusStore}
};

/// File name of the manifest written next to the badges.
pub const MANIFEST_FILE: &str = "index.json";

/// One badge written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeArtifact {
    /// Builder name.
    pub builder: String,
    /// Builder id.
    pub id:      u64,
    /// Status shown on the badge.
    pub status:  BuildStatus,
    /// Location of the badge file.
    pub path:    PathBuf
}

/// Result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Written badges in snapshot order.
    pub artifacts:     Vec<BadgeArtifact>,
    /// Location of the JSON manifest.
    pub manifest_path: PathBuf
}

#[derive(Serialize)]
struct Manifest<'a> {
    format: &'a str,
    badges: &'a [BadgeArtifact]
}

/// Renders a badge for every builder of `store` into `output_dir`.
///
/// # Errors
///
/// Returns [`Error::BadgeIo`] when the directory or a file cannot be written,
/// [`Error::Serialize`] when the manifest cannot be encoded, and any
/// rendering error of the first badge that fails.
pub fn render_all(
    renderer: &BadgeRenderer,
    store: &FileStatusStore,
    config: &BadgeConfig,
    format: BadgeFormat,
    output_dir: &Path
) -> Result<BatchReport, Error> {
    fs::create_dir_all(output_dir).map_err(|source| error::badge_io_error(output_dir, source))?;

    let jobs = plan_paths(store.builders(), format, output_dir);
    let progress = ProgressBar::new(jobs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("valid template")
    );

    let artifacts = jobs
        .par_iter()
        .map(|(builder, path)| -> Result<BadgeArtifact, Error> {
            let status = classify(&builder.latest_outcome());
            let bytes = renderer.render(status, config, format)?;
            write_bytes(path, &bytes)?;
            debug!(builder = %builder.name, %status, path = %path.display(), "wrote badge");
            progress.set_message(builder.name.clone());
            progress.inc(1);

            Ok(BadgeArtifact {
                builder: builder.name.clone(),
                id: builder.id,
                status,
                path: path.clone()
            })
        })
        .collect::<Result<Vec<_>, _>>();
    progress.finish_and_clear();
    let artifacts = artifacts?;

    let manifest_path = output_dir.join(MANIFEST_FILE);
    write_manifest(&manifest_path, format, &artifacts)?;
    info!(
        count = artifacts.len(),
        dir = %output_dir.display(),
        "rendered badges"
    );

    Ok(BatchReport {
        artifacts,
        manifest_path
    })
}

/// Assigns every builder a distinct output path.
///
/// Names are reduced to a file-safe stem; an empty stem or a stem already
/// taken falls back to including the builder id.
fn plan_paths<'a>(
    builders: &'a [BuilderRecord],
    format: BadgeFormat,
    output_dir: &Path
) -> Vec<(&'a BuilderRecord, PathBuf)> {
    let mut taken = HashSet::new();
    builders
        .iter()
        .map(|builder| {
            let mut stem = file_stem(&builder.name);
            if stem.is_empty() {
                stem = builder.id.to_string();
            }
            if !taken.insert(stem.clone()) {
                stem = format!("{stem}-{}", builder.id);
                taken.insert(stem.clone());
            }
            let path = output_dir.join(format!("{stem}.{}", format.extension()));
            (builder, path)
        })
        .collect()
}

/// Replaces runs of characters outside `[A-Za-z0-9_.-]` with one hyphen and
/// strips leading and trailing separators.
fn file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for character in name.chars() {
        if character.is_ascii_alphanumeric() || matches!(character, '_' | '.' | '-') {
            stem.push(character);
        } else if !stem.ends_with('-') {
            stem.push('-');
        }
    }
    stem.trim_matches(|character| matches!(character, '-' | '.'))
        .to_owned()
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    let file = File::create(path).map_err(|source| error::badge_io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .map_err(|source| error::badge_io_error(path, source))?;
    writer
        .flush()
        .map_err(|source| error::badge_io_error(path, source))
}

fn write_manifest(path: &Path, format: BadgeFormat, artifacts: &[BadgeArtifact]) -> Result<(), Error> {
    let manifest = Manifest {
        format: format.extension(),
        badges: artifacts
    };

    let file = File::create(path).map_err(|source| error::badge_io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &manifest)?;
    writer
        .write_all(b"\n")
        .map_err(|source| error::badge_io_error(path, source))?;
    writer
        .flush()
        .map_err(|source| error::badge_io_error(path, source))
}
