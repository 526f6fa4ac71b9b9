//! The four utilities, minus process setup. Product output goes to `out`;
//! a [`Status::Failure`] carries the message for stderr.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use cuentos::error;
use cuentos::error::{Result, Chainable};
use cuentos::images::Normalizer;
use cuentos::library::Library;
use cuentos::templating::EngineInit;
use cuentos::templating::minijinja::MiniJinjaEngine;
use cuentos::{manifest, report, site};

use crate::{util, Project};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure(String),
}

impl Status {
    /// Prints a failure's message to stderr and converts to an exit code.
    pub fn exit(self) -> ExitCode {
        match self {
            Status::Success => ExitCode::SUCCESS,
            Status::Failure(message) => {
                eprintln!("{message}");
                ExitCode::FAILURE
            }
        }
    }
}

/// Normalizes `folder` (relative to the project root), or `images/`.
pub fn compress_images(project: &Project, folder: Option<&Path>, out: &mut dyn Write) -> Result<Status> {
    let dir = match folder {
        Some(folder) => project.resolve(folder),
        None => project.images_dir(),
    };

    if !dir.is_dir() {
        return Ok(Status::Failure(format!("Folder does not exist: {}", dir.display())));
    }

    let mut written: io::Result<()> = Ok(());
    let normalizer = Normalizer::new(&project.settings);
    let batch = normalizer.normalize_dir(&dir, |path, result| {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        let line = match result {
            Ok(()) => writeln!(out, "✔ {name}"),
            Err(e) => writeln!(out, "✘ {name}: {}", util::one_line(e)),
        };

        if written.is_ok() {
            written = line;
        }
    })?;

    written?;
    match batch.processed {
        0 => writeln!(out, "No images found.")?,
        n => writeln!(out, "Done. Processed {n} image(s) in {}", dir.display())?,
    }

    if batch.failed > 0 {
        tracing::warn!(failed = batch.failed, "some images could not be normalized");
    }

    Ok(Status::Success)
}

/// Writes `index.html` and `story.html` at the project root. No stories is
/// a notice, not a failure; a missing `stories/` is an error.
pub fn generate_web(project: &Project, out: &mut dyn Write) -> Result<Status> {
    let library = Library::load(project.stories_dir())?;
    let engine = MiniJinjaEngine::init(&project.settings)?;
    match site::generate(&engine, &library, &project.root)? {
        Some(generated) => {
            writeln!(out, "Generated {} and {} with {} stories.",
                cuentos::INDEX_PAGE, cuentos::READER_PAGE, generated.stories)?;
            writeln!(out, "Open {} in your browser (file://), no server needed.", cuentos::INDEX_PAGE)?;
        }
        None => writeln!(out, "No story JSONs found in {}/", cuentos::STORIES_DIR)?,
    }

    Ok(Status::Success)
}

/// Prints a generation request for every referenced image missing from
/// `images/`, creating the folder if needed. Fails when there are no story
/// files at all; files that exist but can't be loaded still count.
pub fn list_missing_images(project: &Project, out: &mut dyn Write) -> Result<Status> {
    let images_dir = project.images_dir();
    fs::create_dir_all(&images_dir).chain_with(|| error! {
        "failed to create the images folder",
        "images folder" => images_dir.display(),
    })?;

    let stories_dir = project.stories_dir();
    let library = match stories_dir.is_dir() {
        true => Library::load(&stories_dir)?,
        false => Library::default(),
    };

    if library.is_empty() && library.skipped.is_empty() {
        return Ok(Status::Failure(format!("No story JSONs found in {}/.", cuentos::STORIES_DIR)));
    }

    let missing = report::missing_images(&library, &images_dir, &project.settings);
    for image in &missing {
        writeln!(out, "{image}")?;
    }

    if missing.is_empty() {
        writeln!(out, "No missing images.")?;
    }

    Ok(Status::Success)
}

/// Rewrites `stories/manifest.json`. A missing `stories/` is an error.
pub fn update_manifest(project: &Project, out: &mut dyn Write) -> Result<Status> {
    let ids = manifest::refresh(&project.stories_dir())?;
    writeln!(out, "{} updated: {ids:?}", cuentos::MANIFEST_FILE)?;
    Ok(Status::Success)
}
