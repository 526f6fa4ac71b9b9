use std::path::{Path, PathBuf};

use crate::error::{Result, Chainable};
use crate::library::Library;
use crate::manifest::summarize;
use crate::templating::{script_json, Engine};
use crate::value::Sink;

/// The pages written by [`generate()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub index: PathBuf,
    pub reader: PathBuf,
    pub stories: usize,
}

/// Renders the story index and the reader into `out_dir`.
///
/// Returns `Ok(None)`, writing nothing, when `library` holds no stories. Both
/// pages are rendered before either is written.
pub fn generate<E>(engine: &E, library: &Library, out_dir: &Path) -> Result<Option<Generated>>
    where E: Engine + ?Sized
{
    if library.is_empty() {
        return Ok(None);
    }

    for (id, story) in library.iter() {
        for issue in story.highlight_issues() {
            tracing::warn!(story = id, "{issue}");
        }
    }

    let manifest = script_json(&summarize(library))?;
    let stories = script_json(&library.records)?;
    let index_html = render(engine, crate::INDEX_PAGE, &manifest)?;
    let reader_html = render(engine, crate::READER_PAGE, &stories)?;

    let generated = Generated {
        index: out_dir.join(crate::INDEX_PAGE),
        reader: out_dir.join(crate::READER_PAGE),
        stories: library.len(),
    };

    generated.index.write(index_html)?;
    generated.reader.write(reader_html)?;
    tracing::debug!(stories = generated.stories, "wrote {}", out_dir.display());
    Ok(Some(generated))
}

fn render<E: Engine + ?Sized>(engine: &E, page: &str, payload: &str) -> Result<String> {
    engine.render(page, payload).chain_with(|| error! {
        "failed to render page",
        "template used" => page,
    })
}
