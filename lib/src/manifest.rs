use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::library::Library;
use crate::listing::Listing;
use crate::story::Story;
use crate::value::{Json, Sink};

/// The catalog card for one story. Every field is trimmed and empty when the
/// story doesn't provide it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: String,
    pub title: String,
    pub title_translation: String,
    pub level: String,
    pub thumbnail: String,
    pub category: String,
}

impl Summary {
    pub fn of(id: &str, story: &Story) -> Self {
        fn trimmed(value: Option<&String>) -> String {
            value.map_or("", |s| s.trim()).to_string()
        }

        Summary {
            id: id.to_string(),
            title: trimmed(story.title.as_ref()),
            title_translation: trimmed(story.title_translation.as_ref()),
            level: trimmed(story.level.as_ref()),
            thumbnail: trimmed(story.thumbnail.as_ref().and_then(|t| t.filename.as_ref())),
            category: trimmed(story.tags.first().and_then(|t| t.name.as_ref())),
        }
    }
}

/// One summary per story, in library order.
pub fn summarize(library: &Library) -> Vec<Summary> {
    library.iter()
        .map(|(id, story)| Summary::of(id, story))
        .collect()
}

/// Identifiers of every story file in `stories_dir`, sorted. Files are not
/// parsed.
pub fn story_ids(stories_dir: &Path) -> Result<Vec<String>> {
    let listing = Listing::read(stories_dir)?;
    let mut ids: Vec<String> = listing.with_ext("json")
        .filter(|e| e.file_name != crate::MANIFEST_FILE)
        .map(|e| e.file_stem().to_string())
        .collect();

    ids.sort();
    Ok(ids)
}

/// Rewrites the sidecar index in `stories_dir` and returns what was written.
pub fn refresh(stories_dir: &Path) -> Result<Vec<String>> {
    let ids = story_ids(stories_dir)?;
    stories_dir.join(crate::MANIFEST_FILE).write(Json::to_pretty_string(&ids)?)?;
    Ok(ids)
}
