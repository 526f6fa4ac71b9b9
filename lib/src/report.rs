use std::fmt;
use std::path::Path;

use crate::library::Library;
use crate::settings::Settings;
use crate::story::Story;

/// An image a story references that isn't in the images directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingImage {
    pub story: String,
    pub filename: String,
    pub prompt: String,
}

/// Every `(filename, prompt)` pair `story` declares, thumbnail first.
/// References with a blank filename are dropped; the others are trimmed and
/// get `ext` appended unless they already end with it.
pub fn image_requests(story: &Story, ext: &str) -> Vec<(String, String)> {
    story.image_refs()
        .filter_map(|image| {
            let filename = with_extension(image.filename.as_deref()?, ext)?;
            let prompt = image.generation_prompt.clone().unwrap_or_default();
            Some((filename, prompt))
        })
        .collect()
}

/// `name`, trimmed, with `.ext` appended unless it already ends with it
/// (ignoring case). `None` if `name` is blank.
pub fn with_extension(name: &str, ext: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let suffix = format!(".{}", ext.trim_start_matches('.'));
    let has_ext = name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(&suffix);

    Some(match has_ext {
        true => name.to_string(),
        false => format!("{name}{suffix}"),
    })
}

/// The base instruction followed by the story's own prompt, if it has one.
pub fn full_prompt(base: &str, prompt: &str) -> String {
    match (base.trim(), prompt.trim()) {
        (base, "") => base.to_string(),
        ("", prompt) => prompt.to_string(),
        (base, prompt) => format!("{base} {prompt}"),
    }
}

/// Every image referenced by `library` with no file of that name in
/// `images_dir`, in story order.
pub fn missing_images(library: &Library, images_dir: &Path, settings: &Settings) -> Vec<MissingImage> {
    let mut missing = vec![];
    for (id, story) in library.iter() {
        for (filename, prompt) in image_requests(story, &settings.image_extension) {
            if images_dir.join(&filename).is_file() {
                continue;
            }

            missing.push(MissingImage {
                story: id.to_string(),
                prompt: full_prompt(&settings.base_prompt, &prompt),
                filename,
            });
        }
    }

    missing
}

impl fmt::Display for MissingImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {}: {} ---", self.story, self.filename)?;
        writeln!(f, "Save as: {}", self.filename)?;
        writeln!(f, "Full prompt:")?;
        writeln!(f, "{}", self.prompt)
    }
}
