use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Spanish Stories";

pub const DEFAULT_BASE_PROMPT: &str = "I am building a story app where I write different \
    story. I need to generate images. Always use this style, transparent background and \
    black lines, like a drawn sketch of the actual prompt. And no text. Aspect ratio 16:9. \
    Generate image for this prompt:";

/// Project settings, read from the optional `config.toml`. Every key is
/// optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Title of the story index, also appended to reader page titles.
    pub title: String,
    /// RGB color transparent pixels are composited onto.
    pub background: [u8; 3],
    /// Extensions the image normalizer picks up, without the dot.
    pub extensions: Vec<String>,
    /// Extension appended to image references that lack it.
    pub image_extension: String,
    /// Instruction placed before every story-specific image prompt.
    pub base_prompt: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            title: DEFAULT_TITLE.into(),
            background: [255, 255, 255],
            extensions: ["png", "jpg", "jpeg", "webp", "bmp", "tiff"]
                .into_iter()
                .map(String::from)
                .collect(),
            image_extension: "png".into(),
            base_prompt: DEFAULT_BASE_PROMPT.into(),
        }
    }
}
