//! The typed view of a story record, as authored in `stories/*.json`.
//!
//! Only the fields the utilities read are decoded; the record itself is kept
//! verbatim by [`crate::library::Record`]. Decoding never fails on a JSON
//! object: `null` and missing fields are empty, numbers and booleans in text
//! fields are read as text, and values of any other wrong shape are ignored
//! with a warning.

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(default, deserialize_with = "scalar")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub title_translation: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<ImageRef>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub content: Vec<ContentItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Tag {
    #[serde(default, deserialize_with = "scalar")]
    pub name: Option<String>,
}

/// A reference to a file in `images/` plus the prompt to generate it with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageRef {
    #[serde(default, deserialize_with = "scalar")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub generation_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Sentence(Sentence),
    Image(ImageRef),
    /// Any other `type`. The reader page skips these.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Sentence {
    #[serde(default, deserialize_with = "scalar_text")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub highlights: Vec<Highlight>,
}

/// A highlighted range of a sentence's text in UTF-16 code units, the unit
/// the reader page slices strings with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub start_index: usize,
    pub end_index: usize,
}

/// A highlight that doesn't fit its sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightIssue {
    pub item: usize,
    pub highlight: Highlight,
    pub text_len: usize,
}

impl Story {
    /// Reads the typed view of a record. Never fails; see the module docs.
    pub fn from_record(record: &serde_json::Map<String, Value>) -> Self {
        Story::deserialize(Value::Object(record.clone())).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed story: {e}");
            Story::default()
        })
    }

    /// The thumbnail, if any, followed by every inline image, in order.
    pub fn image_refs(&self) -> impl Iterator<Item = &ImageRef> {
        let inline = self.content.iter().filter_map(|item| match item {
            ContentItem::Image(image) => Some(image),
            _ => None,
        });

        self.thumbnail.iter().chain(inline)
    }

    /// Highlights that are inverted or run past the end of their text. The
    /// reader clamps these, so they render, just not as written.
    pub fn highlight_issues(&self) -> Vec<HighlightIssue> {
        let mut issues = vec![];
        for (item, content) in self.content.iter().enumerate() {
            let ContentItem::Sentence(sentence) = content else { continue };
            let text_len = sentence.utf16_len();
            for &highlight in &sentence.highlights {
                if highlight.start_index > highlight.end_index || highlight.end_index > text_len {
                    issues.push(HighlightIssue { item, highlight, text_len });
                }
            }
        }

        issues
    }
}

impl Sentence {
    pub fn utf16_len(&self) -> usize {
        self.text.encode_utf16().count()
    }
}

impl fmt::Display for HighlightIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "content item {}: highlight {}..{} does not fit text of length {}",
            self.item, self.highlight.start_index, self.highlight.end_index, self.text_len)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Option<T> {
    match T::deserialize(value) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("ignoring malformed value: {e}");
            None
        }
    }
}

/// `null` and values of the wrong shape read as the default.
fn lenient<'de, D, T>(de: D) -> Result<T, D::Error>
    where D: Deserializer<'de>, T: DeserializeOwned + Default
{
    Ok(match Value::deserialize(de)? {
        Value::Null => T::default(),
        value => decode(value).unwrap_or_default(),
    })
}

/// Like [`lenient`], and elements of the wrong shape are dropped.
fn lenient_seq<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
    where D: Deserializer<'de>, T: DeserializeOwned
{
    let values: Vec<Value> = lenient(de)?;
    Ok(values.into_iter().filter_map(decode).collect())
}

fn scalar<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        value => {
            tracing::warn!("ignoring non-text value: {value}");
            None
        }
    })
}

fn scalar_text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(scalar(de)?.unwrap_or_default())
}

#[cfg(test)]
mod story_tests {
    use serde_json::json;

    use super::*;

    fn story(value: Value) -> Story {
        Story::from_record(value.as_object().unwrap())
    }

    fn sentence(text: &str, highlights: &[(usize, usize)]) -> ContentItem {
        ContentItem::Sentence(Sentence {
            text: text.into(),
            highlights: highlights.iter()
                .map(|&(start_index, end_index)| Highlight { start_index, end_index })
                .collect(),
        })
    }

    #[test]
    fn decodes_the_fields_it_reads() {
        let story = story(json!({
            "title": "El gato",
            "titleTranslation": "The cat",
            "level": "A1",
            "tags": [{"name": "Animals", "description": "Pets"}],
            "thumbnail": {"filename": "cat", "generation_prompt": "a cat"},
            "content": [
                {"type": "sentence", "text": "El gato duerme.", "translation": "The cat sleeps.",
                 "highlights": [{"startIndex": 3, "endIndex": 7}]},
                {"type": "image", "filename": "cat-sleeping.png", "generation_prompt": "sleeping"}
            ],
            "glossary": {"gato": {"translation": "cat"}}
        }));

        assert_eq!(story.title.as_deref(), Some("El gato"));
        assert_eq!(story.title_translation.as_deref(), Some("The cat"));
        assert_eq!(story.tags[0].name.as_deref(), Some("Animals"));
        assert_eq!(story.content, [
            sentence("El gato duerme.", &[(3, 7)]),
            ContentItem::Image(ImageRef {
                filename: Some("cat-sleeping.png".into()),
                generation_prompt: Some("sleeping".into()),
            }),
        ]);
    }

    #[test]
    fn nulls_and_missing_fields_are_empty() {
        let nulls = story(json!({
            "title": null, "tags": null, "thumbnail": null, "content": [
                {"type": "sentence", "text": null, "highlights": null},
                {"type": "image", "filename": null}
            ]
        }));

        assert_eq!(nulls.title, None);
        assert!(nulls.tags.is_empty() && nulls.thumbnail.is_none());
        assert_eq!(nulls.content, [sentence("", &[]), ContentItem::Image(ImageRef::default())]);
        assert_eq!(story(json!({})), Story::default());
    }

    #[test]
    fn wrong_shapes_are_read_leniently() {
        let story = story(json!({
            "title": ["not", "text"],
            "level": 1,
            "tags": "animals",
            "thumbnail": "cat.png",
            "content": [
                {"type": "video", "filename": "x.mp4"},
                {"type": "sentence", "text": "Hola", "highlights": [
                    {"startIndex": -1, "endIndex": 2},
                    {"startIndex": 0.5, "endIndex": 2},
                    {"startIndex": 0, "endIndex": 2}
                ]},
                "a bare string",
                {"filename": "no-type.png"}
            ]
        }));

        assert_eq!(story.title, None);
        assert_eq!(story.level.as_deref(), Some("1"));
        assert!(story.tags.is_empty() && story.thumbnail.is_none());
        assert_eq!(story.content, [ContentItem::Other, sentence("Hola", &[(0, 2)])]);
    }

    #[test]
    fn image_refs_start_with_the_thumbnail() {
        let story = story(json!({
            "thumbnail": {"filename": "cat"},
            "content": [
                {"type": "sentence", "text": "Hola"},
                {"type": "image", "filename": "cat-sleeping.png"}
            ]
        }));

        let names: Vec<_> = story.image_refs()
            .map(|i| i.filename.as_deref().unwrap())
            .collect();

        assert_eq!(names, ["cat", "cat-sleeping.png"]);
    }

    #[test]
    fn highlight_issues_use_utf16_lengths() {
        // "ñ" is one UTF-16 unit but two bytes; the emoji is two units.
        let story = Story {
            content: vec![
                ContentItem::Image(ImageRef::default()),
                sentence("Hola", &[(0, 4), (3, 9), (3, 1)]),
                sentence("año 🐈 gato", &[(7, 11), (7, 12)]),
            ],
            ..Default::default()
        };

        let issues = story.highlight_issues();
        let found: Vec<_> = issues.iter()
            .map(|i| (i.item, i.highlight.start_index, i.highlight.end_index, i.text_len))
            .collect();

        assert_eq!(found, [(1, 3, 9, 4), (1, 3, 1, 4), (2, 7, 12, 11)]);
        assert_eq!(issues[0].to_string(), "content item 1: highlight 3..9 does not fit text of length 4");
    }
}
