use std::collections::BTreeMap;
use std::path::Path;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result, Chainable};
use crate::listing::Listing;
use crate::story::Story;
use crate::value::{Format, Json};

/// Every story record in a stories directory, keyed by file stem.
#[derive(Debug, Default)]
pub struct Library {
    pub records: BTreeMap<String, Record>,
    pub skipped: Vec<Skipped>,
}

/// A story file's JSON object exactly as written, plus its typed view.
/// Serializes as the object it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub raw: Map<String, Value>,
    pub story: Story,
}

/// A story file that couldn't be loaded.
#[derive(Debug)]
pub struct Skipped {
    pub file_name: String,
    pub error: Error,
}

impl Record {
    /// `None` unless `value` is a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(raw) => Some(Record { story: Story::from_record(&raw), raw }),
            _ => None,
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl Library {
    /// Loads every `*.json` file in `dir` except the sidecar index. Files that
    /// can't be read, aren't JSON, or don't hold a JSON object are recorded in
    /// `skipped` and logged; only a missing or unreadable directory is an
    /// error.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let listing = Listing::read(dir).chain_with(|| error! {
            "failed to load stories",
            "stories directory" => dir.display(),
        })?;

        let mut library = Library::default();
        for entry in listing.with_ext("json") {
            if entry.file_name == crate::MANIFEST_FILE {
                continue;
            }

            let _span = tracing::warn_span!("story", file = %entry.file_name).entered();
            let record = Json::read::<Value>(&entry.path).and_then(|value| {
                Record::from_value(value).ok_or_else(|| error! {
                    "not a story record",
                    "expected a JSON object",
                })
            });

            match record {
                Ok(record) => library.insert(entry.file_stem(), record),
                Err(error) => {
                    tracing::warn!("skipping story: {}", error.message());
                    library.skipped.push(Skipped { file_name: entry.file_name.clone(), error });
                }
            }
        }

        tracing::debug!(
            stories = library.len(),
            skipped = library.skipped.len(),
            "loaded {}", dir.display(),
        );

        Ok(library)
    }

    pub fn insert<I: Into<String>>(&mut self, id: I, record: Record) {
        self.records.insert(id.into(), record);
    }

    pub fn get(&self, id: &str) -> Option<&Story> {
        self.records.get(id).map(|record| &record.story)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Story)> {
        self.records.iter().map(|(id, record)| (id.as_str(), &record.story))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
