#![doc = svgbobdoc::transform!(
//! Building blocks for a static reader site of short language-learning stories.
//!
//! # Overview
//!
//! A project is a directory holding one JSON file per story and a flat folder
//! of illustrations. Four independent batch steps work over it:
//!
//! ```svgbob
//!                  +-----------+                  +----------+
//!                  | stories/  |                  | images/  |
//!                  | *.json    |                  | *.png    |
//!                  +-----+-----+                  +----+-----+
//!                        |                             |
//!        +---------------+--------------+              |
//!        |               |              |              |
//!  +-----+-----+   +-----+-----+   +----+-----+   +----+------+
//!  | manifest  |   |   site    |   |  report  |   |  images   |
//!  |  refresh  |   | generate  |   | missing  |   | normalize |
//!  +-----+-----+   +-----+-----+   +----+-----+   +----+------+
//!        |               |              |              |
//!  manifest.json   index.html      prompts on      opaque PNGs,
//!                  story.html        stdout         in place
//! ```
//!
//!   * [`manifest::refresh()`] lists the story identifiers (file stems) into
//!     the `stories/manifest.json` sidecar.
//!
//!   * [`site::generate()`] loads the [`library::Library`], derives one
//!     [`manifest::Summary`] per story, and renders `index.html` and
//!     `story.html` with both embedded as inline script payloads.
//!
//!   * [`report::missing_images()`] lists every image a story references
//!     that has no file in the images directory, along with the prompt to
//!     generate it from.
//!
//!   * [`images::Normalizer`] flattens transparency onto a solid background
//!     and recompresses every image as PNG, replacing files atomically.
//!
//! Every file the crate writes goes through [`value::Sink`], which writes a
//! temporary file next to the target and renames it into place.
)]

#[macro_use]
pub mod error;
pub mod listing;
pub mod value;
pub mod story;
pub mod settings;
pub mod library;
pub mod manifest;
pub mod templating;
pub mod site;
pub mod images;
pub mod report;

/// Directory of story records, relative to the project root.
pub const STORIES_DIR: &str = "stories";

/// Directory of illustrations, relative to the project root.
pub const IMAGES_DIR: &str = "images";

/// Sidecar index inside [`STORIES_DIR`]. Never loaded as a story.
pub const MANIFEST_FILE: &str = "manifest.json";

pub const INDEX_PAGE: &str = "index.html";
pub const READER_PAGE: &str = "story.html";
