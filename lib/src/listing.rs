use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, Chainable};

/// A regular file directly inside a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub file_name: String,
}

/// The regular files of one directory, sorted by file name.
#[derive(Debug, Default)]
pub struct Listing {
    pub entries: Vec<Entry>,
}

impl Listing {
    /// Lists the files in `dir`, not recursing into subdirectories. Hidden
    /// files are skipped. Fails if `dir` is not an existing directory.
    pub fn read<P: AsRef<Path>>(dir: P) -> Result<Self> {
        use jwalk::WalkDir;

        let root = dir.as_ref();
        require_dir(root)?;

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort(true);

        let mut entries = vec![];
        for entry in walker {
            let entry = entry.map_err(|e| error! {
                "failed to list directory",
                "directory" => root.display(),
                "cause" => e,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            entries.push(Entry {
                path: entry.path(),
                file_name: entry.file_name().to_string_lossy().into_owned(),
            });
        }

        Ok(Listing { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Files whose extension equals `ext`, compared case-sensitively.
    pub fn with_ext<'a>(&'a self, ext: &'a str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.iter().filter(move |e| e.file_ext() == Some(ext))
    }
}

impl Entry {
    /// File name without the extension.
    pub fn file_stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((left, _)) => left,
            None => &self.file_name,
        }
    }

    /// The final extension, if any.
    pub fn file_ext(&self) -> Option<&str> {
        self.file_name.rsplit_once('.').map(|(_, right)| right)
    }
}

#[track_caller]
pub fn require_dir(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => err! {
            "path must point to a directory",
            "path is not a directory" => path.display(),
        },
        Err(e) => Err(e).chain(error! {
            "folder does not exist",
            "path" => path.display(),
        }),
    }
}
