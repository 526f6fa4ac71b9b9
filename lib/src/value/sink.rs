use std::{fs, io};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, Chainable};

/// A destination that is replaced as a whole: writes land in a temporary file
/// beside the target which is then renamed over it. A failed write leaves the
/// previous contents in place.
pub trait Sink {
    fn write_with<F>(&self, f: F) -> Result<()>
        where F: FnOnce(&mut dyn io::Write) -> Result<()>;

    #[inline]
    fn write<B: AsRef<[u8]>>(&self, bytes: B) -> Result<()> {
        self.write_with(|out| Ok(out.write_all(bytes.as_ref())?))
    }
}

impl Sink for Path {
    fn write_with<F>(&self, f: F) -> Result<()>
        where F: FnOnce(&mut dyn io::Write) -> Result<()>
    {
        let dir = match self.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(dir)
            .chain_with(|| error! {
                "failed to create temporary file",
                "directory" => dir.display(),
            })?;

        {
            let mut out = io::BufWriter::new(tmp.as_file_mut());
            f(&mut out)?;
            out.flush()?;
        }

        // Keep the replaced file's mode instead of the temp file's 0600.
        if let Ok(metadata) = fs::metadata(self) {
            tmp.as_file().set_permissions(metadata.permissions())?;
        }

        tmp.persist(self)
            .map_err(|e| e.error)
            .chain_with(|| error! {
                "failed to replace file",
                "file path" => self.display(),
            })?;

        Ok(())
    }
}

impl Sink for PathBuf {
    #[inline]
    fn write_with<F>(&self, f: F) -> Result<()>
        where F: FnOnce(&mut dyn io::Write) -> Result<()>
    {
        self.as_path().write_with(f)
    }
}
