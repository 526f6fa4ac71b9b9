use std::io;
use std::process::ExitCode;

use cuentista::{commands, util, Project};

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Flattens transparency onto the background color and recompresses
        /// every image in a folder as PNG, in place.
        cmd compress-images {
            /// Folder to process, relative to the project root. Defaults to `images`.
            optional folder: PathBuf
        }
    }
}

fn main() -> ExitCode {
    let flags = flags::CompressImages::from_env_or_exit();
    util::run(|| {
        let project = Project::discover()?;
        commands::compress_images(&project, flags.folder.as_deref(), &mut io::stdout().lock())
    })
}
