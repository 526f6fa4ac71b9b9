use std::io;
use std::process::ExitCode;

use cuentista::{commands, util, Project};

mod flags {
    xflags::xflags! {
        /// Writes the sorted identifiers of every story in `stories/` to
        /// `stories/manifest.json`.
        cmd update-manifest {}
    }
}

fn main() -> ExitCode {
    flags::UpdateManifest::from_env_or_exit();
    util::run(|| commands::update_manifest(&Project::discover()?, &mut io::stdout().lock()))
}
