use std::io;
use std::process::ExitCode;

use cuentista::{commands, util, Project};

mod flags {
    xflags::xflags! {
        /// Lists every image the stories reference that is missing from
        /// `images/`, with the full prompt to generate it from.
        cmd list-missing-images {}
    }
}

fn main() -> ExitCode {
    flags::ListMissingImages::from_env_or_exit();
    util::run(|| commands::list_missing_images(&Project::discover()?, &mut io::stdout().lock()))
}
