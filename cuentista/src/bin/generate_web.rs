use std::io;
use std::process::ExitCode;

use cuentista::{commands, util, Project};

mod flags {
    xflags::xflags! {
        /// Renders `index.html` and `story.html` from the story records in
        /// `stories/`, with every record embedded in the pages.
        cmd generate-web {}
    }
}

fn main() -> ExitCode {
    flags::GenerateWeb::from_env_or_exit();
    util::run(|| commands::generate_web(&Project::discover()?, &mut io::stdout().lock()))
}
