use std::process::ExitCode;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cuentos::error::{Error, Result};

use crate::commands::Status;

/// Sends diagnostics to stderr, filtered by `RUST_LOG` (default `info`).
/// Product output stays on stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).without_time().with_target(false))
        .init();
}

/// Runs a utility's body with logging installed. An error is printed to
/// stderr and turned into a failing exit code.
pub fn run<F: FnOnce() -> Result<Status>>(body: F) -> ExitCode {
    init_tracing();
    match body() {
        Ok(status) => status.exit(),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Every message in the error chain on one line, outermost first.
pub fn one_line(error: &Error) -> String {
    let mut line = error.message();
    let mut cause = error.cause();
    while let Some(e) = cause {
        line.push_str(": ");
        line.push_str(&e.message());
        cause = e.cause();
    }

    line
}

#[cfg(test)]
mod util_tests {
    use cuentos::error;
    use cuentos::error::Chainable;

    use super::*;

    #[test]
    fn one_line_joins_the_chain() {
        let result: Result<()> = Err(error!("bad data")).chain(error! {
            "failed to decode image",
            "file path" => "images/a.png",
        });

        assert_eq!(one_line(&result.unwrap_err()), "failed to decode image: bad data");
    }
}
