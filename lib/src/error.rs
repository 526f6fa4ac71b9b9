use std::{fmt, io};
use std::panic::Location;
use std::error::Error as StdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error with one or more details, each carrying `key: value` context,
/// and optionally the error that caused it.
#[derive(Debug)]
pub struct Error {
    detail: Vec<Box<dyn ErrorDetail>>,
    cause: Option<Box<Error>>,
    location: &'static Location<'static>,
}

pub trait ErrorDetail: fmt::Display + fmt::Debug + Send + Sync {
    fn context(&self) -> Vec<(Option<String>, String)> { vec![] }
}

impl Error {
    /// The headline message of the outermost detail.
    pub fn message(&self) -> String {
        self.detail.first().map(|d| d.to_string()).unwrap_or_default()
    }

    /// The error `self` was chained behind, if any.
    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    /// Makes `self` the innermost cause of `other` and returns `other`.
    pub fn chain(self, mut other: Error) -> Self {
        fn innermost(error: &mut Error) -> &mut Option<Box<Error>> {
            match error.cause {
                Some(ref mut cause) => innermost(cause),
                None => &mut error.cause,
            }
        }

        *innermost(&mut other) = Some(Box::new(self));
        other
    }
}

impl ErrorDetail for &(dyn StdError + Send + Sync) {
    fn context(&self) -> Vec<(Option<String>, String)> {
        let mut ctxt = vec![];
        let mut error = self.source();
        while let Some(e) = error {
            ctxt.push((None, e.to_string()));
            error = e.source();
        }

        ctxt
    }
}

impl ErrorDetail for Box<dyn StdError + Send + Sync> {
    fn context(&self) -> Vec<(Option<String>, String)> {
        let error: &(dyn StdError + Send + Sync) = &**self;
        error.context()
    }
}

macro_rules! impl_error_detail_with_std_error {
    ($T:ty) => {
        impl $crate::error::ErrorDetail for $T {
            fn context(&self) -> Vec<(Option<String>, String)> {
                let error: &(dyn std::error::Error + Send + Sync) = self;
                error.context()
            }
        }
    }
}

impl_error_detail_with_std_error!(io::Error);
impl_error_detail_with_std_error!(toml::de::Error);
impl_error_detail_with_std_error!(serde_json::Error);
impl_error_detail_with_std_error!(image::ImageError);

impl ErrorDetail for String { }
impl ErrorDetail for &'static str { }

impl<T: ErrorDetail + 'static> From<T> for Error {
    #[track_caller]
    fn from(detail: T) -> Self {
        Error {
            cause: None,
            detail: vec![Box::new(detail)],
            location: Location::caller(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[derive(Copy, Clone)] struct Indent(usize);

        impl fmt::Display for Indent {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for _ in 0..(self.0 * 4) { write!(f, " ")? }
                Ok(())
            }
        }

        struct Nested<'a>(Indent, &'a Error);

        impl fmt::Display for Nested<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let Nested(indent, e) = self;
                let newline = format!("\n{indent}");

                for detail in &e.detail {
                    writeln!(f, "{indent}{}", detail.to_string().replace('\n', &newline))?;
                    for (key, value) in detail.context() {
                        let value = value.replace('\n', &newline);
                        match key {
                            Some(key) => writeln!(f, "{indent}{key}: {value}")?,
                            None => writeln!(f, "{indent}{value}")?,
                        }
                    }
                }

                if std::env::var_os("RUST_BACKTRACE").is_some() {
                    writeln!(f, "{indent}[{}]", e.location)?;
                }

                match &e.cause {
                    Some(cause) => Nested(Indent(indent.0 + 1), cause).fmt(f),
                    None => Ok(()),
                }
            }
        }

        Nested(Indent(0), self).fmt(f)
    }
}

/// A message with ordered context parameters, as built by [`error!`].
#[derive(Debug)]
pub struct Message {
    pub message: String,
    pub parameters: Vec<(Option<String>, String)>,
}

#[doc(hidden)]
#[macro_export]
macro_rules! err {
    ($($token:tt)*) => (Err($crate::error!($($token)*)));
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($msg:expr, $($rest:tt)*) => (
        $crate::error::Error::from($crate::error::Message {
            message: $msg.to_string(),
            parameters: {
                #[allow(unused_mut)]
                let mut v: Vec<(Option<String>, String)> = Vec::new();
                $crate::error!(@param v $($rest)*);
                v
            },
        })
    );

    ($msg:expr) => ( $crate::error!($msg,) );

    (@param $v:ident $key:expr => $value:expr, $($rest:tt)*) => {
        $crate::error!(@param $v $key => $value);
        $crate::error!(@param $v $($rest)*);
    };

    (@param $v:ident $key:expr => $value:expr) => {
        $v.push((Some($key.to_string()), $value.to_string()));
    };

    (@param $v:ident $value:expr, $($rest:tt)*) => {
        $crate::error!(@param $v $value);
        $crate::error!(@param $v $($rest)*);
    };

    (@param $v:ident $value:expr) => {
        $v.push((None, $value.to_string()));
    };

    (@param $v:ident $(,)?) => { };
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl ErrorDetail for Message {
    fn context(&self) -> Vec<(Option<String>, String)> {
        self.parameters.clone()
    }
}

pub trait Chainable<T> {
    fn chain(self, other: impl Into<Error>) -> Result<T>;

    fn chain_with<F, E>(self, f: F) -> Result<T>
        where F: FnOnce() -> E, E: Into<Error>;
}

impl<T, E: Into<Error>> Chainable<T> for Result<T, E> {
    #[track_caller]
    fn chain(self, other: impl Into<Error>) -> Result<T> {
        self.map_err(|e| e.into().chain(other.into()))
    }

    #[track_caller]
    fn chain_with<F, Err>(self, f: F) -> Result<T>
        where F: FnOnce() -> Err, Err: Into<Error>,
    {
        self.map_err(|e| e.into().chain(f().into()))
    }
}

#[cfg(test)] static_assertions::assert_impl_all!(Error: Send, Sync, fmt::Display);

#[cfg(test)]
mod error_tests {
    use super::*;

    fn missing() -> Result<()> {
        let io = io::Error::new(io::ErrorKind::NotFound, "no such file");
        Err(io).chain(error! {
            "failed to open file for reading",
            "file path" => "stories/a.json",
        })
    }

    #[test]
    fn chained_errors_nest_causes() {
        let error = missing().unwrap_err();
        assert_eq!(error.message(), "failed to open file for reading");
        assert_eq!(error.cause().unwrap().message(), "no such file");

        let display = error.to_string();
        assert!(display.starts_with("failed to open file for reading\n"));
        assert!(display.contains("file path: stories/a.json\n"));
        assert!(display.contains("\n    no such file\n"));
    }

    #[test]
    fn chain_appends_to_innermost_cause() {
        let error = missing()
            .chain_with(|| error!("failed to load stories"))
            .unwrap_err();

        assert_eq!(error.message(), "failed to load stories");
        let cause = error.cause().unwrap();
        assert_eq!(cause.message(), "failed to open file for reading");
        assert_eq!(cause.cause().unwrap().message(), "no such file");
    }

    #[test]
    fn bare_messages_and_positional_context() {
        let error: Result<()> = err!("no story records found", "check the stories directory");
        let display = error.unwrap_err().to_string();
        let lines = display.lines().filter(|l| !l.starts_with('['));
        assert_eq!(lines.collect::<Vec<_>>(), [
            "no story records found",
            "check the stories directory",
        ]);
    }
}
