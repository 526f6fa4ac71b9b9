use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ErrorDetail, Result, Chainable};

pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// Parses `string` as the data format `Self` as a `T` or returns an error
    /// if the `string` is an invalid `T`.
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    /// Reads the file at `path` as UTF-8 and parses it as a `T`.
    fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let string = fs::read_to_string(path).chain_with(|| error! {
            "failed to read file",
            "file path" => path.display(),
        })?;

        Ok(Self::from_str(&string)?)
    }
}

macro_rules! impl_format {
    ($name:ident : $func:expr, $E:ty) => (
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml: toml::from_str, toml::de::Error);
impl_format!(Json: serde_json::from_str, serde_json::Error);

impl Json {
    /// Two-space indented JSON followed by a newline.
    pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        let mut string = serde_json::to_string_pretty(value)?;
        string.push('\n');
        Ok(string)
    }
}
