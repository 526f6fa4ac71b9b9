pub mod minijinja;

use std::borrow::Cow;
use std::fmt::Debug;

use serde::Serialize;

use crate::error::Result;
use crate::settings::Settings;

pub trait EngineInit {
    type Engine: Engine + 'static;

    fn init(settings: &Settings) -> Result<Self::Engine>;
}

pub trait Engine: Send + Sync + Debug {
    /// Renders the page template `name` with `payload`, a script-safe JSON
    /// document as produced by [`script_json()`], spliced in verbatim.
    fn render(&self, name: &str, payload: &str) -> Result<String>;
}

/// Serializes `value` as JSON that can sit inside an inline `<script>` block.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(escape_script(&json).into_owned())
}

/// Replaces `<`, `>` and `&` with their `\uXXXX` escapes so that nothing in
/// `json` can close the script element or open a comment. In JSON these bytes
/// only occur inside strings, where the escape decodes to the same text.
pub fn escape_script(json: &str) -> Cow<'_, str> {
    let bytes = json.as_bytes();
    let mut escaped = String::new();
    let mut last = 0;
    for i in memchr::memchr3_iter(b'<', b'>', b'&', bytes) {
        escaped.push_str(&json[last..i]);
        escaped.push_str(match bytes[i] {
            b'<' => "\\u003c",
            b'>' => "\\u003e",
            _ => "\\u0026",
        });

        last = i + 1;
    }

    if last == 0 {
        return Cow::Borrowed(json);
    }

    escaped.push_str(&json[last..]);
    Cow::Owned(escaped)
}

#[cfg(test)]
mod escape_tests {
    use super::*;

    #[test]
    fn closing_tags_cannot_escape_the_script() {
        let text = "Fin.</script><script>alert(1)</SCRIPT><!-- & more";
        let json = script_json(&[text]).unwrap();
        assert!(!json.contains('<') && !json.contains('>'));
        assert!(!json.to_ascii_lowercase().contains("</script"));

        let back: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, [text]);
    }

    #[test]
    fn plain_json_is_borrowed() {
        assert!(matches!(escape_script(r#"{"a":"hola"}"#), Cow::Borrowed(_)));
        assert_eq!(escape_script(r#""ñ<b>&""#), r#""ñ\u003cb\u003e\u0026""#);
    }
}
