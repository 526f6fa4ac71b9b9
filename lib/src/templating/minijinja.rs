use derive_more::Debug;
use minijinja::{context, Environment};
use minijinja::value::Value;

use crate::error::Result;
use crate::settings::Settings;
use crate::templating::{Engine, EngineInit};

/// Page templates compiled into the library, by output file name.
pub const TEMPLATES: &[(&str, &str)] = &[
    (crate::INDEX_PAGE, include_str!("../../templates/index.html")),
    (crate::READER_PAGE, include_str!("../../templates/story.html")),
];

#[derive(Debug)]
pub struct MiniJinjaEngine {
    #[debug(ignore)]
    env: Environment<'static>,
}

impl EngineInit for MiniJinjaEngine {
    type Engine = Self;

    fn init(settings: &Settings) -> Result<Self::Engine> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }

        // Names end in `.html`, so everything but the payload is HTML-escaped.
        env.add_global("G", Value::from_serializable(settings));
        Ok(MiniJinjaEngine { env })
    }
}

impl Engine for MiniJinjaEngine {
    fn render(&self, name: &str, payload: &str) -> Result<String> {
        let template = self.env.get_template(name)?;
        let payload = Value::from_safe_string(payload.to_string());
        Ok(template.render(context! { payload => payload })?)
    }
}

impl_error_detail_with_std_error!(minijinja::Error);
