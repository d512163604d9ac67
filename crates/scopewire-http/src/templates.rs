//! Handlebars templates for the inspector pages

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::HttpResult;

pub const INDEX: &str = "index";
pub const SCOPE: &str = "scope";
pub const SERVICE: &str = "service";

const PARTIALS: &[(&str, &str)] = &[
    ("header", include_str!("../templates/header.hbs")),
    ("footer", include_str!("../templates/footer.hbs")),
];

const PAGES: &[(&str, &str)] = &[
    (INDEX, include_str!("../templates/index.hbs")),
    (SCOPE, include_str!("../templates/scope.hbs")),
    (SERVICE, include_str!("../templates/service.hbs")),
];

/// Compiled page templates.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> HttpResult<Self> {
        let mut registry = Handlebars::new();
        for &(name, source) in PARTIALS {
            registry.register_partial(name, source)?;
        }
        for &(name, source) in PAGES {
            registry.register_template_string(name, source)?;
        }
        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, page: &str, data: &T) -> HttpResult<String> {
        Ok(self.registry.render(page, data)?)
    }
}
