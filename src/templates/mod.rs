use log::{error, info, warn};
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

pub const TEMPLATE_404: &str = "404.html";

#[derive(Serialize, Debug, Clone)]
pub struct TemplateServerContext {
    pub name: String,
    pub version: &'static str,
}

impl TemplateServerContext {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TemplateErrorContext {
    pub code: u16,
    pub path: String,
    pub message: String,
}

fn checked_add_template<'a>(env: &mut Environment<'a>, entry: &'a str, data: &'a str) {
    match env.add_template(entry, data) {
        Ok(_) => {
            info!("Added template {}", entry)
        }
        Err(e) => {
            error!("Error adding template for \"{}\": {}", entry, e)
        }
    }
}

pub fn templates_from_builtin<'a>() -> Environment<'a> {
    let mut env = Environment::new();

    checked_add_template(&mut env, TEMPLATE_404, include_str!("404.jinja"));

    env
}

/// Render the HTML not-found page for `path`. `None` if the template is
/// missing or fails to render.
pub fn render_not_found(
    env: &Environment<'_>,
    server: &TemplateServerContext,
    path: &str,
) -> Option<String> {
    let error = TemplateErrorContext {
        code: 404,
        path: path.to_string(),
        message: format!("{path} not found"),
    };

    let rendered = env
        .get_template(TEMPLATE_404)
        .and_then(|tp| tp.render(context! { server => server, error => error }));
    match rendered {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Failed to render {}: {}", TEMPLATE_404, e);
            None
        }
    }
}
