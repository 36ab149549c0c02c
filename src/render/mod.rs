//! Template rendering for dashboard views.
//!
//! A [`Renderer`] is built once at startup from a [`RendererConfig`] and shared
//! read-only between requests. Each render call receives the request's
//! [`MountPrefix`], which backs the per-request `URL` template function; the
//! other helpers are registered on the environment itself.
//!
//! With `reload` enabled the environment is rebuilt from disk before every
//! render so template edits show up without a restart.

pub mod helpers;
pub mod mount;

use std::collections::BTreeMap;
use std::path::PathBuf;

use minijinja::{Environment, Value};
use serde::Serialize;
use thiserror::Error;

pub use mount::MountPrefix;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template directory not found: {path}")]
    MissingTemplateDir { path: String },

    #[error("failed to load template {name}: {source}")]
    Load {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to render template {name}: {source}")]
    Execute {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

#[derive(Clone, Debug)]
pub struct RendererConfig {
    pub template_dir: PathBuf,
    /// Layout template name (without extension) that views extend.
    pub layout: String,
    pub reload: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("./templates"),
            layout: "layout".to_string(),
            reload: true,
        }
    }
}

/// Variables handed to a view template. Built per request.
#[derive(Clone, Debug, Default)]
pub struct ViewContext {
    values: BTreeMap<String, Value>,
}

impl ViewContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<T: Serialize>(&mut self, key: &str, value: T) {
        self.values
            .insert(key.to_string(), Value::from_serialize(&value));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    fn into_template_value(self, mount: &MountPrefix) -> Value {
        let base = mount.clone();
        let url = Value::from_function(move |path: String| {
            Value::from_safe_string(helpers::escape_attr(&base.join(&path)))
        });
        Value::from_iter(
            self.values
                .into_iter()
                .chain(std::iter::once(("URL".to_string(), url))),
        )
    }
}

pub struct Renderer {
    config: RendererConfig,
    cached: Option<Environment<'static>>,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Result<Self, RenderError> {
        if !config.template_dir.is_dir() {
            return Err(RenderError::MissingTemplateDir {
                path: config.template_dir.display().to_string(),
            });
        }
        let cached = if config.reload {
            None
        } else {
            Some(build_environment(&config))
        };
        Ok(Self { config, cached })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn render(
        &self,
        view: &str,
        context: ViewContext,
        mount: &MountPrefix,
    ) -> Result<String, RenderError> {
        let fresh;
        let env = match self.cached.as_ref() {
            Some(env) => env,
            None => {
                fresh = build_environment(&self.config);
                &fresh
            }
        };

        let name = template_name(view);
        let template = env.get_template(&name).map_err(|e| RenderError::Load {
            name: name.clone(),
            source: e,
        })?;
        template
            .render(context.into_template_value(mount))
            .map_err(|e| RenderError::Execute { name, source: e })
    }
}

fn template_name(view: &str) -> String {
    format!("{view}.html")
}

fn build_environment(config: &RendererConfig) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader(config.template_dir.clone()));
    env.add_global("layout", template_name(&config.layout));
    env.add_function("JSON", |text: String| helpers::pretty_json(&text));
    env.add_function("TimeAgo", |unix_seconds: i64| helpers::time_ago(unix_seconds));
    env.add_function("Timestamp", |unix_seconds: i64| {
        helpers::timestamp(unix_seconds)
    });
    env.add_function("Colour", |label: String| helpers::colour(&label).to_string());
    env
}
