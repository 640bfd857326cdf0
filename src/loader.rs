//! Template sources and the name-based render helper.
//!
//! The renderer only ever sees template *text*. Where that text comes from is
//! a [`TemplateSource`]: a directory on disk in production, an in-memory map
//! in tests.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::template::{self, Context};

/// Why a template's text could not be produced.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("cannot read template `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Looks up raw template text by name.
pub trait TemplateSource: Send + Sync {
    fn load(&self, name: &str) -> Result<String, TemplateError>;
}

/// Reads `<root>/<name>` from disk on every call.
///
/// Names that would leave `root` (absolute paths, `..`) are reported as
/// not found.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateSource for DirSource {
    fn load(&self, name: &str) -> Result<String, TemplateError> {
        let relative = Path::new(name);
        let contained = relative.components().all(|c| matches!(c, Component::Normal(_)));
        if name.is_empty() || !contained {
            return Err(TemplateError::NotFound(name.to_owned()));
        }

        fs::read_to_string(self.root.join(relative)).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => TemplateError::NotFound(name.to_owned()),
            _ => TemplateError::Io { name: name.to_owned(), source },
        })
    }
}

/// Templates held in memory, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    templates: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(name.into(), text.into());
        self
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, name: &str) -> Result<String, TemplateError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(name.to_owned()))
    }
}

// ── Templates ─────────────────────────────────────────────────────────────────

/// Renders templates by name. Cheap to clone; share one across handlers.
///
/// ```rust
/// use tessera::{Context, MemorySource, Templates};
///
/// let templates = Templates::new(MemorySource::new().with("hi.html", "Hi {{ who }}"));
/// let ctx = Context::new().with("who", "Jero");
/// assert_eq!(templates.render("hi.html", &ctx), "Hi Jero");
/// assert_eq!(templates.render("nope.html", &ctx), "<h1>Template not found: nope.html</h1>");
/// ```
#[derive(Clone)]
pub struct Templates {
    source: Arc<dyn TemplateSource>,
}

impl Templates {
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Self { source: Arc::new(source) }
    }

    /// Templates read from a directory on disk.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(DirSource::new(root))
    }

    /// Loads and renders `name`. A missing or unreadable template renders as a
    /// visible placeholder page instead of failing; the two get different
    /// wording.
    pub fn render(&self, name: &str, ctx: &Context) -> String {
        match self.try_render(name, ctx) {
            Ok(text) => text,
            Err(err @ TemplateError::NotFound(_)) => {
                warn!(template = name, "{err}");
                format!("<h1>Template not found: {name}</h1>")
            }
            Err(err @ TemplateError::Io { .. }) => {
                warn!(template = name, "{err}");
                format!("<h1>Template unreadable: {name}</h1>")
            }
        }
    }

    /// Loads and renders `name`, reporting a missing template to the caller.
    pub fn try_render(&self, name: &str, ctx: &Context) -> Result<String, TemplateError> {
        let text = self.source.load(name)?;
        Ok(template::render(&text, ctx))
    }
}
