//! Text template rendering.
//!
//! Three passes over the template text, always in this order, each feeding
//! the next:
//!
//! 1. `{{ name }}` is replaced by the value of `name`. Markers naming a
//!    variable the context does not hold are left as written.
//! 2. `{% if name %}…{% endif %}` keeps its body when `name` is truthy and
//!    drops it otherwise.
//! 3. `{% for item in list %}…{% endfor %}` repeats its body once per element
//!    of `list`, replacing `{{ item }}` in each copy.
//!
//! Blocks do not nest: a block ends at the nearest closing tag. Rendering
//! never fails.
//!
//! ```rust
//! use tessera::template::{render, Context};
//!
//! let ctx = Context::new()
//!     .with("name", "Jero")
//!     .with("admin", true)
//!     .with("tags", vec!["rust", "web"]);
//!
//! let out = render(
//!     "Hi {{ name }}!{% if admin %} (admin){% endif %}\
//!      {% for t in tags %} #{{ t }}{% endfor %}",
//!     &ctx,
//! );
//! assert_eq!(out, "Hi Jero! (admin) #rust #web");
//! ```

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("variable pattern is valid")
});

static IF_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{%\s*if\s+(\w+)\s*%\}(.*?)\{%\s*endif\s*%\}")
        .expect("if pattern is valid")
});

static FOR_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{%\s*for\s+(\w+)\s+in\s+(\w+)\s*%\}(.*?)\{%\s*endfor\s*%\}")
        .expect("for pattern is valid")
});

// ── Values ────────────────────────────────────────────────────────────────────

/// A single template value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Int(n) => *n != 0,
            Self::Float(x) => *x != 0.0,
            Self::Bool(b) => *b,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A context entry: a scalar, or a flat list of scalars for loops.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Value {
    /// Falsy: empty text, zero, `false`, the empty list.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_truthy(),
            Self::List(items) => !items.is_empty(),
        }
    }
}

/// Lists render as `[a, b, c]`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => fmt::Display::fmt(s, f),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! scalar_from {
    ($variant:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self { Self::$variant(v.into()) }
            }
        )+
    };
}

scalar_from!(Text: String, &str, &String);
scalar_from!(Int: i64, i32, u32, i16, u16);
scalar_from!(Float: f64, f32);
scalar_from!(Bool: bool);

impl From<usize> for Scalar {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or_else(|_| Self::Text(v.to_string()), Self::Int)
    }
}

macro_rules! value_from {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self { Self::Scalar(v.into()) }
            }
        )+
    };
}

value_from!(Scalar, String, &str, &String, i64, i32, u32, i16, u16, usize, f64, f32, bool);

impl<T: Into<Scalar>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

// ── Context ───────────────────────────────────────────────────────────────────

/// Variables available to one render call.
#[derive(Clone, Debug, Default)]
pub struct Context {
    vars: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::is_truthy)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Self::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Renders `template` against `ctx`.
pub fn render(template: &str, ctx: &Context) -> String {
    let text = interpolate(template, ctx);
    let text = conditionals(&text, ctx);
    loops(&text, ctx)
}

fn interpolate(text: &str, ctx: &Context) -> String {
    VARIABLE
        .replace_all(text, |caps: &Captures<'_>| match ctx.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

fn conditionals(text: &str, ctx: &Context) -> String {
    IF_BLOCK
        .replace_all(text, |caps: &Captures<'_>| {
            if ctx.is_truthy(&caps[1]) { caps[2].to_owned() } else { String::new() }
        })
        .into_owned()
}

fn loops(text: &str, ctx: &Context) -> String {
    FOR_BLOCK
        .replace_all(text, |caps: &Captures<'_>| {
            let (item, body) = (&caps[1], &caps[3]);
            let Some(Value::List(elements)) = ctx.get(&caps[2]) else {
                return String::new();
            };
            elements.iter().map(|el| substitute(body, item, el)).collect::<String>()
        })
        .into_owned()
}

/// Replaces only the `{{ item }}` markers in a loop body.
fn substitute(body: &str, item: &str, element: &Scalar) -> String {
    VARIABLE
        .replace_all(body, |caps: &Captures<'_>| {
            if &caps[1] == item { element.to_string() } else { caps[0].to_owned() }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_with_any_inner_whitespace() {
        let ctx = Context::new().with("name", "Jero").with("n", 3);
        assert_eq!(render("Hi {{name}}, {{  name }} x{{ n\t}}", &ctx), "Hi Jero, Jero x3");
    }

    #[test]
    fn unknown_variables_are_left_in_place() {
        let ctx = Context::new().with("a", 1);
        assert_eq!(render("{{ a }} {{ b }}", &ctx), "1 {{ b }}");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let ctx = Context::new().with("a", "{{ b }}").with("b", "x");
        assert_eq!(render("{{ a }}", &ctx), "{{ b }}");
    }

    #[test]
    fn default_text_forms() {
        let ctx = Context::new()
            .with("f", 2.5)
            .with("whole", 3.0)
            .with("yes", true)
            .with("list", vec![1, 2, 3]);
        assert_eq!(render("{{ f }} {{ whole }} {{ yes }} {{ list }}", &ctx), "2.5 3 true [1, 2, 3]");
    }

    #[test]
    fn if_block_truthiness() {
        let t = "{% if show %}X{% endif %}";
        assert_eq!(render(t, &Context::new().with("show", true)), "X");
        assert_eq!(render(t, &Context::new().with("show", false)), "");
        assert_eq!(render(t, &Context::new()), "");
        assert_eq!(render(t, &Context::new().with("show", "")), "");
        assert_eq!(render(t, &Context::new().with("show", 0)), "");
        assert_eq!(render(t, &Context::new().with("show", 0.0)), "");
        assert_eq!(render(t, &Context::new().with("show", Vec::<i64>::new())), "");
        assert_eq!(render(t, &Context::new().with("show", "no")), "X");
        assert_eq!(render(t, &Context::new().with("show", vec![0])), "X");
    }

    #[test]
    fn if_block_spans_lines_and_keeps_surroundings() {
        let t = "a\n{%if user%}\n  <b>{{ user }}</b>\n{% endif %}\nz";
        assert_eq!(render(t, &Context::new().with("user", "kim")), "a\n\n  <b>kim</b>\n\nz");
        assert_eq!(render(t, &Context::new()), "a\n\nz");
    }

    #[test]
    fn if_blocks_close_at_nearest_endif() {
        let t = "{% if a %}1{% if b %}2{% endif %}3{% endif %}";
        let ctx = Context::new().with("a", true);
        assert_eq!(render(t, &ctx), "1{% if b %}23{% endif %}");
    }

    #[test]
    fn for_block_repeats_body() {
        let t = "{% for n in items %}[{{ n }}]{% endfor %}";
        assert_eq!(render(t, &Context::new().with("items", vec![1, 2, 3])), "[1][2][3]");
        assert_eq!(render(t, &Context::new().with("items", Vec::<i64>::new())), "");
        assert_eq!(render(t, &Context::new()), "");
        assert_eq!(render(t, &Context::new().with("items", "abc")), "");
    }

    #[test]
    fn loop_body_sees_pass_one_output() {
        let t = "{% for n in xs %}{{ title }}:{{ n }};{% endfor %}";
        let ctx = Context::new().with("title", "T").with("xs", vec!["a", "b"]);
        assert_eq!(render(t, &ctx), "T:a;T:b;");

        // An unrelated unknown marker survives every iteration untouched.
        let t = "{% for n in xs %}{{ other }}{{ n }}{% endfor %}";
        let ctx = Context::new().with("xs", vec!["a", "b"]);
        assert_eq!(render(t, &ctx), "{{ other }}a{{ other }}b");
    }

    #[test]
    fn loop_marker_accepts_any_inner_whitespace() {
        let t = "{% for n in xs %}{{n}}|{{  n\t}}|{{ n }};{% endfor %}";
        let ctx = Context::new().with("xs", vec!["a", "b"]);
        assert_eq!(render(t, &ctx), "a|a|a;b|b|b;");
    }

    #[test]
    fn loop_variable_shadowed_by_context_is_substituted_by_pass_one() {
        let t = "{% for n in xs %}{{ n }}{% endfor %}";
        let ctx = Context::new().with("n", "outer").with("xs", vec![1, 2]);
        assert_eq!(render(t, &ctx), "outerouter");
    }

    #[test]
    fn conditionals_run_before_loops() {
        let t = "{% if on %}{% for x in xs %}{{ x }}{% endfor %}{% endif %}";
        let ctx = Context::new().with("on", true).with("xs", vec!["a", "b"]);
        assert_eq!(render(t, &ctx), "ab");
        let ctx = Context::new().with("xs", vec!["a", "b"]);
        assert_eq!(render(t, &ctx), "");
    }

    #[test]
    fn rendering_is_stable_once_markers_are_gone() {
        let t = "<h1>{{ name }}</h1>{% if name %}!{% endif %}{% for i in xs %}{{ i }},{% endfor %}";
        let ctx: Context = [("name", Value::from("Jero")), ("xs", Value::from(vec![1, 2]))]
            .into_iter()
            .collect();
        let once = render(t, &ctx);
        assert_eq!(once, "<h1>Jero</h1>!1,2,");
        assert_eq!(render(&once, &ctx), once);
    }
}
