//! Rendering report nodes through named templates.
//!
//! Every node of a [`crate::report::ReportModel`] implements [`Render`]: it names the template it
//! fills and exposes a [`Context`] of fields. Templates are plain text with `{{ field }}`
//! placeholders. Nested nodes are rendered first and inserted verbatim as fragments; scalar
//! fields are HTML-escaped, `null` becomes `n/a`, and arrays or maps are written as compact JSON.
//!
//! ```rust
//! use rust_data_profiling::render::{Render, Templates};
//! use rust_data_profiling::report::DatasetSummary;
//!
//! let mut templates = Templates::new();
//! templates.insert("dataset.html", "{{ observations }} rows x {{ variables }} columns");
//! let summary = DatasetSummary { variables: 2, observations: 10, ..Default::default() };
//! assert_eq!(summary.render(&templates).unwrap(), "10 rows x 2 columns");
//! ```

mod html;

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::RenderError;
use crate::profile::MetricResult;
use crate::report::{ColumnProfile, DatasetSummary, ReportModel};

/// One named value available to a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// A plain field, formatted and escaped on insertion.
    Value(JsonValue),
    /// Already-rendered markup, inserted as is.
    Fragment(String),
}

/// Named fields exposed by a node, in declaration order.
pub type Context = IndexMap<String, Slot>;

/// A lookup of template bodies by name.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    templates: HashMap<String, String>,
}

impl Templates {
    /// An empty template set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in HTML report templates.
    pub fn html() -> Self {
        let mut t = Self::new();
        for (name, body) in html::TEMPLATES {
            t.insert(name, body);
        }
        t
    }

    /// Register (or replace) a template.
    pub fn insert(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.templates.insert(name.into(), body.into());
    }

    pub fn get(&self, name: &str) -> Result<&str, RenderError> {
        self.templates
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RenderError::MissingTemplate(name.to_string()))
    }
}

/// "Render to document fragment" for report nodes.
pub trait Render {
    fn template_name(&self) -> &'static str;

    /// Fields the template may reference, rendering nested nodes with `templates` as needed.
    fn context(&self, templates: &Templates) -> Result<Context, RenderError>;

    fn render(&self, templates: &Templates) -> Result<String, RenderError> {
        let name = self.template_name();
        fill(name, templates.get(name)?, &self.context(templates)?)
    }
}

impl Render for DatasetSummary {
    fn template_name(&self) -> &'static str {
        "dataset.html"
    }

    fn context(&self, _templates: &Templates) -> Result<Context, RenderError> {
        fields_of(self)
    }
}

impl Render for MetricResult {
    fn template_name(&self) -> &'static str {
        match self {
            MetricResult::Numeric(_) => "numeric.html",
            MetricResult::Quantile(_) => "quantile.html",
            MetricResult::Dispersion(_) => "dispersion.html",
            MetricResult::Temporal(_) => "temporal.html",
            MetricResult::Text(_) => "text.html",
        }
    }

    fn context(&self, _templates: &Templates) -> Result<Context, RenderError> {
        fields_of(self)
    }
}

impl Render for ColumnProfile {
    fn template_name(&self) -> &'static str {
        "column.html"
    }

    fn context(&self, templates: &Templates) -> Result<Context, RenderError> {
        let mut ctx = Context::new();
        ctx.insert("name".to_string(), Slot::Value(self.name.clone().into()));
        ctx.insert(
            "semantic_type".to_string(),
            Slot::Value(self.semantic_type.as_str().into()),
        );
        ctx.insert("dtype".to_string(), Slot::Value(self.dtype.clone().into()));
        ctx.insert("profiles".to_string(), Slot::Fragment(render_all(&self.profiles, templates)?));
        Ok(ctx)
    }
}

impl Render for ReportModel {
    fn template_name(&self) -> &'static str {
        "base.html"
    }

    fn context(&self, templates: &Templates) -> Result<Context, RenderError> {
        let mut ctx = Context::new();
        ctx.insert("table".to_string(), Slot::Fragment(self.table.render(templates)?));
        ctx.insert(
            "variables".to_string(),
            Slot::Fragment(render_all(self.variables.values(), templates)?),
        );
        let failures = self
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.profiler, f.message))
            .collect::<Vec<_>>();
        ctx.insert("failures".to_string(), Slot::Value(failures.into()));
        Ok(ctx)
    }
}

fn render_all<'a, T>(nodes: impl IntoIterator<Item = &'a T>, templates: &Templates) -> Result<String, RenderError>
where
    T: Render + 'a,
{
    nodes.into_iter().map(|n| n.render(templates)).collect()
}

/// Top-level serialized fields of `node` as value slots.
fn fields_of<T: Serialize>(node: &T) -> Result<Context, RenderError> {
    match serde_json::to_value(node)? {
        JsonValue::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, Slot::Value(v))).collect()),
        other => Ok(Context::from([("value".to_string(), Slot::Value(other))])),
    }
}

/// Substitute every `{{ field }}` in `body`.
fn fill(template: &str, body: &str, ctx: &Context) -> Result<String, RenderError> {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            // Unterminated braces are literal text.
            out.push_str(&rest[open..]);
            return Ok(out);
        };
        let field = after[..close].trim();
        match ctx.get(field) {
            Some(Slot::Fragment(markup)) => out.push_str(markup),
            Some(Slot::Value(v)) => out.push_str(&escape_html(&display(v))),
            None => {
                return Err(RenderError::UnknownField {
                    template: template.to_string(),
                    field: field.to_string(),
                });
            }
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

fn display(v: &JsonValue) -> String {
    match v {
        JsonValue::Null => "n/a".to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Array(_) | JsonValue::Object(_) => v.to_string(),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
