//! Dependency graph export
//!
//! Edge-list text grammar, one entry per line:
//!
//! ```text
//! # comment
//! A -> FX      edge: A depends on FX
//! FX           module with no dependencies
//! "#raw" -> FX quoted name
//! ```
//!
//! Lines are sorted. Blank lines and `#` comments are ignored on input.
//! A name that is empty, starts with `#` or `"`, contains `->` or a control
//! character, or has surrounding whitespace is written as a JSON string
//! literal, so every graph survives a round trip.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::module::graph::DependencyGraph;
use crate::module::traits::ModuleError;

const EDGE_ARROW: &str = "->";

/// Textual formats a graph can be rendered in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphExportFormat {
    /// One `from -> to` line per edge
    #[default]
    EdgeList,
    /// Graphviz `digraph`
    Dot,
    /// JSON object mapping each module to its dependency list
    Json,
}

impl DependencyGraph {
    /// Render in the requested format
    pub fn export(&self, format: GraphExportFormat) -> Result<String, ModuleError> {
        match format {
            GraphExportFormat::EdgeList => Ok(self.to_edge_list()),
            GraphExportFormat::Dot => Ok(self.to_dot()),
            GraphExportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    /// Render as edge-list text
    pub fn to_edge_list(&self) -> String {
        let mut out = String::new();
        for (module, deps) in self.as_map() {
            if deps.is_empty() {
                let _ = writeln!(out, "{}", edge_name(module));
            }
            for dep in deps {
                let _ = writeln!(out, "{} {} {}", edge_name(module), EDGE_ARROW, edge_name(dep));
            }
        }
        out
    }

    /// Parse edge-list text back into a graph
    pub fn from_edge_list(text: &str) -> Result<Self, ModuleError> {
        let mut adjacency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (from, to) = parse_line(line).map_err(|reason| ModuleError::GraphFormat {
                line: index + 1,
                reason: reason.to_string(),
            })?;
            let deps = adjacency.entry(from).or_default();
            if let Some(dep) = to {
                deps.insert(dep);
            }
        }

        Ok(DependencyGraph::from_adjacency(adjacency))
    }

    /// Render as a Graphviz digraph, edges pointing at dependencies
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph dependencies {\n    rankdir=BT;\n");
        for module in self.modules() {
            let _ = writeln!(out, "    {};", dot_id(module));
        }
        for (module, dep) in self.edges() {
            let _ = writeln!(out, "    {} -> {};", dot_id(module), dot_id(dep));
        }
        out.push_str("}\n");
        out
    }
}

/// A name as it appears in edge-list text
fn edge_name(name: &str) -> Cow<'_, str> {
    let bare = !name.is_empty()
        && name.trim() == name
        && !name.starts_with('#')
        && !name.starts_with('"')
        && !name.contains(EDGE_ARROW)
        && !name.chars().any(char::is_control);
    if bare {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(quote_name(name))
    }
}

/// JSON string literal for `name`
fn quote_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Split one non-comment line into a module and its optional dependency
fn parse_line(line: &str) -> Result<(String, Option<String>), &'static str> {
    let (from, rest) = take_name(line, "missing module name")?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        return Ok((from, None));
    }

    let Some(after) = rest.strip_prefix(EDGE_ARROW) else {
        return Err("expected `->` after module name");
    };
    let (to, tail) = take_name(after.trim_start(), "missing dependency name")?;
    let tail = tail.trim();
    if tail.starts_with(EDGE_ARROW) {
        return Err("more than one arrow");
    }
    if !tail.is_empty() {
        return Err("unexpected text after dependency name");
    }
    Ok((from, Some(to)))
}

/// Leading name of `text` (quoted or bare) and the text after it
fn take_name<'t>(text: &'t str, missing: &'static str) -> Result<(String, &'t str), &'static str> {
    if text.starts_with('"') {
        let mut stream = serde_json::Deserializer::from_str(text).into_iter::<String>();
        return match stream.next() {
            Some(Ok(name)) => Ok((name, &text[stream.byte_offset()..])),
            _ => Err("malformed quoted name"),
        };
    }

    let end = text.find(EDGE_ARROW).unwrap_or(text.len());
    let name = text[..end].trim_end();
    if name.is_empty() {
        return Err(missing);
    }
    Ok((name.to_string(), &text[end..]))
}

fn dot_id(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}
