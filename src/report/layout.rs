//! Report layout parsing.
//!
//! [`ReportLayout::parse`] turns the layout document of a report package into
//! a plain tree of pages, visuals, filters and the field references they
//! hold. Nothing here touches a semantic model: every structural error
//! surfaces before any reference is linked.
//!
//! Layout shape (embedded documents are JSON text inside string fields):
//!
//! ```text
//! {
//!   "sections": [                         // pages
//!     {
//!       "name": "ReportSection1",
//!       "displayName": "Overview",
//!       "config": "{\"visibility\":1}",
//!       "filters": "[ ... ]",
//!       "visualContainers": [
//!         {
//!           "config": "{\"name\":\"abc\",\"singleVisual\":{\"visualType\":\"barChart\",
//!                        \"prototypeQuery\":{\"From\":[...],\"Select\":[...]}}}",
//!           "filters": "[ ... ]"
//!         }
//!       ]
//!     }
//!   ],
//!   "filters": "[ ... ]"                   // report-level filters
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::debug;

use super::document::{decode_embedded, find_objects_by_key, lookup, value_text};
use super::error::{LayoutError, LayoutResult};

/// Which hidden report objects are analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub include_hidden_pages: bool,
    pub include_hidden_visuals: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            include_hidden_pages: true,
            include_hidden_visuals: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldKind {
    Column,
    Measure,
}

impl FieldKind {
    fn key(self) -> &'static str {
        match self {
            FieldKind::Column => "Column",
            FieldKind::Measure => "Measure",
        }
    }
}

/// A column or measure named by a visual query or a filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldReference {
    pub kind: FieldKind,
    pub table: String,
    pub name: String,
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.table, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutFilter {
    /// The filter definition as compact JSON.
    pub conditions: String,
    pub references: Vec<FieldReference>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutVisual {
    pub name: String,
    pub visual_type: String,
    pub hidden: bool,
    pub references: Vec<FieldReference>,
    pub filters: Vec<LayoutFilter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPage {
    pub name: String,
    pub display_name: String,
    pub hidden: bool,
    pub visuals: Vec<LayoutVisual>,
    pub filters: Vec<LayoutFilter>,
}

/// Parsed layout of one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportLayout {
    pub pages: Vec<LayoutPage>,
    pub filters: Vec<LayoutFilter>,
}

impl ReportLayout {
    pub fn parse(text: &str, options: &LoadOptions) -> LayoutResult<Self> {
        let document: Value = serde_json::from_str(text).map_err(LayoutError::InvalidDocument)?;
        Self::from_value(&document, options)
    }

    pub fn from_value(document: &Value, options: &LoadOptions) -> LayoutResult<Self> {
        let sections = document
            .get("sections")
            .and_then(Value::as_array)
            .ok_or(LayoutError::MissingSections)?;

        let mut pages = Vec::with_capacity(sections.len());
        for (index, section) in sections.iter().enumerate() {
            let Some(section) = section.as_object() else {
                continue;
            };
            if let Some(page) = parse_page(section, index, options)? {
                pages.push(page);
            }
        }

        let filters = parse_filters(document.get("filters"), "report")?;

        Ok(Self { pages, filters })
    }

    pub fn visual_count(&self) -> usize {
        self.pages.iter().map(|p| p.visuals.len()).sum()
    }

    /// Filters at every scope.
    pub fn filter_count(&self) -> usize {
        self.filters.len()
            + self
                .pages
                .iter()
                .map(|p| p.filters.len() + p.visuals.iter().map(|v| v.filters.len()).sum::<usize>())
                .sum::<usize>()
    }
}

// ============================================================================
// Pages and visuals
// ============================================================================

fn required<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
    context: &str,
) -> LayoutResult<&'a Value> {
    object.get(field).ok_or_else(|| LayoutError::MissingField {
        context: context.to_string(),
        field,
    })
}

fn parse_page(
    section: &Map<String, Value>,
    index: usize,
    options: &LoadOptions,
) -> LayoutResult<Option<LayoutPage>> {
    let name = section.get("name").map(value_text);
    let context = match &name {
        Some(name) => format!("page '{name}'"),
        None => format!("section #{index}"),
    };

    let config = decode_embedded(required(section, "config", &context)?, "config", &context)?;
    let containers = required(section, "visualContainers", &context)?
        .as_array()
        .ok_or_else(|| LayoutError::UnexpectedShape {
            context: context.clone(),
            field: "visualContainers",
            expected: "an array",
        })?;
    let name = name.ok_or_else(|| LayoutError::MissingField {
        context: context.clone(),
        field: "name",
    })?;
    let display_name = section
        .get("displayName")
        .map(value_text)
        .unwrap_or_else(|| name.clone());

    let hidden = config.get("visibility").map(value_text).as_deref() == Some("1");
    if hidden && !options.include_hidden_pages {
        debug!(page = %display_name, "skipping hidden page");
        return Ok(None);
    }

    let mut visuals = Vec::with_capacity(containers.len());
    for container in containers {
        let Some(container) = container.as_object() else {
            continue;
        };
        if let Some(visual) = parse_visual(container, &context, options)? {
            visuals.push(visual);
        }
    }

    let filters = parse_filters(section.get("filters"), &context)?;

    Ok(Some(LayoutPage {
        name,
        display_name,
        hidden,
        visuals,
        filters,
    }))
}

fn parse_visual(
    container: &Map<String, Value>,
    page_context: &str,
    options: &LoadOptions,
) -> LayoutResult<Option<LayoutVisual>> {
    let container_context = format!("visual container on {page_context}");
    let config = decode_embedded(
        required(container, "config", &container_context)?,
        "config",
        &container_context,
    )?;
    let name = config
        .get("name")
        .map(value_text)
        .ok_or_else(|| LayoutError::MissingField {
            context: container_context.clone(),
            field: "name",
        })?;
    let context = format!("visual '{name}' on {page_context}");

    let Some(single_visual) = config.get("singleVisual") else {
        debug!(visual = %name, "skipping visual group");
        return Ok(None);
    };

    let visual_type = single_visual
        .get("visualType")
        .map(value_text)
        .unwrap_or_else(|| "unknown".to_string());

    let hidden = lookup(single_visual, &["display", "mode"]).and_then(Value::as_str) == Some("hidden");
    if hidden && !options.include_hidden_visuals {
        debug!(visual = %name, visual_type = %visual_type, "skipping hidden visual");
        return Ok(None);
    }

    let filters = parse_filters(container.get("filters"), &context)?;

    let references = match single_visual.get("prototypeQuery") {
        Some(query) if !query.is_null() => parse_query(query, &context)?,
        _ => Vec::new(),
    };

    Ok(Some(LayoutVisual {
        name,
        visual_type,
        hidden,
        references,
        filters,
    }))
}

/// Field references of a visual's `prototypeQuery`.
fn parse_query(query: &Value, context: &str) -> LayoutResult<Vec<FieldReference>> {
    let query = decode_embedded(query, "prototypeQuery", context)?;
    let query_context = format!("query of {context}");
    let object = query.as_object().ok_or_else(|| LayoutError::UnexpectedShape {
        context: context.to_string(),
        field: "prototypeQuery",
        expected: "an object",
    })?;

    let select = required(object, "Select", &query_context)?
        .as_array()
        .ok_or_else(|| LayoutError::UnexpectedShape {
            context: query_context.clone(),
            field: "Select",
            expected: "an array",
        })?;
    let from = required(object, "From", &query_context)?;
    let aliases = source_aliases(from, &query_context)?;

    let mut references = Vec::new();
    for item in select {
        for kind in [FieldKind::Measure, FieldKind::Column] {
            for field in find_objects_by_key(item, kind.key()) {
                push_unique(&mut references, field_reference(kind, field, &aliases, context)?);
            }
        }
    }
    Ok(references)
}

/// Alias map of a `From` array: `Name` → `Entity`.
fn source_aliases(from: &Value, context: &str) -> LayoutResult<HashMap<String, String>> {
    let entries = from.as_array().ok_or_else(|| LayoutError::UnexpectedShape {
        context: context.to_string(),
        field: "From",
        expected: "an array",
    })?;

    let mut aliases = HashMap::with_capacity(entries.len());
    for entry in entries.iter().filter_map(Value::as_object) {
        // Subquery sources (TopN filters) carry an Expression instead of an Entity
        let (Some(alias), Some(entity)) = (entry.get("Name"), entry.get("Entity")) else {
            continue;
        };
        aliases.insert(value_text(alias), value_text(entity));
    }
    Ok(aliases)
}

fn field_reference(
    kind: FieldKind,
    field: &Map<String, Value>,
    aliases: &HashMap<String, String>,
    context: &str,
) -> LayoutResult<FieldReference> {
    let name = value_text(required(field, "Property", context)?);

    let source_ref = field
        .get("Expression")
        .and_then(|e| e.get("SourceRef"))
        .ok_or_else(|| LayoutError::MissingField {
            context: format!("{} '{}' in {}", kind.key().to_lowercase(), name, context),
            field: "Expression.SourceRef",
        })?;

    let table = if let Some(alias) = source_ref.get("Source") {
        let alias = value_text(alias);
        aliases
            .get(&alias)
            .cloned()
            .ok_or_else(|| LayoutError::UnknownSourceAlias {
                context: context.to_string(),
                alias,
            })?
    } else if let Some(entity) = source_ref.get("Entity") {
        value_text(entity)
    } else {
        return Err(LayoutError::MissingField {
            context: format!("{} '{}' in {}", kind.key().to_lowercase(), name, context),
            field: "Expression.SourceRef.Entity",
        });
    };

    Ok(FieldReference { kind, table, name })
}

fn push_unique(references: &mut Vec<FieldReference>, reference: FieldReference) {
    if !references.contains(&reference) {
        references.push(reference);
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Parse a `filters` field holding an (embedded) array of filter objects.
fn parse_filters(field: Option<&Value>, context: &str) -> LayoutResult<Vec<LayoutFilter>> {
    let Some(field) = field.filter(|f| !f.is_null()) else {
        return Ok(Vec::new());
    };
    let decoded = decode_embedded(field, "filters", context)?;
    let entries = decoded.as_array().ok_or_else(|| LayoutError::UnexpectedShape {
        context: context.to_string(),
        field: "filters",
        expected: "an array",
    })?;

    let mut filters = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            continue;
        }
        let filter_context = format!("filter #{index} of {context}");
        filters.push(parse_filter(entry, &filter_context)?);
    }
    Ok(filters)
}

fn parse_filter(filter: &Value, context: &str) -> LayoutResult<LayoutFilter> {
    let mut aliases = HashMap::new();
    for from in find_arrays_by_key(filter, "From") {
        for (alias, entity) in source_aliases(from, context)? {
            aliases.entry(alias).or_insert(entity);
        }
    }

    let expressions: Vec<&Value> = match lookup(filter, &["filterExpressionMetadata", "expressions"]) {
        Some(Value::Array(items)) => items.iter().collect(),
        _ => filter.get("expression").into_iter().collect(),
    };

    let mut references = Vec::new();
    for expression in expressions {
        for kind in [FieldKind::Column, FieldKind::Measure] {
            for field in find_objects_by_key(expression, kind.key()) {
                push_unique(&mut references, field_reference(kind, field, &aliases, context)?);
            }
        }
    }

    Ok(LayoutFilter {
        conditions: filter.to_string(),
        references,
    })
}

/// Arrays stored under `key` below `value`, outermost first. Subqueries
/// have their own alias scope and are not entered.
fn find_arrays_by_key<'a>(value: &'a Value, key: &str) -> Vec<&'a Value> {
    let mut found = Vec::new();
    let mut queue = VecDeque::from([value]);
    while let Some(current) = queue.pop_front() {
        match current {
            Value::Object(map) => {
                for (k, child) in map {
                    if k == key && child.is_array() {
                        found.push(child);
                    } else if k != "Subquery" {
                        queue.push_back(child);
                    }
                }
            }
            Value::Array(items) => queue.extend(items),
            _ => {}
        }
    }
    found
}
