//! Report object model: report → pages → visuals, with filters at each level.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::model::DataInput;
use crate::semantic::{GraphNode, LeafKind, LeafNode, SemanticModel};
use crate::warnings::{WarningBus, WarningSender};

use super::connections::ReportConnection;
use super::error::{ReportError, ReportResult};
use super::layout::{LayoutFilter, LayoutPage, LayoutVisual, LoadOptions, ReportLayout};
use super::package::{
    decode_layout_text, ReportPackage, ZipReportPackage, CONNECTIONS_ENTRY, LAYOUT_ENTRY,
};
use super::resolver::ReferenceResolver;

/// Level a filter applies at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterScope {
    Report,
    Page,
    Visual,
}

impl FilterScope {
    pub fn target_type(self) -> &'static str {
        match self {
            FilterScope::Report => "PowerBI Report Filter",
            FilterScope::Page => "PowerBI Report Page Filter",
            FilterScope::Visual => "PowerBI Visual Filter",
        }
    }

    fn label(self) -> &'static str {
        match self {
            FilterScope::Report => "Report Filter",
            FilterScope::Page => "Page Filter",
            FilterScope::Visual => "Visual Filter",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Filter {
    node: GraphNode,
    scope: FilterScope,
    number: u32,
    conditions: String,
    data_inputs: Vec<DataInput>,
}

impl Filter {
    pub fn node(&self) -> GraphNode {
        self.node
    }

    pub fn scope(&self) -> FilterScope {
        self.scope
    }

    /// Per-model display number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Display name, e.g. `Page Filter '3'`.
    pub fn name(&self) -> String {
        filter_name(self.scope, self.number)
    }

    pub fn target_type(&self) -> &'static str {
        self.scope.target_type()
    }

    /// The raw filter definition.
    pub fn conditions(&self) -> &str {
        &self.conditions
    }

    pub fn data_inputs(&self) -> &[DataInput] {
        &self.data_inputs
    }
}

fn filter_name(scope: FilterScope, number: u32) -> String {
    format!("{} '{}'", scope.label(), number)
}

#[derive(Debug, Clone)]
pub struct Visual {
    node: GraphNode,
    name: String,
    visual_type: String,
    hidden: bool,
    data_inputs: Vec<DataInput>,
    filters: Vec<Filter>,
}

impl Visual {
    pub fn node(&self) -> GraphNode {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visual_type(&self) -> &str {
        &self.visual_type
    }

    pub fn target_type(&self) -> &str {
        &self.visual_type
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn data_inputs(&self) -> &[DataInput] {
        &self.data_inputs
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }
}

#[derive(Debug, Clone)]
pub struct ReportPage {
    node: GraphNode,
    /// Internal section name.
    name: String,
    display_name: String,
    hidden: bool,
    visuals: Vec<Visual>,
    filters: Vec<Filter>,
}

impl ReportPage {
    pub fn node(&self) -> GraphNode {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn visuals(&self) -> &[Visual] {
        &self.visuals
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }
}

/// What a filter is attached to.
#[derive(Debug, Clone, Copy)]
pub enum FilterParent<'r> {
    Report(&'r PowerBIReport),
    Page(&'r ReportPage),
    Visual(&'r Visual),
}

/// A report linked against a semantic model.
#[derive(Debug, Clone)]
pub struct PowerBIReport {
    node: GraphNode,
    name: String,
    path: PathBuf,
    /// Name of the model the report reads from.
    model_name: String,
    connection: ReportConnection,
    pages: Vec<ReportPage>,
    filters: Vec<Filter>,
}

impl PowerBIReport {
    /// Load a `.pbix` package from disk and link it against `model`.
    pub fn load_from_package(
        path: impl AsRef<Path>,
        model: &mut SemanticModel,
        options: &LoadOptions,
        warnings: &WarningBus,
    ) -> ReportResult<Self> {
        let path = path.as_ref();
        let mut package = ZipReportPackage::open(path)?;
        Self::load(&mut package, path, model, options, warnings)
    }

    /// Load from any package source. `path` names the report.
    pub fn load(
        package: &mut dyn ReportPackage,
        path: &Path,
        model: &mut SemanticModel,
        options: &LoadOptions,
        warnings: &WarningBus,
    ) -> ReportResult<Self> {
        let name = report_name(path);

        let layout_bytes =
            package
                .read_entry(LAYOUT_ENTRY)?
                .ok_or_else(|| ReportError::MissingEntry {
                    report: name.clone(),
                    entry: LAYOUT_ENTRY,
                })?;
        let layout_text = decode_layout_text(&layout_bytes).map_err(|reason| ReportError::Encoding {
            report: name.clone(),
            reason,
        })?;

        let connection = match package.read_entry(CONNECTIONS_ENTRY)? {
            Some(bytes) => {
                let text = decode_layout_text(&bytes).map_err(|reason| ReportError::Connections {
                    report: name.clone(),
                    reason,
                })?;
                ReportConnection::parse(&text).map_err(|e| ReportError::Connections {
                    report: name.clone(),
                    reason: e.to_string(),
                })?
            }
            None => ReportConnection::Local,
        };
        debug!(report = %name, remote = connection.is_remote(), "read report package");

        let layout = ReportLayout::parse(&layout_text, options).map_err(|source| ReportError::Layout {
            report: name.clone(),
            source,
        })?;
        Ok(Self::link(name, path.to_path_buf(), connection, layout, model, warnings))
    }

    /// Parse a layout document directly and link it against `model`.
    pub fn load_from_layout(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        layout_text: &str,
        model: &mut SemanticModel,
        options: &LoadOptions,
        warnings: &WarningBus,
    ) -> ReportResult<Self> {
        let name = name.into();
        let layout = ReportLayout::parse(layout_text, options).map_err(|source| ReportError::Layout {
            report: name.clone(),
            source,
        })?;
        Ok(Self::link(name, path.into(), ReportConnection::Local, layout, model, warnings))
    }

    /// Link a parsed layout. Cannot fail: unresolved references become
    /// warnings.
    pub fn link(
        name: String,
        path: PathBuf,
        connection: ReportConnection,
        layout: ReportLayout,
        model: &mut SemanticModel,
        warnings: &WarningBus,
    ) -> Self {
        let model_name = connection
            .model_name()
            .map(str::to_string)
            .unwrap_or_else(|| model.name().to_string());
        let warnings_before = warnings.len();

        let mut linker = Linker {
            resolver: ReferenceResolver::new(model, warnings),
            report: name.clone(),
        };
        let node = linker.resolver.register(LeafNode {
            kind: LeafKind::Report,
            name: name.clone(),
            target_type: "PowerBI Report".to_string(),
            parent: None,
        });

        let pages: Vec<ReportPage> = layout
            .pages
            .into_iter()
            .map(|page| linker.page(page, node))
            .collect();
        let report_context = format!("from report '{name}'");
        let filters = linker.filters(layout.filters, FilterScope::Report, node, &report_context);

        let report = Self {
            node,
            name,
            path,
            model_name,
            connection,
            pages,
            filters,
        };
        info!(
            report = %report.name,
            model = %report.model_name,
            pages = report.pages.len(),
            visuals = report.all_visuals().count(),
            filters = report.all_filters().len(),
            warnings = warnings.len() - warnings_before,
            "loaded report"
        );
        report
    }

    pub fn node(&self) -> GraphNode {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn connection(&self) -> &ReportConnection {
        &self.connection
    }

    pub fn pages(&self) -> &[ReportPage] {
        &self.pages
    }

    /// Report-level filters only.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn all_visuals(&self) -> impl Iterator<Item = &Visual> {
        self.pages.iter().flat_map(|p| p.visuals.iter())
    }

    /// Filters at every scope: report, then each page followed by its
    /// visuals' filters.
    pub fn all_filters(&self) -> Vec<&Filter> {
        let mut filters: Vec<&Filter> = self.filters.iter().collect();
        for page in &self.pages {
            filters.extend(page.filters.iter());
            for visual in &page.visuals {
                filters.extend(visual.filters.iter());
            }
        }
        filters
    }

    pub fn page_of(&self, visual: &Visual) -> Option<&ReportPage> {
        self.pages
            .iter()
            .find(|p| p.visuals.iter().any(|v| v.node == visual.node))
    }

    pub fn filter_parent(&self, filter: &Filter) -> Option<FilterParent<'_>> {
        if self.filters.iter().any(|f| f.node == filter.node) {
            return Some(FilterParent::Report(self));
        }
        for page in &self.pages {
            if page.filters.iter().any(|f| f.node == filter.node) {
                return Some(FilterParent::Page(page));
            }
            for visual in &page.visuals {
                if visual.filters.iter().any(|f| f.node == filter.node) {
                    return Some(FilterParent::Visual(visual));
                }
            }
        }
        None
    }

    /// `{type} : '{name}' from page '{page}' in report '{report}'`.
    pub fn describe_visual(&self, visual: &Visual) -> String {
        let page = self.page_of(visual).map(|p| p.display_name()).unwrap_or_default();
        visual_description(visual.visual_type(), visual.name(), page, &self.name)
    }
}

impl fmt::Display for PowerBIReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

/// Report name: the package file name without its `.pbix` extension.
pub fn report_name(path: &Path) -> String {
    let is_pbix = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pbix"));
    let name = if is_pbix { path.file_stem() } else { path.file_name() };
    name.map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

fn visual_description(visual_type: &str, name: &str, page: &str, report: &str) -> String {
    format!("{visual_type} : '{name}' from page '{page}' in report '{report}'")
}

// ============================================================================
// Linking
// ============================================================================

struct Linker<'a> {
    resolver: ReferenceResolver<'a>,
    report: String,
}

impl Linker<'_> {
    fn page(&mut self, page: LayoutPage, report_node: GraphNode) -> ReportPage {
        let node = self.resolver.register(LeafNode {
            kind: LeafKind::Page,
            name: page.display_name.clone(),
            target_type: "PowerBI Report Page".to_string(),
            parent: report_node.leaf_id(),
        });

        let visuals = page
            .visuals
            .into_iter()
            .map(|visual| self.visual(visual, node, &page.display_name))
            .collect();
        let context = format!("from page '{}'", page.display_name);
        let filters = self.filters(page.filters, FilterScope::Page, node, &context);

        ReportPage {
            node,
            name: page.name,
            display_name: page.display_name,
            hidden: page.hidden,
            visuals,
            filters,
        }
    }

    fn visual(&mut self, visual: LayoutVisual, page_node: GraphNode, page_name: &str) -> Visual {
        let node = self.resolver.register(LeafNode {
            kind: LeafKind::Visual,
            name: visual.name.clone(),
            target_type: visual.visual_type.clone(),
            parent: page_node.leaf_id(),
        });

        let context = format!("from visual '{}' in page {}", visual.name, page_name);
        let filters = self.filters(visual.filters, FilterScope::Visual, node, &context);

        let sender = WarningSender {
            node,
            name: visual.name.clone(),
            description: visual_description(&visual.visual_type, &visual.name, page_name, &self.report),
        };
        let data_inputs = self.resolver.resolve_all(&visual.references, &sender);

        Visual {
            node,
            name: visual.name,
            visual_type: visual.visual_type,
            hidden: visual.hidden,
            data_inputs,
            filters,
        }
    }

    /// `context` completes the description of each filter, e.g.
    /// "from page 'Overview'".
    fn filters(
        &mut self,
        filters: Vec<LayoutFilter>,
        scope: FilterScope,
        parent: GraphNode,
        context: &str,
    ) -> Vec<Filter> {
        filters
            .into_iter()
            .map(|filter| {
                let number = self.resolver.next_filter_number();
                let name = filter_name(scope, number);
                let node = self.resolver.register(LeafNode {
                    kind: LeafKind::Filter,
                    name: name.clone(),
                    target_type: scope.target_type().to_string(),
                    parent: parent.leaf_id(),
                });
                let sender = WarningSender {
                    node,
                    description: format!("{name} {context}"),
                    name,
                };
                let data_inputs = self.resolver.resolve_all(&filter.references, &sender);
                Filter {
                    node,
                    scope,
                    number,
                    conditions: filter.conditions,
                    data_inputs,
                }
            })
            .collect()
    }
}
