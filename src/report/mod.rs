//! Report parsing and linking.
//!
//! Loading a report is two-phase:
//!
//! 1. **Parse** - read the package entries and turn the layout document
//!    into a [`ReportLayout`]. All fatal errors happen here.
//! 2. **Link** - register report objects with the semantic model and
//!    resolve their field references through a [`ReferenceResolver`],
//!    adding dependency edges or publishing warnings.
//!
//! A report that fails to load therefore leaves the model untouched.

pub mod connections;
mod document;
pub mod error;
pub mod layout;
pub mod package;
#[allow(clippy::module_inception)]
pub mod report;
pub mod resolver;

pub use connections::ReportConnection;
pub use error::{LayoutError, LayoutResult, PackageError, ReportError, ReportResult};
pub use layout::{
    FieldKind, FieldReference, LayoutFilter, LayoutPage, LayoutVisual, LoadOptions, ReportLayout,
};
pub use package::{
    decode_layout_text, encode_utf16le, MemoryReportPackage, ReportPackage, ZipReportPackage,
    CONNECTIONS_ENTRY, DEFAULT_MAX_ENTRY_BYTES, LAYOUT_ENTRY,
};
pub use report::{report_name, Filter, FilterParent, FilterScope, PowerBIReport, ReportPage, Visual};
pub use resolver::ReferenceResolver;
