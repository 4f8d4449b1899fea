//! JSON import and export of single processes.

mod export;
mod import;

pub use export::{export_file_name, export_process, ExportDocument, EXPORT_EXTENSION};
pub use import::{
    import_document, import_json, parse_document, ImportDocument, ImportedArtifact,
    DEFAULT_IMPORT_NAME, IMPORT_SUFFIX,
};
