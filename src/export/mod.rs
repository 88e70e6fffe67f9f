pub mod json;

pub use json::{ExportError, export_cards_to_path, import_cards};
