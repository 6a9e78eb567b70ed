//! URL helpers for naming cached artifacts.

mod path;

pub use path::filename_from_url_path;
