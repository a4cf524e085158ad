pub mod paths;
pub mod terminal;

pub use paths::{format_path_with_tilde, normalize_target_dir, trim_suffix, validate_target_dir};
