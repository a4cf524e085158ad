//! What a popup UI needs from the cache: menu rows and selection handling
//!
//! Drawing the menu is left to the UI layer; this module only decides what the rows are
//! and which path a selected row stands for.

mod menu;
mod open;

pub use menu::{Menu, MenuRow};
pub use open::launch;
