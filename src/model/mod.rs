pub mod cursor;
pub mod theme;

pub use cursor::{CursorDefinition, Hotspot, ResizeAlgorithm};
pub use theme::{ColorMap, Theme};
