use serde::Deserialize;

use super::cursor::CursorDefinition;

/// Literal text substitution applied to SVG sources before rendering.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ColorMap {
    #[serde(rename = "match")]
    pub from: String,
    #[serde(rename = "replace")]
    pub to: String,
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub name: String,
    pub comment: String,
    pub inherits: Option<String>,
    pub version: String,
    pub colors: Vec<ColorMap>,
    pub cursors: Vec<CursorDefinition>,
}
