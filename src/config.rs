//! Serializable presentation settings for a `GraphMaker`.

use crate::charts::Style;
use crate::error::GraphResult;
use serde::{Deserialize, Serialize};

/// Everything a `GraphMaker` holds except the table itself.
///
/// Missing fields take their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub style: Style,
    pub x_label: String,
    pub y_label: String,
    pub title: String,
    pub x: Option<String>,
    pub y: Option<String>,
}

impl GraphConfig {
    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
