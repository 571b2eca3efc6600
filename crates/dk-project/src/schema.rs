//! Project schema definitions.

use dk_value::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub experiment: ExperimentDef,
    #[serde(default)]
    pub conditions: Vec<ConditionDef>,
    #[serde(default)]
    pub outputs: Vec<OutputDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentDef {
    pub name: String,
    #[serde(default)]
    pub begin: f64,
    pub duration: f64,
    #[serde(default)]
    pub seed: u64,
}

/// Named group of initial parameters, one ordered value list per port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionDef {
    pub name: String,
    #[serde(default)]
    pub ports: Vec<PortDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortDef {
    pub name: String,
    #[serde(default)]
    pub values: Vec<Value>,
}

/// Destination of a view's observations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputDef {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub format: StreamFormat,
    pub plugin: String,
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    #[default]
    Local,
    Distant,
}

impl StreamFormat {
    /// `"local"` selects a local stream; anything else is distant.
    pub fn from_name(name: &str) -> Self {
        if name == "local" {
            StreamFormat::Local
        } else {
            StreamFormat::Distant
        }
    }
}

impl Project {
    /// Minimal valid project.
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        let name = name.into();
        Self {
            version: crate::validate::LATEST_VERSION,
            experiment: ExperimentDef {
                name: name.clone(),
                begin: 0.0,
                duration,
                seed: 0,
            },
            name,
            conditions: Vec::new(),
            outputs: Vec::new(),
        }
    }
}
