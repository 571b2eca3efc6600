//! Project validation logic.

use crate::schema::{ConditionDef, ExperimentDef, Project};
use std::collections::HashSet;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_experiment(&project.experiment)?;

    let mut condition_names = HashSet::new();
    for condition in &project.conditions {
        if !condition_names.insert(&condition.name) {
            return Err(ValidationError::DuplicateName {
                name: condition.name.clone(),
                context: "conditions".to_string(),
            });
        }
        validate_condition(condition)?;
    }

    let mut output_names = HashSet::new();
    for output in &project.outputs {
        if !output_names.insert(&output.name) {
            return Err(ValidationError::DuplicateName {
                name: output.name.clone(),
                context: "outputs".to_string(),
            });
        }
    }

    Ok(())
}

pub(crate) fn check_begin(begin: f64) -> Result<(), ValidationError> {
    if !begin.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: "experiment.begin".to_string(),
            value: begin.to_string(),
            reason: "must be finite".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn check_duration(duration: f64) -> Result<(), ValidationError> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "experiment.duration".to_string(),
            value: duration.to_string(),
            reason: "must be finite and positive".to_string(),
        });
    }
    Ok(())
}

fn validate_experiment(experiment: &ExperimentDef) -> Result<(), ValidationError> {
    check_begin(experiment.begin)?;
    check_duration(experiment.duration)
}

fn validate_condition(condition: &ConditionDef) -> Result<(), ValidationError> {
    let mut port_names = HashSet::new();
    for port in &condition.ports {
        if !port_names.insert(&port.name) {
            return Err(ValidationError::DuplicateName {
                name: port.name.clone(),
                context: format!("condition '{}' ports", condition.name),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{OutputDef, PortDef, StreamFormat};

    #[test]
    fn new_project_is_valid() {
        assert!(validate_project(&Project::new("p", 10.0)).is_ok());
    }

    #[test]
    fn rejects_future_version() {
        let mut project = Project::new("p", 10.0);
        project.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_bad_duration() {
        for duration in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let project = Project::new("p", duration);
            assert!(validate_project(&project).is_err(), "duration {duration}");
        }
    }

    #[test]
    fn rejects_duplicate_ports() {
        let mut project = Project::new("p", 1.0);
        project.conditions.push(ConditionDef {
            name: "cond".to_string(),
            ports: vec![
                PortDef {
                    name: "a".to_string(),
                    values: vec![],
                },
                PortDef {
                    name: "a".to_string(),
                    values: vec![],
                },
            ],
        });
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::DuplicateName { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_outputs() {
        let mut project = Project::new("p", 1.0);
        let output = OutputDef {
            name: "o".to_string(),
            location: String::new(),
            format: StreamFormat::Local,
            plugin: "storage".to_string(),
            package: "pkg".to_string(),
            data: None,
        };
        project.outputs.push(output.clone());
        project.outputs.push(output);
        assert!(validate_project(&project).is_err());
    }
}
