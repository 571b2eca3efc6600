//! Project loading, saving, and condition access through generic trees.

use std::path::Path;

use dk_project::Project;
use dk_value::{GenericNode, Value, decode, encode};

use crate::error::{AppError, AppResult};

enum FileFormat {
    Yaml,
    Json,
}

fn file_format(path: &Path) -> AppResult<FileFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => Ok(FileFormat::Yaml),
        Some("json") => Ok(FileFormat::Json),
        _ => Err(AppError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load and validate a project from a YAML or JSON file.
pub fn load_project(path: &Path) -> AppResult<Project> {
    let format = file_format(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ProjectFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let project: Project = match format {
        FileFormat::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| AppError::Project(format!("Failed to parse project YAML: {}", e)))?,
        FileFormat::Json => serde_json::from_str(&content)
            .map_err(|e| AppError::Project(format!("Failed to parse project JSON: {}", e)))?,
    };
    dk_project::validate_project(&project).map_err(dk_project::ProjectError::from)?;

    Ok(project)
}

/// Validate and save a project; the format follows the file extension.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    let format = file_format(path)?;
    dk_project::validate_project(project).map_err(dk_project::ProjectError::from)?;

    let content = match format {
        FileFormat::Yaml => serde_yaml::to_string(project)
            .map_err(|e| AppError::Project(format!("Failed to serialize project: {}", e)))?,
        FileFormat::Json => serde_json::to_string_pretty(project)?,
    };

    std::fs::write(path, content).map_err(|e| AppError::ProjectFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Values of a port as one tree: null when the port is empty, the value
/// itself when it holds one, a sequence otherwise.
pub fn condition_show(project: &Project, condition: &str, port: &str) -> AppResult<GenericNode> {
    let values = project.condition_get_setvalue(condition, port)?;
    match values {
        [] => Ok(GenericNode::null()),
        [single] => Ok(encode(single)?),
        many => Ok(GenericNode::Sequence(
            many.iter()
                .map(|value| encode(value))
                .collect::<Result<_, _>>()?,
        )),
    }
}

pub fn condition_get_value_node(
    project: &Project,
    condition: &str,
    port: &str,
    index: usize,
) -> AppResult<GenericNode> {
    Ok(encode(project.condition_get_value(condition, port, index)?)?)
}

/// Decode `node` and append it to the port.
pub fn condition_add_node(
    project: &mut Project,
    condition: &str,
    port: &str,
    node: &GenericNode,
) -> AppResult<()> {
    let value = decode_node(node)?;
    project.condition_add_value(condition, port, value)?;
    Ok(())
}

/// Decode `node` and store it at `index` of the port.
pub fn condition_set_port_node(
    project: &mut Project,
    condition: &str,
    port: &str,
    index: usize,
    node: &GenericNode,
) -> AppResult<()> {
    let value = decode_node(node)?;
    project.condition_set_port_value(condition, port, index, value)?;
    Ok(())
}

fn decode_node(node: &GenericNode) -> AppResult<Value> {
    decode(node).ok_or_else(|| AppError::InvalidInput("a null node holds no value".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_value::Scalar;

    fn project() -> Project {
        let mut project = Project::new("p", 1.0);
        project.condition_create("c").unwrap();
        project
    }

    #[test]
    fn show_depends_on_value_count() {
        let mut project = project();
        project.condition_add_value("c", "x", Value::Integer(1)).unwrap();
        project.condition_port_clear("c", "x").unwrap();
        assert!(condition_show(&project, "c", "x").unwrap().is_null());

        project.condition_add_value("c", "x", Value::Integer(1)).unwrap();
        assert_eq!(
            condition_show(&project, "c", "x").unwrap(),
            GenericNode::Leaf(Scalar::Integer(1))
        );

        project.condition_add_value("c", "x", Value::from("b")).unwrap();
        assert_eq!(
            condition_show(&project, "c", "x").unwrap(),
            GenericNode::Sequence(vec![
                GenericNode::Leaf(Scalar::Integer(1)),
                GenericNode::Leaf(Scalar::Text("b".to_string())),
            ])
        );
    }

    #[test]
    fn nodes_are_decoded_before_storing() {
        let mut project = project();
        condition_add_node(&mut project, "c", "x", &GenericNode::Leaf(Scalar::Float(2.0)))
            .unwrap();
        assert_eq!(
            project.condition_get_value("c", "x", 0).unwrap(),
            &Value::Integer(2)
        );

        condition_set_port_node(
            &mut project,
            "c",
            "x",
            0,
            &GenericNode::Leaf(Scalar::Float(2.5)),
        )
        .unwrap();
        assert_eq!(
            condition_get_value_node(&project, "c", "x", 0).unwrap(),
            GenericNode::Leaf(Scalar::Float(2.5))
        );

        assert!(matches!(
            condition_add_node(&mut project, "c", "x", &GenericNode::null()),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_project(Path::new("project.toml")).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat { .. }));
    }
}
