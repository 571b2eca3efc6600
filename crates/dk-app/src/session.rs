//! A loaded experiment bound to an initialized engine.

use std::path::Path;

use dk_project::{Project, StreamFormat};
use dk_value::Value;

use crate::engine::{SimulationEngine, ensure_initialized};
use crate::error::AppResult;
use crate::project_service;

/// Output plugin that keeps observations in memory for the caller.
pub const STORAGE_PLUGIN: &str = "storage";

/// Package providing [`STORAGE_PLUGIN`].
pub const OUTPUT_PACKAGE: &str = "dk.output";

pub struct Session<E> {
    project: Project,
    engine: E,
}

impl<E: SimulationEngine> Session<E> {
    /// Bind `project` to `engine`, initializing the engine runtime if no
    /// session has done so yet. Every output is routed to local storage.
    pub fn new(mut project: Project, engine: E) -> AppResult<Self> {
        ensure_initialized(&engine)?;
        route_outputs_to_storage(&mut project)?;
        Ok(Self { project, engine })
    }

    pub fn open(path: &Path, engine: E) -> AppResult<Self> {
        let project = project_service::load_project(path)?;
        Self::new(project, engine)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Copy of the project as handed to the engine: storage outputs emit
    /// their column headers as the first row.
    pub fn prepared_project(&self) -> Project {
        let mut project = self.project.clone();
        for output in &mut project.outputs {
            if output.plugin == STORAGE_PLUGIN {
                output.data = Some(Value::map([("header", Value::from("top"))]));
            }
        }
        project
    }
}

fn route_outputs_to_storage(project: &mut Project) -> AppResult<()> {
    let names: Vec<String> = project.outputs.iter().map(|o| o.name.clone()).collect();
    for name in names {
        project.output_set_plugin(&name, "", StreamFormat::Local, STORAGE_PLUGIN, OUTPUT_PACKAGE)?;
    }
    Ok(())
}
