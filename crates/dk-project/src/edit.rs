//! Getters and setters over a loaded project.
//!
//! Condition values are addressed by condition name, port name and the
//! value's position in the port's list.

use dk_value::{Value, ValueType};

use crate::schema::{ConditionDef, OutputDef, PortDef, Project, StreamFormat};
use crate::validate::{check_begin, check_duration};
use crate::{ProjectError, ProjectResult};

impl Project {
    pub fn begin(&self) -> f64 {
        self.experiment.begin
    }

    pub fn set_begin(&mut self, begin: f64) -> ProjectResult<()> {
        check_begin(begin)?;
        self.experiment.begin = begin;
        Ok(())
    }

    pub fn duration(&self) -> f64 {
        self.experiment.duration
    }

    pub fn set_duration(&mut self, duration: f64) -> ProjectResult<()> {
        check_duration(duration)?;
        self.experiment.duration = duration;
        Ok(())
    }

    pub fn seed(&self) -> u64 {
        self.experiment.seed
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.experiment.seed = seed;
    }

    pub fn condition_list(&self) -> Vec<&str> {
        self.conditions.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn condition_create(&mut self, name: &str) -> ProjectResult<()> {
        if self.conditions.iter().any(|c| c.name == name) {
            return Err(ProjectError::DuplicateCondition {
                name: name.to_string(),
            });
        }
        self.conditions.push(ConditionDef {
            name: name.to_string(),
            ports: Vec::new(),
        });
        Ok(())
    }

    pub fn condition(&self, name: &str) -> ProjectResult<&ConditionDef> {
        self.conditions
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ProjectError::ConditionNotFound {
                name: name.to_string(),
            })
    }

    fn condition_mut(&mut self, name: &str) -> ProjectResult<&mut ConditionDef> {
        self.conditions
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ProjectError::ConditionNotFound {
                name: name.to_string(),
            })
    }

    pub fn condition_port_list(&self, condition: &str) -> ProjectResult<Vec<&str>> {
        Ok(self
            .condition(condition)?
            .ports
            .iter()
            .map(|p| p.name.as_str())
            .collect())
    }

    fn port_mut(&mut self, condition: &str, port: &str) -> ProjectResult<&mut PortDef> {
        self.condition_mut(condition)?
            .ports
            .iter_mut()
            .find(|p| p.name == port)
            .ok_or_else(|| ProjectError::PortNotFound {
                condition: condition.to_string(),
                port: port.to_string(),
            })
    }

    /// Remove every value of a port, keeping the port itself.
    pub fn condition_port_clear(&mut self, condition: &str, port: &str) -> ProjectResult<()> {
        self.port_mut(condition, port)?.values.clear();
        Ok(())
    }

    /// Append a value to a port, creating the port when missing.
    pub fn condition_add_value(
        &mut self,
        condition: &str,
        port: &str,
        value: Value,
    ) -> ProjectResult<()> {
        let cond = self.condition_mut(condition)?;
        match cond.ports.iter_mut().find(|p| p.name == port) {
            Some(existing) => existing.values.push(value),
            None => cond.ports.push(PortDef {
                name: port.to_string(),
                values: vec![value],
            }),
        }
        Ok(())
    }

    pub fn condition_add_real(&mut self, condition: &str, port: &str, v: f64) -> ProjectResult<()> {
        self.condition_add_value(condition, port, Value::Double(v))
    }

    pub fn condition_add_integer(
        &mut self,
        condition: &str,
        port: &str,
        v: i64,
    ) -> ProjectResult<()> {
        self.condition_add_value(condition, port, Value::Integer(v))
    }

    pub fn condition_add_string(
        &mut self,
        condition: &str,
        port: &str,
        v: impl Into<String>,
    ) -> ProjectResult<()> {
        self.condition_add_value(condition, port, Value::String(v.into()))
    }

    pub fn condition_add_boolean(
        &mut self,
        condition: &str,
        port: &str,
        v: bool,
    ) -> ProjectResult<()> {
        self.condition_add_value(condition, port, Value::Boolean(v))
    }

    /// All values of a port, in order.
    pub fn condition_get_setvalue(&self, condition: &str, port: &str) -> ProjectResult<&[Value]> {
        self.condition(condition)?
            .ports
            .iter()
            .find(|p| p.name == port)
            .map(|p| p.values.as_slice())
            .ok_or_else(|| ProjectError::PortNotFound {
                condition: condition.to_string(),
                port: port.to_string(),
            })
    }

    pub fn condition_get_value(
        &self,
        condition: &str,
        port: &str,
        index: usize,
    ) -> ProjectResult<&Value> {
        let values = self.condition_get_setvalue(condition, port)?;
        values.get(index).ok_or_else(|| ProjectError::ValueIndexOob {
            condition: condition.to_string(),
            port: port.to_string(),
            index,
            len: values.len(),
        })
    }

    pub fn condition_get_value_type(
        &self,
        condition: &str,
        port: &str,
        index: usize,
    ) -> ProjectResult<ValueType> {
        Ok(self.condition_get_value(condition, port, index)?.value_type())
    }

    /// Replace the value at `index`; the index must already exist.
    pub fn condition_set_port_value(
        &mut self,
        condition: &str,
        port: &str,
        index: usize,
        value: Value,
    ) -> ProjectResult<()> {
        let slot = self.value_slot(condition, port, index)?;
        *slot = value;
        Ok(())
    }

    /// Remove and return the value at `index`.
    pub fn condition_delete_value(
        &mut self,
        condition: &str,
        port: &str,
        index: usize,
    ) -> ProjectResult<Value> {
        self.value_slot(condition, port, index)?;
        Ok(self.port_mut(condition, port)?.values.remove(index))
    }

    fn value_slot(&mut self, condition: &str, port: &str, index: usize) -> ProjectResult<&mut Value> {
        let values = &mut self.port_mut(condition, port)?.values;
        let len = values.len();
        values.get_mut(index).ok_or_else(|| ProjectError::ValueIndexOob {
            condition: condition.to_string(),
            port: port.to_string(),
            index,
            len,
        })
    }

    pub fn outputs_list(&self) -> Vec<&str> {
        self.outputs.iter().map(|o| o.name.as_str()).collect()
    }

    pub fn output(&self, name: &str) -> ProjectResult<&OutputDef> {
        self.outputs
            .iter()
            .find(|o| o.name == name)
            .ok_or_else(|| ProjectError::OutputNotFound {
                name: name.to_string(),
            })
    }

    /// Point an output at a plugin. The previous plugin configuration
    /// is dropped.
    pub fn output_set_plugin(
        &mut self,
        name: &str,
        location: &str,
        format: StreamFormat,
        plugin: &str,
        package: &str,
    ) -> ProjectResult<()> {
        let output = self
            .outputs
            .iter_mut()
            .find(|o| o.name == name)
            .ok_or_else(|| ProjectError::OutputNotFound {
                name: name.to_string(),
            })?;
        output.location = location.to_string();
        output.format = format;
        output.plugin = plugin.to_string();
        output.package = package.to_string();
        output.data = None;
        Ok(())
    }
}
