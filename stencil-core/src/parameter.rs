use crate::{Result, StencilError, Value};
use std::{borrow::Cow, fmt::Write};

/// Whether the engine reads or writes the parameter.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Input,
    /// Filled by the engine, reported back as `QueryResult::Output`.
    Output,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Name without the dialect prefix.
    pub name: Cow<'static, str>,
    pub value: Value,
    pub direction: Direction,
}

/// Ordered set of named parameters bound to one statement (or one batch).
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ParameterBag {
    parameters: Vec<Parameter>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn len(&self) -> usize {
        self.parameters.len()
    }
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Bind an input parameter, the name must be unused in this bag.
    pub fn add(&mut self, name: impl Into<Cow<'static, str>>, value: Value) -> Result<()> {
        self.push(name.into(), value, Direction::Input)
    }

    /// Bind an output parameter seeded with `value`.
    pub fn add_output(&mut self, name: impl Into<Cow<'static, str>>, value: Value) -> Result<()> {
        self.push(name.into(), value, Direction::Output)
    }

    /// Bind `value` under `<property>_<n>` where `n` is the 1-based position the
    /// parameter takes in the bag, returning the generated name. Names built this way
    /// never collide with each other nor with the unsuffixed dialect parameters.
    pub fn add_positional(&mut self, property: &str, value: Value) -> Result<String> {
        let mut name = String::with_capacity(property.len() + 4);
        let _ = write!(name, "{}_{}", property, self.parameters.len() + 1);
        self.push(name.clone().into(), value, Direction::Input)?;
        Ok(name)
    }

    fn push(&mut self, name: Cow<'static, str>, value: Value, direction: Direction) -> Result<()> {
        if self.contains(&name) {
            return Err(StencilError::DuplicateParameter(name.into_owned()).into());
        }
        self.parameters.push(Parameter {
            name,
            value,
            direction,
        });
        Ok(())
    }
}

impl IntoIterator for ParameterBag {
    type Item = Parameter;
    type IntoIter = std::vec::IntoIter<Parameter>;
    fn into_iter(self) -> Self::IntoIter {
        self.parameters.into_iter()
    }
}
