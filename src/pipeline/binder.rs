//! Table-driven parameter binding.
//!
//! Cmdlets publish a static descriptor table; the binder walks it in
//! declaration order, binding named arguments (aliases included) first,
//! then positional arguments by their `position` attribute. A positional
//! array parameter absorbs every remaining positional argument.

use std::collections::HashMap;

use crate::cmdlet::{CmdletSpec, ParameterSpec, ValueType};
use crate::error::ExecError;
use crate::object::Object;

/// An argument after materialization: plain text, or the object list a
/// subexpression produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Materialized {
    Text(String),
    Objects(Vec<Object>),
}

impl Materialized {
    /// Text projection. Object lists join on a single space when bound to
    /// a string-typed parameter.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Objects(objects) => objects
                .iter()
                .map(Object::to_display_string)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// List projection: one element per object, or the single text value.
    #[must_use]
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::Text(text) => vec![text],
            Self::Objects(objects) => {
                objects.iter().map(Object::to_display_string).collect()
            }
        }
    }
}

/// A converted parameter value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
}

/// Parameter values keyed by canonical parameter name.
#[derive(Clone, Debug, Default)]
pub struct BoundParameters {
    values: HashMap<&'static str, Value>,
}

impl BoundParameters {
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(Value::Text(text)) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name) {
            Some(Value::List(items)) => Some(items),
            _ => None,
        }
    }

    /// Switch presence; absent switches read as false.
    #[must_use]
    pub fn switch(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(Value::Bool(true)))
    }
}

fn convert(param: &ParameterSpec, argument: Materialized) -> Result<Value, ExecError> {
    match param.value_type {
        ValueType::String => Ok(Value::Text(argument.into_text())),
        ValueType::Int => {
            let text = argument.into_text();
            text.parse::<i64>().map(Value::Int).map_err(|_| {
                ExecError::ParameterBinding(format!(
                    "-{}: '{text}' is not an integer",
                    param.name
                ))
            })
        }
        ValueType::Bool | ValueType::Switch => {
            let text = argument.into_text();
            match text.as_str() {
                "true" | "True" => Ok(Value::Bool(true)),
                "false" | "False" => Ok(Value::Bool(false)),
                _ => Err(ExecError::ParameterBinding(format!(
                    "-{}: '{text}' is not a boolean",
                    param.name
                ))),
            }
        }
        ValueType::StringArray => Ok(Value::List(argument.into_list())),
    }
}

fn find_parameter<'s>(spec: &'s CmdletSpec, name: &str) -> Option<&'s ParameterSpec> {
    spec.parameters
        .iter()
        .find(|p| p.name == name || p.aliases.contains(&name))
}

/// Bind materialized arguments against a cmdlet's descriptor table.
///
/// # Errors
///
/// [`ExecError::ParameterBinding`] for an unknown or duplicate named
/// parameter, a conversion failure, surplus positional arguments, or a
/// missing mandatory parameter.
pub fn bind_parameters(
    spec: &CmdletSpec,
    positional: Vec<Materialized>,
    named: Vec<(String, Option<Materialized>)>,
) -> Result<BoundParameters, ExecError> {
    let mut bound = BoundParameters::default();

    // Named parameters first, aliases included.
    for (given, value) in named {
        let Some(param) = find_parameter(spec, &given) else {
            return Err(ExecError::ParameterBinding(format!(
                "{}: unknown parameter -{given}",
                spec.name
            )));
        };
        if bound.contains(param.name) {
            return Err(ExecError::ParameterBinding(format!(
                "{}: parameter -{} specified more than once",
                spec.name, param.name
            )));
        }
        let value = match value {
            Some(argument) => convert(param, argument)?,
            None => match param.value_type {
                ValueType::Switch => Value::Bool(true),
                _ => {
                    return Err(ExecError::ParameterBinding(format!(
                        "{}: parameter -{} requires a value",
                        spec.name, param.name
                    )));
                }
            },
        };
        bound.values.insert(param.name, value);
    }

    // Positional parameters in position order.
    let mut slots: Vec<&ParameterSpec> = spec
        .parameters
        .iter()
        .filter(|p| p.position.is_some() && !bound.contains(p.name))
        .collect();
    slots.sort_by_key(|p| p.position);

    let mut remaining = positional.into_iter();
    for param in slots {
        if param.value_type == ValueType::StringArray {
            let items: Vec<String> = remaining
                .by_ref()
                .flat_map(Materialized::into_list)
                .collect();
            if !items.is_empty() {
                bound.values.insert(param.name, Value::List(items));
            }
            continue;
        }
        match remaining.next() {
            Some(argument) => {
                bound.values.insert(param.name, convert(param, argument)?);
            }
            None => break,
        }
    }
    let surplus = remaining.count();
    if surplus > 0 {
        return Err(ExecError::ParameterBinding(format!(
            "{}: {surplus} positional argument(s) could not be bound",
            spec.name
        )));
    }

    // Mandatory check last.
    for param in spec.parameters {
        if param.mandatory && !bound.contains(param.name) {
            return Err(ExecError::ParameterBinding(format!(
                "{}: missing mandatory parameter -{}",
                spec.name, param.name
            )));
        }
    }
    Ok(bound)
}
