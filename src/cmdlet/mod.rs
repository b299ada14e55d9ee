//! Cmdlet framework: the command contract, parameter metadata, and the
//! registry.
//!
//! A cmdlet publishes a static [`CmdletSpec`] describing its name, aliases
//! and parameter table, and implements the [`Cmdlet`] lifecycle. Discovery
//! is one-shot: the built-in set is scanned at startup and the registry is
//! immutable afterwards, so concurrent stages may read it freely.

mod builtins;

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::ExecError;
use crate::object::Object;
use crate::pipeline::{BoundParameters, StageContext, StageResult};

/// How a parameter accepts pipeline input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineBinding {
    None,
    ByValue,
    ByPropertyName,
}

/// Declared value type of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    String,
    Int,
    Bool,
    Switch,
    StringArray,
}

/// One entry in a cmdlet's parameter table.
#[derive(Clone, Copy, Debug)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Positional index, when the parameter binds by position.
    pub position: Option<usize>,
    pub mandatory: bool,
    pub pipeline: PipelineBinding,
    pub value_type: ValueType,
}

/// Static description of a cmdlet.
#[derive(Clone, Copy, Debug)]
pub struct CmdletSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub summary: &'static str,
    pub parameters: &'static [ParameterSpec],
}

/// A command implementation.
///
/// Instances live for a single pipeline invocation: the executor creates
/// one, binds its parameters, runs the lifecycle on a stage thread, and
/// drops it when the pipeline joins.
pub trait Cmdlet: Send {
    /// Accept the bound parameter values.
    ///
    /// # Errors
    ///
    /// [`ExecError::ParameterBinding`] when a value the table admitted is
    /// still unusable.
    fn bind(&mut self, parameters: BoundParameters) -> Result<(), ExecError>;

    /// Called once before any records flow.
    fn begin_processing(&mut self, _ctx: &mut StageContext<'_>) -> StageResult {
        Ok(())
    }

    /// Called per input record; a first stage gets exactly one `None` call.
    fn process_record(&mut self, input: Option<Object>, ctx: &mut StageContext<'_>)
    -> StageResult;

    /// Called once after the input channel closes.
    fn end_processing(&mut self, _ctx: &mut StageContext<'_>) -> StageResult {
        Ok(())
    }
}

type Factory = fn() -> Box<dyn Cmdlet>;

/// A registered cmdlet: its descriptor plus an instance factory.
pub struct Registration {
    pub spec: &'static CmdletSpec,
    pub factory: Factory,
}

/// Case-sensitive name and alias lookup over the registered cmdlets.
#[derive(Default)]
pub struct CmdletRegistry {
    entries: Vec<Registration>,
    by_name: HashMap<&'static str, usize>,
}

impl CmdletRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cmdlet under its name and every alias.
    ///
    /// # Panics
    ///
    /// Panics when a name or alias is already taken; two distinct cmdlets
    /// may never share one.
    pub fn register(&mut self, spec: &'static CmdletSpec, factory: Factory) {
        let index = self.entries.len();
        for key in std::iter::once(spec.name).chain(spec.aliases.iter().copied()) {
            let previous = self.by_name.insert(key, index);
            assert!(
                previous.is_none(),
                "cmdlet name or alias registered twice: {key}"
            );
        }
        self.entries.push(Registration { spec, factory });
    }

    /// Resolve a command name or alias, case-sensitively.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Registration> {
        let index = *self.by_name.get(name)?;
        self.entries.get(index)
    }

    /// Registered cmdlets in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.entries.iter()
    }

    /// Registry with the built-in command set.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    /// Process-wide registry, built on first use.
    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<CmdletRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::with_builtins)
    }
}
