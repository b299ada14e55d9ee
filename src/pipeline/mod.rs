//! Pipeline execution: stages, channels, binding, redirection.
//!
//! One statement becomes one pipeline. Every command runs as its own stage
//! on its own thread, connected to its neighbors by bounded channels; the
//! executor owns the statement loop, drains the last stage into the sink,
//! and joins and aggregates before moving on.

mod binder;
mod channel;
mod executor;
mod redirect;

pub use binder::{BoundParameters, Materialized, Value, bind_parameters};
pub use channel::{ChannelClosed, DEFAULT_CAPACITY, StageReceiver, StageSender, stage_channel};
pub use executor::{execute, execute_with_registry};

use std::fmt;
use std::io;

use crate::cmdlet::CmdletRegistry;
use crate::object::Object;
use crate::session::{SessionState, SessionUpdate};
use crate::sink::ExecutionSink;
use redirect::FileWriter;
pub(crate) use redirect::{ErrorDisposition, OutputDisposition, StageRouting, plan_routing};

/// Tunables for the executor.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionOptions {
    /// Bounded capacity of each stage channel.
    pub channel_capacity: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Why a stage stopped early.
#[derive(Debug)]
pub enum StageFailure {
    /// The downstream consumer is gone. A wind-down signal, not an error.
    Cancelled,
    /// Terminating error raised by the cmdlet.
    Message(String),
    /// I/O failure inside the stage (file redirection, content reads).
    Io(io::Error),
}

impl StageFailure {
    /// Terminating error with a message.
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::Message(m) => write!(f, "{m}"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl From<io::Error> for StageFailure {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Result of a cmdlet lifecycle hook.
pub type StageResult = Result<(), StageFailure>;

/// Runtime output route of a stage.
pub(crate) enum OutputRoute {
    Channel(StageSender),
    File(FileWriter),
    ToError,
}

/// Runtime error route of a stage.
pub(crate) enum ErrorRoute {
    Sink,
    File(FileWriter),
    ToOutput,
}

/// Everything a running stage may touch.
///
/// Stages see a session snapshot only; mutations are queued as
/// [`SessionUpdate`]s and applied by the executor after the stage joins.
pub struct StageContext<'a> {
    command: &'a str,
    output: OutputRoute,
    error: ErrorRoute,
    sink: &'a dyn ExecutionSink,
    registry: &'a CmdletRegistry,
    session: &'a SessionState,
    updates: Vec<SessionUpdate>,
}

impl<'a> StageContext<'a> {
    pub(crate) fn new(
        command: &'a str,
        output: OutputRoute,
        error: ErrorRoute,
        sink: &'a dyn ExecutionSink,
        registry: &'a CmdletRegistry,
        session: &'a SessionState,
    ) -> Self {
        Self {
            command,
            output,
            error,
            sink,
            registry,
            session,
            updates: Vec::new(),
        }
    }

    /// Emit one object on the stage's output stream.
    ///
    /// # Errors
    ///
    /// [`StageFailure::Cancelled`] when the downstream consumer is gone;
    /// [`StageFailure::Io`] when a file redirection target fails.
    pub fn write_output(&self, object: Object) -> StageResult {
        match &self.output {
            OutputRoute::Channel(tx) => {
                tx.send(object).map_err(|_| StageFailure::Cancelled)
            }
            OutputRoute::File(writer) => writer.write_object(&object).map_err(StageFailure::Io),
            OutputRoute::ToError => {
                self.route_error(object.to_display_string());
                Ok(())
            }
        }
    }

    /// Emit a non-terminating error record.
    pub fn write_error(&self, message: &str) {
        self.route_error(message.to_string());
    }

    pub fn write_warning(&self, message: &str) {
        self.sink.write_warning(message);
    }

    pub fn write_debug(&self, message: &str) {
        self.sink.write_debug(message);
    }

    /// Session snapshot taken when the pipeline was constructed.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        self.session
    }

    #[must_use]
    pub fn registry(&self) -> &CmdletRegistry {
        self.registry
    }

    /// Name the command was invoked under.
    #[must_use]
    pub fn command(&self) -> &str {
        self.command
    }

    /// Queue a session mutation for the executor to apply after the join.
    pub fn request_update(&mut self, update: SessionUpdate) {
        self.updates.push(update);
    }

    pub(crate) fn take_updates(&mut self) -> Vec<SessionUpdate> {
        std::mem::take(&mut self.updates)
    }

    fn route_error(&self, message: String) {
        match &self.error {
            ErrorRoute::Sink => self.sink.write_error(&message),
            ErrorRoute::File(writer) => {
                if writer.write_object(&Object::Error(message.clone())).is_err() {
                    self.sink.write_error(&message);
                }
            }
            ErrorRoute::ToOutput => match &self.output {
                OutputRoute::Channel(tx) => {
                    // Closed channel during wind-down loses nothing the
                    // pipeline still wants.
                    let _ = tx.send(Object::Error(message));
                }
                OutputRoute::File(writer) => {
                    if writer.write_object(&Object::Error(message.clone())).is_err() {
                        self.sink.write_error(&message);
                    }
                }
                OutputRoute::ToError => self.sink.write_error(&message),
            },
        }
    }
}
