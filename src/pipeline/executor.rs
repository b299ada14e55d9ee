//! Statement loop and concurrent stage execution.
//!
//! # Architecture
//!
//! ```text
//! Executor thread                    Stage threads
//! ---------------                    -------------
//! materialize arguments
//! bind parameters, open redirects
//! spawn stage 0..N  ───────────────▶ begin_processing
//!                                    process_record per input
//! drain final channel ◀───────────── write_output
//! join all stages, aggregate errors  end_processing
//! apply queued session updates
//! ```
//!
//! Statements run strictly sequentially: statement N+1 starts only after
//! every stage of statement N has joined. Within a statement, stages run
//! concurrently, connected by bounded FIFO channels; channel closure is the
//! cancellation signal in both directions.

use std::path::Path;
use std::thread;

use crate::cmdlet::{Cmdlet, CmdletRegistry};
use crate::error::ExecError;
use crate::pipeline::{
    ErrorDisposition, ErrorRoute, ExecutionOptions, Materialized, OutputDisposition, OutputRoute,
    StageContext, StageFailure, StageReceiver, StageResult, StageRouting, StageSender,
    bind_parameters, plan_routing, stage_channel,
};
use crate::object::Object;
use crate::session::{SessionState, SessionUpdate};
use crate::sink::{BufferSink, ExecutionSink};
use crate::syntax::{Argument, ParsedCommand, Statement, StringPart};

/// Execute statements against the global cmdlet registry.
pub fn execute(
    statements: &[Statement],
    sink: &dyn ExecutionSink,
    options: &ExecutionOptions,
    session: &mut SessionState,
) {
    execute_with_registry(statements, sink, options, CmdletRegistry::global(), session);
}

/// Execute statements against an explicit registry.
///
/// Failures are reported through the sink; one failing statement does not
/// stop the ones after it unless the failure is fatal.
pub fn execute_with_registry(
    statements: &[Statement],
    sink: &dyn ExecutionSink,
    options: &ExecutionOptions,
    registry: &CmdletRegistry,
    session: &mut SessionState,
) {
    for statement in statements {
        let errors = run_statement(statement, sink, options, registry, session);
        let fatal = errors.iter().any(ExecError::is_fatal);
        for error in &errors {
            sink.write_error(&error.to_string());
        }
        if fatal {
            return;
        }
    }
}

/// A fully prepared stage, ready to spawn.
struct StagePlan {
    name: String,
    cmdlet: Box<dyn Cmdlet>,
    routing: StageRouting,
}

/// What a stage thread hands back at join time.
struct StageOutcome {
    command: String,
    result: StageResult,
    updates: Vec<SessionUpdate>,
}

fn run_statement(
    statement: &Statement,
    sink: &dyn ExecutionSink,
    options: &ExecutionOptions,
    registry: &CmdletRegistry,
    session: &mut SessionState,
) -> Vec<ExecError> {
    // Resolve, materialize, bind and open redirections for every stage
    // before anything runs; a failure here stops the pipeline cold.
    let mut plans = Vec::with_capacity(statement.commands.len());
    for command in &statement.commands {
        match prepare_stage(command, sink, options, registry, session) {
            Ok(plan) => plans.push(plan),
            Err(error) => return vec![error],
        }
    }
    if plans.is_empty() {
        return Vec::new();
    }

    let snapshot = session.snapshot();
    let capacity = options.channel_capacity;
    let last = plans.len() - 1;
    let mut errors: Vec<ExecError> = Vec::new();
    let mut updates: Vec<SessionUpdate> = Vec::new();

    thread::scope(|scope| {
        let snapshot = &snapshot;
        let mut handles = Vec::with_capacity(plans.len());
        let mut next_input: Option<StageReceiver> = None;
        let mut final_receiver: Option<StageReceiver> = None;

        for (index, plan) in plans.into_iter().enumerate() {
            let StagePlan {
                name,
                cmdlet,
                routing,
            } = plan;

            let input = if index == 0 {
                match routing.input_file {
                    Some(ref path) => {
                        let (tx, rx) = stage_channel(capacity);
                        let path = path.clone();
                        let spawned = thread::Builder::new()
                            .name("pipeline-input".to_string())
                            .spawn_scoped(scope, move || feed_input(&path, &tx, sink));
                        if let Err(e) = spawned {
                            errors.push(ExecError::TaskRuntime(e));
                            break;
                        }
                        Some(rx)
                    }
                    None => None,
                }
            } else {
                next_input.take()
            };

            let output_route = match routing.output {
                OutputDisposition::Pipe => {
                    let (tx, rx) = stage_channel(capacity);
                    if index == last {
                        final_receiver = Some(rx);
                    } else {
                        next_input = Some(rx);
                    }
                    OutputRoute::Channel(tx)
                }
                OutputDisposition::File(writer) => {
                    if index != last {
                        next_input = Some(closed_receiver(capacity));
                    }
                    OutputRoute::File(writer)
                }
                OutputDisposition::ToError => {
                    if index != last {
                        next_input = Some(closed_receiver(capacity));
                    }
                    OutputRoute::ToError
                }
            };
            let error_route = match routing.error {
                ErrorDisposition::Sink => ErrorRoute::Sink,
                ErrorDisposition::File(writer) => ErrorRoute::File(writer),
                ErrorDisposition::ToOutput => ErrorRoute::ToOutput,
            };

            let spawned = thread::Builder::new()
                .name(format!("pipeline-stage-{index}"))
                .spawn_scoped(scope, move || {
                    run_stage(
                        name,
                        cmdlet,
                        input,
                        output_route,
                        error_route,
                        sink,
                        registry,
                        snapshot,
                    )
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    errors.push(ExecError::TaskRuntime(e));
                    break;
                }
            }
        }

        // Route the last stage's output to the sink while stages run.
        if let Some(receiver) = final_receiver.take() {
            while let Some(object) = receiver.recv() {
                sink.write_object(object);
            }
        }

        // Join everything, aggregating errors in stage order.
        for handle in handles {
            match handle.join() {
                Ok(outcome) => {
                    if let Err(failure) = outcome.result {
                        errors.push(ExecError::PipelineStage {
                            command: outcome.command,
                            message: failure.to_string(),
                        });
                    }
                    updates.extend(outcome.updates);
                }
                Err(_) => errors.push(ExecError::PipelineStage {
                    command: "pipeline".to_string(),
                    message: "stage panicked".to_string(),
                }),
            }
        }
    });

    for update in updates {
        session.apply(update);
    }
    errors
}

/// A receiver whose sender is already gone: reads as an empty, closed
/// channel. Used downstream of a stage whose output went to a file.
fn closed_receiver(capacity: usize) -> StageReceiver {
    let (tx, rx) = stage_channel(capacity);
    drop(tx);
    rx
}

fn prepare_stage(
    command: &ParsedCommand,
    sink: &dyn ExecutionSink,
    options: &ExecutionOptions,
    registry: &CmdletRegistry,
    session: &mut SessionState,
) -> Result<StagePlan, ExecError> {
    let Some(registration) = registry.resolve(&command.name) else {
        return Err(ExecError::CommandNotFound(command.name.clone()));
    };

    let mut positional = Vec::with_capacity(command.arguments.len());
    for argument in &command.arguments {
        positional.push(materialize(argument, sink, options, registry, session)?);
    }
    let mut named = Vec::with_capacity(command.named.len());
    for entry in &command.named {
        let value = match &entry.value {
            Some(argument) => Some(materialize(argument, sink, options, registry, session)?),
            None => None,
        };
        named.push((entry.name.clone(), value));
    }

    let bound = bind_parameters(registration.spec, positional, named)?;
    let mut cmdlet = (registration.factory)();
    cmdlet.bind(bound)?;
    let routing = plan_routing(&command.redirections, session)?;
    Ok(StagePlan {
        name: command.name.clone(),
        cmdlet,
        routing,
    })
}

/// Expand one parsed argument into its runtime value.
fn materialize(
    argument: &Argument,
    sink: &dyn ExecutionSink,
    options: &ExecutionOptions,
    registry: &CmdletRegistry,
    session: &mut SessionState,
) -> Result<Materialized, ExecError> {
    Ok(match argument {
        Argument::Literal(text) => Materialized::Text(text.clone()),
        Argument::Variable(name) => Materialized::Text(session.expand(name)),
        Argument::Interpolated(parts) => {
            let mut text = String::new();
            for part in parts {
                match part {
                    StringPart::Literal(literal) => text.push_str(literal),
                    StringPart::Variable(name) => text.push_str(&session.expand(name)),
                }
            }
            Materialized::Text(text)
        }
        Argument::Typed { type_name, value } => match value {
            Some(inner) => {
                let text =
                    materialize(inner, sink, options, registry, session)?.into_text();
                Materialized::Text(apply_type_hint(type_name, text)?)
            }
            None => Materialized::Text(format!("[{type_name}]")),
        },
        Argument::Subexpression(statements) => {
            // Recursive execution into an in-memory sink; diagnostics are
            // forwarded to the real one.
            let buffer = BufferSink::new();
            execute_with_registry(statements, &buffer, options, registry, session);
            for message in buffer.take_errors() {
                sink.write_error(&message);
            }
            for message in buffer.take_warnings() {
                sink.write_warning(&message);
            }
            Materialized::Objects(buffer.take_objects())
        }
    })
}

/// Validate a `[type]`-hinted value, normalizing its spelling.
fn apply_type_hint(type_name: &str, text: String) -> Result<String, ExecError> {
    match type_name.to_ascii_lowercase().as_str() {
        "int" | "long" | "system.int32" | "system.int64" => text
            .trim()
            .parse::<i64>()
            .map(|n| n.to_string())
            .map_err(|_| {
                ExecError::ParameterBinding(format!(
                    "[{type_name}]: '{text}' is not an integer"
                ))
            }),
        "bool" | "system.boolean" => match text.trim() {
            "true" | "True" => Ok("true".to_string()),
            "false" | "False" => Ok("false".to_string()),
            _ => Err(ExecError::ParameterBinding(format!(
                "[{type_name}]: '{text}' is not a boolean"
            ))),
        },
        _ => Ok(text),
    }
}

/// Read a `<` target line-by-line into the first stage's input channel.
fn feed_input(path: &Path, tx: &StageSender, sink: &dyn ExecutionSink) {
    use std::io::{BufRead, BufReader};
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            sink.write_error(&format!("{}: {e}", path.display()));
            return;
        }
    };
    for line in BufReader::new(file).lines() {
        match line {
            Ok(text) => {
                if tx.send(Object::text(text)).is_err() {
                    // Consumer gone; stop reading.
                    return;
                }
            }
            Err(e) => {
                sink.write_error(&format!("{}: {e}", path.display()));
                return;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_stage(
    command: String,
    mut cmdlet: Box<dyn Cmdlet>,
    input: Option<StageReceiver>,
    output: OutputRoute,
    error: ErrorRoute,
    sink: &dyn ExecutionSink,
    registry: &CmdletRegistry,
    session: &SessionState,
) -> StageOutcome {
    let mut ctx = StageContext::new(&command, output, error, sink, registry, session);
    let result = match drive(cmdlet.as_mut(), input.as_ref(), &mut ctx) {
        // A closed downstream channel is a wind-down, not a failure.
        Err(StageFailure::Cancelled) => Ok(()),
        other => other,
    };
    let updates = ctx.take_updates();
    drop(ctx);
    StageOutcome {
        command,
        result,
        updates,
    }
}

fn drive(
    cmdlet: &mut dyn Cmdlet,
    input: Option<&StageReceiver>,
    ctx: &mut StageContext<'_>,
) -> StageResult {
    cmdlet.begin_processing(ctx)?;
    match input {
        None => cmdlet.process_record(None, ctx)?,
        Some(receiver) => {
            while let Some(object) = receiver.recv() {
                match cmdlet.process_record(Some(object), ctx) {
                    Ok(()) => {}
                    Err(StageFailure::Cancelled) => {
                        // Downstream is gone: drain so upstream unblocks,
                        // then wind down.
                        receiver.drain();
                        return Err(StageFailure::Cancelled);
                    }
                    Err(failure) => return Err(failure),
                }
            }
        }
    }
    cmdlet.end_processing(ctx)
}
