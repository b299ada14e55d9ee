//! Redirection planning: where each stage's output and error streams go.
//!
//! Targets are opened in declaration order before the stage starts, so a
//! bad path fails the pipeline before any stage runs. File writers
//! serialize objects as their string projection, one per line.

use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::ExecError;
use crate::object::Object;
use crate::session::SessionState;
use crate::syntax::{RedirectionInfo, RedirectionKind, StreamId};

/// Shared line-buffered writer over a redirection target file.
#[derive(Clone)]
pub(crate) struct FileWriter(Arc<Mutex<LineWriter<File>>>);

impl FileWriter {
    fn open(path: &PathBuf, append: bool) -> io::Result<Self> {
        let file = if append {
            OpenOptions::new().create(true).append(true).open(path)?
        } else {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?
        };
        Ok(Self(Arc::new(Mutex::new(LineWriter::new(file)))))
    }

    pub(crate) fn write_object(&self, object: &Object) -> io::Result<()> {
        let mut writer = self.0.lock().expect("file writer lock");
        writeln!(writer, "{}", object.to_display_string())
    }
}

/// Where a stage's output objects go.
pub(crate) enum OutputDisposition {
    /// Default: the pipeline channel (or the sink, for the last stage).
    Pipe,
    /// `>` / `>>`.
    File(FileWriter),
    /// `1>&2`.
    ToError,
}

/// Where a stage's error records go.
pub(crate) enum ErrorDisposition {
    /// Default: the sink's error channel.
    Sink,
    /// `2>` / `2>>`.
    File(FileWriter),
    /// `2>&1`.
    ToOutput,
}

/// Resolved routing for one stage.
pub(crate) struct StageRouting {
    pub(crate) output: OutputDisposition,
    pub(crate) error: ErrorDisposition,
    /// `<` target, fed line-by-line into the stage's input channel.
    pub(crate) input_file: Option<PathBuf>,
}

/// Apply redirections in declaration order; the last one wins per stream.
pub(crate) fn plan_routing(
    redirections: &[RedirectionInfo],
    session: &SessionState,
) -> Result<StageRouting, ExecError> {
    let mut routing = StageRouting {
        output: OutputDisposition::Pipe,
        error: ErrorDisposition::Sink,
        input_file: None,
    };
    for redirection in redirections {
        let target = |info: &RedirectionInfo| -> Result<PathBuf, ExecError> {
            info.target.as_deref().map(|t| session.resolve_path(t)).ok_or_else(|| {
                ExecError::ParameterBinding("redirection is missing its target".to_string())
            })
        };
        match redirection.kind {
            RedirectionKind::File { stream, append } => {
                let writer = FileWriter::open(&target(redirection)?, append)?;
                match stream {
                    StreamId::Output => routing.output = OutputDisposition::File(writer),
                    StreamId::Error => routing.error = ErrorDisposition::File(writer),
                }
            }
            RedirectionKind::Input => {
                routing.input_file = Some(target(redirection)?);
            }
            RedirectionKind::Merge {
                source: StreamId::Error,
                target: StreamId::Output,
            } => routing.error = ErrorDisposition::ToOutput,
            RedirectionKind::Merge {
                source: StreamId::Output,
                target: StreamId::Error,
            } => routing.output = OutputDisposition::ToError,
            // Identity merges change no routing.
            RedirectionKind::Merge { .. } => {}
        }
    }
    Ok(routing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::RedirectionKind as K;

    fn info(kind: K, target: Option<&str>) -> RedirectionInfo {
        RedirectionInfo {
            kind,
            target: target.map(str::to_string),
        }
    }

    #[test]
    fn empty_redirections_default_to_pipe_and_sink() {
        let session = SessionState::with_working_dir("/tmp");
        let routing = plan_routing(&[], &session).expect("plan");
        assert!(matches!(routing.output, OutputDisposition::Pipe));
        assert!(matches!(routing.error, ErrorDisposition::Sink));
        assert!(routing.input_file.is_none());
    }

    #[test]
    fn merges_rewire_streams() {
        let session = SessionState::with_working_dir("/tmp");
        let routing = plan_routing(
            &[info(
                K::Merge {
                    source: StreamId::Error,
                    target: StreamId::Output,
                },
                None,
            )],
            &session,
        )
        .expect("plan");
        assert!(matches!(routing.error, ErrorDisposition::ToOutput));
    }

    #[test]
    fn identity_merge_is_a_no_op() {
        let session = SessionState::with_working_dir("/tmp");
        let routing = plan_routing(
            &[info(
                K::Merge {
                    source: StreamId::Output,
                    target: StreamId::Output,
                },
                None,
            )],
            &session,
        )
        .expect("plan");
        assert!(matches!(routing.output, OutputDisposition::Pipe));
    }

    #[test]
    fn input_redirection_resolves_against_working_dir() {
        let session = SessionState::with_working_dir("/data");
        let routing =
            plan_routing(&[info(K::Input, Some("in.txt"))], &session).expect("plan");
        assert_eq!(routing.input_file, Some(PathBuf::from("/data/in.txt")));
    }
}
