//! `arbsh` core - Arabic-aware shell engine.
//!
//! The crate pairs a conformant UAX #9 bidirectional text engine (with
//! Arabic shaping) with the shell pipeline that consumes it: tokenizer,
//! parser, and a concurrent cmdlet executor behind an abstract output sink.
//!
//! The load-bearing contract: parsing and execution operate on *logical*
//! order; only a rendering host, via [`shape`] and [`bidi_process`],
//! produces *visual* order. The two never mix.

// Crate-level lint configuration
#![allow(clippy::upper_case_acronyms)] // UAX #9 class names are acronyms
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error contracts documented on the types
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)] // Intentional run-offset casts
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine

pub mod cmdlet;
pub mod error;
pub mod event;
pub mod object;
pub mod pipeline;
pub mod session;
pub mod sink;
pub mod syntax;
pub mod unicode;

// Re-export core types at crate root
pub use error::{Error, ExecError, ParseError, Result, TokenizeError, TokenizeErrorKind};
pub use event::{LogLevel, emit_log, set_log_callback};
pub use object::Object;
pub use session::{SessionState, SessionUpdate};
pub use sink::{BufferSink, ConsoleSink, ExecutionSink, RecordingSink};

// Re-export the shell surface
pub use cmdlet::{Cmdlet, CmdletRegistry, CmdletSpec, ParameterSpec};
pub use pipeline::{ExecutionOptions, execute, execute_with_registry};
pub use syntax::{Statement, Token, parse, tokenize};

// Re-export the BiDi API under the names rendering hosts consume
pub use unicode::process as bidi_process;
pub use unicode::resolve as bidi_resolve;
pub use unicode::{Run, paragraph_level, shape};
