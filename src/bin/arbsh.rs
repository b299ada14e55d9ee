//! Minimal console host.
//!
//! Reads lines from stdin, runs them through the tokenizer, parser and
//! executor, and renders results through a [`ConsoleSink`]. Honors a single
//! argument, `--working-dir <path>`, for the initial working directory.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use arbsh::{
    ConsoleSink, ExecutionOptions, ExecutionSink, LogLevel, SessionState, execute, parse,
    set_log_callback, tokenize,
};

fn parse_args() -> Result<SessionState, String> {
    let mut args = std::env::args().skip(1);
    let mut session = SessionState::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--working-dir" => {
                let Some(dir) = args.next() else {
                    return Err("--working-dir requires a path".to_string());
                };
                if !std::path::Path::new(&dir).is_dir() {
                    return Err(format!("not a directory: {dir}"));
                }
                session = SessionState::with_working_dir(dir);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(session)
}

fn main() -> ExitCode {
    let mut session = match parse_args() {
        Ok(session) => session,
        Err(message) => {
            eprintln!("arbsh: {message}");
            return ExitCode::FAILURE;
        }
    };

    let sink = ConsoleSink::new();
    set_log_callback(|level, message| match level {
        LogLevel::Warn | LogLevel::Error => eprintln!("arbsh: {message}"),
        LogLevel::Info | LogLevel::Debug => {}
    });

    let options = ExecutionOptions::default();
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }

        let tokens = match tokenize(line) {
            Ok(tokens) => tokens,
            Err(error) => {
                sink.write_error(&error.to_string());
                continue;
            }
        };
        let statements = match parse(&tokens) {
            Ok(statements) => statements,
            Err(error) => {
                sink.write_error(&error.to_string());
                continue;
            }
        };
        execute(&statements, &sink, &options, &mut session);
    }
    ExitCode::SUCCESS
}
