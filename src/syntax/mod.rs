//! Shell syntax: tokenizer and parser over logical-order input lines.

mod parser;
mod token;
mod tokenizer;

pub use parser::{
    Argument, NamedArgument, ParsedCommand, RedirectionInfo, Statement, parse,
};
pub use token::{Operator, RedirectionKind, StreamId, StringPart, Token};
pub use tokenizer::tokenize;
