//! Token types produced by the line tokenizer.

use std::fmt;

/// Output streams a redirection can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamId {
    /// Stream 1, the object output stream.
    Output,
    /// Stream 2, the error stream.
    Error,
}

/// Shape of a redirection operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectionKind {
    /// `>`, `>>`, `2>`, `2>>`: stream to file, optionally appending.
    File { stream: StreamId, append: bool },
    /// `<`: file contents into the first stage's input.
    Input,
    /// `2>&1`, `1>&2`, `>&1`: splice one stream onto another.
    Merge { source: StreamId, target: StreamId },
}

/// Piece of a double-quoted string: literal text or a variable to expand
/// at execution time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StringPart {
    Literal(String),
    Variable(String),
}

/// Binary operators between commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Pipe,
}

/// One lexical token of an input line, in logical order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Bare word: command names, arguments, paths.
    Word(String),
    /// `'…'`: fully literal.
    SingleQuoted(String),
    /// `"…"`: literal text interleaved with variables to expand later.
    DoubleQuoted(Vec<StringPart>),
    /// `$name` outside quotes.
    Variable(String),
    /// `-name` at the start of a word.
    ParameterName(String),
    Operator(Operator),
    Semicolon,
    Redirection(RedirectionKind),
    /// `[Type.Name]`.
    TypeLiteral(String),
    /// `$(`.
    SubexpressionOpen,
    /// `)` closing a subexpression.
    SubexpressionClose,
}

impl Token {
    /// Re-emit the token as source text. Tokenizing the emission yields the
    /// same token back (redirection spellings are canonicalized).
    #[must_use]
    pub fn emit(&self) -> String {
        match self {
            Self::Word(w) => {
                // Backslash-escape anything that would tokenize as a
                // boundary, and a leading dash or bracket that would turn
                // the word into a parameter name or type literal.
                let mut out = String::with_capacity(w.len());
                for (i, c) in w.chars().enumerate() {
                    let escape = c.is_whitespace()
                        || matches!(c, '\\' | '"' | '\'' | '$' | '|' | ';' | '<' | '>' | ')')
                        || (i == 0 && matches!(c, '-' | '['));
                    if escape {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out
            }
            Self::SingleQuoted(s) => format!("'{s}'"),
            Self::DoubleQuoted(parts) => {
                let mut out = String::from('"');
                let mut after_variable = false;
                for part in parts {
                    match part {
                        StringPart::Literal(text) => {
                            for (i, c) in text.chars().enumerate() {
                                // A literal directly after a variable must
                                // not extend the variable's identifier.
                                if i == 0
                                    && after_variable
                                    && crate::syntax::tokenizer::is_ident_char(c)
                                {
                                    out.push('\\');
                                }
                                match c {
                                    '\\' => out.push_str("\\\\"),
                                    '"' => out.push_str("\\\""),
                                    '$' => out.push_str("\\$"),
                                    '\n' => out.push_str("\\n"),
                                    '\t' => out.push_str("\\t"),
                                    _ => out.push(c),
                                }
                            }
                            after_variable = false;
                        }
                        StringPart::Variable(name) => {
                            out.push('$');
                            out.push_str(name);
                            after_variable = true;
                        }
                    }
                }
                out.push('"');
                out
            }
            Self::Variable(name) => format!("${name}"),
            Self::ParameterName(name) => format!("-{name}"),
            Self::Operator(Operator::Pipe) => "|".to_string(),
            Self::Semicolon => ";".to_string(),
            Self::Redirection(kind) => kind.emit().to_string(),
            Self::TypeLiteral(name) => format!("[{name}]"),
            Self::SubexpressionOpen => "$(".to_string(),
            Self::SubexpressionClose => ")".to_string(),
        }
    }
}

impl RedirectionKind {
    /// Canonical operator spelling.
    #[must_use]
    pub fn emit(self) -> &'static str {
        match self {
            Self::File {
                stream: StreamId::Output,
                append: false,
            } => ">",
            Self::File {
                stream: StreamId::Output,
                append: true,
            } => ">>",
            Self::File {
                stream: StreamId::Error,
                append: false,
            } => "2>",
            Self::File {
                stream: StreamId::Error,
                append: true,
            } => "2>>",
            Self::Input => "<",
            Self::Merge {
                source: StreamId::Error,
                target: StreamId::Output,
            } => "2>&1",
            Self::Merge {
                source: StreamId::Output,
                target: StreamId::Error,
            } => "1>&2",
            Self::Merge {
                source: StreamId::Output,
                target: StreamId::Output,
            } => ">&1",
            Self::Merge {
                source: StreamId::Error,
                target: StreamId::Error,
            } => "2>&2",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.emit())
    }
}
