//! Parser: token stream to statements, pipelines and commands.
//!
//! Variables are left unexpanded here; the executor materializes them
//! against the live session. The parser only establishes structure.

use crate::error::ParseError;
use crate::syntax::token::{Operator, RedirectionKind, StringPart, Token};

/// One statement: commands joined by pipes, executed as a pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    pub commands: Vec<ParsedCommand>,
}

/// A command invocation with its arguments and redirections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub named: Vec<NamedArgument>,
    pub redirections: Vec<RedirectionInfo>,
}

/// `-name value` or a bare `-name` switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedArgument {
    pub name: String,
    pub value: Option<Argument>,
}

/// A redirection entry, with its file target where the operator takes one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectionInfo {
    pub kind: RedirectionKind,
    pub target: Option<String>,
}

/// An argument position, unevaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Argument {
    /// Bare word or single-quoted text.
    Literal(String),
    /// Double-quoted text with embedded variables.
    Interpolated(Vec<StringPart>),
    /// `$name`.
    Variable(String),
    /// `[Type]` with an optional immediately-following value.
    Typed {
        type_name: String,
        value: Option<Box<Argument>>,
    },
    /// `$( … )`: nested statements evaluated into a list of objects.
    Subexpression(Vec<Statement>),
}

/// Parse a token stream into statements.
///
/// # Errors
///
/// Returns [`ParseError`] for a pipe with no following command, a missing
/// redirection target, a missing command name, or unbalanced subexpression
/// tokens. Positions are token indices.
pub fn parse(tokens: &[Token]) -> Result<Vec<Statement>, ParseError> {
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_statements(false)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn parse_statements(&mut self, nested: bool) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        loop {
            while matches!(self.peek(), Some(Token::Semicolon)) {
                self.pos += 1;
            }
            match self.peek() {
                None => break,
                Some(Token::SubexpressionClose) if nested => break,
                Some(_) => statements.push(self.parse_statement(nested)?),
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self, nested: bool) -> Result<Statement, ParseError> {
        let mut commands = vec![self.parse_command(nested)?];
        while matches!(self.peek(), Some(Token::Operator(Operator::Pipe))) {
            let pipe_pos = self.pos;
            self.pos += 1;
            if self.command_boundary(nested) {
                return Err(ParseError::new("pipe with no following command", pipe_pos));
            }
            commands.push(self.parse_command(nested)?);
        }
        Ok(Statement { commands })
    }

    /// True when the cursor sits where no command can start.
    fn command_boundary(&self, nested: bool) -> bool {
        match self.peek() {
            None | Some(Token::Semicolon | Token::Operator(_)) => true,
            Some(Token::SubexpressionClose) => nested,
            Some(_) => false,
        }
    }

    fn parse_command(&mut self, nested: bool) -> Result<ParsedCommand, ParseError> {
        let name = match self.peek() {
            Some(Token::Word(w)) => {
                let name = w.clone();
                self.pos += 1;
                name
            }
            _ => return Err(ParseError::new("expected command name", self.pos)),
        };
        let mut command = ParsedCommand {
            name,
            arguments: Vec::new(),
            named: Vec::new(),
            redirections: Vec::new(),
        };

        loop {
            if self.command_boundary(nested) {
                break;
            }
            match self.peek().expect("boundary check guarantees a token") {
                Token::ParameterName(name) => {
                    let name = name.clone();
                    self.pos += 1;
                    let value = if self.value_ahead(nested) {
                        Some(self.parse_value()?)
                    } else {
                        None
                    };
                    command.named.push(NamedArgument { name, value });
                }
                Token::Redirection(kind) => {
                    let kind = *kind;
                    let at = self.pos;
                    self.pos += 1;
                    let target = match kind {
                        RedirectionKind::Merge { .. } => None,
                        RedirectionKind::File { .. } | RedirectionKind::Input => {
                            Some(self.parse_redirection_target(at)?)
                        }
                    };
                    command.redirections.push(RedirectionInfo { kind, target });
                }
                Token::TypeLiteral(name) => {
                    let type_name = name.clone();
                    self.pos += 1;
                    let value = if self.value_ahead(nested) {
                        Some(Box::new(self.parse_value()?))
                    } else {
                        None
                    };
                    command.arguments.push(Argument::Typed { type_name, value });
                }
                _ => {
                    let argument = self.parse_value()?;
                    command.arguments.push(argument);
                }
            }
        }
        Ok(command)
    }

    /// True when the next token can be consumed as a parameter or type value.
    fn value_ahead(&self, nested: bool) -> bool {
        if self.command_boundary(nested) {
            return false;
        }
        matches!(
            self.peek(),
            Some(
                Token::Word(_)
                    | Token::SingleQuoted(_)
                    | Token::DoubleQuoted(_)
                    | Token::Variable(_)
                    | Token::SubexpressionOpen
            )
        )
    }

    fn parse_value(&mut self) -> Result<Argument, ParseError> {
        let argument = match self.peek() {
            Some(Token::Word(w)) => Argument::Literal(w.clone()),
            Some(Token::SingleQuoted(s)) => Argument::Literal(s.clone()),
            Some(Token::DoubleQuoted(parts)) => Argument::Interpolated(parts.clone()),
            Some(Token::Variable(name)) => Argument::Variable(name.clone()),
            Some(Token::SubexpressionOpen) => {
                self.pos += 1;
                let statements = self.parse_statements(true)?;
                if !matches!(self.peek(), Some(Token::SubexpressionClose)) {
                    return Err(ParseError::new("unterminated subexpression", self.pos));
                }
                self.pos += 1;
                return Ok(Argument::Subexpression(statements));
            }
            _ => return Err(ParseError::new("expected argument", self.pos)),
        };
        self.pos += 1;
        Ok(argument)
    }

    fn parse_redirection_target(&mut self, at: usize) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Word(w)) => {
                let target = w.clone();
                self.pos += 1;
                Ok(target)
            }
            Some(Token::SingleQuoted(s)) => {
                let target = s.clone();
                self.pos += 1;
                Ok(target)
            }
            _ => Err(ParseError::new("missing redirection target", at)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::token::StreamId;
    use crate::syntax::tokenizer::tokenize;

    fn parse_line(line: &str) -> Vec<Statement> {
        parse(&tokenize(line).expect("tokenize")).expect("parse")
    }

    #[test]
    fn single_command_with_arguments() {
        let statements = parse_line("write-output hello world");
        assert_eq!(statements.len(), 1);
        let command = &statements[0].commands[0];
        assert_eq!(command.name, "write-output");
        assert_eq!(
            command.arguments,
            vec![
                Argument::Literal("hello".into()),
                Argument::Literal("world".into()),
            ]
        );
    }

    #[test]
    fn pipeline_splits_commands() {
        let statements = parse_line("get-command | measure-object");
        assert_eq!(statements[0].commands.len(), 2);
        assert_eq!(statements[0].commands[0].name, "get-command");
        assert_eq!(statements[0].commands[1].name, "measure-object");
    }

    #[test]
    fn semicolons_split_statements_and_empty_ones_vanish() {
        let statements = parse_line("a; ;b;");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].commands[0].name, "a");
        assert_eq!(statements[1].commands[0].name, "b");
    }

    #[test]
    fn named_parameters_take_following_value() {
        let statements = parse_line("get-content -Path file.txt -Force");
        let command = &statements[0].commands[0];
        assert_eq!(
            command.named,
            vec![
                NamedArgument {
                    name: "Path".into(),
                    value: Some(Argument::Literal("file.txt".into())),
                },
                NamedArgument {
                    name: "Force".into(),
                    value: None,
                },
            ]
        );
    }

    #[test]
    fn switch_before_pipe_has_no_value() {
        let statements = parse_line("a -Quiet | b");
        assert_eq!(
            statements[0].commands[0].named,
            vec![NamedArgument {
                name: "Quiet".into(),
                value: None
            }]
        );
        assert_eq!(statements[0].commands.len(), 2);
    }

    #[test]
    fn type_literal_binds_following_value() {
        let statements = parse_line("write-output [int] 42 [string]");
        let command = &statements[0].commands[0];
        assert_eq!(
            command.arguments,
            vec![
                Argument::Typed {
                    type_name: "int".into(),
                    value: Some(Box::new(Argument::Literal("42".into()))),
                },
                Argument::Typed {
                    type_name: "string".into(),
                    value: None,
                },
            ]
        );
    }

    #[test]
    fn subexpression_nests_statements() {
        let statements = parse_line("write-output $(get-command | write-output)");
        assert_eq!(statements.len(), 1);
        let command = &statements[0].commands[0];
        assert_eq!(command.name, "write-output");
        let Argument::Subexpression(inner) = &command.arguments[0] else {
            panic!("expected subexpression, got {:?}", command.arguments[0]);
        };
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].commands.len(), 2);
        assert_eq!(inner[0].commands[0].name, "get-command");
        assert_eq!(inner[0].commands[1].name, "write-output");
    }

    #[test]
    fn subexpression_with_multiple_statements() {
        let statements = parse_line("a $(b; c)");
        let Argument::Subexpression(inner) = &statements[0].commands[0].arguments[0] else {
            panic!("expected subexpression");
        };
        assert_eq!(inner.len(), 2);
    }

    #[test]
    fn redirections_capture_targets() {
        let statements = parse_line("a > out.txt 2>> err.log 2>&1");
        let redirections = &statements[0].commands[0].redirections;
        assert_eq!(redirections.len(), 3);
        assert_eq!(redirections[0].target.as_deref(), Some("out.txt"));
        assert_eq!(
            redirections[1].kind,
            RedirectionKind::File {
                stream: StreamId::Error,
                append: true
            }
        );
        assert_eq!(redirections[1].target.as_deref(), Some("err.log"));
        assert_eq!(
            redirections[2].kind,
            RedirectionKind::Merge {
                source: StreamId::Error,
                target: StreamId::Output
            }
        );
        assert_eq!(redirections[2].target, None);
    }

    #[test]
    fn variables_stay_unexpanded() {
        let statements = parse_line("write-output $greeting \"hi $name\"");
        let command = &statements[0].commands[0];
        assert_eq!(command.arguments[0], Argument::Variable("greeting".into()));
        assert!(matches!(command.arguments[1], Argument::Interpolated(_)));
    }

    #[test]
    fn trailing_pipe_is_an_error() {
        let tokens = tokenize("a |").expect("tokenize");
        let err = parse(&tokens).unwrap_err();
        assert!(err.message.contains("pipe"));
    }

    #[test]
    fn missing_redirection_target_is_an_error() {
        let tokens = tokenize("a >").expect("tokenize");
        let err = parse(&tokens).unwrap_err();
        assert!(err.message.contains("redirection target"));
    }

    #[test]
    fn missing_command_name_is_an_error() {
        let tokens = tokenize("| b").expect("tokenize");
        assert!(parse(&tokens).is_err());
    }
}
