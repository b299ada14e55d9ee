//! Line tokenizer: one logical input line to a stream of typed tokens.
//!
//! The scanner walks the line once, character by character, with a small
//! amount of lookahead for redirection operators and type literals. It
//! tracks subexpression depth so that a bare `)` closes `$(` and is
//! otherwise word text. All offsets in errors are character positions.

use crate::error::{TokenizeError, TokenizeErrorKind};
use crate::syntax::token::{Operator, RedirectionKind, StreamId, StringPart, Token};

/// Identifier characters for `$name` variables and `-name` parameters:
/// ASCII letters and digits, underscore, and Arabic letters.
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || is_arabic_letter(c)
}

/// Arabic-block letters usable in identifiers and command names.
pub(crate) fn is_arabic_letter(c: char) -> bool {
    matches!(
        u32::from(c),
        0x0620..=0x064A | 0x066E..=0x06D5 | 0x0750..=0x077F | 0x08A0..=0x08FF
    )
}

/// Tokenize one logical line.
///
/// # Errors
///
/// Returns [`TokenizeError`] for an unterminated quote or subexpression.
pub fn tokenize(line: &str) -> Result<Vec<Token>, TokenizeError> {
    Scanner::new(line).run()
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    /// Positions of currently open `$(`, for depth tracking and errors.
    open_subexpressions: Vec<usize>,
    tokens: Vec<Token>,
}

impl Scanner {
    fn new(line: &str) -> Self {
        Self {
            chars: line.chars().collect(),
            pos: 0,
            open_subexpressions: Vec::new(),
            tokens: Vec::new(),
        }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(k, c)| self.peek(k) == Some(c))
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizeError> {
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            if c.is_whitespace() {
                self.pos += 1;
                continue;
            }
            match c {
                '"' => self.scan_double_quoted()?,
                '\'' => self.scan_single_quoted()?,
                '$' => self.scan_dollar(),
                ')' if !self.open_subexpressions.is_empty() => {
                    self.open_subexpressions.pop();
                    self.tokens.push(Token::SubexpressionClose);
                    self.pos += 1;
                }
                '|' => {
                    self.tokens.push(Token::Operator(Operator::Pipe));
                    self.pos += 1;
                }
                ';' => {
                    self.tokens.push(Token::Semicolon);
                    self.pos += 1;
                }
                '<' => {
                    self.tokens.push(Token::Redirection(RedirectionKind::Input));
                    self.pos += 1;
                }
                '>' => self.scan_output_redirection(),
                '1' | '2' if self.peek(1) == Some('>') => self.scan_numbered_redirection(),
                '[' => {
                    if !self.try_type_literal() {
                        self.scan_word();
                    }
                }
                '-' => {
                    if !self.try_parameter_name() {
                        self.scan_word();
                    }
                }
                _ => self.scan_word(),
            }
        }
        if let Some(&open) = self.open_subexpressions.last() {
            return Err(TokenizeError {
                kind: TokenizeErrorKind::UnterminatedSubexpression,
                position: open,
            });
        }
        Ok(self.tokens)
    }

    /// `>`, `>>`, `>&1`, `>>&1`.
    fn scan_output_redirection(&mut self) {
        let kind = if self.starts_with(">>&1") {
            self.pos += 4;
            RedirectionKind::Merge {
                source: StreamId::Output,
                target: StreamId::Output,
            }
        } else if self.starts_with(">&1") {
            self.pos += 3;
            RedirectionKind::Merge {
                source: StreamId::Output,
                target: StreamId::Output,
            }
        } else if self.starts_with(">>") {
            self.pos += 2;
            RedirectionKind::File {
                stream: StreamId::Output,
                append: true,
            }
        } else {
            self.pos += 1;
            RedirectionKind::File {
                stream: StreamId::Output,
                append: false,
            }
        };
        self.tokens.push(Token::Redirection(kind));
    }

    /// `2>`, `2>>`, `2>&1`, `1>&2`, `1>`.
    fn scan_numbered_redirection(&mut self) {
        let kind = if self.starts_with("2>&1") {
            self.pos += 4;
            RedirectionKind::Merge {
                source: StreamId::Error,
                target: StreamId::Output,
            }
        } else if self.starts_with("1>&2") {
            self.pos += 4;
            RedirectionKind::Merge {
                source: StreamId::Output,
                target: StreamId::Error,
            }
        } else if self.starts_with("2>>") {
            self.pos += 3;
            RedirectionKind::File {
                stream: StreamId::Error,
                append: true,
            }
        } else if self.starts_with("2>") {
            self.pos += 2;
            RedirectionKind::File {
                stream: StreamId::Error,
                append: false,
            }
        } else {
            // "1>" and "1>>" behave as the plain output forms.
            let append = self.starts_with("1>>");
            self.pos += if append { 3 } else { 2 };
            RedirectionKind::File {
                stream: StreamId::Output,
                append,
            }
        };
        self.tokens.push(Token::Redirection(kind));
    }

    fn scan_single_quoted(&mut self) -> Result<(), TokenizeError> {
        let open = self.pos;
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.peek(0) {
                None => {
                    return Err(TokenizeError {
                        kind: TokenizeErrorKind::UnterminatedString,
                        position: open,
                    });
                }
                Some('\'') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
        self.tokens.push(Token::SingleQuoted(text));
        Ok(())
    }

    fn scan_double_quoted(&mut self) -> Result<(), TokenizeError> {
        let open = self.pos;
        self.pos += 1;
        let mut parts = Vec::new();
        let mut literal = String::new();
        loop {
            match self.peek(0) {
                None => {
                    return Err(TokenizeError {
                        kind: TokenizeErrorKind::UnterminatedString,
                        position: open,
                    });
                }
                Some('"') => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => {
                    let Some(escaped) = self.peek(1) else {
                        return Err(TokenizeError {
                            kind: TokenizeErrorKind::UnterminatedString,
                            position: open,
                        });
                    };
                    literal.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                    self.pos += 2;
                }
                Some('$') => {
                    let name = self.scan_identifier(self.pos + 1);
                    if name.is_empty() {
                        literal.push('$');
                        self.pos += 1;
                    } else {
                        self.pos += 1 + name.chars().count();
                        if !literal.is_empty() {
                            parts.push(StringPart::Literal(std::mem::take(&mut literal)));
                        }
                        parts.push(StringPart::Variable(name));
                    }
                }
                Some(c) => {
                    literal.push(c);
                    self.pos += 1;
                }
            }
        }
        if !literal.is_empty() {
            parts.push(StringPart::Literal(literal));
        }
        self.tokens.push(Token::DoubleQuoted(parts));
        Ok(())
    }

    /// `$name`, `$(`, or a lone `$` as word text.
    fn scan_dollar(&mut self) {
        if self.peek(1) == Some('(') {
            self.open_subexpressions.push(self.pos);
            self.tokens.push(Token::SubexpressionOpen);
            self.pos += 2;
            return;
        }
        let name = self.scan_identifier(self.pos + 1);
        if name.is_empty() {
            self.pos += 1;
            self.tokens.push(Token::Word("$".to_string()));
        } else {
            self.pos += 1 + name.chars().count();
            self.tokens.push(Token::Variable(name));
        }
    }

    fn scan_identifier(&self, from: usize) -> String {
        self.chars[from.min(self.chars.len())..]
            .iter()
            .take_while(|&&c| is_ident_char(c))
            .collect()
    }

    /// `[Type.Name]`, whitespace allowed inside the brackets.
    fn try_type_literal(&mut self) -> bool {
        let mut p = self.pos + 1;
        while p < self.chars.len() && self.chars[p].is_whitespace() {
            p += 1;
        }
        let mut name = String::new();
        while p < self.chars.len()
            && (self.chars[p].is_alphanumeric() || self.chars[p] == '.' || self.chars[p] == '_')
        {
            name.push(self.chars[p]);
            p += 1;
        }
        while p < self.chars.len() && self.chars[p].is_whitespace() {
            p += 1;
        }
        if name.is_empty() || self.chars.get(p) != Some(&']') {
            return false;
        }
        self.pos = p + 1;
        self.tokens.push(Token::TypeLiteral(name));
        true
    }

    /// `-name`: a dash starting a word, followed by a letter.
    fn try_parameter_name(&mut self) -> bool {
        let first = self.peek(1);
        if !first.is_some_and(|c| c.is_ascii_alphabetic() || is_arabic_letter(c)) {
            return false;
        }
        let mut p = self.pos + 1;
        let mut name = String::new();
        while p < self.chars.len() && (is_ident_char(self.chars[p]) || self.chars[p] == '-') {
            name.push(self.chars[p]);
            p += 1;
        }
        self.pos = p;
        self.tokens.push(Token::ParameterName(name));
        true
    }

    /// Bare word: everything up to whitespace or a token boundary. A
    /// backslash escapes the next character into the word, whatever it is.
    fn scan_word(&mut self) {
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_whitespace() || matches!(c, '"' | '\'' | '$' | '|' | ';' | '<' | '>') {
                break;
            }
            if c == ')' && !self.open_subexpressions.is_empty() {
                break;
            }
            if c == '\\' {
                self.pos += 1;
                if let Some(escaped) = self.peek(0) {
                    text.push(escaped);
                    self.pos += 1;
                }
                continue;
            }
            text.push(c);
            self.pos += 1;
        }
        // A trailing backslash contributes nothing; drop the empty word.
        if !text.is_empty() {
            self.tokens.push(Token::Word(text));
        }
    }
}
