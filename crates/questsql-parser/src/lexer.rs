use crate::error::Error;
use crate::keyword::Keyword;
use crate::token::{Token, TokenKind};

/// Breaks source text into a covering token stream.
///
/// Lexing never fails: unrecognised characters and unterminated literals are
/// turned into tokens paired with an [`Error`], so every byte of the input is
/// accounted for by exactly one token.
pub struct Lexer {
    tokens: Vec<Token>,
    errors: Vec<Error>,
}

impl Lexer {
    /// Tokenize the whole input, appending a final `Eof` token.
    pub fn new(input: &str) -> Self {
        let mut scanner = Scanner::new(input);
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        while !scanner.is_eof() {
            let (token, error) = scanner.advance();
            tokens.push(token);
            if let Some(error) = error {
                errors.push(error);
            }
        }
        tokens.push(Token::new(
            TokenKind::Eof,
            String::new(),
            scanner.pos,
            scanner.line,
            scanner.column,
        ));

        Self { tokens, errors }
    }

    pub fn tokens(&self) -> &[Token] {
        self.tokens.as_slice()
    }

    pub fn errors(&self) -> &[Error] {
        self.errors.as_slice()
    }

    pub fn into_parts(self) -> (Vec<Token>, Vec<Error>) {
        (self.tokens, self.errors)
    }
}

/// Character-level cursor over the source with position tracking.
struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn first(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.first()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume characters while `pred` holds.
    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.first() {
            if pred(c) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) -> (Token, Option<Error>) {
        let start = self.pos;
        let line = self.line;
        let column = self.column;
        let first = self.first().expect("advance called at EOF");

        let (kind, error) = match first {
            c if c.is_whitespace() => {
                self.eat_while(|c| c.is_whitespace());
                (TokenKind::Whitespace, None)
            }
            '-' if self.second() == Some('-') => self.line_comment(),
            '/' if self.second() == Some('*') => self.block_comment(),
            '\'' => self.string_literal(),
            '"' => self.quoted_identifier(),
            '#' => self.geohash(),
            c if c.is_ascii_digit() => self.number_or_duration(),
            c if is_ident_start(c) => self.ident_or_keyword(),
            '$' | '@' => self.variable(),
            _ => self.punctuator(),
        };

        let text = self.src[start..self.pos].to_string();
        let error = error.map(|message| Error::new(message, text.clone(), start, line, column));
        (Token::new(kind, text, start, line, column), error)
    }

    fn line_comment(&mut self) -> (TokenKind, Option<String>) {
        self.eat_while(|c| c != '\n');
        (TokenKind::LineComment, None)
    }

    fn block_comment(&mut self) -> (TokenKind, Option<String>) {
        self.bump();
        self.bump();
        loop {
            match self.first() {
                None => {
                    return (
                        TokenKind::BlockComment,
                        Some("unterminated block comment".to_string()),
                    )
                }
                Some('*') if self.second() == Some('/') => {
                    self.bump();
                    self.bump();
                    return (TokenKind::BlockComment, None);
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Single-quote delimited; `''` escapes a quote. An unterminated string
    /// still yields a token covering the rest of the input.
    fn string_literal(&mut self) -> (TokenKind, Option<String>) {
        self.bump();
        loop {
            match self.first() {
                None => {
                    return (
                        TokenKind::String,
                        Some("unterminated string literal".to_string()),
                    )
                }
                Some('\'') => {
                    self.bump();
                    if self.first() == Some('\'') {
                        self.bump();
                    } else {
                        return (TokenKind::String, None);
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Double-quote delimited, case preserving; `""` escapes a quote.
    fn quoted_identifier(&mut self) -> (TokenKind, Option<String>) {
        self.bump();
        loop {
            match self.first() {
                None => {
                    return (
                        TokenKind::QuotedIdentifier,
                        Some("unterminated quoted identifier".to_string()),
                    )
                }
                Some('"') => {
                    self.bump();
                    if self.first() == Some('"') {
                        self.bump();
                    } else {
                        return (TokenKind::QuotedIdentifier, None);
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// `#` plus base32 characters, optionally `/bits`.
    fn geohash(&mut self) -> (TokenKind, Option<String>) {
        self.bump();
        let chars_start = self.pos;
        self.eat_while(|c| c.is_ascii_alphanumeric());
        if self.pos == chars_start {
            return (TokenKind::Unknown, Some("expected geohash characters after `#`".to_string()));
        }
        if self.first() == Some('/') {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }
        (TokenKind::Geohash, None)
    }

    /// Numbers and duration literals share a prefix: `<digits>[.<digits>]`.
    /// A trailing unit (single letter, case sensitive, or a full unit word,
    /// case insensitive) turns the lexeme into a duration.
    fn number_or_duration(&mut self) -> (TokenKind, Option<String>) {
        self.eat_while(|c| c.is_ascii_digit());
        if self.first() == Some('.') && self.second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }

        // A trailing alphabetic run is a duration unit, an exponent, or the
        // start of the next token.
        let alpha_start = self.pos;
        let alpha_len: usize = self.src[self.pos..]
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .map(|c| c.len_utf8())
            .sum();
        let run = &self.src[alpha_start..alpha_start + alpha_len];

        if is_duration_unit(run) {
            for _ in 0..run.len() {
                self.bump();
            }
            return (TokenKind::Duration, None);
        }

        // Exponent form: exactly `e`/`E`, an optional sign, then digits.
        if run.len() == 1 && (run == "e" || run == "E") {
            let after = self.src[alpha_start + 1..].chars().next();
            let signed = matches!(after, Some('+') | Some('-'));
            let digit_after = if signed {
                self.src[alpha_start + 2..].chars().next()
            } else {
                after
            };
            if digit_after.is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
                if signed {
                    self.bump();
                }
                self.eat_while(|c| c.is_ascii_digit());
            }
        }
        (TokenKind::Number, None)
    }

    fn ident_or_keyword(&mut self) -> (TokenKind, Option<String>) {
        let start = self.pos;
        self.eat_while(is_ident_part);
        let word = &self.src[start..self.pos];
        match Keyword::lookup(word) {
            Some(kw) => (TokenKind::Keyword(kw), None),
            None => (TokenKind::Identifier, None),
        }
    }

    fn variable(&mut self) -> (TokenKind, Option<String>) {
        self.bump();
        let start = self.pos;
        self.eat_while(|c| is_ident_part(c) || c.is_ascii_digit());
        if self.pos == start {
            return (
                TokenKind::Unknown,
                Some("expected a variable name".to_string()),
            );
        }
        (TokenKind::Variable, None)
    }

    fn punctuator(&mut self) -> (TokenKind, Option<String>) {
        let c = self.bump().expect("punctuator called at EOF");
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Eq,
            '~' => TokenKind::Tilde,
            '|' => {
                if self.first() == Some('|') {
                    self.bump();
                    TokenKind::Concat
                } else {
                    return (TokenKind::Unknown, Some("unexpected character `|`".to_string()));
                }
            }
            '!' => match self.first() {
                Some('=') => {
                    self.bump();
                    TokenKind::Neq
                }
                Some('~') => {
                    self.bump();
                    TokenKind::NotTilde
                }
                _ => {
                    return (TokenKind::Unknown, Some("unexpected character `!`".to_string()));
                }
            },
            '<' => match self.first() {
                Some('=') => {
                    self.bump();
                    TokenKind::LtEq
                }
                Some('>') => {
                    self.bump();
                    TokenKind::Neq
                }
                _ => TokenKind::Lt,
            },
            '>' => {
                if self.first() == Some('=') {
                    self.bump();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            ':' => match self.first() {
                Some(':') => {
                    self.bump();
                    TokenKind::DoubleColon
                }
                Some('=') => {
                    self.bump();
                    TokenKind::Assign
                }
                Some(c) if is_ident_start(c) => {
                    self.eat_while(is_ident_part);
                    TokenKind::Variable
                }
                _ => TokenKind::Colon,
            },
            other => {
                return (
                    TokenKind::Unknown,
                    Some(format!("unexpected character `{other}`")),
                );
            }
        };
        (kind, None)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Duration units: single letters are case sensitive (`M` is month, `m` is
/// minute); full words are case insensitive and accept the plural.
fn is_duration_unit(run: &str) -> bool {
    if run.len() == 1 {
        return matches!(run, "s" | "m" | "h" | "d" | "w" | "M" | "y");
    }
    let lower = run.to_ascii_lowercase();
    let singular = lower.strip_suffix('s').unwrap_or(&lower);
    matches!(
        singular,
        "second" | "minute" | "hour" | "day" | "week" | "month" | "year"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokens()
            .iter()
            .filter(|t| !t.kind().is_trivia() && t.kind() != TokenKind::Eof)
            .map(|t| t.kind())
            .collect()
    }

    #[test]
    fn keywords_fold_case() {
        assert_eq!(
            kinds("select From WHERE"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Keyword(Keyword::Where),
            ]
        );
    }

    #[test]
    fn covering_stream_without_gaps() {
        let input = "SELECT *\nFROM trades -- tail\n";
        let lexer = Lexer::new(input);
        let mut expected_start = 0;
        for token in lexer.tokens() {
            assert_eq!(token.index(), expected_start);
            expected_start = token.end();
        }
        assert_eq!(expected_start, input.len());
    }

    #[test]
    fn string_escapes_and_unterminated() {
        let lexer = Lexer::new("'it''s'");
        assert_eq!(lexer.tokens()[0].kind(), TokenKind::String);
        assert_eq!(lexer.tokens()[0].text(), "'it''s'");
        assert!(lexer.errors().is_empty());

        let lexer = Lexer::new("'oops");
        assert_eq!(lexer.tokens()[0].kind(), TokenKind::String);
        assert_eq!(lexer.tokens()[0].text(), "'oops");
        assert_eq!(lexer.errors().len(), 1);
        assert_eq!(lexer.errors()[0].message(), "unterminated string literal");
    }

    #[test]
    fn durations_are_case_sensitive_on_single_letters() {
        assert_eq!(kinds("1m"), vec![TokenKind::Duration]);
        assert_eq!(kinds("1M"), vec![TokenKind::Duration]);
        assert_eq!(kinds("2.5s"), vec![TokenKind::Duration]);
        assert_eq!(kinds("3days"), vec![TokenKind::Duration]);
        // `T` is not a unit.
        assert_eq!(kinds("1T"), vec![TokenKind::Number, TokenKind::Identifier]);
    }

    #[test]
    fn numbers_keep_exponent_form() {
        let lexer = Lexer::new("1.5e-3 42 0.25");
        let nums: Vec<&str> = lexer
            .tokens()
            .iter()
            .filter(|t| t.kind() == TokenKind::Number)
            .map(|t| t.text())
            .collect();
        assert_eq!(nums, vec!["1.5e-3", "42", "0.25"]);
    }

    #[test]
    fn geohash_literals() {
        assert_eq!(kinds("#u33d8b12"), vec![TokenKind::Geohash]);
        assert_eq!(kinds("#u33/20"), vec![TokenKind::Geohash]);
    }

    #[test]
    fn operators_longest_match() {
        assert_eq!(
            kinds("a != b <> c <= d :: e := :f"),
            vec![
                TokenKind::Identifier,
                TokenKind::Neq,
                TokenKind::Identifier,
                TokenKind::Neq,
                TokenKind::Identifier,
                TokenKind::LtEq,
                TokenKind::Identifier,
                TokenKind::DoubleColon,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Variable,
            ]
        );
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let lexer = Lexer::new("a\n bb");
        let tokens: Vec<&Token> = lexer
            .tokens()
            .iter()
            .filter(|t| t.kind() == TokenKind::Identifier)
            .collect();
        assert_eq!((tokens[0].line(), tokens[0].column()), (1, 1));
        assert_eq!((tokens[1].line(), tokens[1].column()), (2, 2));
    }

    #[test]
    fn unknown_characters_become_error_tokens() {
        let lexer = Lexer::new("select ^ 1");
        assert!(lexer
            .tokens()
            .iter()
            .any(|t| t.kind() == TokenKind::Unknown));
        assert_eq!(lexer.errors().len(), 1);
    }
}
