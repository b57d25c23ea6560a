use crate::keyword::Keyword;
use std::fmt;

/// The kind of a lexed token.
///
/// Keywords carry their [`Keyword`] so the grammar can use a single keyword
/// as a terminal; all other variants are structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    /// Double-quoted, case-preserving identifier.
    QuotedIdentifier,
    /// Single-quoted string literal.
    String,
    Number,
    /// `1h`, `30d`, `2.5seconds` and friends.
    Duration,
    /// `#u33d8b12` or `#u33/20`.
    Geohash,
    /// Bind variable: `$1`, `:name` or `@name`.
    Variable,

    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Dot,      // .
    Semicolon, // ;
    Colon,     // :
    DoubleColon, // ::
    Assign,    // :=

    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %
    Concat,  // ||
    Eq,      // =
    Neq,     // != or <>
    Lt,      // <
    LtEq,    // <=
    Gt,      // >
    GtEq,    // >=
    Tilde,   // ~
    NotTilde, // !~

    Whitespace,
    LineComment,
    BlockComment,

    Eof,
    /// A character the lexer does not recognise; always paired with a lex
    /// error.
    Unknown,
}

impl TokenKind {
    /// The kind name surfaced by content assist, e.g. `"Identifier"`,
    /// `"Star"`, or the keyword name (`"By"`, `"Select"`).
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Keyword(kw) => kw.name(),
            TokenKind::Identifier => "Identifier",
            TokenKind::QuotedIdentifier => "QuotedIdentifier",
            TokenKind::String => "String",
            TokenKind::Number => "Number",
            TokenKind::Duration => "Duration",
            TokenKind::Geohash => "Geohash",
            TokenKind::Variable => "Variable",
            TokenKind::LParen => "LParen",
            TokenKind::RParen => "RParen",
            TokenKind::LBracket => "LBracket",
            TokenKind::RBracket => "RBracket",
            TokenKind::Comma => "Comma",
            TokenKind::Dot => "Dot",
            TokenKind::Semicolon => "Semicolon",
            TokenKind::Colon => "Colon",
            TokenKind::DoubleColon => "DoubleColon",
            TokenKind::Assign => "Assign",
            TokenKind::Plus => "Plus",
            TokenKind::Minus => "Minus",
            TokenKind::Star => "Star",
            TokenKind::Slash => "Slash",
            TokenKind::Percent => "Percent",
            TokenKind::Concat => "Concat",
            TokenKind::Eq => "Eq",
            TokenKind::Neq => "Neq",
            TokenKind::Lt => "LessThan",
            TokenKind::LtEq => "LessThanOrEqual",
            TokenKind::Gt => "GreaterThan",
            TokenKind::GtEq => "GreaterThanOrEqual",
            TokenKind::Tilde => "Tilde",
            TokenKind::NotTilde => "NotTilde",
            TokenKind::Whitespace => "Whitespace",
            TokenKind::LineComment => "LineComment",
            TokenKind::BlockComment => "BlockComment",
            TokenKind::Eof => "Eof",
            TokenKind::Unknown => "Unknown",
        }
    }

    /// Trivia is recorded in the CST but never consulted by the grammar.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }
}

/// A lexed token with its source position.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) text: String,
    pub(crate) index: usize,
    pub(crate) line: u32,
    pub(crate) column: u32,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, text: String, index: usize, line: u32, column: u32) -> Self {
        Self {
            kind,
            text,
            index,
            line,
            column,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The token's source slice.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of the token's first byte.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte offset one past the token's last byte.
    pub fn end(&self) -> usize {
        self.index + self.text.len()
    }

    /// 1-based line of the token's first byte.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-based column of the token's first byte.
    pub fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{} {:?}",
            self.kind.name(),
            self.index,
            self.end(),
            self.text
        )
    }
}
