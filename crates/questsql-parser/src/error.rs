use std::fmt;

/// An `Error` produced by the lexer or the parser.
///
/// Errors are accumulated and returned alongside the resulting syntax tree;
/// neither lexing nor parsing ever aborts. Check the tree's errors before
/// iterating its nodes.
#[derive(PartialEq, Eq, Clone)]
pub struct Error {
    pub(crate) message: String,
    pub(crate) data: String,
    pub(crate) index: usize,
    pub(crate) line: u32,
    pub(crate) column: u32,
}

impl Error {
    /// Create a new instance of `Error` at a source position.
    pub fn new<S: Into<String>>(
        message: S,
        data: String,
        index: usize,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            message: message.into(),
            data,
            index,
            line,
            column,
        }
    }

    /// An error at end of input.
    pub(crate) fn eof<S: Into<String>>(message: S, index: usize, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            data: "EOF".to_string(),
            index,
            line,
            column,
        }
    }

    /// The source slice this error refers to, usually the offending token.
    pub fn data(&self) -> &str {
        self.data.as_ref()
    }

    /// Byte offset where the error begins.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based line of the error.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-based column of the error.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// The error message.
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.index;
        let end = self.index + self.data.len();

        if self.data == "EOF" {
            write!(
                f,
                "ERROR@{}:{} {:?} {}",
                start, start, self.message, self.data
            )
        } else {
            write!(
                f,
                "ERROR@{}:{} {:?} {}",
                start, end, self.message, self.data
            )
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}
