use questsql_parser::is_reserved;
use std::fmt;

/// A possibly-qualified name: `trades`, `telemetry.trades`, `t.*`.
///
/// Parts are stored unquoted; quoting is re-applied on output only where
/// needed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QualifiedName {
    pub parts: Vec<String>,
}

impl QualifiedName {
    pub fn new(parts: Vec<String>) -> Self {
        Self { parts }
    }

    pub fn single(part: impl Into<String>) -> Self {
        Self {
            parts: vec![part.into()],
        }
    }

    /// The last part of the name; what a table reference resolves to when
    /// schema-qualified.
    pub fn last(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or("")
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            if part == "*" {
                write!(f, "*")?;
            } else {
                write_ident(f, part)?;
            }
        }
        Ok(())
    }
}

/// Emit an identifier, quoting it when it is not a bare word or collides
/// with a reserved word. Quoted form is single-quoted with `'` doubled.
pub(crate) fn write_ident(f: &mut fmt::Formatter<'_>, ident: &str) -> fmt::Result {
    if is_bare(ident) && !is_reserved(ident) {
        f.write_str(ident)
    } else {
        write!(f, "'{}'", ident.replace('\'', "''"))
    }
}

/// Emit a string literal: single quotes, `'` doubled.
pub(crate) fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    write!(f, "'{}'", value.replace('\'', "''"))
}

fn is_bare(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A display adapter for identifiers held as plain strings.
pub(crate) struct Ident<'a>(pub &'a str);

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ident(f, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_stay_bare() {
        assert_eq!(QualifiedName::single("trades").to_string(), "trades");
        assert_eq!(
            QualifiedName::new(vec!["telemetry".into(), "trades".into()]).to_string(),
            "telemetry.trades"
        );
    }

    #[test]
    fn reserved_and_spaced_names_are_quoted() {
        assert_eq!(QualifiedName::single("select").to_string(), "'select'");
        assert_eq!(QualifiedName::single("my table").to_string(), "'my table'");
        assert_eq!(QualifiedName::single("it's").to_string(), "'it''s'");
        // Identifier-keywords stay bare.
        assert_eq!(QualifiedName::single("wal").to_string(), "wal");
    }

    #[test]
    fn qualified_star() {
        assert_eq!(
            QualifiedName::new(vec!["t".into(), "*".into()]).to_string(),
            "t.*"
        );
    }
}
