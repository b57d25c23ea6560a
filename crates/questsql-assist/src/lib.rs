#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(future_incompatible, unreachable_pub, rust_2018_idioms)]

mod scope;

use indexmap::IndexMap;
use questsql_parser::completion;
use questsql_parser::grammar::is_ident_like;
use questsql_parser::{Lexer, Parser, Token, TokenKind};

/// A table visible at the cursor, with its alias when one was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInScope {
    pub table: String,
    pub alias: Option<String>,
}

/// A column a CTE projects, with its type when it is statically known
/// (currently: through an explicit cast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteColumn {
    pub name: String,
    pub data_type: Option<String>,
}

/// Everything the editor needs at one cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentAssist {
    /// Names of the token kinds that may legally come next.
    pub next_token_kinds: Vec<String>,
    pub tables_in_scope: Vec<TableInScope>,
    /// CTE name (lower-cased) to projected columns.
    pub cte_columns: IndexMap<String, Vec<CteColumn>>,
    /// When the cursor follows `<name>.`, the name before the dot.
    pub qualified_table_ref: Option<String>,
}

/// Compute content assist for `sql` at byte offset `cursor`.
///
/// The engine is stateless: everything is derived from the inputs, and
/// malformed input degrades to token-level analysis instead of failing.
///
/// ```rust
/// use questsql_assist::get_content_assist;
///
/// let sql = "SELECT  FROM trades WHERE symbol = 'BTC'";
/// let assist = get_content_assist(sql, 7);
/// assert_eq!(assist.tables_in_scope[0].table, "trades");
/// assert!(assist.next_token_kinds.iter().any(|k| k == "Star"));
/// ```
pub fn get_content_assist(sql: &str, cursor: usize) -> ContentAssist {
    let mut next_token_kinds: Vec<String> = Vec::new();
    for kind in completion::expected_at(sql, cursor) {
        let name = kind.name().to_string();
        if !next_token_kinds.contains(&name) {
            next_token_kinds.push(name);
        }
    }

    let tree = Parser::new(sql).parse();
    let mut tables_in_scope = scope::tables_at(&tree, cursor);
    let cte_columns = scope::cte_columns(&tree);

    let qualified_table_ref = qualified_ref(sql, cursor);
    if let Some(name) = &qualified_table_ref {
        // Autocomplete without FROM: `tab.` alone still names a table.
        if tables_in_scope.is_empty() {
            tables_in_scope.push(TableInScope {
                table: name.clone(),
                alias: None,
            });
        }
    }

    ContentAssist {
        next_token_kinds,
        tables_in_scope,
        cte_columns,
        qualified_table_ref,
    }
}

/// Token-kind names valid at end of input.
pub fn get_next_valid_tokens(sql: &str) -> Vec<String> {
    completion::expected_names(sql)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Whether a token of the named kind may come next at end of input.
pub fn is_token_expected(sql: &str, kind_name: &str) -> bool {
    completion::expected_names(sql)
        .iter()
        .any(|name| name.eq_ignore_ascii_case(kind_name))
}

/// The identifier before a trailing `.`, if the cursor sits right after one.
fn qualified_ref(sql: &str, cursor: usize) -> Option<String> {
    let (tokens, _) = Lexer::new(sql).into_parts();
    let prefix: Vec<Token> = tokens
        .into_iter()
        .filter(|t| !t.kind().is_trivia() && t.kind() != TokenKind::Eof && t.end() <= cursor)
        .collect();
    let [.., name, dot] = prefix.as_slice() else {
        return None;
    };
    if dot.kind() != TokenKind::Dot || !is_ident_like(name.kind()) {
        return None;
    }
    Some(match name.kind() {
        TokenKind::QuotedIdentifier => {
            let text = name.text();
            let inner = text.strip_prefix('"').unwrap_or(text);
            let inner = inner.strip_suffix('"').unwrap_or(inner);
            inner.replace("\"\"", "\"")
        }
        _ => name.text().to_string(),
    })
}
