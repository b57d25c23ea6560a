#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(future_incompatible, unreachable_pub, rust_2018_idioms)]

mod acl;
mod alter;
mod create;
mod expr;
mod from_parser;
mod insert;
mod name;
mod ops;
mod select;
mod statement;

pub use acl::{
    AddUser, AlterServiceAccount, AlterUser, CreateGroup, CreateServiceAccount, CreateUser,
    DropPrincipal, Grant, GrantAssume, GrantTarget, PasswordSpec, PermissionTarget, PrincipalKind,
    RemoveUser, Revoke, RevokeAssume, UserAction,
};
pub use alter::{
    AlterColumnAction, AlterMaterializedView, AlterTable, AlterTableAction, AlterView, DropTable,
    DropView, MatViewAction, PartitionSelector, RefreshMaterializedView, RefreshRange,
    ReindexTable, RenameTable, ResumeFrom, SetRefreshMode, TruncateTable, TxnSpelling,
    VacuumTable,
};
pub use create::{
    CastDef, ColumnDef, CreateMaterializedView, CreateTable, CreateTableSource, CreateView,
    IndexDef, RefreshSpec, Ttl, WithParam,
};
pub use expr::{
    CaseExpression, Expression, FrameBound, FrameExclusion, FrameUnits, FunctionCall, Literal,
    LiteralKind, Subscript, WhenClause, WindowFrame, WindowSpec,
};
pub use from_parser::FromError;
pub use insert::{InsertStatement, SetAssignment, UpdateStatement};
pub use name::QualifiedName;
pub use ops::{
    Backup, CancelQuery, Checkpoint, CompileView, CopyCancel, CopyFrom, CopyOption, CopyTo, Show,
    Snapshot,
};
pub use select::{
    AlignMode, AlignTo, CommonTableExpression, DeclareItem, Direction, Join, JoinKind, LatestOn,
    Limit, OrderByItem, Pivot, PivotAggregate, PivotItem, Prevailing, RangeBound, SampleBy,
    SelectColumn, SelectStatement, SetOpKind, SetOperation, TableRef, TableSource,
};
pub use statement::Statement;

use questsql_parser::Parser;
use thiserror::Error;

/// A positioned error surfaced by [`parse_to_ast`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

/// The result of [`parse_to_ast`]: always returned, never thrown. When
/// `errors` is non-empty the AST holds whatever could still be built.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub ast: Vec<Statement>,
    pub errors: Vec<ParseError>,
}

/// Contract-level failures of [`parse_statements`] and [`parse_one`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{message} at {line}:{column}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },
    #[error("expected exactly one statement, found {0}")]
    ExpectedOneStatement(usize),
}

/// Parse `sql` into typed statements, accumulating errors instead of
/// failing.
///
/// ```rust
/// use questsql_encoder::parse_to_ast;
///
/// let result = parse_to_ast("SELECT * FROM trades");
/// assert!(result.errors.is_empty());
/// assert_eq!(result.ast.len(), 1);
/// ```
pub fn parse_to_ast(sql: &str) -> ParseResult {
    let tree = Parser::new(sql).parse();
    let (ast, failures) = from_parser::tree_to_statements(&tree);
    let mut errors: Vec<ParseError> = tree
        .errors()
        .iter()
        .map(|err| ParseError {
            message: err.message().to_string(),
            line: Some(err.line()),
            column: Some(err.column()),
        })
        .collect();
    // Conversion failures on an otherwise clean parse are real problems;
    // under parse errors they are expected fallout of recovery and the
    // partial AST already tells the story.
    if errors.is_empty() {
        for failure in failures {
            errors.push(ParseError {
                message: failure.to_string(),
                line: None,
                column: None,
            });
        }
    }
    ParseResult { ast, errors }
}

/// Parse `sql`, failing on the first error.
pub fn parse_statements(sql: &str) -> Result<Vec<Statement>, ApiError> {
    let result = parse_to_ast(sql);
    match result.errors.into_iter().next() {
        None => Ok(result.ast),
        Some(error) => Err(ApiError::Parse {
            message: error.message,
            line: error.line.unwrap_or(0),
            column: error.column.unwrap_or(0),
        }),
    }
}

/// Parse exactly one statement.
pub fn parse_one(sql: &str) -> Result<Statement, ApiError> {
    let mut statements = parse_statements(sql)?;
    if statements.len() != 1 {
        return Err(ApiError::ExpectedOneStatement(statements.len()));
    }
    Ok(statements.remove(0))
}

/// Serialize statements back to SQL, joined with `;\n`.
pub fn to_sql(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(Statement::to_string)
        .collect::<Vec<_>>()
        .join(";\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_one_rejects_statement_lists() {
        assert!(parse_one("SELECT 1").is_ok());
        assert_eq!(
            parse_one("SELECT 1; SELECT 2"),
            Err(ApiError::ExpectedOneStatement(2))
        );
    }

    #[test]
    fn parse_statements_surfaces_positions() {
        let err = parse_statements("SELECT FROM ^").unwrap_err();
        match err {
            ApiError::Parse { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn to_sql_joins_with_semicolons() {
        let statements = parse_statements("SELECT 1; SELECT 2").unwrap();
        assert_eq!(to_sql(&statements), "SELECT 1;\nSELECT 2");
    }
}
