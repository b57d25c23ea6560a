//! Table and CTE visibility at a cursor position.
//!
//! Scope is read off the concrete syntax tree so it keeps working on the
//! partial trees error recovery produces. Only when the tree walk yields
//! nothing does the token-level scanner take over.

use crate::{CteColumn, TableInScope};
use indexmap::IndexMap;
use questsql_parser::grammar::is_ident_like;
use questsql_parser::{Keyword, SyntaxNode, SyntaxTree, Token, TokenKind};

/// Tables visible at `offset`: the FROM/JOIN references of the nearest
/// enclosing select plus the CTE names declared above it.
pub(crate) fn tables_at(tree: &SyntaxTree, offset: usize) -> Vec<TableInScope> {
    let mut tables = Vec::new();

    let mut path = Vec::new();
    if find_path(tree.root(), offset, &mut path) {
        // The innermost select core on the path owns the FROM chain.
        if let Some(core) = path
            .iter()
            .rev()
            .find(|node| matches!(node.rule(), "selectBody" | "implicitSelect"))
        {
            if let Some(from) = core.node("fromClause") {
                collect_from_clause(from, &mut tables);
            }
        }
        // Every WITH list on the path contributes its CTE names as
        // synthetic tables.
        for node in &path {
            if let Some(with) = node.node("withClause") {
                for cte in with.nodes_named("cte") {
                    if let Some(name) = first_ident_text(cte) {
                        push_unique(
                            &mut tables,
                            TableInScope {
                                table: name,
                                alias: None,
                            },
                        );
                    }
                }
            }
        }
    }

    if tables.is_empty() {
        tables = scan_tokens(tree);
    }
    tables
}

/// Walk to the deepest node containing `offset`, recording the node path.
fn find_path<'a>(node: &'a SyntaxNode, offset: usize, path: &mut Vec<&'a SyntaxNode>) -> bool {
    if !node.contains(offset) && node.rule() != "statementList" {
        return false;
    }
    path.push(node);
    for child in node.nodes() {
        if child.contains(offset) && find_path(child, offset, path) {
            return true;
        }
    }
    true
}

fn collect_from_clause(from: &SyntaxNode, tables: &mut Vec<TableInScope>) {
    for table_ref in from.nodes_named("tableRef") {
        let alias = alias_text(table_ref);
        if let Some(table) = source_name(table_ref) {
            push_unique(
                tables,
                TableInScope {
                    table,
                    alias: alias.clone(),
                },
            );
        } else if let Some(alias) = alias {
            // Subqueries are visible through their alias only.
            push_unique(
                tables,
                TableInScope {
                    table: alias,
                    alias: None,
                },
            );
        }
        for join in table_ref.nodes_named("joinClause") {
            let alias = alias_text(join);
            if let Some(table) = source_name(join) {
                push_unique(tables, TableInScope { table, alias });
            } else if let Some(alias) = alias {
                push_unique(
                    tables,
                    TableInScope {
                        table: alias,
                        alias: None,
                    },
                );
            }
        }
    }
}

/// The resolvable name of a table source: the last part of a qualified
/// name, or a table function's name.
fn source_name(parent: &SyntaxNode) -> Option<String> {
    let source = parent.node("tableSource")?;
    if let Some(name) = source.node("qualifiedName") {
        return name
            .tokens()
            .filter(|t| is_ident_like(t.kind()))
            .last()
            .map(ident_text);
    }
    if let Some(call) = source.node("functionCall") {
        return first_ident_text(call);
    }
    None
}

fn alias_text(node: &SyntaxNode) -> Option<String> {
    node.node("aliasClause").and_then(first_ident_text)
}

fn first_ident_text(node: &SyntaxNode) -> Option<String> {
    node.tokens()
        .find(|t| is_ident_like(t.kind()))
        .map(ident_text)
}

fn push_unique(tables: &mut Vec<TableInScope>, entry: TableInScope) {
    if !tables.iter().any(|t| t.table == entry.table && t.alias == entry.alias) {
        tables.push(entry);
    }
}

/// Token-level fallback: recognise `FROM <name> [<alias>]` and
/// `JOIN <name> [<alias>]` even when nothing parsed.
fn scan_tokens(tree: &SyntaxTree) -> Vec<TableInScope> {
    let tokens = flatten_tokens(tree.root());
    let mut tables = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let kind = tokens[i].kind();
        let is_anchor = matches!(
            kind,
            TokenKind::Keyword(Keyword::From) | TokenKind::Keyword(Keyword::Join)
        );
        if !is_anchor {
            i += 1;
            continue;
        }
        i += 1;
        // Qualified name: schema-qualified forms resolve to the last part.
        let mut last_part: Option<String> = None;
        while i < tokens.len() && is_ident_like(tokens[i].kind()) {
            last_part = Some(ident_text(tokens[i]));
            if i + 1 < tokens.len() && tokens[i + 1].kind() == TokenKind::Dot {
                i += 2;
            } else {
                i += 1;
                break;
            }
        }
        let Some(table) = last_part else { continue };
        let alias = if i < tokens.len() && is_ident_like(tokens[i].kind()) {
            let alias = ident_text(tokens[i]);
            i += 1;
            Some(alias)
        } else {
            None
        };
        push_unique(&mut tables, TableInScope { table, alias });
    }
    tables
}

fn flatten_tokens<'a>(node: &'a SyntaxNode) -> Vec<&'a Token> {
    let mut out = Vec::new();
    collect_tokens(node, &mut out);
    out
}

fn collect_tokens<'a>(node: &'a SyntaxNode, out: &mut Vec<&'a Token>) {
    for child in node.children() {
        match child {
            questsql_parser::SyntaxElement::Token(token) => {
                if !token.kind().is_trivia() && token.kind() != TokenKind::Eof {
                    out.push(token);
                }
            }
            questsql_parser::SyntaxElement::Node(inner) => collect_tokens(inner, out),
        }
    }
}

/// Project every parseable CTE's select list to column descriptors. Keys
/// are lower-cased; lookups are case-insensitive by construction.
pub(crate) fn cte_columns(tree: &SyntaxTree) -> IndexMap<String, Vec<CteColumn>> {
    let mut out = IndexMap::new();
    collect_ctes(tree.root(), &mut out);
    out
}

fn collect_ctes(node: &SyntaxNode, out: &mut IndexMap<String, Vec<CteColumn>>) {
    if node.rule() == "cte" {
        if let (Some(name), Some(select)) = (first_ident_text(node), node.node("selectStatement"))
        {
            let columns = project_columns(select);
            out.insert(name.to_ascii_lowercase(), columns);
        }
    }
    for child in node.nodes() {
        collect_ctes(child, out);
    }
}

fn project_columns(select: &SyntaxNode) -> Vec<CteColumn> {
    let Some(body) = select.node("selectBody") else {
        return Vec::new();
    };
    let Some(columns) = body.node("selectColumns") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for column in columns.nodes_named("selectColumn") {
        if let Some(alias) = alias_text(column) {
            out.push(CteColumn {
                name: alias,
                data_type: column_type(column),
            });
            continue;
        }
        let Some(expr) = column.node("expr") else {
            continue;
        };
        match projected_name(expr) {
            Some(name) => out.push(CteColumn {
                name,
                data_type: column_type(column),
            }),
            // Literal-only items carry no name.
            None => {}
        }
    }
    out
}

/// Drill through the single-child precedence chain to the primary below.
fn primary_of(expr: &SyntaxNode) -> Option<&SyntaxNode> {
    let mut node = expr;
    loop {
        if node.rule() == "primaryExpr" {
            return Some(node);
        }
        let mut children = node.nodes();
        let first = children.next()?;
        // Composite expressions (binary chains, postfix tails) have no
        // single projected name.
        if children.next().is_some() && node.rule() != "postfixExpr" {
            return None;
        }
        node = first;
    }
}

fn projected_name(expr: &SyntaxNode) -> Option<String> {
    let primary = primary_of(expr)?;
    if let Some(name) = primary.node("qualifiedName") {
        return name
            .tokens()
            .filter(|t| is_ident_like(t.kind()))
            .last()
            .map(ident_text);
    }
    if let Some(call) = primary.node("functionCall") {
        return first_ident_text(call);
    }
    if let Some(cast) = primary.node("castExpr") {
        return cast.node("expr").and_then(projected_name);
    }
    None
}

/// A cast's target type, when the column projects through one.
fn column_type(column: &SyntaxNode) -> Option<String> {
    let expr = column.node("expr")?;
    let primary = primary_of(expr)?;
    let cast = primary.node("castExpr")?;
    let type_name = cast.node("typeName")?;
    type_name.tokens().next().map(|t| t.text().to_string())
}

fn ident_text(token: &Token) -> String {
    match token.kind() {
        TokenKind::QuotedIdentifier => {
            let text = token.text();
            let inner = text.strip_prefix('"').unwrap_or(text);
            let inner = inner.strip_suffix('"').unwrap_or(inner);
            inner.replace("\"\"", "\"")
        }
        _ => token.text().to_string(),
    }
}
