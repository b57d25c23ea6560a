//! CST → AST conversion.
//!
//! Each function folds one grammar rule's node into its typed counterpart.
//! Conversions are total over well-formed trees and fail with a [`FromError`]
//! on trees left partial by error recovery; callers isolate those failures
//! per statement.

use crate::acl::*;
use crate::alter::*;
use crate::create::*;
use crate::expr::*;
use crate::insert::*;
use crate::name::QualifiedName;
use crate::ops::*;
use crate::select::*;
use crate::statement::Statement;
use questsql_parser::grammar::is_ident_like;
use questsql_parser::{Keyword, SyntaxElement, SyntaxNode, SyntaxTree, Token, TokenKind};
use thiserror::Error;

/// Errors raised while folding a parse tree into the typed AST.
///
/// These surface when the tree is partial (error recovery dropped an
/// expected child). Check the parse errors before converting if you need
/// granular positions.
#[derive(Debug, Clone, Error)]
pub enum FromError {
    #[error("parse tree is missing a `{0}` node")]
    MissingNode(&'static str),
    #[error("parse tree is missing a token in `{0}`")]
    MissingToken(&'static str),
    #[error("unrecognised `{0}` shape in parse tree")]
    Unrecognised(&'static str),
}

/// Convert every statement in the tree, collecting per-statement failures.
pub(crate) fn tree_to_statements(tree: &SyntaxTree) -> (Vec<Statement>, Vec<FromError>) {
    let mut statements = Vec::new();
    let mut failures = Vec::new();
    for node in tree.statements() {
        match statement(node) {
            Ok(stmt) => statements.push(stmt),
            Err(err) => failures.push(err),
        }
    }
    (statements, failures)
}

pub(crate) fn statement(node: &SyntaxNode) -> Result<Statement, FromError> {
    let inner = node
        .nodes()
        .next()
        .ok_or(FromError::MissingNode("statement"))?;
    Ok(match inner.rule() {
        "selectStatement" => Statement::Select(Box::new(select_statement(inner)?)),
        "withStatement" => with_statement(inner)?,
        "insertStatement" => Statement::Insert(Box::new(insert_statement(inner)?)),
        "updateStatement" => Statement::Update(Box::new(update_statement(inner)?)),
        "createTableStatement" => Statement::CreateTable(Box::new(create_table(inner)?)),
        "createViewStatement" => Statement::CreateView(Box::new(create_view(inner)?)),
        "createMatViewStatement" => {
            Statement::CreateMaterializedView(Box::new(create_mat_view(inner)?))
        }
        "alterTableStatement" => Statement::AlterTable(Box::new(alter_table(inner)?)),
        "alterViewStatement" => Statement::AlterView(alter_view(inner)?),
        "alterMatViewStatement" => {
            Statement::AlterMaterializedView(Box::new(alter_mat_view(inner)?))
        }
        "dropTableStatement" => Statement::DropTable(drop_table(inner)?),
        "dropViewStatement" => Statement::DropView(drop_view(inner, false)?),
        "dropMatViewStatement" => Statement::DropView(drop_view(inner, true)?),
        "refreshMatViewStatement" => {
            Statement::RefreshMaterializedView(refresh_mat_view(inner)?)
        }
        "truncateTableStatement" => Statement::TruncateTable(TruncateTable {
            table: req_qualified_name(inner)?,
        }),
        "renameTableStatement" => {
            let mut names = inner.nodes_named("qualifiedName");
            let table = qualified_name(
                names
                    .next()
                    .ok_or(FromError::MissingNode("qualifiedName"))?,
            );
            let to = qualified_name(
                names
                    .next()
                    .ok_or(FromError::MissingNode("qualifiedName"))?,
            );
            Statement::RenameTable(RenameTable { table, to })
        }
        "vacuumTableStatement" => Statement::VacuumTable(VacuumTable {
            table: req_qualified_name(inner)?,
        }),
        "reindexTableStatement" => Statement::ReindexTable(ReindexTable {
            table: req_qualified_name(inner)?,
            column: token_after(inner, Keyword::Column).map(ident_text),
            partition: token_after(inner, Keyword::Partition).map(string_content),
        }),
        "showStatement" => Statement::Show(show(inner)?),
        "explainStatement" => {
            let target = inner
                .node("statement")
                .ok_or(FromError::MissingNode("statement"))?;
            Statement::Explain(Box::new(statement(target)?))
        }
        "copyStatement" => copy_statement(inner)?,
        "cancelQueryStatement" => {
            let id = inner
                .tokens()
                .find(|t| matches!(t.kind(), TokenKind::Number | TokenKind::String))
                .ok_or(FromError::MissingToken("cancelQueryStatement"))?;
            Statement::CancelQuery(CancelQuery {
                id: id.text().to_string(),
            })
        }
        "checkpointStatement" => Statement::Checkpoint(if inner.has_keyword(Keyword::Create) {
            Checkpoint::Create
        } else {
            Checkpoint::Release
        }),
        "snapshotStatement" => Statement::Snapshot(if inner.has_keyword(Keyword::Prepare) {
            Snapshot::Prepare
        } else {
            Snapshot::Complete
        }),
        "backupStatement" => Statement::Backup(if inner.has_keyword(Keyword::Database) {
            Backup::Database
        } else {
            Backup::Tables(inner.nodes_named("qualifiedName").map(qualified_name).collect())
        }),
        "compileViewStatement" => Statement::CompileView(CompileView {
            materialized: inner.has_keyword(Keyword::Materialized),
            view: req_qualified_name(inner)?,
        }),
        "createUserStatement" => Statement::CreateUser(CreateUser {
            if_not_exists: inner.node("ifNotExists").is_some(),
            name: token_after(inner, Keyword::User)
                .map(ident_text)
                .ok_or(FromError::MissingToken("createUserStatement"))?,
            password: inner.node("passwordSpec").map(password_spec),
        }),
        "createGroupStatement" => Statement::CreateGroup(CreateGroup {
            if_not_exists: inner.node("ifNotExists").is_some(),
            name: token_after(inner, Keyword::Group)
                .map(ident_text)
                .ok_or(FromError::MissingToken("createGroupStatement"))?,
        }),
        "createServiceAccountStatement" => {
            Statement::CreateServiceAccount(CreateServiceAccount {
                if_not_exists: inner.node("ifNotExists").is_some(),
                name: token_after(inner, Keyword::Account)
                    .map(ident_text)
                    .ok_or(FromError::MissingToken("createServiceAccountStatement"))?,
                owned_by: owned_by(inner),
            })
        }
        "alterUserStatement" => Statement::AlterUser(AlterUser {
            name: token_after(inner, Keyword::User)
                .map(ident_text)
                .ok_or(FromError::MissingToken("alterUserStatement"))?,
            action: user_action(inner)?,
        }),
        "alterServiceAccountStatement" => Statement::AlterServiceAccount(AlterServiceAccount {
            name: token_after(inner, Keyword::Account)
                .map(ident_text)
                .ok_or(FromError::MissingToken("alterServiceAccountStatement"))?,
            action: user_action(inner)?,
        }),
        "dropUserStatement" => Statement::DropPrincipal(drop_principal(
            inner,
            PrincipalKind::User,
            Keyword::User,
        )?),
        "dropGroupStatement" => Statement::DropPrincipal(drop_principal(
            inner,
            PrincipalKind::Group,
            Keyword::Group,
        )?),
        "dropServiceAccountStatement" => Statement::DropPrincipal(drop_principal(
            inner,
            PrincipalKind::ServiceAccount,
            Keyword::Account,
        )?),
        "addUserStatement" => Statement::AddUser(AddUser {
            user: token_after(inner, Keyword::User)
                .map(ident_text)
                .ok_or(FromError::MissingToken("addUserStatement"))?,
            groups: idents_after(inner, Keyword::To),
        }),
        "removeUserStatement" => Statement::RemoveUser(RemoveUser {
            user: token_after(inner, Keyword::User)
                .map(ident_text)
                .ok_or(FromError::MissingToken("removeUserStatement"))?,
            groups: idents_after(inner, Keyword::From),
        }),
        "assumeServiceAccountStatement" => Statement::AssumeServiceAccount(
            token_after(inner, Keyword::Account)
                .map(ident_text)
                .ok_or(FromError::MissingToken("assumeServiceAccountStatement"))?,
        ),
        "exitServiceAccountStatement" => {
            Statement::ExitServiceAccount(token_after(inner, Keyword::Account).map(ident_text))
        }
        "grantStatement" => Statement::Grant(Grant {
            permissions: permissions(inner),
            on: grant_target(inner)?,
            to: token_after(inner, Keyword::To)
                .map(ident_text)
                .ok_or(FromError::MissingToken("grantStatement"))?,
            with_grant_option: inner.node("grantOption").is_some(),
        }),
        "revokeStatement" => Statement::Revoke(Revoke {
            permissions: permissions(inner),
            on: grant_target(inner)?,
            from: token_after(inner, Keyword::From)
                .map(ident_text)
                .ok_or(FromError::MissingToken("revokeStatement"))?,
        }),
        "grantAssumeStatement" => Statement::GrantAssume(GrantAssume {
            service_account: token_after(inner, Keyword::Account)
                .map(ident_text)
                .ok_or(FromError::MissingToken("grantAssumeStatement"))?,
            to: token_after(inner, Keyword::To)
                .map(ident_text)
                .ok_or(FromError::MissingToken("grantAssumeStatement"))?,
            with_grant_option: inner.node("grantOption").is_some(),
        }),
        "revokeAssumeStatement" => Statement::RevokeAssume(RevokeAssume {
            service_account: token_after(inner, Keyword::Account)
                .map(ident_text)
                .ok_or(FromError::MissingToken("revokeAssumeStatement"))?,
            from: token_after(inner, Keyword::From)
                .map(ident_text)
                .ok_or(FromError::MissingToken("revokeAssumeStatement"))?,
        }),
        other => return Err(FromError::Unrecognised(other)),
    })
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub(crate) fn select_statement(node: &SyntaxNode) -> Result<SelectStatement, FromError> {
    let core = node
        .node("selectBody")
        .or_else(|| node.node("implicitSelect"))
        .ok_or(FromError::MissingNode("selectBody"))?;
    let mut select = select_core(core)?;

    if let Some(declare) = node.node("declareClause") {
        for item in declare.nodes_named("declareItem") {
            let variable = item
                .token(TokenKind::Variable)
                .ok_or(FromError::MissingToken("declareItem"))?
                .text()
                .to_string();
            let value = expr(req(item, "expr")?)?;
            select.declare.push(DeclareItem { variable, value });
        }
    }
    if let Some(with) = node.node("withClause") {
        select.with = ctes(with)?;
    }
    for tail in node.nodes_named("setOpTail") {
        let kind = if tail.has_keyword(Keyword::Union) {
            SetOpKind::Union
        } else if tail.has_keyword(Keyword::Except) {
            SetOpKind::Except
        } else {
            SetOpKind::Intersect
        };
        let core = tail
            .node("selectBody")
            .or_else(|| tail.node("implicitSelect"))
            .ok_or(FromError::MissingNode("setOpTail"))?;
        select.set_ops.push(SetOperation {
            kind,
            all: tail.has_keyword(Keyword::All),
            select: Box::new(select_core(core)?),
        });
    }
    Ok(select)
}

fn ctes(node: &SyntaxNode) -> Result<Vec<CommonTableExpression>, FromError> {
    let mut out = Vec::new();
    for cte in node.nodes_named("cte") {
        let name = first_ident(cte).ok_or(FromError::MissingToken("cte"))?;
        let select = select_statement(req(cte, "selectStatement")?)?;
        out.push(CommonTableExpression {
            name,
            select: Box::new(select),
        });
    }
    Ok(out)
}

/// Fold a `selectBody` or `implicitSelect` node.
fn select_core(node: &SyntaxNode) -> Result<SelectStatement, FromError> {
    let mut select = SelectStatement::default();
    match node.rule() {
        "selectBody" => {
            select.distinct = node.has_keyword(Keyword::Distinct);
            let columns = req(node, "selectColumns")?;
            for column in columns.nodes_named("selectColumn") {
                select.columns.push(select_column(column)?);
            }
            if let Some(from) = node.node("fromClause") {
                select.from = table_refs(from)?;
            }
        }
        "implicitSelect" => {
            select.implicit = true;
            select.from = table_refs(req(node, "fromClause")?)?;
        }
        other => return Err(FromError::Unrecognised(other)),
    }
    if let Some(tail) = node.node("queryTail") {
        apply_query_tail(&mut select, tail)?;
    }
    Ok(select)
}

fn select_column(node: &SyntaxNode) -> Result<SelectColumn, FromError> {
    if node.token(TokenKind::Star).is_some() && node.node("expr").is_none() {
        return Ok(SelectColumn {
            expr: Expression::Column(QualifiedName::single("*")),
            alias: None,
        });
    }
    Ok(SelectColumn {
        expr: expr(req(node, "expr")?)?,
        alias: alias_of(node),
    })
}

fn alias_of(node: &SyntaxNode) -> Option<String> {
    node.node("aliasClause").and_then(first_ident)
}

fn table_refs(node: &SyntaxNode) -> Result<Vec<TableRef>, FromError> {
    let mut out = Vec::new();
    for table_ref in node.nodes_named("tableRef") {
        let source = table_source(req(table_ref, "tableSource")?)?;
        let mut joins = Vec::new();
        for join in table_ref.nodes_named("joinClause") {
            joins.push(join_clause(join)?);
        }
        out.push(TableRef {
            source,
            alias: alias_of(table_ref),
            joins,
        });
    }
    Ok(out)
}

fn table_source(node: &SyntaxNode) -> Result<TableSource, FromError> {
    let inner = node
        .nodes()
        .next()
        .ok_or(FromError::MissingNode("tableSource"))?;
    Ok(match inner.rule() {
        "functionCall" => TableSource::Function(function_call(inner)?),
        "qualifiedName" => TableSource::Name(qualified_name(inner)),
        "subquery" => TableSource::Subquery(Box::new(select_statement(req(
            inner,
            "selectStatement",
        )?)?)),
        other => return Err(FromError::Unrecognised(other)),
    })
}

fn join_clause(node: &SyntaxNode) -> Result<Join, FromError> {
    let (kind, outer) = match node.node("joinKind") {
        None => (JoinKind::Plain, false),
        Some(kind_node) => {
            let outer = kind_node.has_keyword(Keyword::Outer);
            let kind = if kind_node.has_keyword(Keyword::Inner) {
                JoinKind::Inner
            } else if kind_node.has_keyword(Keyword::Left) {
                JoinKind::Left
            } else if kind_node.has_keyword(Keyword::Cross) {
                JoinKind::Cross
            } else if kind_node.has_keyword(Keyword::Asof) {
                JoinKind::Asof
            } else if kind_node.has_keyword(Keyword::Lt) {
                JoinKind::Lt
            } else if kind_node.has_keyword(Keyword::Splice) {
                JoinKind::Splice
            } else {
                JoinKind::Window
            };
            (kind, outer)
        }
    };
    let source = table_source(req(node, "tableSource")?)?;
    let on = match node.node("expr") {
        Some(on) => Some(expr(on)?),
        None => None,
    };
    let tolerance = if node.has_keyword(Keyword::Tolerance) {
        node.tokens()
            .find(|t| matches!(t.kind(), TokenKind::Duration | TokenKind::String))
            .map(|t| t.text().to_string())
    } else {
        None
    };
    let range = match node.node("joinRange") {
        None => None,
        Some(range) => {
            let mut bounds = range.nodes_named("rangeBound");
            let start = range_bound(
                bounds.next().ok_or(FromError::MissingNode("rangeBound"))?,
            )?;
            let end = range_bound(
                bounds.next().ok_or(FromError::MissingNode("rangeBound"))?,
            )?;
            Some((start, end))
        }
    };
    let prevailing = node.node("joinPrevailing").map(|p| {
        if p.has_keyword(Keyword::Include) {
            Prevailing::Include
        } else {
            Prevailing::Exclude
        }
    });
    Ok(Join {
        kind,
        outer,
        source,
        alias: alias_of(node),
        on,
        tolerance,
        range,
        prevailing,
    })
}

fn range_bound(node: &SyntaxNode) -> Result<RangeBound, FromError> {
    if node.has_keyword(Keyword::Unbounded) {
        return Ok(RangeBound::UnboundedPreceding);
    }
    if node.has_keyword(Keyword::Current) {
        return Ok(RangeBound::CurrentRow);
    }
    let bound = node
        .tokens()
        .find(|t| {
            matches!(
                t.kind(),
                TokenKind::Duration | TokenKind::Number | TokenKind::String
            )
        })
        .ok_or(FromError::MissingToken("rangeBound"))?
        .text()
        .to_string();
    if node.has_keyword(Keyword::Following) {
        Ok(RangeBound::Following(bound))
    } else {
        Ok(RangeBound::Preceding(bound))
    }
}

fn apply_query_tail(select: &mut SelectStatement, tail: &SyntaxNode) -> Result<(), FromError> {
    if let Some(where_clause) = tail.node("whereClause") {
        select.where_clause = Some(expr(req(where_clause, "expr")?)?);
    }
    if let Some(latest) = tail.node("latestOnClause") {
        let mut names = latest.nodes_named("qualifiedName");
        let timestamp = qualified_name(
            names
                .next()
                .ok_or(FromError::MissingNode("qualifiedName"))?,
        );
        select.latest_on = Some(LatestOn {
            timestamp,
            partition_by: names.map(qualified_name).collect(),
        });
    }
    if let Some(sample) = tail.node("sampleByClause") {
        select.sample_by = Some(sample_by(sample)?);
    }
    if let Some(group) = tail.node("groupByClause") {
        for e in group.nodes_named("expr") {
            select.group_by.push(expr(e)?);
        }
    }
    if let Some(pivot) = tail.node("pivotClause") {
        select.pivot = Some(pivot_clause(pivot)?);
    }
    if let Some(order) = tail.node("orderByClause") {
        select.order_by = order_by(order)?;
    }
    if let Some(limit) = tail.node("limitClause") {
        let mut exprs = limit.nodes_named("expr");
        let lower_bound = expr(exprs.next().ok_or(FromError::MissingNode("expr"))?)?;
        let upper_bound = match exprs.next() {
            Some(upper) => Some(expr(upper)?),
            None => None,
        };
        select.limit = Some(Limit {
            lower_bound,
            upper_bound,
        });
    }
    Ok(())
}

fn sample_by(node: &SyntaxNode) -> Result<SampleBy, FromError> {
    let duration = node
        .tokens()
        .find(|t| {
            matches!(
                t.kind(),
                TokenKind::Duration | TokenKind::Number | TokenKind::String
            )
        })
        .ok_or(FromError::MissingToken("sampleByClause"))?
        .text()
        .to_string();

    // FROM and TO both carry a bare expression; walk children in order to
    // know which is which.
    let mut from = None;
    let mut to = None;
    let mut slot: Option<Keyword> = None;
    for child in node.children() {
        match child {
            SyntaxElement::Token(token) => match token.kind() {
                TokenKind::Keyword(Keyword::From) => slot = Some(Keyword::From),
                TokenKind::Keyword(Keyword::To) => slot = Some(Keyword::To),
                _ => {}
            },
            SyntaxElement::Node(inner) if inner.rule() == "expr" => match slot {
                Some(Keyword::From) => from = Some(expr(inner)?),
                Some(Keyword::To) => to = Some(expr(inner)?),
                _ => {}
            },
            SyntaxElement::Node(_) => {}
        }
    }

    let fill = match node.node("fillClause") {
        None => Vec::new(),
        Some(fill) => fill
            .nodes_named("fillValue")
            .map(|value| {
                value
                    .tokens()
                    .map(|t| t.text().to_string())
                    .collect::<Vec<_>>()
                    .concat()
            })
            .collect(),
    };

    let align_to = node.node("alignToClause").map(|align| {
        let mode = if align.has_keyword(Keyword::Calendar) {
            AlignMode::Calendar
        } else {
            AlignMode::FirstObservation
        };
        AlignTo {
            mode,
            time_zone: token_after(align, Keyword::Zone).map(string_content),
            offset: token_after(align, Keyword::Offset).map(string_content),
        }
    });

    Ok(SampleBy {
        duration,
        from,
        to,
        fill,
        align_to,
    })
}

fn pivot_clause(node: &SyntaxNode) -> Result<Pivot, FromError> {
    let mut aggregates = Vec::new();
    for agg in node.nodes_named("pivotAggregate") {
        aggregates.push(PivotAggregate {
            expr: expr(req(agg, "expr")?)?,
            alias: alias_of(agg),
        });
    }
    let mut items = Vec::new();
    for item in node.nodes_named("pivotItem") {
        let column = first_ident(item).ok_or(FromError::MissingToken("pivotItem"))?;
        let mut values = Vec::new();
        for value in item.nodes_named("pivotValue") {
            values.push(PivotAggregate {
                expr: expr(req(value, "expr")?)?,
                alias: alias_of(value),
            });
        }
        items.push(PivotItem { column, values });
    }
    Ok(Pivot { aggregates, items })
}

fn order_by(node: &SyntaxNode) -> Result<Vec<OrderByItem>, FromError> {
    let mut out = Vec::new();
    for item in node.nodes_named("orderItem") {
        let direction = if item.has_keyword(Keyword::Asc) {
            Some(Direction::Asc)
        } else if item.has_keyword(Keyword::Desc) {
            Some(Direction::Desc)
        } else {
            None
        };
        out.push(OrderByItem {
            expr: expr(req(item, "expr")?)?,
            direction,
        });
    }
    Ok(out)
}

fn with_statement(node: &SyntaxNode) -> Result<Statement, FromError> {
    let with = ctes(req(node, "withClause")?)?;
    if let Some(insert) = node.node("insertStatement") {
        let mut insert = insert_statement(insert)?;
        insert.with = with;
        return Ok(Statement::Insert(Box::new(insert)));
    }
    if let Some(update) = node.node("updateStatement") {
        let mut update = update_statement(update)?;
        update.with = with;
        return Ok(Statement::Update(Box::new(update)));
    }
    let mut select = select_statement(req(node, "selectStatement")?)?;
    select.with = with;
    Ok(Statement::Select(Box::new(select)))
}

// ---------------------------------------------------------------------------
// DML
// ---------------------------------------------------------------------------

fn insert_statement(node: &SyntaxNode) -> Result<InsertStatement, FromError> {
    let mut insert = InsertStatement {
        atomic: node.has_keyword(Keyword::Atomic),
        batch: batch_size(node),
        table: req_qualified_name(node)?,
        ..Default::default()
    };
    if let Some(columns) = node.node("columnList") {
        insert.columns = ident_list(columns);
    }
    if let Some(values) = node.node("valuesClause") {
        for row in values.nodes_named("valuesRow") {
            let mut exprs = Vec::new();
            for e in row.nodes_named("expr") {
                exprs.push(expr(e)?);
            }
            insert.values.push(exprs);
        }
    } else if let Some(select) = node.node("selectStatement") {
        insert.select = Some(Box::new(select_statement(select)?));
    }
    Ok(insert)
}

fn update_statement(node: &SyntaxNode) -> Result<UpdateStatement, FromError> {
    let mut update = UpdateStatement {
        table: req_qualified_name(node)?,
        alias: alias_of(node),
        ..Default::default()
    };
    for assignment in node.nodes_named("setAssignment") {
        update.set.push(SetAssignment {
            column: qualified_name(req(assignment, "qualifiedName")?),
            value: expr(req(assignment, "expr")?)?,
        });
    }
    if let Some(from) = node.node("fromClause") {
        update.from = table_refs(from)?;
    }
    if let Some(where_clause) = node.node("whereClause") {
        update.where_clause = Some(expr(req(where_clause, "expr")?)?);
    }
    Ok(update)
}

fn batch_size(node: &SyntaxNode) -> Option<String> {
    if node.has_keyword(Keyword::Batch) {
        node.token(TokenKind::Number).map(|t| t.text().to_string())
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------------

fn create_table(node: &SyntaxNode) -> Result<CreateTable, FromError> {
    let body = req(node, "createTableBody")?;
    let source = if body.has_keyword(Keyword::Like) {
        CreateTableSource::Like(qualified_name(req(body, "qualifiedName")?))
    } else if body.has_keyword(Keyword::As) {
        let select = match body.node("subquery") {
            Some(subquery) => select_statement(req(subquery, "selectStatement")?)?,
            None => select_statement(req(body, "selectStatement")?)?,
        };
        let mut casts = Vec::new();
        for cast in body.nodes_named("castDef") {
            casts.push(CastDef {
                column: first_ident(cast).ok_or(FromError::MissingToken("castDef"))?,
                type_name: type_name(req(cast, "typeName")?),
            });
        }
        let mut indexes = Vec::new();
        for index in body.nodes_named("indexDef") {
            indexes.push(IndexDef {
                column: ident_after(index, Keyword::Index)
                    .ok_or(FromError::MissingToken("indexDef"))?,
                capacity: token_after(index, Keyword::Capacity).map(|t| t.text().to_string()),
            });
        }
        CreateTableSource::AsSelect {
            select: Box::new(select),
            casts,
            indexes,
        }
    } else {
        let mut columns = Vec::new();
        for column in body.nodes_named("columnDef") {
            columns.push(column_def(column)?);
        }
        CreateTableSource::Columns(columns)
    };

    let mut create = CreateTable {
        atomic: node.has_keyword(Keyword::Atomic),
        batch: batch_size(node),
        if_not_exists: node.node("ifNotExists").is_some(),
        table: req_qualified_name(node)?,
        source,
        timestamp: None,
        partition_by: None,
        ttl: None,
        wal: None,
        with_params: Vec::new(),
        volume: None,
        dedup_keys: Vec::new(),
        owned_by: None,
    };
    for option in node.nodes_named("createTableOption") {
        apply_table_option(&mut create, option)?;
    }
    Ok(create)
}

fn apply_table_option(create: &mut CreateTable, option: &SyntaxNode) -> Result<(), FromError> {
    let inner = option
        .nodes()
        .next()
        .ok_or(FromError::MissingNode("createTableOption"))?;
    match inner.rule() {
        "timestampClause" => {
            create.timestamp = ident_after(inner, Keyword::Timestamp);
        }
        "partitionByClause" => {
            create.partition_by = partition_unit(inner);
        }
        "ttlClause" => {
            create.ttl = Some(ttl_value(req(inner, "ttlValue")?)?);
        }
        "walClause" => {
            create.wal = Some(!inner.has_keyword(Keyword::Bypass));
        }
        "withParams" => {
            for param in inner.nodes_named("withParam") {
                let mut tokens = param.tokens();
                let name = tokens
                    .next()
                    .map(ident_text)
                    .ok_or(FromError::MissingToken("withParam"))?;
                let value = param
                    .tokens()
                    .last()
                    .map(|t| t.text().to_string())
                    .ok_or(FromError::MissingToken("withParam"))?;
                create.with_params.push(WithParam { name, value });
            }
        }
        "dedupClause" => {
            create.dedup_keys = idents_in_parens(inner);
        }
        "inVolume" => {
            create.volume = inner
                .tokens()
                .last()
                .map(|t| match t.kind() {
                    TokenKind::String => string_content(t),
                    _ => t.text().to_string(),
                });
        }
        "ownedBy" => {
            create.owned_by = owned_by_name(inner);
        }
        other => return Err(FromError::Unrecognised(other)),
    }
    Ok(())
}

fn column_def(node: &SyntaxNode) -> Result<ColumnDef, FromError> {
    let mut def = ColumnDef {
        name: first_ident(node).ok_or(FromError::MissingToken("columnDef"))?,
        type_name: type_name(req(node, "typeName")?),
        ..Default::default()
    };
    for opt in node.nodes_named("columnOpt") {
        if opt.has_keyword(Keyword::Index) {
            def.index = true;
            def.index_capacity =
                token_after(opt, Keyword::Capacity).map(|t| t.text().to_string());
        } else if opt.has_keyword(Keyword::Capacity) {
            def.capacity = token_after(opt, Keyword::Capacity).map(|t| t.text().to_string());
        } else if opt.has_keyword(Keyword::Cache) {
            def.cache = Some(true);
        } else if opt.has_keyword(Keyword::Nocache) {
            def.cache = Some(false);
        }
    }
    Ok(def)
}

fn partition_unit(node: &SyntaxNode) -> Option<String> {
    node.tokens()
        .filter_map(|t| match t.kind() {
            TokenKind::Keyword(kw) => match kw {
                Keyword::None
                | Keyword::Year
                | Keyword::Month
                | Keyword::Week
                | Keyword::Day
                | Keyword::Hour => Some(kw.name().to_ascii_uppercase()),
                _ => None,
            },
            _ => None,
        })
        .next()
}

fn ttl_value(node: &SyntaxNode) -> Result<Ttl, FromError> {
    if let Some(duration) = node.token(TokenKind::Duration) {
        return Ok(Ttl {
            value: duration.text().to_string(),
            unit: None,
        });
    }
    let value = node
        .token(TokenKind::Number)
        .ok_or(FromError::MissingToken("ttlValue"))?
        .text()
        .to_string();
    let unit = node
        .node("timeUnit")
        .and_then(|unit| unit.tokens().next().map(|t| t.text().to_ascii_uppercase()));
    Ok(Ttl { value, unit })
}

fn create_view(node: &SyntaxNode) -> Result<CreateView, FromError> {
    let select = match node.node("subquery") {
        Some(subquery) => select_statement(req(subquery, "selectStatement")?)?,
        None => select_statement(req(node, "selectStatement")?)?,
    };
    Ok(CreateView {
        if_not_exists: node.node("ifNotExists").is_some(),
        view: req_qualified_name(node)?,
        select: Box::new(select),
        owned_by: owned_by(node),
    })
}

fn create_mat_view(node: &SyntaxNode) -> Result<CreateMaterializedView, FromError> {
    let select = match node.node("subquery") {
        Some(subquery) => select_statement(req(subquery, "selectStatement")?)?,
        None => select_statement(req(node, "selectStatement")?)?,
    };
    let base = token_after(node, Keyword::Base).map(|t| match t.kind() {
        TokenKind::String => string_content(t),
        _ => ident_text(t),
    });
    let refresh = match node.node("refreshSpec") {
        None => None,
        Some(spec) => Some(refresh_spec(spec)?),
    };
    let ttl = match node.node("ttlClause") {
        None => None,
        Some(clause) => Some(ttl_value(req(clause, "ttlValue")?)?),
    };
    Ok(CreateMaterializedView {
        if_not_exists: node.node("ifNotExists").is_some(),
        view: req_qualified_name(node)?,
        base,
        refresh,
        select: Box::new(select),
        partition_by: node.node("partitionByClause").and_then(partition_unit),
        ttl,
        volume: node.node("inVolume").and_then(|v| {
            v.tokens().last().map(|t| match t.kind() {
                TokenKind::String => string_content(t),
                _ => t.text().to_string(),
            })
        }),
        owned_by: owned_by(node),
    })
}

fn refresh_spec(node: &SyntaxNode) -> Result<RefreshSpec, FromError> {
    if let Some(period) = node.node("periodSpec") {
        let length = period
            .token(TokenKind::Duration)
            .ok_or(FromError::MissingToken("periodSpec"))?
            .text()
            .to_string();
        return Ok(RefreshSpec::Period {
            length,
            time_zone: token_after(period, Keyword::Zone).map(string_content),
            delay: token_after(period, Keyword::Delay).map(|t| t.text().to_string()),
        });
    }
    if node.has_keyword(Keyword::Immediate) {
        Ok(RefreshSpec::Immediate)
    } else if node.has_keyword(Keyword::Manual) {
        Ok(RefreshSpec::Manual)
    } else if node.has_keyword(Keyword::Incremental) {
        Ok(RefreshSpec::Incremental)
    } else if node.has_keyword(Keyword::Every) {
        let interval = node
            .token(TokenKind::Duration)
            .ok_or(FromError::MissingToken("refreshSpec"))?
            .text()
            .to_string();
        Ok(RefreshSpec::Every(interval))
    } else {
        Ok(RefreshSpec::Default)
    }
}

fn alter_table(node: &SyntaxNode) -> Result<AlterTable, FromError> {
    let action_node = req(node, "alterTableAction")?;
    Ok(AlterTable {
        table: req_qualified_name(node)?,
        action: alter_table_action(action_node)?,
    })
}

fn alter_table_action(node: &SyntaxNode) -> Result<AlterTableAction, FromError> {
    let first = node
        .tokens()
        .next()
        .ok_or(FromError::MissingToken("alterTableAction"))?;
    let first_kw = match first.kind() {
        TokenKind::Keyword(kw) => kw,
        _ => return Err(FromError::Unrecognised("alterTableAction")),
    };
    Ok(match first_kw {
        Keyword::Add => {
            let mut columns = Vec::new();
            for column in node.nodes_named("columnDef") {
                columns.push(column_def(column)?);
            }
            AlterTableAction::AddColumns(columns)
        }
        Keyword::Drop if node.has_keyword(Keyword::Column) => {
            AlterTableAction::DropColumns(idents_after(node, Keyword::Column))
        }
        Keyword::Drop => {
            AlterTableAction::DropPartition(partition_selector(req(node, "partitionSelector")?)?)
        }
        Keyword::Rename => {
            let mut idents = node.tokens().filter(|t| is_ident_like(t.kind()));
            // RENAME COLUMN a TO b: the COLUMN keyword is identifier-like,
            // skip past it explicitly.
            let _ = idents.next();
            let from = idents
                .next()
                .map(ident_text)
                .ok_or(FromError::MissingToken("alterTableAction"))?;
            let to = idents
                .next()
                .map(ident_text)
                .ok_or(FromError::MissingToken("alterTableAction"))?;
            AlterTableAction::RenameColumn { from, to }
        }
        Keyword::Alter => {
            let column = token_after(node, Keyword::Column)
                .map(ident_text)
                .ok_or(FromError::MissingToken("alterTableAction"))?;
            AlterTableAction::AlterColumn {
                column,
                action: alter_column_action(req(node, "alterColumnAction")?)?,
            }
        }
        Keyword::Attach => AlterTableAction::AttachPartitionList(
            node.tokens()
                .filter(|t| t.kind() == TokenKind::String)
                .map(string_content)
                .collect(),
        ),
        Keyword::Detach => {
            AlterTableAction::DetachPartition(partition_selector(req(node, "partitionSelector")?)?)
        }
        Keyword::Convert => {
            let format = token_after(node, Keyword::To)
                .map(|t| t.text().to_ascii_uppercase())
                .ok_or(FromError::MissingToken("alterTableAction"))?;
            AlterTableAction::ConvertPartition {
                format,
                selector: partition_selector(req(node, "partitionSelector")?)?,
            }
        }
        Keyword::Squash => AlterTableAction::SquashPartitions,
        Keyword::Set if node.has_keyword(Keyword::Param) => {
            let name = token_after(node, Keyword::Param)
                .map(ident_text)
                .ok_or(FromError::MissingToken("alterTableAction"))?;
            let value = node
                .tokens()
                .last()
                .map(|t| t.text().to_string())
                .ok_or(FromError::MissingToken("alterTableAction"))?;
            AlterTableAction::SetParam { name, value }
        }
        Keyword::Set if node.has_keyword(Keyword::Ttl) => {
            AlterTableAction::SetTtl(ttl_value(req(node, "ttlValue")?)?)
        }
        Keyword::Set => AlterTableAction::SetType {
            wal: !node.has_keyword(Keyword::Bypass),
        },
        Keyword::Dedup if node.has_keyword(Keyword::Disable) => AlterTableAction::DedupDisable,
        Keyword::Dedup => AlterTableAction::DedupEnable(idents_in_parens(node)),
        Keyword::Suspend => AlterTableAction::SuspendWal,
        Keyword::Resume => AlterTableAction::ResumeWal(resume_from(node)?),
        _ => return Err(FromError::Unrecognised("alterTableAction")),
    })
}

fn resume_from(node: &SyntaxNode) -> Result<Option<ResumeFrom>, FromError> {
    if !node.has_keyword(Keyword::From) {
        return Ok(None);
    }
    let spelling = if node.has_keyword(Keyword::Transaction) {
        TxnSpelling::Transaction
    } else {
        TxnSpelling::Txn
    };
    let txn = node
        .token(TokenKind::Number)
        .ok_or(FromError::MissingToken("alterTableAction"))?
        .text()
        .to_string();
    Ok(Some(ResumeFrom { spelling, txn }))
}

fn alter_column_action(node: &SyntaxNode) -> Result<AlterColumnAction, FromError> {
    if node.has_keyword(Keyword::Add) {
        return Ok(AlterColumnAction::AddIndex {
            capacity: token_after(node, Keyword::Capacity).map(|t| t.text().to_string()),
        });
    }
    if node.has_keyword(Keyword::Drop) {
        return Ok(AlterColumnAction::DropIndex);
    }
    if node.has_keyword(Keyword::Type) {
        return Ok(AlterColumnAction::Type(type_name(req(node, "typeName")?)));
    }
    if node.has_keyword(Keyword::Symbol) {
        let capacity = token_after(node, Keyword::Capacity)
            .map(|t| t.text().to_string())
            .ok_or(FromError::MissingToken("alterColumnAction"))?;
        return Ok(AlterColumnAction::SymbolCapacity(capacity));
    }
    if node.has_keyword(Keyword::Cache) {
        return Ok(AlterColumnAction::Cache);
    }
    if node.has_keyword(Keyword::Nocache) {
        return Ok(AlterColumnAction::Nocache);
    }
    Err(FromError::Unrecognised("alterColumnAction"))
}

fn partition_selector(node: &SyntaxNode) -> Result<PartitionSelector, FromError> {
    if node.has_keyword(Keyword::Where) {
        return Ok(PartitionSelector::Where(expr(req(node, "expr")?)?));
    }
    let items = node
        .tokens()
        .filter_map(|t| match t.kind() {
            TokenKind::String => Some(string_content(t)),
            kind if is_ident_like(kind) && kind != TokenKind::Keyword(Keyword::List) => {
                Some(t.text().to_string())
            }
            _ => None,
        })
        .collect();
    Ok(PartitionSelector::List(items))
}

fn alter_view(node: &SyntaxNode) -> Result<AlterView, FromError> {
    Ok(AlterView {
        view: req_qualified_name(node)?,
        owned_by: owned_by(node).ok_or(FromError::MissingToken("alterViewStatement"))?,
    })
}

fn alter_mat_view(node: &SyntaxNode) -> Result<AlterMaterializedView, FromError> {
    let action_node = req(node, "matViewAction")?;
    let action = if let Some(owner) = owned_by(action_node) {
        MatViewAction::OwnedBy(owner)
    } else if action_node.has_keyword(Keyword::Suspend) {
        MatViewAction::SuspendWal
    } else if action_node.has_keyword(Keyword::Resume) {
        MatViewAction::ResumeWal(resume_from(action_node)?)
    } else if action_node.has_keyword(Keyword::Refresh) {
        let mode = if action_node.has_keyword(Keyword::Immediate) {
            SetRefreshMode::Immediate
        } else if action_node.has_keyword(Keyword::Manual) {
            SetRefreshMode::Manual
        } else if action_node.has_keyword(Keyword::Incremental) {
            SetRefreshMode::Incremental
        } else if action_node.has_keyword(Keyword::Every) {
            SetRefreshMode::Every(
                action_node
                    .token(TokenKind::Duration)
                    .ok_or(FromError::MissingToken("matViewAction"))?
                    .text()
                    .to_string(),
            )
        } else {
            SetRefreshMode::Limit(ttl_value(req(action_node, "ttlValue")?)?)
        };
        MatViewAction::SetRefresh(mode)
    } else {
        MatViewAction::SetTtl(ttl_value(req(action_node, "ttlValue")?)?)
    };
    Ok(AlterMaterializedView {
        view: req_qualified_name(node)?,
        action,
    })
}

fn drop_table(node: &SyntaxNode) -> Result<DropTable, FromError> {
    let all_tables = node.has_keyword(Keyword::All);
    Ok(DropTable {
        all_tables,
        if_exists: node.node("ifExists").is_some(),
        table: if all_tables {
            None
        } else {
            Some(req_qualified_name(node)?)
        },
    })
}

fn drop_view(node: &SyntaxNode, materialized: bool) -> Result<DropView, FromError> {
    Ok(DropView {
        materialized,
        if_exists: node.node("ifExists").is_some(),
        view: req_qualified_name(node)?,
    })
}

fn refresh_mat_view(node: &SyntaxNode) -> Result<RefreshMaterializedView, FromError> {
    let range = if node.has_keyword(Keyword::Full) {
        Some(RefreshRange::Full)
    } else if node.has_keyword(Keyword::Incremental) {
        Some(RefreshRange::Incremental)
    } else if node.has_keyword(Keyword::Interval) {
        let mut strings = node.tokens().filter(|t| t.kind() == TokenKind::String);
        let from = strings
            .next()
            .map(string_content)
            .ok_or(FromError::MissingToken("refreshMatViewStatement"))?;
        let to = strings
            .next()
            .map(string_content)
            .ok_or(FromError::MissingToken("refreshMatViewStatement"))?;
        Some(RefreshRange::Interval { from, to })
    } else {
        None
    };
    Ok(RefreshMaterializedView {
        view: req_qualified_name(node)?,
        range,
    })
}

// ---------------------------------------------------------------------------
// SHOW / COPY / ACL helpers
// ---------------------------------------------------------------------------

fn show(node: &SyntaxNode) -> Result<Show, FromError> {
    if node.has_keyword(Keyword::Create) {
        let name = req_qualified_name(node)?;
        return Ok(if node.has_keyword(Keyword::Materialized) {
            Show::CreateMaterializedView { view: name }
        } else if node.has_keyword(Keyword::View) {
            Show::CreateView { view: name }
        } else {
            Show::CreateTable { table: name }
        });
    }
    if node.has_keyword(Keyword::Columns) {
        return Ok(Show::Columns {
            table: req_qualified_name(node)?,
        });
    }
    if node.has_keyword(Keyword::Partitions) {
        return Ok(Show::Partitions {
            table: req_qualified_name(node)?,
        });
    }
    if node.has_keyword(Keyword::Tables) {
        return Ok(Show::Tables);
    }
    if node.has_keyword(Keyword::ServerVersion) {
        return Ok(Show::ServerVersion);
    }
    if node.has_keyword(Keyword::Parameters) {
        return Ok(Show::Parameters);
    }
    if node.has_keyword(Keyword::Users) {
        return Ok(Show::Users);
    }
    if node.has_keyword(Keyword::User) {
        return Ok(Show::User {
            name: token_after(node, Keyword::User).map(ident_text),
        });
    }
    if node.has_keyword(Keyword::Groups) {
        return Ok(Show::Groups {
            user: token_after(node, Keyword::Groups).map(ident_text),
        });
    }
    if node.has_keyword(Keyword::Accounts) {
        return Ok(Show::ServiceAccounts {
            user: token_after(node, Keyword::Accounts).map(ident_text),
        });
    }
    if node.has_keyword(Keyword::Account) {
        return Ok(Show::ServiceAccount {
            name: token_after(node, Keyword::Account)
                .map(ident_text)
                .ok_or(FromError::MissingToken("showStatement"))?,
        });
    }
    if node.has_keyword(Keyword::Permissions) {
        return Ok(Show::Permissions {
            entity: token_after(node, Keyword::Permissions).map(ident_text),
        });
    }
    Err(FromError::Unrecognised("showStatement"))
}

fn copy_statement(node: &SyntaxNode) -> Result<Statement, FromError> {
    let table = token_after(node, Keyword::Copy)
        .map(ident_text)
        .ok_or(FromError::MissingToken("copyStatement"))?;
    if node.has_keyword(Keyword::Cancel) {
        return Ok(Statement::CopyCancel(CopyCancel { id: table }));
    }
    let to_form = node.has_keyword(Keyword::To);
    let path_kw = if to_form { Keyword::To } else { Keyword::From };
    let path = token_after(node, path_kw)
        .map(|t| match t.kind() {
            TokenKind::String => string_content(t),
            _ => t.text().to_string(),
        })
        .ok_or(FromError::MissingToken("copyStatement"))?;
    let mut options = Vec::new();
    for option in node.nodes_named("copyOption") {
        options.push(copy_option(option)?);
    }
    Ok(if to_form {
        Statement::CopyTo(Box::new(CopyTo {
            table,
            path,
            options,
        }))
    } else {
        Statement::CopyFrom(Box::new(CopyFrom {
            table,
            path,
            options,
        }))
    })
}

fn copy_option(node: &SyntaxNode) -> Result<CopyOption, FromError> {
    if node.has_keyword(Keyword::Header) {
        return Ok(CopyOption::Header(node.has_keyword(Keyword::True)));
    }
    if node.has_keyword(Keyword::Timestamp) {
        let column = token_after(node, Keyword::Timestamp)
            .map(|t| match t.kind() {
                TokenKind::String => string_content(t),
                _ => t.text().to_string(),
            })
            .ok_or(FromError::MissingToken("copyOption"))?;
        return Ok(CopyOption::Timestamp(column));
    }
    if node.has_keyword(Keyword::Delimiter) {
        let delim = node
            .token(TokenKind::String)
            .map(string_content)
            .ok_or(FromError::MissingToken("copyOption"))?;
        return Ok(CopyOption::Delimiter(delim));
    }
    if node.has_keyword(Keyword::Format) {
        let format = token_after(node, Keyword::Format)
            .map(|t| t.text().to_string())
            .ok_or(FromError::MissingToken("copyOption"))?;
        return Ok(CopyOption::Format(format));
    }
    if node.has_keyword(Keyword::Error) {
        let mode = node
            .tokens()
            .last()
            .map(|t| t.text().to_ascii_uppercase())
            .ok_or(FromError::MissingToken("copyOption"))?;
        return Ok(CopyOption::OnError(mode));
    }
    if node.has_keyword(Keyword::Partition) {
        return Ok(CopyOption::PartitionByUnit(
            partition_unit(node).ok_or(FromError::MissingToken("copyOption"))?,
        ));
    }
    if node.has_keyword(Keyword::PartitionBy) {
        let target = token_after(node, Keyword::PartitionBy)
            .map(|t| t.text().to_string())
            .ok_or(FromError::MissingToken("copyOption"))?;
        return Ok(CopyOption::PartitionByTarget(target));
    }
    if node.has_keyword(Keyword::CompressionCodec) {
        let codec = token_after(node, Keyword::CompressionCodec)
            .map(|t| t.text().to_string())
            .ok_or(FromError::MissingToken("copyOption"))?;
        return Ok(CopyOption::CompressionCodec(codec));
    }
    Err(FromError::Unrecognised("copyOption"))
}

fn password_spec(node: &SyntaxNode) -> PasswordSpec {
    if node.has_keyword(Keyword::No) {
        PasswordSpec::NoPassword
    } else {
        let password = node
            .tokens()
            .last()
            .map(|t| match t.kind() {
                TokenKind::String => string_content(t),
                _ => t.text().to_string(),
            })
            .unwrap_or_default();
        PasswordSpec::Password(password)
    }
}

fn user_action(node: &SyntaxNode) -> Result<UserAction, FromError> {
    if let Some(spec) = node.node("userAction") {
        if spec.has_keyword(Keyword::Enable) {
            return Ok(UserAction::Enable);
        }
        if spec.has_keyword(Keyword::Disable) {
            return Ok(UserAction::Disable);
        }
        if let Some(password) = spec.node("passwordSpec") {
            return Ok(UserAction::Password(password_spec(password)));
        }
    }
    Err(FromError::MissingNode("userAction"))
}

fn drop_principal(
    node: &SyntaxNode,
    kind: PrincipalKind,
    name_kw: Keyword,
) -> Result<DropPrincipal, FromError> {
    Ok(DropPrincipal {
        kind,
        if_exists: node.node("ifExists").is_some(),
        name: token_after(node, name_kw)
            .map(ident_text)
            .ok_or(FromError::MissingToken("dropPrincipal"))?,
    })
}

fn permissions(node: &SyntaxNode) -> Vec<String> {
    node.nodes_named("permission")
        .map(|permission| {
            permission
                .tokens()
                .map(|t| t.text().to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn grant_target(node: &SyntaxNode) -> Result<Option<GrantTarget>, FromError> {
    if !node.has_keyword(Keyword::On) {
        return Ok(None);
    }
    if node.has_keyword(Keyword::All) {
        return Ok(Some(GrantTarget::AllTables));
    }
    let mut targets = Vec::new();
    for target in node.nodes_named("permissionTarget") {
        targets.push(PermissionTarget {
            table: qualified_name(req(target, "qualifiedName")?),
            columns: target
                .node("columnList")
                .map(ident_list)
                .unwrap_or_default(),
        });
    }
    Ok(Some(GrantTarget::Tables(targets)))
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

pub(crate) fn expr(node: &SyntaxNode) -> Result<Expression, FromError> {
    or_expr(req(node, "orExpr")?)
}

fn or_expr(node: &SyntaxNode) -> Result<Expression, FromError> {
    fold_binary(node, "andExpr", and_expr)
}

fn and_expr(node: &SyntaxNode) -> Result<Expression, FromError> {
    fold_binary(node, "notExpr", not_expr)
}

/// Fold `child (op child)*` into left-associated `Binary` nodes. The
/// operator tokens are the node's direct non-trivia tokens, in order.
fn fold_binary(
    node: &SyntaxNode,
    child_rule: &str,
    convert: impl Fn(&SyntaxNode) -> Result<Expression, FromError>,
) -> Result<Expression, FromError> {
    let mut acc: Option<Expression> = None;
    let mut pending_op: Option<String> = None;
    for child in node.children() {
        match child {
            SyntaxElement::Token(token) if !token.kind().is_trivia() => {
                pending_op = Some(op_text(token));
            }
            SyntaxElement::Node(inner) if inner.rule() == child_rule => {
                let rhs = convert(inner)?;
                acc = Some(match acc {
                    None => rhs,
                    Some(lhs) => Expression::Binary {
                        op: pending_op
                            .take()
                            .ok_or(FromError::MissingToken("binary operator"))?,
                        left: Box::new(lhs),
                        right: Box::new(rhs),
                    },
                });
            }
            _ => {}
        }
    }
    acc.ok_or(FromError::MissingNode("expression operand"))
}

/// Keyword operators serialize upper-cased; symbol operators keep their
/// source spelling.
fn op_text(token: &Token) -> String {
    match token.kind() {
        TokenKind::Keyword(_) => token.text().to_ascii_uppercase(),
        _ => token.text().to_string(),
    }
}

fn not_expr(node: &SyntaxNode) -> Result<Expression, FromError> {
    let mut result = compare_expr(req(node, "compareExpr")?)?;
    let nots = node
        .tokens()
        .filter(|t| t.kind() == TokenKind::Keyword(Keyword::Not))
        .count();
    for _ in 0..nots {
        result = Expression::Unary {
            op: "NOT".into(),
            expr: Box::new(result),
        };
    }
    Ok(result)
}

fn compare_expr(node: &SyntaxNode) -> Result<Expression, FromError> {
    let mut nodes = node.nodes();
    let first = nodes.next().ok_or(FromError::MissingNode("addExpr"))?;
    let mut acc = add_expr(first)?;
    for tail in node.nodes_named("compareTail") {
        acc = compare_tail(acc, tail)?;
    }
    Ok(acc)
}

fn compare_tail(acc: Expression, node: &SyntaxNode) -> Result<Expression, FromError> {
    if let Some(between) = node.node("betweenTail") {
        let mut bounds = between.nodes_named("addExpr");
        let low = add_expr(bounds.next().ok_or(FromError::MissingNode("addExpr"))?)?;
        let high = add_expr(bounds.next().ok_or(FromError::MissingNode("addExpr"))?)?;
        return Ok(Expression::Between {
            expr: Box::new(acc),
            not: between.has_keyword(Keyword::Not),
            low: Box::new(low),
            high: Box::new(high),
        });
    }
    if let Some(in_tail) = node.node("inTail") {
        let operand = req(in_tail, "inOperand")?;
        let not = in_tail.has_keyword(Keyword::Not);
        if let Some(subquery) = operand.node("subquery") {
            let select = select_statement(req(subquery, "selectStatement")?)?;
            return Ok(Expression::In {
                expr: Box::new(acc),
                not,
                values: vec![Expression::Subquery(Box::new(select))],
                parenthesized: false,
            });
        }
        if operand.token(TokenKind::LParen).is_some() {
            let mut values = Vec::new();
            for value in operand.nodes_named("expr") {
                values.push(expr(value)?);
            }
            return Ok(Expression::In {
                expr: Box::new(acc),
                not,
                values,
                parenthesized: true,
            });
        }
        let value = add_expr(req(operand, "addExpr")?)?;
        return Ok(Expression::In {
            expr: Box::new(acc),
            not,
            values: vec![value],
            parenthesized: false,
        });
    }
    if let Some(like) = node.node("likeTail") {
        let mut op = String::new();
        if like.has_keyword(Keyword::Not) {
            op.push_str("NOT ");
        }
        op.push_str(if like.has_keyword(Keyword::Ilike) {
            "ILIKE"
        } else {
            "LIKE"
        });
        let right = add_expr(req(like, "addExpr")?)?;
        return Ok(Expression::Binary {
            op,
            left: Box::new(acc),
            right: Box::new(right),
        });
    }
    if let Some(is_tail) = node.node("isTail") {
        return Ok(Expression::IsNull {
            expr: Box::new(acc),
            not: is_tail.has_keyword(Keyword::Not),
        });
    }
    if let Some(within) = node.node("withinTail") {
        let mut values = Vec::new();
        for value in within.nodes_named("expr") {
            values.push(expr(value)?);
        }
        return Ok(Expression::Within {
            expr: Box::new(acc),
            values,
        });
    }
    // Plain comparison: an operator token followed by an addExpr.
    let op = node
        .tokens()
        .next()
        .map(op_text)
        .ok_or(FromError::MissingToken("compareTail"))?;
    let right = add_expr(req(node, "addExpr")?)?;
    Ok(Expression::Binary {
        op,
        left: Box::new(acc),
        right: Box::new(right),
    })
}

fn add_expr(node: &SyntaxNode) -> Result<Expression, FromError> {
    fold_binary(node, "mulExpr", mul_expr)
}

fn mul_expr(node: &SyntaxNode) -> Result<Expression, FromError> {
    fold_binary(node, "unaryExpr", unary_expr)
}

fn unary_expr(node: &SyntaxNode) -> Result<Expression, FromError> {
    let inner = postfix_expr(req(node, "postfixExpr")?)?;
    match node
        .tokens()
        .find(|t| matches!(t.kind(), TokenKind::Minus | TokenKind::Plus))
    {
        Some(sign) => Ok(Expression::Unary {
            op: sign.text().to_string(),
            expr: Box::new(inner),
        }),
        None => Ok(inner),
    }
}

fn postfix_expr(node: &SyntaxNode) -> Result<Expression, FromError> {
    let mut acc = primary_expr(req(node, "primaryExpr")?)?;
    for postfix in node.nodes() {
        match postfix.rule() {
            "arrayAccess" => {
                let mut subscripts = Vec::new();
                for sub in postfix.nodes_named("subscript") {
                    subscripts.push(subscript(sub)?);
                }
                acc = Expression::ArrayAccess {
                    array: Box::new(acc),
                    subscripts,
                };
            }
            "typeCastTail" => {
                acc = Expression::TypeCast {
                    expr: Box::new(acc),
                    type_name: type_name(req(postfix, "typeName")?),
                };
            }
            _ => {}
        }
    }
    Ok(acc)
}

fn subscript(node: &SyntaxNode) -> Result<Subscript, FromError> {
    if node.token(TokenKind::Colon).is_none() {
        return Ok(Subscript::Index(expr(req(node, "expr")?)?));
    }
    // Order matters: expressions before the colon are the start bound.
    let mut start = None;
    let mut end = None;
    let mut seen_colon = false;
    for child in node.children() {
        match child {
            SyntaxElement::Token(token) if token.kind() == TokenKind::Colon => {
                seen_colon = true;
            }
            SyntaxElement::Node(inner) if inner.rule() == "expr" => {
                if seen_colon {
                    end = Some(expr(inner)?);
                } else {
                    start = Some(expr(inner)?);
                }
            }
            _ => {}
        }
    }
    Ok(Subscript::Slice { start, end })
}

fn primary_expr(node: &SyntaxNode) -> Result<Expression, FromError> {
    if let Some(token) = node.token(TokenKind::Variable) {
        return Ok(Expression::Variable(token.text().to_string()));
    }
    let inner = node
        .nodes()
        .next()
        .ok_or(FromError::MissingNode("primaryExpr"))?;
    Ok(match inner.rule() {
        "literal" => Expression::Literal(literal(inner)?),
        "caseExpr" => Expression::Case(Box::new(case_expr(inner)?)),
        "castExpr" => Expression::Cast {
            expr: Box::new(expr(req(inner, "expr")?)?),
            type_name: type_name(req(inner, "typeName")?),
        },
        "arrayLiteral" => {
            let mut elements = Vec::new();
            for element in inner.nodes_named("expr") {
                elements.push(expr(element)?);
            }
            Expression::ArrayLiteral {
                elements,
                has_array_keyword: inner.has_keyword(Keyword::Array),
            }
        }
        "subquery" => Expression::Subquery(Box::new(select_statement(req(
            inner,
            "selectStatement",
        )?)?)),
        "parenExpr" => {
            let mut exprs = inner.nodes_named("expr");
            let first = expr(exprs.next().ok_or(FromError::MissingNode("expr"))?)?;
            let mut additional = Vec::new();
            for extra in exprs {
                additional.push(expr(extra)?);
            }
            Expression::Paren {
                expr: Box::new(first),
                additional,
            }
        }
        "functionCall" => Expression::FunctionCall(Box::new(function_call(inner)?)),
        "qualifiedName" => Expression::Column(qualified_name(inner)),
        other => return Err(FromError::Unrecognised(other)),
    })
}

fn literal(node: &SyntaxNode) -> Result<Literal, FromError> {
    let token = node
        .tokens()
        .next()
        .ok_or(FromError::MissingToken("literal"))?;
    Ok(match token.kind() {
        TokenKind::String => Literal {
            kind: LiteralKind::String,
            value: string_content(token),
            raw: Some(token.text().to_string()),
        },
        TokenKind::Number => Literal {
            kind: LiteralKind::Number,
            value: token.text().to_string(),
            raw: Some(token.text().to_string()),
        },
        TokenKind::Duration => Literal {
            kind: LiteralKind::Duration,
            value: token.text().to_string(),
            raw: Some(token.text().to_string()),
        },
        TokenKind::Geohash => Literal {
            kind: LiteralKind::Geohash,
            value: token.text().to_string(),
            raw: Some(token.text().to_string()),
        },
        TokenKind::Keyword(Keyword::True) | TokenKind::Keyword(Keyword::False) => Literal {
            kind: LiteralKind::Boolean,
            value: token.text().to_string(),
            raw: Some(token.text().to_string()),
        },
        TokenKind::Keyword(Keyword::Null) => Literal {
            kind: LiteralKind::Null,
            value: token.text().to_string(),
            raw: Some(token.text().to_string()),
        },
        TokenKind::Keyword(Keyword::Nan) => Literal {
            kind: LiteralKind::Number,
            value: token.text().to_string(),
            raw: Some(token.text().to_string()),
        },
        _ => return Err(FromError::Unrecognised("literal")),
    })
}

fn case_expr(node: &SyntaxNode) -> Result<CaseExpression, FromError> {
    let mut operand = None;
    let mut else_expr = None;
    let mut whens = Vec::new();
    let mut seen_when = false;
    let mut seen_else = false;
    for child in node.children() {
        match child {
            SyntaxElement::Token(token)
                if token.kind() == TokenKind::Keyword(Keyword::Else) =>
            {
                seen_else = true;
            }
            SyntaxElement::Node(inner) => match inner.rule() {
                "whenClause" => {
                    seen_when = true;
                    let mut exprs = inner.nodes_named("expr");
                    let when = expr(exprs.next().ok_or(FromError::MissingNode("expr"))?)?;
                    let then = expr(exprs.next().ok_or(FromError::MissingNode("expr"))?)?;
                    whens.push(WhenClause { when, then });
                }
                "expr" => {
                    if seen_else {
                        else_expr = Some(expr(inner)?);
                    } else if !seen_when {
                        operand = Some(expr(inner)?);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
    Ok(CaseExpression {
        operand,
        whens,
        else_expr,
    })
}

fn function_call(node: &SyntaxNode) -> Result<FunctionCall, FromError> {
    let mut call = FunctionCall {
        name: first_ident(node).ok_or(FromError::MissingToken("functionCall"))?,
        ..Default::default()
    };
    if let Some(args) = node.node("functionArgs") {
        call.star = args.token(TokenKind::Star).is_some();
        call.distinct = args.has_keyword(Keyword::Distinct);
        for arg in args.nodes_named("functionArg") {
            if arg.has_keyword(Keyword::From) {
                call.from_separator = true;
            }
            for e in arg.nodes_named("expr") {
                call.args.push(expr(e)?);
            }
        }
        // A lone subquery argument is recorded on the call itself.
        if call.args.len() == 1 && !call.distinct && !call.from_separator {
            if let Expression::Subquery(_) = &call.args[0] {
                if let Expression::Subquery(select) = call.args.remove(0) {
                    call.subquery = Some(select);
                }
            }
        }
    }
    if let Some(nulls) = node.node("nullsTreatment") {
        call.ignore_nulls = Some(nulls.has_keyword(Keyword::Ignore));
    }
    if let Some(over) = node.node("overClause") {
        call.over = Some(over_clause(over)?);
    }
    Ok(call)
}

fn over_clause(node: &SyntaxNode) -> Result<WindowSpec, FromError> {
    let mut spec = WindowSpec::default();
    for partition in node.nodes_named("expr") {
        spec.partition_by.push(expr(partition)?);
    }
    if let Some(order) = node.node("orderByClause") {
        spec.order_by = order_by(order)?;
    }
    if let Some(frame) = node.node("windowFrame") {
        let units = if frame.has_keyword(Keyword::Rows) {
            FrameUnits::Rows
        } else if frame.has_keyword(Keyword::Range) {
            FrameUnits::Range
        } else {
            FrameUnits::Groups
        };
        let mut bounds = frame.nodes_named("frameBound");
        let start = frame_bound(bounds.next().ok_or(FromError::MissingNode("frameBound"))?)?;
        let end = match bounds.next() {
            Some(bound) => Some(frame_bound(bound)?),
            None => None,
        };
        let exclusion = frame.node("frameExclusion").map(|excl| {
            if excl.has_keyword(Keyword::Ties) {
                FrameExclusion::Ties
            } else if excl.has_keyword(Keyword::No) {
                FrameExclusion::NoOthers
            } else if excl.has_keyword(Keyword::Group) {
                FrameExclusion::Group
            } else {
                FrameExclusion::CurrentRow
            }
        });
        spec.frame = Some(WindowFrame {
            units,
            start,
            end,
            exclusion,
        });
    }
    Ok(spec)
}

fn frame_bound(node: &SyntaxNode) -> Result<FrameBound, FromError> {
    let following = node.has_keyword(Keyword::Following);
    if node.has_keyword(Keyword::Unbounded) {
        return Ok(if following {
            FrameBound::UnboundedFollowing
        } else {
            FrameBound::UnboundedPreceding
        });
    }
    if node.has_keyword(Keyword::Current) {
        return Ok(FrameBound::CurrentRow);
    }
    let bound = expr(req(node, "expr")?)?;
    Ok(if following {
        FrameBound::Following(bound)
    } else {
        FrameBound::Preceding(bound)
    })
}

fn type_name(node: &SyntaxNode) -> String {
    let mut out = String::new();
    for child in node.children() {
        match child {
            SyntaxElement::Token(token) if !token.kind().is_trivia() => {
                out.push_str(token.text());
            }
            SyntaxElement::Node(params) if params.rule() == "typeParams" => {
                for element in params.children() {
                    if let SyntaxElement::Token(token) = element {
                        if token.kind().is_trivia() {
                            continue;
                        }
                        if token.kind() == TokenKind::Comma {
                            out.push_str(", ");
                        } else {
                            out.push_str(token.text());
                        }
                    }
                }
            }
            _ => {}
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Token helpers
// ---------------------------------------------------------------------------

fn req<'a>(node: &'a SyntaxNode, rule: &'static str) -> Result<&'a SyntaxNode, FromError> {
    node.node(rule).ok_or(FromError::MissingNode(rule))
}

fn req_qualified_name(node: &SyntaxNode) -> Result<QualifiedName, FromError> {
    Ok(qualified_name(req(node, "qualifiedName")?))
}

fn qualified_name(node: &SyntaxNode) -> QualifiedName {
    let parts = node
        .tokens()
        .filter_map(|t| match t.kind() {
            TokenKind::Star => Some("*".to_string()),
            kind if is_ident_like(kind) => Some(ident_text(t)),
            _ => None,
        })
        .collect();
    QualifiedName::new(parts)
}

/// The first identifier-like token directly under `node`, unquoted.
fn first_ident(node: &SyntaxNode) -> Option<String> {
    node.tokens()
        .find(|t| is_ident_like(t.kind()))
        .map(ident_text)
}

/// The first identifier-like token after the keyword `kw`; used where the
/// keyword itself is identifier-like and punctuation may intervene, as in
/// `TIMESTAMP(ts)`.
fn ident_after(node: &SyntaxNode, kw: Keyword) -> Option<String> {
    let mut seen = false;
    for token in node.tokens() {
        if seen && is_ident_like(token.kind()) {
            return Some(ident_text(token));
        }
        if token.kind() == TokenKind::Keyword(kw) {
            seen = true;
        }
    }
    None
}

/// Identifier-like tokens between the node's parentheses, unquoted.
fn idents_in_parens(node: &SyntaxNode) -> Vec<String> {
    let mut inside = false;
    let mut out = Vec::new();
    for token in node.tokens() {
        match token.kind() {
            TokenKind::LParen => inside = true,
            TokenKind::RParen => inside = false,
            kind if inside && is_ident_like(kind) => out.push(ident_text(token)),
            _ => {}
        }
    }
    out
}

/// The direct token immediately following the keyword `kw`.
fn token_after(node: &SyntaxNode, kw: Keyword) -> Option<&Token> {
    let mut seen = false;
    for token in node.tokens() {
        if seen {
            return Some(token);
        }
        if token.kind() == TokenKind::Keyword(kw) {
            seen = true;
        }
    }
    None
}

/// Identifier-like tokens after the keyword `kw`, unquoted.
fn idents_after(node: &SyntaxNode, kw: Keyword) -> Vec<String> {
    let mut seen = false;
    let mut out = Vec::new();
    for token in node.tokens() {
        if seen && is_ident_like(token.kind()) {
            out.push(ident_text(token));
        }
        if token.kind() == TokenKind::Keyword(kw) {
            seen = true;
        }
    }
    out
}

fn owned_by(node: &SyntaxNode) -> Option<String> {
    node.node("ownedBy").and_then(owned_by_name)
}

fn owned_by_name(node: &SyntaxNode) -> Option<String> {
    if let Some(owned) = node.node("ownedBy") {
        return token_after(owned, Keyword::By).map(ident_text);
    }
    token_after(node, Keyword::By).map(ident_text)
}

/// All identifier-like tokens directly under `node`, unquoted.
fn ident_list(node: &SyntaxNode) -> Vec<String> {
    node.tokens()
        .filter(|t| is_ident_like(t.kind()))
        .map(ident_text)
        .collect()
}

fn ident_text(token: &Token) -> String {
    match token.kind() {
        TokenKind::QuotedIdentifier => unquote(token.text(), '"'),
        _ => token.text().to_string(),
    }
}

fn string_content(token: &Token) -> String {
    unquote(token.text(), '\'')
}

/// Strip the delimiters off a quoted lexeme and fold doubled quotes. Copes
/// with the unterminated form the lexer produces under errors.
fn unquote(text: &str, quote: char) -> String {
    let inner = text.strip_prefix(quote).unwrap_or(text);
    let inner = inner.strip_suffix(quote).unwrap_or(inner);
    let doubled: String = [quote, quote].iter().collect();
    inner.replace(&doubled, &quote.to_string())
}
