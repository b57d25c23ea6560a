use crate::expr::{write_list, Expression};
use crate::name::{Ident, QualifiedName};
use crate::select::{CommonTableExpression, SelectStatement, TableRef};
use std::fmt;

/// An INSERT statement: `VALUES` rows or an inner select, never both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertStatement {
    pub with: Vec<CommonTableExpression>,
    pub atomic: bool,
    /// Raw batch size when `BATCH n` was given.
    pub batch: Option<String>,
    pub table: QualifiedName,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Expression>>,
    pub select: Option<Box<SelectStatement>>,
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_with(f, &self.with)?;
        write!(f, "INSERT ")?;
        if self.atomic {
            write!(f, "ATOMIC ")?;
        }
        if let Some(batch) = &self.batch {
            write!(f, "BATCH {batch} ")?;
        }
        write!(f, "INTO {}", self.table)?;
        if !self.columns.is_empty() {
            write!(f, " (")?;
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", Ident(column))?;
            }
            write!(f, ")")?;
        }
        if let Some(select) = &self.select {
            write!(f, " {select}")?;
        } else {
            write!(f, " VALUES ")?;
            for (i, row) in self.values.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "(")?;
                write_list(f, row)?;
                write!(f, ")")?;
            }
        }
        Ok(())
    }
}

/// An UPDATE statement; QuestDB allows a FROM clause with joins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateStatement {
    pub with: Vec<CommonTableExpression>,
    pub table: QualifiedName,
    pub alias: Option<String>,
    pub set: Vec<SetAssignment>,
    pub from: Vec<TableRef>,
    pub where_clause: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetAssignment {
    pub column: QualifiedName,
    pub value: Expression,
}

impl fmt::Display for UpdateStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_with(f, &self.with)?;
        write!(f, "UPDATE {}", self.table)?;
        if let Some(alias) = &self.alias {
            write!(f, " {}", Ident(alias))?;
        }
        write!(f, " SET ")?;
        for (i, assignment) in self.set.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", assignment.column, assignment.value)?;
        }
        if !self.from.is_empty() {
            write!(f, " FROM ")?;
            for (i, table_ref) in self.from.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{table_ref}")?;
            }
        }
        if let Some(where_clause) = &self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        Ok(())
    }
}

pub(crate) fn write_with(
    f: &mut fmt::Formatter<'_>,
    with: &[CommonTableExpression],
) -> fmt::Result {
    if with.is_empty() {
        return Ok(());
    }
    write!(f, "WITH ")?;
    for (i, cte) in with.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{} AS ({})", Ident(&cte.name), cte.select)?;
    }
    write!(f, " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Literal;

    #[test]
    fn it_encodes_values_inserts() {
        let insert = InsertStatement {
            table: QualifiedName::single("trades"),
            columns: vec!["ts".into(), "price".into()],
            values: vec![vec![
                Expression::Literal(Literal::string("2024-01-01")),
                Expression::Literal(Literal::number("42.5")),
            ]],
            ..Default::default()
        };
        assert_eq!(
            insert.to_string(),
            "INSERT INTO trades (ts, price) VALUES ('2024-01-01', 42.5)"
        );
    }

    #[test]
    fn it_encodes_batched_insert_select() {
        let insert = InsertStatement {
            batch: Some("10000".into()),
            table: QualifiedName::single("archive"),
            select: Some(Box::new(SelectStatement {
                columns: vec![crate::select::SelectColumn {
                    expr: Expression::Column(QualifiedName::single("*")),
                    alias: None,
                }],
                from: vec![TableRef {
                    source: crate::select::TableSource::Name(QualifiedName::single("trades")),
                    alias: None,
                    joins: vec![],
                }],
                ..Default::default()
            })),
            ..Default::default()
        };
        assert_eq!(
            insert.to_string(),
            "INSERT BATCH 10000 INTO archive SELECT * FROM trades"
        );
    }

    #[test]
    fn it_encodes_updates() {
        let update = UpdateStatement {
            table: QualifiedName::single("spreads"),
            set: vec![SetAssignment {
                column: QualifiedName::single("spread"),
                value: Expression::Binary {
                    op: "-".into(),
                    left: Box::new(Expression::Column(QualifiedName::single("ask"))),
                    right: Box::new(Expression::Column(QualifiedName::single("bid"))),
                },
            }],
            where_clause: Some(Expression::IsNull {
                expr: Box::new(Expression::Column(QualifiedName::single("spread"))),
                not: false,
            }),
            ..Default::default()
        };
        assert_eq!(
            update.to_string(),
            "UPDATE spreads SET spread = ask - bid WHERE spread IS NULL"
        );
    }
}
