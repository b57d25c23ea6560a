use crate::expr::{write_list, Expression, FunctionCall};
use crate::name::{Ident, QualifiedName};
use std::fmt;

/// A SELECT statement, explicit or implicit.
///
/// An implicit select carries no column list and at least one FROM table
/// (`trades WHERE symbol = 'x'`); an explicit one has at least one column
/// item. Set operations chain off the left-hand side in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub declare: Vec<DeclareItem>,
    pub with: Vec<CommonTableExpression>,
    pub implicit: bool,
    pub distinct: bool,
    pub columns: Vec<SelectColumn>,
    pub from: Vec<TableRef>,
    pub where_clause: Option<Expression>,
    pub latest_on: Option<LatestOn>,
    pub sample_by: Option<SampleBy>,
    pub group_by: Vec<Expression>,
    pub pivot: Option<Pivot>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Limit>,
    pub set_ops: Vec<SetOperation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclareItem {
    pub variable: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpression {
    pub name: String,
    pub select: Box<SelectStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expr: Expression,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub source: TableSource,
    pub alias: Option<String>,
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Name(QualifiedName),
    Function(FunctionCall),
    Subquery(Box<SelectStatement>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub outer: bool,
    pub source: TableSource,
    pub alias: Option<String>,
    pub on: Option<Expression>,
    /// Raw tolerance literal, e.g. `1s`.
    pub tolerance: Option<String>,
    pub range: Option<(RangeBound, RangeBound)>,
    pub prevailing: Option<Prevailing>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Plain,
    Inner,
    Left,
    Cross,
    Asof,
    Lt,
    Splice,
    Window,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RangeBound {
    UnboundedPreceding,
    CurrentRow,
    /// Raw bound literal plus direction, e.g. `1m PRECEDING`.
    Preceding(String),
    Following(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prevailing {
    Include,
    Exclude,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatestOn {
    pub timestamp: QualifiedName,
    pub partition_by: Vec<QualifiedName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleBy {
    /// Raw sample interval as written: `1h`, `'15m'`, `100`.
    pub duration: String,
    pub from: Option<Expression>,
    pub to: Option<Expression>,
    pub fill: Vec<String>,
    pub align_to: Option<AlignTo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignTo {
    pub mode: AlignMode,
    pub time_zone: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignMode {
    Calendar,
    FirstObservation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    pub aggregates: Vec<PivotAggregate>,
    pub items: Vec<PivotItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotAggregate {
    pub expr: Expression,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotItem {
    pub column: String,
    pub values: Vec<PivotAggregate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expression,
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub lower_bound: Expression,
    pub upper_bound: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    pub kind: SetOpKind,
    pub all: bool,
    pub select: Box<SelectStatement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOpKind {
    Union,
    Except,
    Intersect,
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.declare.is_empty() {
            write!(f, "DECLARE ")?;
            for (i, item) in self.declare.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} := {}", item.variable, item.value)?;
            }
            write!(f, " ")?;
        }
        if !self.with.is_empty() {
            write!(f, "WITH ")?;
            for (i, cte) in self.with.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} AS ({})", Ident(&cte.name), cte.select)?;
            }
            write!(f, " ")?;
        }

        if self.implicit {
            write_table_refs(f, &self.from)?;
        } else {
            write!(f, "SELECT ")?;
            if self.distinct {
                write!(f, "DISTINCT ")?;
            }
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{column}")?;
            }
            if !self.from.is_empty() {
                write!(f, " FROM ")?;
                write_table_refs(f, &self.from)?;
            }
        }

        if let Some(where_clause) = &self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        if let Some(latest_on) = &self.latest_on {
            write!(f, " {latest_on}")?;
        }
        if let Some(sample_by) = &self.sample_by {
            write!(f, " {sample_by}")?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY ")?;
            write_list(f, &self.group_by)?;
        }
        if let Some(pivot) = &self.pivot {
            write!(f, " {pivot}")?;
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY ")?;
            for (i, item) in self.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {}", limit.lower_bound)?;
            if let Some(upper) = &limit.upper_bound {
                write!(f, ", {upper}")?;
            }
        }
        for set_op in &self.set_ops {
            let op = match set_op.kind {
                SetOpKind::Union => "UNION",
                SetOpKind::Except => "EXCEPT",
                SetOpKind::Intersect => "INTERSECT",
            };
            write!(f, " {op} ")?;
            if set_op.all {
                write!(f, "ALL ")?;
            }
            write!(f, "{}", set_op.select)?;
        }
        Ok(())
    }
}

fn write_table_refs(f: &mut fmt::Formatter<'_>, refs: &[TableRef]) -> fmt::Result {
    for (i, table_ref) in refs.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{table_ref}")?;
    }
    Ok(())
}

impl fmt::Display for SelectColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " {}", Ident(alias))?;
        }
        Ok(())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)?;
        if let Some(alias) = &self.alias {
            write!(f, " {}", Ident(alias))?;
        }
        for join in &self.joins {
            write!(f, " {join}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSource::Name(name) => write!(f, "{name}"),
            TableSource::Function(call) => write!(f, "{call}"),
            TableSource::Subquery(select) => write!(f, "({select})"),
        }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            JoinKind::Plain => None,
            JoinKind::Inner => Some("INNER"),
            JoinKind::Left => Some("LEFT"),
            JoinKind::Cross => Some("CROSS"),
            JoinKind::Asof => Some("ASOF"),
            JoinKind::Lt => Some("LT"),
            JoinKind::Splice => Some("SPLICE"),
            JoinKind::Window => Some("WINDOW"),
        };
        if let Some(kind) = kind {
            write!(f, "{kind} ")?;
        }
        if self.outer {
            write!(f, "OUTER ")?;
        }
        write!(f, "JOIN {}", self.source)?;
        if let Some(alias) = &self.alias {
            write!(f, " {}", Ident(alias))?;
        }
        if let Some(on) = &self.on {
            write!(f, " ON {on}")?;
        }
        if let Some(tolerance) = &self.tolerance {
            write!(f, " TOLERANCE {tolerance}")?;
        }
        if let Some((start, end)) = &self.range {
            write!(f, " RANGE BETWEEN {start} AND {end}")?;
        }
        match self.prevailing {
            Some(Prevailing::Include) => write!(f, " INCLUDE PREVAILING")?,
            Some(Prevailing::Exclude) => write!(f, " EXCLUDE PREVAILING")?,
            None => {}
        }
        Ok(())
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeBound::UnboundedPreceding => write!(f, "UNBOUNDED PRECEDING"),
            RangeBound::CurrentRow => write!(f, "CURRENT ROW"),
            RangeBound::Preceding(bound) => write!(f, "{bound} PRECEDING"),
            RangeBound::Following(bound) => write!(f, "{bound} FOLLOWING"),
        }
    }
}

impl fmt::Display for LatestOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LATEST ON {} PARTITION BY ", self.timestamp)?;
        for (i, name) in self.partition_by.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SampleBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SAMPLE BY {}", self.duration)?;
        if let Some(from) = &self.from {
            write!(f, " FROM {from}")?;
        }
        if let Some(to) = &self.to {
            write!(f, " TO {to}")?;
        }
        if !self.fill.is_empty() {
            write!(f, " FILL({})", self.fill.join(", "))?;
        }
        if let Some(align_to) = &self.align_to {
            write!(f, " ALIGN TO ")?;
            match align_to.mode {
                AlignMode::FirstObservation => write!(f, "FIRST OBSERVATION")?,
                AlignMode::Calendar => {
                    write!(f, "CALENDAR")?;
                    if let Some(tz) = &align_to.time_zone {
                        write!(f, " TIME ZONE '{}'", tz.replace('\'', "''"))?;
                    }
                    if let Some(offset) = &align_to.offset {
                        write!(f, " WITH OFFSET '{}'", offset.replace('\'', "''"))?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Pivot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PIVOT (")?;
        for (i, agg) in self.aggregates.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", agg.expr)?;
            if let Some(alias) = &agg.alias {
                write!(f, " {}", Ident(alias))?;
            }
        }
        // Only the first pivot item takes the leading FOR.
        for (i, item) in self.items.iter().enumerate() {
            if i == 0 {
                write!(f, " FOR ")?;
            } else {
                write!(f, " ")?;
            }
            write!(f, "{} IN (", Ident(&item.column))?;
            for (j, value) in item.values.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", value.expr)?;
                if let Some(alias) = &value.alias {
                    write!(f, " {}", Ident(alias))?;
                }
            }
            write!(f, ")")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for OrderByItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match self.direction {
            Some(Direction::Asc) => write!(f, " ASC"),
            Some(Direction::Desc) => write!(f, " DESC"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Literal;

    fn col(name: &str) -> Expression {
        Expression::Column(QualifiedName::single(name))
    }

    #[test]
    fn it_encodes_a_plain_select() {
        let select = SelectStatement {
            columns: vec![SelectColumn {
                expr: col("*"),
                alias: None,
            }],
            from: vec![TableRef {
                source: TableSource::Name(QualifiedName::single("trades")),
                alias: None,
                joins: vec![],
            }],
            ..Default::default()
        };
        assert_eq!(select.to_string(), "SELECT * FROM trades");
    }

    #[test]
    fn it_encodes_sample_by_with_alignment() {
        let select = SelectStatement {
            columns: vec![SelectColumn {
                expr: Expression::FunctionCall(Box::new(FunctionCall {
                    name: "avg".into(),
                    args: vec![col("price")],
                    ..Default::default()
                })),
                alias: None,
            }],
            from: vec![TableRef {
                source: TableSource::Name(QualifiedName::single("trades")),
                alias: None,
                joins: vec![],
            }],
            sample_by: Some(SampleBy {
                duration: "1h".into(),
                from: None,
                to: None,
                fill: vec!["PREV".into()],
                align_to: Some(AlignTo {
                    mode: AlignMode::Calendar,
                    time_zone: None,
                    offset: None,
                }),
            }),
            ..Default::default()
        };
        assert_eq!(
            select.to_string(),
            "SELECT avg(price) FROM trades SAMPLE BY 1h FILL(PREV) ALIGN TO CALENDAR"
        );
    }

    #[test]
    fn it_encodes_asof_joins_with_tolerance() {
        let select = SelectStatement {
            columns: vec![SelectColumn {
                expr: col("*"),
                alias: None,
            }],
            from: vec![TableRef {
                source: TableSource::Name(QualifiedName::single("trades")),
                alias: Some("t".into()),
                joins: vec![Join {
                    kind: JoinKind::Asof,
                    outer: false,
                    source: TableSource::Name(QualifiedName::single("quotes")),
                    alias: Some("q".into()),
                    on: None,
                    tolerance: Some("1s".into()),
                    range: None,
                    prevailing: None,
                }],
            }],
            ..Default::default()
        };
        assert_eq!(
            select.to_string(),
            "SELECT * FROM trades t ASOF JOIN quotes q TOLERANCE 1s"
        );
    }

    #[test]
    fn it_encodes_implicit_selects() {
        let select = SelectStatement {
            implicit: true,
            from: vec![TableRef {
                source: TableSource::Name(QualifiedName::single("trades")),
                alias: None,
                joins: vec![],
            }],
            where_clause: Some(Expression::Binary {
                op: ">".into(),
                left: Box::new(col("price")),
                right: Box::new(Expression::Literal(Literal::number("0"))),
            }),
            ..Default::default()
        };
        assert_eq!(select.to_string(), "trades WHERE price > 0");
    }

    #[test]
    fn it_encodes_set_operations_after_order_by() {
        let select = SelectStatement {
            columns: vec![SelectColumn {
                expr: col("a"),
                alias: None,
            }],
            from: vec![TableRef {
                source: TableSource::Name(QualifiedName::single("t1")),
                alias: None,
                joins: vec![],
            }],
            order_by: vec![OrderByItem {
                expr: col("a"),
                direction: Some(Direction::Desc),
            }],
            set_ops: vec![SetOperation {
                kind: SetOpKind::Union,
                all: true,
                select: Box::new(SelectStatement {
                    columns: vec![SelectColumn {
                        expr: col("a"),
                        alias: None,
                    }],
                    from: vec![TableRef {
                        source: TableSource::Name(QualifiedName::single("t2")),
                        alias: None,
                        joins: vec![],
                    }],
                    ..Default::default()
                }),
            }],
            ..Default::default()
        };
        assert_eq!(
            select.to_string(),
            "SELECT a FROM t1 ORDER BY a DESC UNION ALL SELECT a FROM t2"
        );
    }
}
