use crate::name::{write_string, QualifiedName};
use crate::select::{OrderByItem, SelectStatement};
use std::fmt;

/// An expression.
///
/// Each variant serializes to one canonical textual form through `Display`;
/// parentheses appear only where the source carried them (`Paren`,
/// subqueries) — precedence is preserved structurally, never by defensive
/// parenthesization.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Binary {
        op: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        op: String,
        expr: Box<Expression>,
    },
    Column(QualifiedName),
    Variable(String),
    Literal(Literal),
    FunctionCall(Box<FunctionCall>),
    Case(Box<CaseExpression>),
    Cast {
        expr: Box<Expression>,
        type_name: String,
    },
    TypeCast {
        expr: Box<Expression>,
        type_name: String,
    },
    In {
        expr: Box<Expression>,
        not: bool,
        values: Vec<Expression>,
        parenthesized: bool,
    },
    Between {
        expr: Box<Expression>,
        not: bool,
        low: Box<Expression>,
        high: Box<Expression>,
    },
    Within {
        expr: Box<Expression>,
        values: Vec<Expression>,
    },
    IsNull {
        expr: Box<Expression>,
        not: bool,
    },
    Paren {
        expr: Box<Expression>,
        additional: Vec<Expression>,
    },
    ArrayLiteral {
        elements: Vec<Expression>,
        has_array_keyword: bool,
    },
    ArrayAccess {
        array: Box<Expression>,
        subscripts: Vec<Subscript>,
    },
    Subquery(Box<SelectStatement>),
}

/// One subscript of an array access: an index or a slice.
#[derive(Debug, Clone, PartialEq)]
pub enum Subscript {
    Index(Expression),
    Slice {
        start: Option<Expression>,
        end: Option<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
    Null,
    Duration,
    Geohash,
}

/// A literal with its parsed value and, for numbers, the raw lexeme so the
/// serializer can preserve the source spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub value: String,
    pub raw: Option<String>,
}

impl Literal {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: LiteralKind::String,
            value: value.into(),
            raw: None,
        }
    }

    pub fn number(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            kind: LiteralKind::Number,
            value: raw.clone(),
            raw: Some(raw),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LiteralKind::String => write_string(f, &self.value),
            LiteralKind::Number => match &self.raw {
                Some(raw) => f.write_str(raw),
                None => f.write_str(&self.value),
            },
            LiteralKind::Boolean | LiteralKind::Null => {
                f.write_str(&self.value.to_ascii_uppercase())
            }
            LiteralKind::Duration | LiteralKind::Geohash => f.write_str(&self.value),
        }
    }
}

/// A function call, including window-function modifiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
    pub distinct: bool,
    pub star: bool,
    /// `extract(part FROM ts)`-style calls separate the first two arguments
    /// with `FROM` instead of a comma.
    pub from_separator: bool,
    pub subquery: Option<Box<SelectStatement>>,
    pub ignore_nulls: Option<bool>,
    pub over: Option<WindowSpec>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowSpec {
    pub partition_by: Vec<Expression>,
    pub order_by: Vec<OrderByItem>,
    pub frame: Option<WindowFrame>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    pub units: FrameUnits,
    pub start: FrameBound,
    pub end: Option<FrameBound>,
    pub exclusion: Option<FrameExclusion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnits {
    Rows,
    Range,
    Groups,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameBound {
    UnboundedPreceding,
    UnboundedFollowing,
    CurrentRow,
    Preceding(Expression),
    Following(Expression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameExclusion {
    CurrentRow,
    Group,
    Ties,
    NoOthers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpression {
    pub operand: Option<Expression>,
    pub whens: Vec<WhenClause>,
    pub else_expr: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub when: Expression,
    pub then: Expression,
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Binary { op, left, right } => {
                write!(f, "{left} {op} {right}")
            }
            Expression::Unary { op, expr } => {
                // Word operators (NOT) need a space; sign operators do not.
                if op.chars().all(|c| c.is_ascii_alphabetic()) {
                    write!(f, "{op} {expr}")
                } else {
                    write!(f, "{op}{expr}")
                }
            }
            Expression::Column(name) => write!(f, "{name}"),
            Expression::Variable(name) => f.write_str(name),
            Expression::Literal(lit) => write!(f, "{lit}"),
            Expression::FunctionCall(call) => write!(f, "{call}"),
            Expression::Case(case) => write!(f, "{case}"),
            Expression::Cast { expr, type_name } => {
                write!(f, "CAST({expr} AS {type_name})")
            }
            Expression::TypeCast { expr, type_name } => write!(f, "{expr}::{type_name}"),
            Expression::In {
                expr,
                not,
                values,
                parenthesized,
            } => {
                write!(f, "{expr} ")?;
                if *not {
                    write!(f, "NOT ")?;
                }
                write!(f, "IN ")?;
                if *parenthesized {
                    write!(f, "(")?;
                    write_list(f, values)?;
                    write!(f, ")")
                } else {
                    write_list(f, values)
                }
            }
            Expression::Between {
                expr,
                not,
                low,
                high,
            } => {
                write!(f, "{expr} ")?;
                if *not {
                    write!(f, "NOT ")?;
                }
                write!(f, "BETWEEN {low} AND {high}")
            }
            Expression::Within { expr, values } => {
                write!(f, "{expr} WITHIN(")?;
                write_list(f, values)?;
                write!(f, ")")
            }
            Expression::IsNull { expr, not } => {
                write!(f, "{expr} IS ")?;
                if *not {
                    write!(f, "NOT ")?;
                }
                write!(f, "NULL")
            }
            Expression::Paren { expr, additional } => {
                write!(f, "({expr}")?;
                for extra in additional {
                    write!(f, ", {extra}")?;
                }
                write!(f, ")")
            }
            Expression::ArrayLiteral {
                elements,
                has_array_keyword,
            } => {
                if *has_array_keyword {
                    write!(f, "ARRAY")?;
                }
                write!(f, "[")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            Expression::ArrayAccess { array, subscripts } => {
                write!(f, "{array}[")?;
                for (i, sub) in subscripts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{sub}")?;
                }
                write!(f, "]")
            }
            Expression::Subquery(select) => write!(f, "({select})"),
        }
    }
}

impl fmt::Display for Subscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subscript::Index(expr) => write!(f, "{expr}"),
            Subscript::Slice { start, end } => {
                if let Some(start) = start {
                    write!(f, "{start}")?;
                }
                write!(f, ":")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        if self.star {
            write!(f, "*")?;
        } else if let Some(subquery) = &self.subquery {
            write!(f, "({subquery})")?;
        } else {
            if self.distinct {
                write!(f, "DISTINCT ")?;
            }
            if self.from_separator && self.args.len() == 2 {
                write!(f, "{} FROM {}", self.args[0], self.args[1])?;
            } else {
                write_list(f, &self.args)?;
            }
        }
        write!(f, ")")?;
        match self.ignore_nulls {
            Some(true) => write!(f, " IGNORE NULLS")?,
            Some(false) => write!(f, " RESPECT NULLS")?,
            None => {}
        }
        if let Some(over) = &self.over {
            write!(f, " OVER ({over})")?;
        }
        Ok(())
    }
}

impl fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut space = "";
        if !self.partition_by.is_empty() {
            write!(f, "PARTITION BY ")?;
            write_list(f, &self.partition_by)?;
            space = " ";
        }
        if !self.order_by.is_empty() {
            write!(f, "{space}ORDER BY ")?;
            for (i, item) in self.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            space = " ";
        }
        if let Some(frame) = &self.frame {
            write!(f, "{space}{frame}")?;
        }
        Ok(())
    }
}

impl fmt::Display for WindowFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = match self.units {
            FrameUnits::Rows => "ROWS",
            FrameUnits::Range => "RANGE",
            FrameUnits::Groups => "GROUPS",
        };
        write!(f, "{units} ")?;
        match &self.end {
            Some(end) => write!(f, "BETWEEN {} AND {end}", self.start)?,
            None => write!(f, "{}", self.start)?,
        }
        if let Some(exclusion) = &self.exclusion {
            let text = match exclusion {
                FrameExclusion::CurrentRow => "EXCLUDE CURRENT ROW",
                FrameExclusion::Group => "EXCLUDE GROUP",
                FrameExclusion::Ties => "EXCLUDE TIES",
                FrameExclusion::NoOthers => "EXCLUDE NO OTHERS",
            };
            write!(f, " {text}")?;
        }
        Ok(())
    }
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameBound::UnboundedPreceding => write!(f, "UNBOUNDED PRECEDING"),
            FrameBound::UnboundedFollowing => write!(f, "UNBOUNDED FOLLOWING"),
            FrameBound::CurrentRow => write!(f, "CURRENT ROW"),
            FrameBound::Preceding(expr) => write!(f, "{expr} PRECEDING"),
            FrameBound::Following(expr) => write!(f, "{expr} FOLLOWING"),
        }
    }
}

impl fmt::Display for CaseExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CASE")?;
        if let Some(operand) = &self.operand {
            write!(f, " {operand}")?;
        }
        for when in &self.whens {
            write!(f, " WHEN {} THEN {}", when.when, when.then)?;
        }
        if let Some(else_expr) = &self.else_expr {
            write!(f, " ELSE {else_expr}")?;
        }
        write!(f, " END")
    }
}

pub(crate) fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expression]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str) -> Expression {
        Expression::Column(QualifiedName::single(name))
    }

    #[test]
    fn it_encodes_binary_chains() {
        let expr = Expression::Binary {
            op: "=".into(),
            left: Box::new(col("symbol")),
            right: Box::new(Expression::Literal(Literal::string("BTC-USD"))),
        };
        assert_eq!(expr.to_string(), "symbol = 'BTC-USD'");
    }

    #[test]
    fn it_encodes_function_calls() {
        let call = FunctionCall {
            name: "count".into(),
            star: true,
            ..Default::default()
        };
        assert_eq!(call.to_string(), "count(*)");

        let call = FunctionCall {
            name: "avg".into(),
            args: vec![col("price")],
            ..Default::default()
        };
        assert_eq!(call.to_string(), "avg(price)");
    }

    #[test]
    fn it_encodes_windowed_calls() {
        let call = FunctionCall {
            name: "first_value".into(),
            args: vec![col("price")],
            ignore_nulls: Some(true),
            over: Some(WindowSpec {
                partition_by: vec![col("symbol")],
                order_by: vec![],
                frame: Some(WindowFrame {
                    units: FrameUnits::Rows,
                    start: FrameBound::UnboundedPreceding,
                    end: Some(FrameBound::CurrentRow),
                    exclusion: None,
                }),
            }),
            ..Default::default()
        };
        assert_eq!(
            call.to_string(),
            "first_value(price) IGNORE NULLS OVER (PARTITION BY symbol ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)"
        );
    }

    #[test]
    fn it_encodes_array_access_and_slices() {
        let expr = Expression::ArrayAccess {
            array: Box::new(col("a")),
            subscripts: vec![
                Subscript::Index(Expression::Literal(Literal::number("1"))),
                Subscript::Slice {
                    start: Some(Expression::Literal(Literal::number("2"))),
                    end: None,
                },
            ],
        };
        assert_eq!(expr.to_string(), "a[1, 2:]");
    }

    #[test]
    fn it_encodes_case_expressions() {
        let case = CaseExpression {
            operand: None,
            whens: vec![WhenClause {
                when: Expression::IsNull {
                    expr: Box::new(col("x")),
                    not: false,
                },
                then: Expression::Literal(Literal::number("0")),
            }],
            else_expr: Some(col("x")),
        };
        assert_eq!(case.to_string(), "CASE WHEN x IS NULL THEN 0 ELSE x END");
    }
}
