//! Query productions: SELECT in its explicit and implicit forms, CTEs,
//! joins, and the QuestDB time-series clauses (SAMPLE BY, LATEST ON, PIVOT).

use super::{alt, ident, kw, many, opt, peek, pident, pk, r, sep_by, seq, t, Rule};
use crate::keyword::Keyword;
use crate::token::TokenKind;
use indexmap::IndexMap;

pub(super) fn register(rules: &mut IndexMap<&'static str, Rule>) {
    rules.insert(
        "selectStatement",
        seq![
            opt(r("declareClause")),
            opt(r("withClause")),
            alt![r("selectBody"), r("implicitSelect")],
            many(r("setOpTail"))
        ],
    );
    rules.insert(
        "declareClause",
        seq![
            kw(Keyword::Declare),
            sep_by(r("declareItem"), t(TokenKind::Comma))
        ],
    );
    rules.insert(
        "declareItem",
        seq![t(TokenKind::Variable), t(TokenKind::Assign), r("expr")],
    );
    rules.insert(
        "withClause",
        seq![kw(Keyword::With), sep_by(r("cte"), t(TokenKind::Comma))],
    );
    rules.insert(
        "cte",
        seq![
            ident(),
            kw(Keyword::As),
            t(TokenKind::LParen),
            r("selectStatement"),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "selectBody",
        seq![
            kw(Keyword::Select),
            opt(kw(Keyword::Distinct)),
            r("selectColumns"),
            opt(seq![kw(Keyword::From), r("fromClause")]),
            r("queryTail")
        ],
    );
    rules.insert("implicitSelect", seq![r("fromClause"), r("queryTail")]);
    rules.insert(
        "selectColumns",
        sep_by(r("selectColumn"), t(TokenKind::Comma)),
    );
    rules.insert(
        "selectColumn",
        alt![
            t(TokenKind::Star),
            seq![r("expr"), opt(r("aliasClause"))]
        ],
    );
    rules.insert("aliasClause", seq![opt(kw(Keyword::As)), ident()]);
    rules.insert("fromClause", sep_by(r("tableRef"), t(TokenKind::Comma)));
    rules.insert(
        "tableRef",
        seq![
            r("tableSource"),
            opt(r("aliasClause")),
            many(r("joinClause"))
        ],
    );
    rules.insert(
        "tableSource",
        alt![
            peek(vec![pident(), pk(TokenKind::LParen)], r("functionCall")),
            r("qualifiedName"),
            r("subquery"),
        ],
    );
    rules.insert(
        "joinClause",
        seq![
            opt(r("joinKind")),
            kw(Keyword::Join),
            r("tableSource"),
            opt(r("aliasClause")),
            opt(seq![kw(Keyword::On), r("expr")]),
            opt(seq![
                kw(Keyword::Tolerance),
                alt![t(TokenKind::Duration), t(TokenKind::String)]
            ]),
            opt(r("joinRange")),
            opt(r("joinPrevailing"))
        ],
    );
    rules.insert(
        "joinKind",
        seq![
            alt![
                kw(Keyword::Inner),
                kw(Keyword::Left),
                kw(Keyword::Cross),
                kw(Keyword::Asof),
                kw(Keyword::Lt),
                kw(Keyword::Splice),
                kw(Keyword::Window)
            ],
            opt(kw(Keyword::Outer))
        ],
    );
    rules.insert(
        "joinRange",
        seq![
            kw(Keyword::Range),
            kw(Keyword::Between),
            r("rangeBound"),
            kw(Keyword::And),
            r("rangeBound")
        ],
    );
    rules.insert(
        "rangeBound",
        alt![
            seq![kw(Keyword::Unbounded), kw(Keyword::Preceding)],
            seq![kw(Keyword::Current), kw(Keyword::Row)],
            seq![
                alt![
                    t(TokenKind::Duration),
                    t(TokenKind::Number),
                    t(TokenKind::String)
                ],
                alt![kw(Keyword::Preceding), kw(Keyword::Following)]
            ],
        ],
    );
    rules.insert(
        "joinPrevailing",
        seq![
            alt![kw(Keyword::Include), kw(Keyword::Exclude)],
            kw(Keyword::Prevailing)
        ],
    );
    rules.insert("whereClause", seq![kw(Keyword::Where), r("expr")]);
    rules.insert(
        "queryTail",
        seq![
            opt(r("whereClause")),
            opt(r("latestOnClause")),
            opt(r("sampleByClause")),
            opt(r("groupByClause")),
            opt(r("pivotClause")),
            opt(r("orderByClause")),
            opt(r("limitClause"))
        ],
    );
    rules.insert(
        "latestOnClause",
        seq![
            kw(Keyword::Latest),
            kw(Keyword::On),
            r("qualifiedName"),
            kw(Keyword::Partition),
            kw(Keyword::By),
            sep_by(r("qualifiedName"), t(TokenKind::Comma))
        ],
    );
    rules.insert(
        "sampleByClause",
        seq![
            kw(Keyword::Sample),
            kw(Keyword::By),
            alt![
                t(TokenKind::Duration),
                t(TokenKind::Number),
                t(TokenKind::String)
            ],
            opt(seq![kw(Keyword::From), r("expr")]),
            opt(seq![kw(Keyword::To), r("expr")]),
            opt(r("fillClause")),
            opt(r("alignToClause"))
        ],
    );
    rules.insert(
        "fillClause",
        seq![
            kw(Keyword::Fill),
            t(TokenKind::LParen),
            sep_by(r("fillValue"), t(TokenKind::Comma)),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "fillValue",
        alt![
            kw(Keyword::Null),
            kw(Keyword::Nan),
            t(TokenKind::Number),
            seq![t(TokenKind::Minus), t(TokenKind::Number)],
            ident()
        ],
    );
    rules.insert(
        "alignToClause",
        seq![
            kw(Keyword::Align),
            kw(Keyword::To),
            alt![
                seq![kw(Keyword::First), kw(Keyword::Observation)],
                seq![
                    kw(Keyword::Calendar),
                    opt(seq![
                        kw(Keyword::Time),
                        kw(Keyword::Zone),
                        t(TokenKind::String)
                    ]),
                    opt(seq![
                        kw(Keyword::With),
                        kw(Keyword::Offset),
                        t(TokenKind::String)
                    ])
                ]
            ]
        ],
    );
    rules.insert(
        "groupByClause",
        seq![
            kw(Keyword::Group),
            kw(Keyword::By),
            sep_by(r("expr"), t(TokenKind::Comma))
        ],
    );
    rules.insert(
        "orderByClause",
        seq![
            kw(Keyword::Order),
            kw(Keyword::By),
            sep_by(r("orderItem"), t(TokenKind::Comma))
        ],
    );
    rules.insert(
        "orderItem",
        seq![r("expr"), opt(alt![kw(Keyword::Asc), kw(Keyword::Desc)])],
    );
    rules.insert(
        "limitClause",
        seq![
            kw(Keyword::Limit),
            r("expr"),
            opt(seq![t(TokenKind::Comma), r("expr")])
        ],
    );
    rules.insert(
        "setOpTail",
        seq![
            alt![
                kw(Keyword::Union),
                kw(Keyword::Except),
                kw(Keyword::Intersect)
            ],
            opt(kw(Keyword::All)),
            alt![r("selectBody"), r("implicitSelect")]
        ],
    );
    rules.insert(
        "pivotClause",
        seq![
            kw(Keyword::Pivot),
            t(TokenKind::LParen),
            sep_by(r("pivotAggregate"), t(TokenKind::Comma)),
            kw(Keyword::For),
            r("pivotItem"),
            many(r("pivotItem")),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "pivotAggregate",
        seq![r("expr"), opt(r("aliasClause"))],
    );
    rules.insert(
        "pivotItem",
        seq![
            ident(),
            kw(Keyword::In),
            t(TokenKind::LParen),
            sep_by(r("pivotValue"), t(TokenKind::Comma)),
            t(TokenKind::RParen)
        ],
    );
    rules.insert("pivotValue", seq![r("expr"), opt(r("aliasClause"))]);
}
