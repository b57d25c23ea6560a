//! The expression grammar: a precedence-climbing chain from `expr` down to
//! `primaryExpr`, with array access and `::` casts as postfix forms.

use super::{
    alt, ident, kw, many, many1, opt, peek, pident, pk, pk_kw, pone, r, sep_by, seq, t, Rule,
};
use crate::keyword::Keyword;
use crate::token::TokenKind;
use indexmap::IndexMap;

pub(super) fn register(rules: &mut IndexMap<&'static str, Rule>) {
    rules.insert("expr", r("orExpr"));
    rules.insert(
        "orExpr",
        seq![r("andExpr"), many(seq![kw(Keyword::Or), r("andExpr")])],
    );
    rules.insert(
        "andExpr",
        seq![r("notExpr"), many(seq![kw(Keyword::And), r("notExpr")])],
    );
    rules.insert("notExpr", seq![many(kw(Keyword::Not)), r("compareExpr")]);
    rules.insert(
        "compareExpr",
        seq![r("addExpr"), many(r("compareTail"))],
    );
    rules.insert(
        "compareTail",
        alt![
            seq![
                alt![
                    t(TokenKind::Eq),
                    t(TokenKind::Neq),
                    t(TokenKind::Lt),
                    t(TokenKind::LtEq),
                    t(TokenKind::Gt),
                    t(TokenKind::GtEq),
                    t(TokenKind::Tilde),
                    t(TokenKind::NotTilde)
                ],
                r("addExpr")
            ],
            peek(vec![pk_kw(Keyword::Between)], r("betweenTail")),
            peek(vec![pk_kw(Keyword::Not), pk_kw(Keyword::Between)], r("betweenTail")),
            peek(vec![pk_kw(Keyword::In)], r("inTail")),
            peek(vec![pk_kw(Keyword::Not), pk_kw(Keyword::In)], r("inTail")),
            peek(vec![pk_kw(Keyword::Like)], r("likeTail")),
            peek(vec![pk_kw(Keyword::Ilike)], r("likeTail")),
            peek(vec![pk_kw(Keyword::Not), pk_kw(Keyword::Like)], r("likeTail")),
            peek(vec![pk_kw(Keyword::Not), pk_kw(Keyword::Ilike)], r("likeTail")),
            r("isTail"),
            r("withinTail"),
        ],
    );
    rules.insert(
        "betweenTail",
        seq![
            opt(kw(Keyword::Not)),
            kw(Keyword::Between),
            r("addExpr"),
            kw(Keyword::And),
            r("addExpr")
        ],
    );
    rules.insert(
        "inTail",
        seq![opt(kw(Keyword::Not)), kw(Keyword::In), r("inOperand")],
    );
    rules.insert(
        "inOperand",
        alt![
            peek(
                vec![
                    pk(TokenKind::LParen),
                    pone(vec![
                        TokenKind::Keyword(Keyword::Select),
                        TokenKind::Keyword(Keyword::With)
                    ])
                ],
                r("subquery")
            ),
            seq![
                t(TokenKind::LParen),
                sep_by(r("expr"), t(TokenKind::Comma)),
                t(TokenKind::RParen)
            ],
            r("addExpr"),
        ],
    );
    rules.insert(
        "likeTail",
        seq![
            opt(kw(Keyword::Not)),
            alt![kw(Keyword::Like), kw(Keyword::Ilike)],
            r("addExpr")
        ],
    );
    rules.insert(
        "isTail",
        seq![kw(Keyword::Is), opt(kw(Keyword::Not)), kw(Keyword::Null)],
    );
    rules.insert(
        "withinTail",
        seq![
            kw(Keyword::Within),
            t(TokenKind::LParen),
            sep_by(r("expr"), t(TokenKind::Comma)),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "addExpr",
        seq![
            r("mulExpr"),
            many(seq![
                alt![t(TokenKind::Plus), t(TokenKind::Minus), t(TokenKind::Concat)],
                r("mulExpr")
            ])
        ],
    );
    rules.insert(
        "mulExpr",
        seq![
            r("unaryExpr"),
            many(seq![
                alt![t(TokenKind::Star), t(TokenKind::Slash), t(TokenKind::Percent)],
                r("unaryExpr")
            ])
        ],
    );
    rules.insert(
        "unaryExpr",
        seq![
            opt(alt![t(TokenKind::Minus), t(TokenKind::Plus)]),
            r("postfixExpr")
        ],
    );
    rules.insert(
        "postfixExpr",
        seq![
            r("primaryExpr"),
            many(alt![r("arrayAccess"), r("typeCastTail")])
        ],
    );
    rules.insert(
        "arrayAccess",
        seq![
            t(TokenKind::LBracket),
            sep_by(r("subscript"), t(TokenKind::Comma)),
            t(TokenKind::RBracket)
        ],
    );
    rules.insert(
        "subscript",
        alt![
            seq![t(TokenKind::Colon), opt(r("expr"))],
            seq![
                r("expr"),
                opt(seq![t(TokenKind::Colon), opt(r("expr"))])
            ],
        ],
    );
    rules.insert(
        "typeCastTail",
        seq![t(TokenKind::DoubleColon), r("typeName")],
    );
    rules.insert(
        "primaryExpr",
        alt![
            r("literal"),
            t(TokenKind::Variable),
            r("caseExpr"),
            r("castExpr"),
            // `ARRAY` is an identifier-keyword; only commit to an array
            // literal when a bracket follows.
            peek(
                vec![pk_kw(Keyword::Array), pk(TokenKind::LBracket)],
                r("arrayLiteral")
            ),
            peek(vec![pk(TokenKind::LBracket)], r("arrayLiteral")),
            peek(
                vec![
                    pk(TokenKind::LParen),
                    pone(vec![
                        TokenKind::Keyword(Keyword::Select),
                        TokenKind::Keyword(Keyword::With)
                    ])
                ],
                r("subquery")
            ),
            r("parenExpr"),
            peek(vec![pident(), pk(TokenKind::LParen)], r("functionCall")),
            r("qualifiedName"),
        ],
    );
    rules.insert(
        "literal",
        alt![
            t(TokenKind::String),
            t(TokenKind::Number),
            t(TokenKind::Duration),
            t(TokenKind::Geohash),
            kw(Keyword::True),
            kw(Keyword::False),
            kw(Keyword::Null),
            kw(Keyword::Nan)
        ],
    );
    rules.insert(
        "parenExpr",
        seq![
            t(TokenKind::LParen),
            sep_by(r("expr"), t(TokenKind::Comma)),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "subquery",
        seq![
            t(TokenKind::LParen),
            r("selectStatement"),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "qualifiedName",
        seq![
            ident(),
            many(seq![
                t(TokenKind::Dot),
                alt![ident(), t(TokenKind::Star)]
            ])
        ],
    );
    rules.insert(
        "functionCall",
        seq![
            ident(),
            t(TokenKind::LParen),
            opt(r("functionArgs")),
            t(TokenKind::RParen),
            opt(r("nullsTreatment")),
            opt(r("overClause"))
        ],
    );
    rules.insert(
        "functionArgs",
        alt![
            t(TokenKind::Star),
            seq![
                opt(kw(Keyword::Distinct)),
                sep_by(r("functionArg"), t(TokenKind::Comma))
            ]
        ],
    );
    rules.insert(
        "functionArg",
        seq![r("expr"), opt(seq![kw(Keyword::From), r("expr")])],
    );
    rules.insert(
        "nullsTreatment",
        seq![
            alt![kw(Keyword::Ignore), kw(Keyword::Respect)],
            kw(Keyword::Nulls)
        ],
    );
    rules.insert(
        "caseExpr",
        seq![
            kw(Keyword::Case),
            opt(r("expr")),
            many1(r("whenClause")),
            opt(seq![kw(Keyword::Else), r("expr")]),
            kw(Keyword::End)
        ],
    );
    rules.insert(
        "whenClause",
        seq![kw(Keyword::When), r("expr"), kw(Keyword::Then), r("expr")],
    );
    rules.insert(
        "castExpr",
        seq![
            kw(Keyword::Cast),
            t(TokenKind::LParen),
            r("expr"),
            kw(Keyword::As),
            r("typeName"),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "typeName",
        seq![
            ident(),
            opt(r("typeParams")),
            many(seq![t(TokenKind::LBracket), t(TokenKind::RBracket)])
        ],
    );
    rules.insert(
        "typeParams",
        seq![
            t(TokenKind::LParen),
            many1(alt![
                t(TokenKind::Number),
                t(TokenKind::String),
                ident(),
                t(TokenKind::Comma)
            ]),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "arrayLiteral",
        alt![
            seq![
                kw(Keyword::Array),
                t(TokenKind::LBracket),
                opt(sep_by(r("expr"), t(TokenKind::Comma))),
                t(TokenKind::RBracket)
            ],
            seq![
                t(TokenKind::LBracket),
                sep_by(r("expr"), t(TokenKind::Comma)),
                t(TokenKind::RBracket)
            ],
        ],
    );
    rules.insert(
        "overClause",
        seq![
            kw(Keyword::Over),
            t(TokenKind::LParen),
            opt(seq![
                kw(Keyword::Partition),
                kw(Keyword::By),
                sep_by(r("expr"), t(TokenKind::Comma))
            ]),
            opt(r("orderByClause")),
            opt(r("windowFrame")),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "windowFrame",
        seq![
            alt![kw(Keyword::Rows), kw(Keyword::Range), kw(Keyword::Groups)],
            alt![
                seq![
                    kw(Keyword::Between),
                    r("frameBound"),
                    kw(Keyword::And),
                    r("frameBound")
                ],
                r("frameBound")
            ],
            opt(r("frameExclusion"))
        ],
    );
    rules.insert(
        "frameBound",
        alt![
            seq![
                kw(Keyword::Unbounded),
                alt![kw(Keyword::Preceding), kw(Keyword::Following)]
            ],
            seq![kw(Keyword::Current), kw(Keyword::Row)],
            seq![
                r("expr"),
                alt![kw(Keyword::Preceding), kw(Keyword::Following)]
            ],
        ],
    );
    rules.insert(
        "frameExclusion",
        seq![
            kw(Keyword::Exclude),
            alt![
                seq![kw(Keyword::Current), kw(Keyword::Row)],
                kw(Keyword::Ties),
                seq![kw(Keyword::No), kw(Keyword::Others)],
                kw(Keyword::Group)
            ]
        ],
    );
}
