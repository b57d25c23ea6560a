//! CREATE TABLE / VIEW / MATERIALIZED VIEW productions.

use super::{alt, ident, kw, many, opt, peek, pk, pk_kw, r, sep_by, seq, t, Rule};
use crate::keyword::Keyword;
use crate::token::TokenKind;
use indexmap::IndexMap;

pub(super) fn register(rules: &mut IndexMap<&'static str, Rule>) {
    rules.insert(
        "createTableStatement",
        seq![
            kw(Keyword::Create),
            opt(alt![
                kw(Keyword::Atomic),
                seq![kw(Keyword::Batch), t(TokenKind::Number)]
            ]),
            kw(Keyword::Table),
            opt(r("ifNotExists")),
            r("qualifiedName"),
            r("createTableBody"),
            many(r("createTableOption"))
        ],
    );
    rules.insert(
        "createTableBody",
        alt![
            peek(
                vec![pk(TokenKind::LParen), pk_kw(Keyword::Like)],
                seq![
                    t(TokenKind::LParen),
                    kw(Keyword::Like),
                    r("qualifiedName"),
                    t(TokenKind::RParen)
                ]
            ),
            seq![
                t(TokenKind::LParen),
                sep_by(r("columnDef"), t(TokenKind::Comma)),
                t(TokenKind::RParen)
            ],
            seq![
                kw(Keyword::As),
                alt![r("subquery"), r("selectStatement")],
                many(seq![
                    t(TokenKind::Comma),
                    alt![r("castDef"), r("indexDef")]
                ])
            ],
        ],
    );
    rules.insert("columnDef", seq![ident(), r("typeName"), many(r("columnOpt"))]);
    rules.insert(
        "columnOpt",
        alt![
            seq![kw(Keyword::Capacity), t(TokenKind::Number)],
            kw(Keyword::Cache),
            kw(Keyword::Nocache),
            seq![
                kw(Keyword::Index),
                opt(seq![kw(Keyword::Capacity), t(TokenKind::Number)])
            ]
        ],
    );
    rules.insert(
        "castDef",
        seq![
            kw(Keyword::Cast),
            t(TokenKind::LParen),
            ident(),
            kw(Keyword::As),
            r("typeName"),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "indexDef",
        seq![
            kw(Keyword::Index),
            t(TokenKind::LParen),
            ident(),
            opt(seq![kw(Keyword::Capacity), t(TokenKind::Number)]),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "ifNotExists",
        seq![kw(Keyword::If), kw(Keyword::Not), kw(Keyword::Exists)],
    );
    rules.insert("ifExists", seq![kw(Keyword::If), kw(Keyword::Exists)]);
    rules.insert(
        "createTableOption",
        alt![
            r("timestampClause"),
            r("partitionByClause"),
            r("ttlClause"),
            r("walClause"),
            r("withParams"),
            r("dedupClause"),
            r("inVolume"),
            r("ownedBy")
        ],
    );
    rules.insert(
        "timestampClause",
        seq![
            kw(Keyword::Timestamp),
            t(TokenKind::LParen),
            ident(),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "partitionByClause",
        seq![
            kw(Keyword::Partition),
            kw(Keyword::By),
            alt![
                kw(Keyword::None),
                kw(Keyword::Year),
                kw(Keyword::Month),
                kw(Keyword::Week),
                kw(Keyword::Day),
                kw(Keyword::Hour)
            ]
        ],
    );
    rules.insert("ttlClause", seq![kw(Keyword::Ttl), r("ttlValue")]);
    rules.insert(
        "ttlValue",
        alt![
            t(TokenKind::Duration),
            seq![t(TokenKind::Number), opt(r("timeUnit"))]
        ],
    );
    rules.insert(
        "timeUnit",
        alt![
            kw(Keyword::Hour),
            kw(Keyword::Hours),
            kw(Keyword::Day),
            kw(Keyword::Days),
            kw(Keyword::Week),
            kw(Keyword::Weeks),
            kw(Keyword::Month),
            kw(Keyword::Months),
            kw(Keyword::Year),
            kw(Keyword::Years)
        ],
    );
    rules.insert(
        "walClause",
        alt![kw(Keyword::Wal), seq![kw(Keyword::Bypass), kw(Keyword::Wal)]],
    );
    rules.insert(
        "withParams",
        seq![
            kw(Keyword::With),
            sep_by(r("withParam"), t(TokenKind::Comma))
        ],
    );
    rules.insert(
        "withParam",
        seq![
            ident(),
            t(TokenKind::Eq),
            alt![
                t(TokenKind::Number),
                t(TokenKind::String),
                kw(Keyword::True),
                kw(Keyword::False),
                ident()
            ]
        ],
    );
    rules.insert(
        "inVolume",
        seq![
            opt(t(TokenKind::Comma)),
            kw(Keyword::In),
            kw(Keyword::Volume),
            alt![ident(), t(TokenKind::String)]
        ],
    );
    rules.insert(
        "ownedBy",
        seq![kw(Keyword::Owned), kw(Keyword::By), ident()],
    );
    rules.insert(
        "dedupClause",
        seq![
            kw(Keyword::Dedup),
            kw(Keyword::Upsert),
            kw(Keyword::Keys),
            t(TokenKind::LParen),
            sep_by(ident(), t(TokenKind::Comma)),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "createViewStatement",
        seq![
            kw(Keyword::Create),
            kw(Keyword::View),
            opt(r("ifNotExists")),
            r("qualifiedName"),
            kw(Keyword::As),
            alt![r("subquery"), r("selectStatement")],
            opt(r("ownedBy"))
        ],
    );
    rules.insert(
        "createMatViewStatement",
        seq![
            kw(Keyword::Create),
            kw(Keyword::Materialized),
            kw(Keyword::View),
            opt(r("ifNotExists")),
            r("qualifiedName"),
            opt(seq![
                kw(Keyword::With),
                kw(Keyword::Base),
                alt![ident(), t(TokenKind::String)]
            ]),
            opt(r("refreshSpec")),
            kw(Keyword::As),
            alt![r("subquery"), r("selectStatement")],
            many(alt![
                r("partitionByClause"),
                r("ttlClause"),
                r("inVolume"),
                r("ownedBy")
            ])
        ],
    );
    rules.insert(
        "refreshSpec",
        seq![
            kw(Keyword::Refresh),
            opt(alt![
                kw(Keyword::Immediate),
                kw(Keyword::Manual),
                kw(Keyword::Incremental),
                seq![kw(Keyword::Every), t(TokenKind::Duration)],
                r("periodSpec")
            ])
        ],
    );
    rules.insert(
        "periodSpec",
        seq![
            kw(Keyword::Period),
            t(TokenKind::LParen),
            kw(Keyword::Length),
            t(TokenKind::Duration),
            opt(seq![
                kw(Keyword::Time),
                kw(Keyword::Zone),
                t(TokenKind::String)
            ]),
            opt(seq![kw(Keyword::Delay), t(TokenKind::Duration)]),
            t(TokenKind::RParen)
        ],
    );
}
