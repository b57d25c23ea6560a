//! ALTER / DROP / TRUNCATE / RENAME productions and the table maintenance
//! statements (VACUUM, REINDEX, REFRESH MATERIALIZED VIEW).

use super::{alt, ident, kw, opt, peek, pk_kw, r, sep_by, seq, t, Rule};
use crate::keyword::Keyword;
use crate::token::TokenKind;
use indexmap::IndexMap;

pub(super) fn register(rules: &mut IndexMap<&'static str, Rule>) {
    rules.insert(
        "alterTableStatement",
        seq![
            kw(Keyword::Alter),
            kw(Keyword::Table),
            r("qualifiedName"),
            r("alterTableAction")
        ],
    );
    rules.insert(
        "alterTableAction",
        alt![
            seq![
                kw(Keyword::Add),
                opt(kw(Keyword::Column)),
                sep_by(r("columnDef"), t(TokenKind::Comma))
            ],
            peek(
                vec![pk_kw(Keyword::Drop), pk_kw(Keyword::Column)],
                seq![
                    kw(Keyword::Drop),
                    kw(Keyword::Column),
                    sep_by(ident(), t(TokenKind::Comma))
                ]
            ),
            peek(
                vec![pk_kw(Keyword::Drop), pk_kw(Keyword::Partition)],
                seq![kw(Keyword::Drop), kw(Keyword::Partition), r("partitionSelector")]
            ),
            peek(
                vec![pk_kw(Keyword::Rename), pk_kw(Keyword::Column)],
                seq![
                    kw(Keyword::Rename),
                    kw(Keyword::Column),
                    ident(),
                    kw(Keyword::To),
                    ident()
                ]
            ),
            seq![
                kw(Keyword::Alter),
                kw(Keyword::Column),
                ident(),
                r("alterColumnAction")
            ],
            seq![
                kw(Keyword::Attach),
                kw(Keyword::Partition),
                kw(Keyword::List),
                sep_by(t(TokenKind::String), t(TokenKind::Comma))
            ],
            seq![
                kw(Keyword::Detach),
                kw(Keyword::Partition),
                r("partitionSelector")
            ],
            seq![
                kw(Keyword::Convert),
                kw(Keyword::Partition),
                kw(Keyword::To),
                ident(),
                r("partitionSelector")
            ],
            seq![kw(Keyword::Squash), kw(Keyword::Partitions)],
            peek(
                vec![pk_kw(Keyword::Set), pk_kw(Keyword::Param)],
                seq![
                    kw(Keyword::Set),
                    kw(Keyword::Param),
                    ident(),
                    t(TokenKind::Eq),
                    alt![t(TokenKind::Number), t(TokenKind::String), ident()]
                ]
            ),
            peek(
                vec![pk_kw(Keyword::Set), pk_kw(Keyword::Ttl)],
                seq![kw(Keyword::Set), kw(Keyword::Ttl), r("ttlValue")]
            ),
            peek(
                vec![pk_kw(Keyword::Set), pk_kw(Keyword::Type)],
                seq![
                    kw(Keyword::Set),
                    kw(Keyword::Type),
                    alt![kw(Keyword::Wal), seq![kw(Keyword::Bypass), kw(Keyword::Wal)]]
                ]
            ),
            seq![
                kw(Keyword::Dedup),
                alt![
                    kw(Keyword::Disable),
                    seq![
                        kw(Keyword::Enable),
                        kw(Keyword::Upsert),
                        kw(Keyword::Keys),
                        t(TokenKind::LParen),
                        sep_by(ident(), t(TokenKind::Comma)),
                        t(TokenKind::RParen)
                    ]
                ]
            ],
            seq![kw(Keyword::Suspend), kw(Keyword::Wal)],
            seq![
                kw(Keyword::Resume),
                kw(Keyword::Wal),
                opt(seq![
                    kw(Keyword::From),
                    alt![kw(Keyword::Txn), kw(Keyword::Transaction)],
                    t(TokenKind::Number)
                ])
            ],
        ],
    );
    rules.insert(
        "partitionSelector",
        alt![
            seq![
                kw(Keyword::List),
                sep_by(alt![t(TokenKind::String), ident()], t(TokenKind::Comma))
            ],
            seq![kw(Keyword::Where), r("expr")]
        ],
    );
    rules.insert(
        "alterColumnAction",
        alt![
            seq![
                kw(Keyword::Add),
                kw(Keyword::Index),
                opt(seq![kw(Keyword::Capacity), t(TokenKind::Number)])
            ],
            seq![kw(Keyword::Drop), kw(Keyword::Index)],
            seq![kw(Keyword::Type), r("typeName")],
            kw(Keyword::Cache),
            kw(Keyword::Nocache),
            seq![
                kw(Keyword::Symbol),
                kw(Keyword::Capacity),
                t(TokenKind::Number)
            ]
        ],
    );
    rules.insert(
        "alterViewStatement",
        seq![
            kw(Keyword::Alter),
            kw(Keyword::View),
            r("qualifiedName"),
            r("ownedBy")
        ],
    );
    rules.insert(
        "alterMatViewStatement",
        seq![
            kw(Keyword::Alter),
            kw(Keyword::Materialized),
            kw(Keyword::View),
            r("qualifiedName"),
            r("matViewAction")
        ],
    );
    rules.insert(
        "matViewAction",
        alt![
            peek(
                vec![pk_kw(Keyword::Set), pk_kw(Keyword::Refresh)],
                seq![
                    kw(Keyword::Set),
                    kw(Keyword::Refresh),
                    alt![
                        kw(Keyword::Immediate),
                        kw(Keyword::Manual),
                        kw(Keyword::Incremental),
                        seq![kw(Keyword::Every), t(TokenKind::Duration)],
                        seq![kw(Keyword::Limit), r("ttlValue")]
                    ]
                ]
            ),
            peek(
                vec![pk_kw(Keyword::Set), pk_kw(Keyword::Ttl)],
                seq![kw(Keyword::Set), kw(Keyword::Ttl), r("ttlValue")]
            ),
            seq![kw(Keyword::Suspend), kw(Keyword::Wal)],
            seq![
                kw(Keyword::Resume),
                kw(Keyword::Wal),
                opt(seq![
                    kw(Keyword::From),
                    alt![kw(Keyword::Txn), kw(Keyword::Transaction)],
                    t(TokenKind::Number)
                ])
            ],
            r("ownedBy"),
        ],
    );
    rules.insert(
        "dropTableStatement",
        seq![
            kw(Keyword::Drop),
            alt![
                seq![kw(Keyword::All), kw(Keyword::Tables)],
                seq![
                    kw(Keyword::Table),
                    opt(r("ifExists")),
                    r("qualifiedName")
                ]
            ]
        ],
    );
    rules.insert(
        "dropViewStatement",
        seq![
            kw(Keyword::Drop),
            kw(Keyword::View),
            opt(r("ifExists")),
            r("qualifiedName")
        ],
    );
    rules.insert(
        "dropMatViewStatement",
        seq![
            kw(Keyword::Drop),
            kw(Keyword::Materialized),
            kw(Keyword::View),
            opt(r("ifExists")),
            r("qualifiedName")
        ],
    );
    rules.insert(
        "refreshMatViewStatement",
        seq![
            kw(Keyword::Refresh),
            kw(Keyword::Materialized),
            kw(Keyword::View),
            r("qualifiedName"),
            opt(alt![
                kw(Keyword::Full),
                kw(Keyword::Incremental),
                seq![
                    kw(Keyword::Interval),
                    kw(Keyword::From),
                    t(TokenKind::String),
                    kw(Keyword::To),
                    t(TokenKind::String)
                ]
            ])
        ],
    );
    rules.insert(
        "truncateTableStatement",
        seq![kw(Keyword::Truncate), kw(Keyword::Table), r("qualifiedName")],
    );
    rules.insert(
        "renameTableStatement",
        seq![
            kw(Keyword::Rename),
            kw(Keyword::Table),
            r("qualifiedName"),
            kw(Keyword::To),
            r("qualifiedName")
        ],
    );
    rules.insert(
        "vacuumTableStatement",
        seq![kw(Keyword::Vacuum), kw(Keyword::Table), r("qualifiedName")],
    );
    rules.insert(
        "reindexTableStatement",
        seq![
            kw(Keyword::Reindex),
            kw(Keyword::Table),
            r("qualifiedName"),
            opt(seq![kw(Keyword::Column), ident()]),
            opt(seq![kw(Keyword::Partition), t(TokenKind::String)]),
            kw(Keyword::Lock),
            kw(Keyword::Exclusive)
        ],
    );
}
