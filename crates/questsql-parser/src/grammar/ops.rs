//! Operational statements: SHOW, EXPLAIN, COPY, CANCEL QUERY, CHECKPOINT,
//! SNAPSHOT, BACKUP and COMPILE VIEW.

use super::{alt, ident, kw, many, opt, peek, pk_kw, r, sep_by, seq, t, Rule};
use crate::keyword::Keyword;
use crate::token::TokenKind;
use indexmap::IndexMap;

pub(super) fn register(rules: &mut IndexMap<&'static str, Rule>) {
    rules.insert(
        "showStatement",
        seq![
            kw(Keyword::Show),
            alt![
                kw(Keyword::Tables),
                seq![kw(Keyword::Columns), kw(Keyword::From), r("qualifiedName")],
                seq![
                    kw(Keyword::Partitions),
                    kw(Keyword::From),
                    r("qualifiedName")
                ],
                peek(
                    vec![pk_kw(Keyword::Create), pk_kw(Keyword::Table)],
                    seq![kw(Keyword::Create), kw(Keyword::Table), r("qualifiedName")]
                ),
                peek(
                    vec![pk_kw(Keyword::Create), pk_kw(Keyword::Materialized)],
                    seq![
                        kw(Keyword::Create),
                        kw(Keyword::Materialized),
                        kw(Keyword::View),
                        r("qualifiedName")
                    ]
                ),
                peek(
                    vec![pk_kw(Keyword::Create), pk_kw(Keyword::View)],
                    seq![kw(Keyword::Create), kw(Keyword::View), r("qualifiedName")]
                ),
                kw(Keyword::ServerVersion),
                kw(Keyword::Parameters),
                kw(Keyword::Users),
                seq![kw(Keyword::User), opt(ident())],
                seq![kw(Keyword::Groups), opt(ident())],
                peek(
                    vec![pk_kw(Keyword::Service), pk_kw(Keyword::Accounts)],
                    seq![kw(Keyword::Service), kw(Keyword::Accounts), opt(ident())]
                ),
                seq![kw(Keyword::Service), kw(Keyword::Account), ident()],
                seq![kw(Keyword::Permissions), opt(ident())],
            ]
        ],
    );
    rules.insert("explainStatement", seq![kw(Keyword::Explain), r("statement")]);
    rules.insert(
        "copyStatement",
        seq![
            kw(Keyword::Copy),
            ident(),
            alt![
                kw(Keyword::Cancel),
                seq![
                    kw(Keyword::From),
                    alt![t(TokenKind::String), ident()],
                    opt(kw(Keyword::With)),
                    many(r("copyOption"))
                ],
                seq![
                    kw(Keyword::To),
                    alt![t(TokenKind::String), ident()],
                    opt(kw(Keyword::With)),
                    many(r("copyOption"))
                ]
            ]
        ],
    );
    rules.insert(
        "copyOption",
        alt![
            seq![
                kw(Keyword::Header),
                alt![kw(Keyword::True), kw(Keyword::False)]
            ],
            seq![
                kw(Keyword::Timestamp),
                alt![t(TokenKind::String), ident()]
            ],
            seq![kw(Keyword::Delimiter), t(TokenKind::String)],
            seq![kw(Keyword::Format), alt![t(TokenKind::String), ident()]],
            seq![
                kw(Keyword::On),
                kw(Keyword::Error),
                alt![
                    kw(Keyword::SkipRow),
                    kw(Keyword::SkipColumn),
                    kw(Keyword::Abort)
                ]
            ],
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
            seq![
                kw(Keyword::PartitionBy),
                alt![ident(), t(TokenKind::String)]
            ],
            seq![
                kw(Keyword::CompressionCodec),
                alt![ident(), t(TokenKind::String)]
            ],
        ],
    );
    rules.insert(
        "cancelQueryStatement",
        seq![
            kw(Keyword::Cancel),
            kw(Keyword::Query),
            alt![t(TokenKind::Number), t(TokenKind::String)]
        ],
    );
    rules.insert(
        "checkpointStatement",
        seq![
            kw(Keyword::Checkpoint),
            alt![kw(Keyword::Create), kw(Keyword::Release)]
        ],
    );
    rules.insert(
        "snapshotStatement",
        seq![
            kw(Keyword::Snapshot),
            alt![kw(Keyword::Prepare), kw(Keyword::Complete)]
        ],
    );
    rules.insert(
        "backupStatement",
        seq![
            kw(Keyword::Backup),
            alt![
                seq![
                    kw(Keyword::Table),
                    sep_by(r("qualifiedName"), t(TokenKind::Comma))
                ],
                kw(Keyword::Database)
            ]
        ],
    );
    rules.insert(
        "compileViewStatement",
        seq![
            kw(Keyword::Compile),
            opt(kw(Keyword::Materialized)),
            kw(Keyword::View),
            r("qualifiedName")
        ],
    );
}
