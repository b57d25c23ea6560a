//! The statement list and the top-level statement dispatch.
//!
//! Statements sharing a first keyword (CREATE, ALTER, DROP, GRANT, …) are
//! disambiguated with bounded lookahead guards; the guards never need more
//! than two tokens. Statements whose first keyword is an identifier-keyword
//! (ADD, COPY, CANCEL, …) are guarded too so that a table of the same name
//! still parses as an implicit select.

use super::{alt, kw, many, peek, pident, pk_kw, pone, r, seq, t, Rule};
use crate::keyword::Keyword;
use crate::token::TokenKind;
use indexmap::IndexMap;

pub(super) fn register(rules: &mut IndexMap<&'static str, Rule>) {
    rules.insert(
        "statementList",
        many(alt![t(TokenKind::Semicolon), r("statement")]),
    );
    rules.insert(
        "withStatement",
        seq![
            r("withClause"),
            alt![
                r("insertStatement"),
                r("updateStatement"),
                r("selectStatement")
            ]
        ],
    );
    rules.insert(
        "statement",
        alt![
            peek(
                vec![pk_kw(Keyword::Create), pk_kw(Keyword::Atomic)],
                r("createTableStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Create), pk_kw(Keyword::Batch)],
                r("createTableStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Create), pk_kw(Keyword::Table)],
                r("createTableStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Create), pk_kw(Keyword::Materialized)],
                r("createMatViewStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Create), pk_kw(Keyword::View)],
                r("createViewStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Create), pk_kw(Keyword::User)],
                r("createUserStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Create), pk_kw(Keyword::Group)],
                r("createGroupStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Create), pk_kw(Keyword::Service)],
                r("createServiceAccountStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Alter), pk_kw(Keyword::Table)],
                r("alterTableStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Alter), pk_kw(Keyword::Materialized)],
                r("alterMatViewStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Alter), pk_kw(Keyword::View)],
                r("alterViewStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Alter), pk_kw(Keyword::User)],
                r("alterUserStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Alter), pk_kw(Keyword::Service)],
                r("alterServiceAccountStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Drop), pk_kw(Keyword::Table)],
                r("dropTableStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Drop), pk_kw(Keyword::All)],
                r("dropTableStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Drop), pk_kw(Keyword::Materialized)],
                r("dropMatViewStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Drop), pk_kw(Keyword::View)],
                r("dropViewStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Drop), pk_kw(Keyword::User)],
                r("dropUserStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Drop), pk_kw(Keyword::Group)],
                r("dropGroupStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Drop), pk_kw(Keyword::Service)],
                r("dropServiceAccountStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Refresh), pk_kw(Keyword::Materialized)],
                r("refreshMatViewStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Grant), pk_kw(Keyword::Assume)],
                r("grantAssumeStatement")
            ),
            r("grantStatement"),
            peek(
                vec![pk_kw(Keyword::Revoke), pk_kw(Keyword::Assume)],
                r("revokeAssumeStatement")
            ),
            r("revokeStatement"),
            r("insertStatement"),
            r("updateStatement"),
            r("withStatement"),
            r("truncateTableStatement"),
            r("renameTableStatement"),
            peek(
                vec![pk_kw(Keyword::Vacuum), pk_kw(Keyword::Table)],
                r("vacuumTableStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Reindex), pk_kw(Keyword::Table)],
                r("reindexTableStatement")
            ),
            r("showStatement"),
            r("explainStatement"),
            peek(
                vec![pk_kw(Keyword::Copy), pident()],
                r("copyStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Cancel), pk_kw(Keyword::Query)],
                r("cancelQueryStatement")
            ),
            peek(
                vec![
                    pk_kw(Keyword::Checkpoint),
                    pone(vec![
                        TokenKind::Keyword(Keyword::Create),
                        TokenKind::Keyword(Keyword::Release)
                    ])
                ],
                r("checkpointStatement")
            ),
            peek(
                vec![
                    pk_kw(Keyword::Snapshot),
                    pone(vec![
                        TokenKind::Keyword(Keyword::Prepare),
                        TokenKind::Keyword(Keyword::Complete)
                    ])
                ],
                r("snapshotStatement")
            ),
            peek(
                vec![
                    pk_kw(Keyword::Backup),
                    pone(vec![
                        TokenKind::Keyword(Keyword::Table),
                        TokenKind::Keyword(Keyword::Database)
                    ])
                ],
                r("backupStatement")
            ),
            peek(
                vec![
                    pk_kw(Keyword::Compile),
                    pone(vec![
                        TokenKind::Keyword(Keyword::View),
                        TokenKind::Keyword(Keyword::Materialized)
                    ])
                ],
                r("compileViewStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Add), pk_kw(Keyword::User)],
                r("addUserStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Remove), pk_kw(Keyword::User)],
                r("removeUserStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Assume), pk_kw(Keyword::Service)],
                r("assumeServiceAccountStatement")
            ),
            peek(
                vec![pk_kw(Keyword::Exit), pk_kw(Keyword::Service)],
                r("exitServiceAccountStatement")
            ),
            r("selectStatement"),
        ],
    );
}
