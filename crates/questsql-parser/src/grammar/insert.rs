//! INSERT and UPDATE productions.

use super::{alt, ident, kw, opt, peek, pident, pk, r, sep_by, seq, t, Rule};
use crate::keyword::Keyword;
use crate::token::TokenKind;
use indexmap::IndexMap;

pub(super) fn register(rules: &mut IndexMap<&'static str, Rule>) {
    rules.insert(
        "insertStatement",
        seq![
            kw(Keyword::Insert),
            opt(alt![
                kw(Keyword::Atomic),
                seq![kw(Keyword::Batch), t(TokenKind::Number)]
            ]),
            kw(Keyword::Into),
            r("qualifiedName"),
            opt(peek(
                vec![pk(TokenKind::LParen), pident()],
                r("columnList")
            )),
            alt![r("valuesClause"), r("selectStatement")]
        ],
    );
    rules.insert(
        "columnList",
        seq![
            t(TokenKind::LParen),
            sep_by(ident(), t(TokenKind::Comma)),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "valuesClause",
        seq![
            kw(Keyword::Values),
            sep_by(r("valuesRow"), t(TokenKind::Comma))
        ],
    );
    rules.insert(
        "valuesRow",
        seq![
            t(TokenKind::LParen),
            sep_by(r("expr"), t(TokenKind::Comma)),
            t(TokenKind::RParen)
        ],
    );
    rules.insert(
        "updateStatement",
        seq![
            kw(Keyword::Update),
            r("qualifiedName"),
            opt(r("aliasClause")),
            kw(Keyword::Set),
            sep_by(r("setAssignment"), t(TokenKind::Comma)),
            opt(seq![kw(Keyword::From), r("fromClause")]),
            opt(r("whereClause"))
        ],
    );
    rules.insert(
        "setAssignment",
        seq![r("qualifiedName"), t(TokenKind::Eq), r("expr")],
    );
}
