//! Access-control productions: users, groups, service accounts, GRANT and
//! REVOKE.

use super::{alt, ident, kw, many1, opt, r, sep_by, seq, t, Rule};
use crate::keyword::Keyword;
use crate::token::TokenKind;
use indexmap::IndexMap;

pub(super) fn register(rules: &mut IndexMap<&'static str, Rule>) {
    rules.insert(
        "createUserStatement",
        seq![
            kw(Keyword::Create),
            kw(Keyword::User),
            opt(r("ifNotExists")),
            ident(),
            opt(r("passwordSpec"))
        ],
    );
    rules.insert(
        "passwordSpec",
        seq![
            kw(Keyword::With),
            alt![
                seq![kw(Keyword::No), kw(Keyword::Password)],
                seq![
                    kw(Keyword::Password),
                    alt![t(TokenKind::String), ident()]
                ]
            ]
        ],
    );
    rules.insert(
        "createGroupStatement",
        seq![
            kw(Keyword::Create),
            kw(Keyword::Group),
            opt(r("ifNotExists")),
            ident()
        ],
    );
    rules.insert(
        "createServiceAccountStatement",
        seq![
            kw(Keyword::Create),
            kw(Keyword::Service),
            kw(Keyword::Account),
            opt(r("ifNotExists")),
            ident(),
            opt(r("ownedBy"))
        ],
    );
    rules.insert(
        "alterUserStatement",
        seq![kw(Keyword::Alter), kw(Keyword::User), ident(), r("userAction")],
    );
    rules.insert(
        "userAction",
        alt![kw(Keyword::Enable), kw(Keyword::Disable), r("passwordSpec")],
    );
    rules.insert(
        "alterServiceAccountStatement",
        seq![
            kw(Keyword::Alter),
            kw(Keyword::Service),
            kw(Keyword::Account),
            ident(),
            r("userAction")
        ],
    );
    rules.insert(
        "dropUserStatement",
        seq![
            kw(Keyword::Drop),
            kw(Keyword::User),
            opt(r("ifExists")),
            ident()
        ],
    );
    rules.insert(
        "dropGroupStatement",
        seq![
            kw(Keyword::Drop),
            kw(Keyword::Group),
            opt(r("ifExists")),
            ident()
        ],
    );
    rules.insert(
        "dropServiceAccountStatement",
        seq![
            kw(Keyword::Drop),
            kw(Keyword::Service),
            kw(Keyword::Account),
            opt(r("ifExists")),
            ident()
        ],
    );
    rules.insert(
        "addUserStatement",
        seq![
            kw(Keyword::Add),
            kw(Keyword::User),
            ident(),
            kw(Keyword::To),
            sep_by(ident(), t(TokenKind::Comma))
        ],
    );
    rules.insert(
        "removeUserStatement",
        seq![
            kw(Keyword::Remove),
            kw(Keyword::User),
            ident(),
            kw(Keyword::From),
            sep_by(ident(), t(TokenKind::Comma))
        ],
    );
    rules.insert(
        "assumeServiceAccountStatement",
        seq![
            kw(Keyword::Assume),
            kw(Keyword::Service),
            kw(Keyword::Account),
            ident()
        ],
    );
    rules.insert(
        "exitServiceAccountStatement",
        seq![
            kw(Keyword::Exit),
            kw(Keyword::Service),
            kw(Keyword::Account),
            opt(ident())
        ],
    );
    rules.insert(
        "grantStatement",
        seq![
            kw(Keyword::Grant),
            sep_by(r("permission"), t(TokenKind::Comma)),
            opt(seq![
                kw(Keyword::On),
                alt![
                    seq![kw(Keyword::All), kw(Keyword::Tables)],
                    sep_by(r("permissionTarget"), t(TokenKind::Comma))
                ]
            ]),
            kw(Keyword::To),
            ident(),
            opt(r("grantOption"))
        ],
    );
    // Permission names reuse statement keywords ("CREATE TABLE", "ALTER
    // TABLE", "SELECT"); a permission is a run of such words.
    rules.insert(
        "permission",
        many1(alt![
            kw(Keyword::Select),
            kw(Keyword::Insert),
            kw(Keyword::Update),
            kw(Keyword::Create),
            kw(Keyword::Drop),
            kw(Keyword::Alter),
            kw(Keyword::Truncate),
            kw(Keyword::Rename),
            kw(Keyword::Show),
            kw(Keyword::Table),
            ident()
        ]),
    );
    rules.insert(
        "permissionTarget",
        seq![r("qualifiedName"), opt(r("columnList"))],
    );
    rules.insert(
        "grantOption",
        seq![kw(Keyword::With), kw(Keyword::Grant), kw(Keyword::Option)],
    );
    rules.insert(
        "grantAssumeStatement",
        seq![
            kw(Keyword::Grant),
            kw(Keyword::Assume),
            kw(Keyword::Service),
            kw(Keyword::Account),
            ident(),
            kw(Keyword::To),
            ident(),
            opt(r("grantOption"))
        ],
    );
    rules.insert(
        "revokeStatement",
        seq![
            kw(Keyword::Revoke),
            sep_by(r("permission"), t(TokenKind::Comma)),
            opt(seq![
                kw(Keyword::On),
                alt![
                    seq![kw(Keyword::All), kw(Keyword::Tables)],
                    sep_by(r("permissionTarget"), t(TokenKind::Comma))
                ]
            ]),
            kw(Keyword::From),
            ident()
        ],
    );
    rules.insert(
        "revokeAssumeStatement",
        seq![
            kw(Keyword::Revoke),
            kw(Keyword::Assume),
            kw(Keyword::Service),
            kw(Keyword::Account),
            ident(),
            kw(Keyword::From),
            ident()
        ],
    );
}
