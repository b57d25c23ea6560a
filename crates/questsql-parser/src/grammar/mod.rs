//! The QuestDB SQL grammar as data.
//!
//! Rules are first-class values registered in a name-indexed table. The same
//! rule objects drive both the parser's predictive choices and the
//! content-assist follow-set computation; the grammar exists in exactly one
//! place.

use crate::keyword::{Keyword, IDENTIFIER_KEYWORDS};
use crate::token::{Token, TokenKind};
use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;

mod acl;
mod alter;
mod create;
mod expr;
mod insert;
mod ops;
mod select;
mod statement;

/// A grammar rule.
///
/// `Sequence`, `Alt`, `Optional`, `Many`, `Many1` and `SepBy` compose;
/// `Ref` points into the rule table (rules may recurse); `Peek` attaches a
/// bounded lookahead guard (at most three tokens) to an alternation branch;
/// `IdentLike` is the dedicated non-terminal that admits identifiers, quoted
/// identifiers and identifier-keywords.
#[derive(Debug, Clone)]
pub enum Rule {
    Terminal(TokenKind),
    IdentLike,
    Sequence(Vec<Rule>),
    Alt(Vec<Rule>),
    Optional(Box<Rule>),
    Many(Box<Rule>),
    Many1(Box<Rule>),
    SepBy { elem: Box<Rule>, sep: Box<Rule> },
    Ref(&'static str),
    Peek { pats: Vec<PeekPat>, rule: Box<Rule> },
}

/// One position of a `Peek` guard.
#[derive(Debug, Clone)]
pub enum PeekPat {
    Kind(TokenKind),
    OneOf(Vec<TokenKind>),
    IdentLike,
    Any,
}

impl PeekPat {
    pub(crate) fn matches(&self, token: &Token) -> bool {
        match self {
            PeekPat::Kind(kind) => token.kind() == *kind,
            PeekPat::OneOf(kinds) => kinds.contains(&token.kind()),
            PeekPat::IdentLike => is_ident_like(token.kind()),
            PeekPat::Any => token.kind() != TokenKind::Eof,
        }
    }
}

/// Whether a token of this kind may stand in an identifier position.
pub fn is_ident_like(kind: TokenKind) -> bool {
    match kind {
        TokenKind::Identifier | TokenKind::QuotedIdentifier => true,
        TokenKind::Keyword(kw) => !kw.is_reserved(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Builder helpers used by the rule modules.
// ---------------------------------------------------------------------------

pub(crate) fn t(kind: TokenKind) -> Rule {
    Rule::Terminal(kind)
}

pub(crate) fn kw(keyword: Keyword) -> Rule {
    Rule::Terminal(TokenKind::Keyword(keyword))
}

pub(crate) fn ident() -> Rule {
    Rule::IdentLike
}

pub(crate) fn opt(rule: Rule) -> Rule {
    Rule::Optional(Box::new(rule))
}

pub(crate) fn many(rule: Rule) -> Rule {
    Rule::Many(Box::new(rule))
}

pub(crate) fn many1(rule: Rule) -> Rule {
    Rule::Many1(Box::new(rule))
}

pub(crate) fn sep_by(elem: Rule, sep: Rule) -> Rule {
    Rule::SepBy {
        elem: Box::new(elem),
        sep: Box::new(sep),
    }
}

pub(crate) fn r(name: &'static str) -> Rule {
    Rule::Ref(name)
}

pub(crate) fn peek(pats: Vec<PeekPat>, rule: Rule) -> Rule {
    Rule::Peek {
        pats,
        rule: Box::new(rule),
    }
}

pub(crate) fn pk(kind: TokenKind) -> PeekPat {
    PeekPat::Kind(kind)
}

pub(crate) fn pk_kw(keyword: Keyword) -> PeekPat {
    PeekPat::Kind(TokenKind::Keyword(keyword))
}

pub(crate) fn pone(kinds: Vec<TokenKind>) -> PeekPat {
    PeekPat::OneOf(kinds)
}

pub(crate) fn pident() -> PeekPat {
    PeekPat::IdentLike
}

macro_rules! seq {
    ($($rule:expr),+ $(,)?) => {
        $crate::grammar::Rule::Sequence(vec![$($rule),+])
    };
}
macro_rules! alt {
    ($($rule:expr),+ $(,)?) => {
        $crate::grammar::Rule::Alt(vec![$($rule),+])
    };
}
pub(crate) use {alt, seq};

// ---------------------------------------------------------------------------
// The rule table.
// ---------------------------------------------------------------------------

/// FIRST set of the `IdentLike` non-terminal.
static IDENT_FIRST: Lazy<IndexSet<TokenKind>> = Lazy::new(|| {
    let mut set = IndexSet::new();
    set.insert(TokenKind::Identifier);
    set.insert(TokenKind::QuotedIdentifier);
    for &kw in IDENTIFIER_KEYWORDS.iter() {
        set.insert(TokenKind::Keyword(kw));
    }
    set
});

/// The grammar: a name-indexed rule table with FIRST sets and nullability
/// precomputed by fixpoint iteration.
pub struct Grammar {
    rules: IndexMap<&'static str, Rule>,
    first: IndexMap<&'static str, IndexSet<TokenKind>>,
    nullable: IndexMap<&'static str, bool>,
}

/// The process-wide grammar, built once.
pub static GRAMMAR: Lazy<Grammar> = Lazy::new(Grammar::build);

impl Grammar {
    fn build() -> Self {
        let mut rules = IndexMap::new();
        statement::register(&mut rules);
        select::register(&mut rules);
        insert::register(&mut rules);
        create::register(&mut rules);
        alter::register(&mut rules);
        acl::register(&mut rules);
        ops::register(&mut rules);
        expr::register(&mut rules);

        let mut grammar = Self {
            rules,
            first: IndexMap::new(),
            nullable: IndexMap::new(),
        };
        grammar.compute_nullable();
        grammar.compute_first();
        grammar.check_refs();
        grammar
    }

    /// The body of a named rule. Panics on an unknown name; rule names are
    /// compile-time constants checked by `check_refs` at table build.
    pub fn rule(&self, name: &str) -> &Rule {
        &self.rules[name]
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }

    /// Whether `rule` can match the empty token sequence.
    pub fn nullable(&self, rule: &Rule) -> bool {
        match rule {
            Rule::Terminal(_) | Rule::IdentLike => false,
            Rule::Sequence(items) => items.iter().all(|item| self.nullable(item)),
            Rule::Alt(branches) => branches.iter().any(|branch| self.nullable(branch)),
            Rule::Optional(_) | Rule::Many(_) => true,
            Rule::Many1(inner) => self.nullable(inner),
            Rule::SepBy { elem, .. } => self.nullable(elem),
            Rule::Ref(name) => self.nullable.get(name).copied().unwrap_or(false),
            Rule::Peek { rule, .. } => self.nullable(rule),
        }
    }

    /// Accumulate FIRST(`rule`) into `out`.
    pub fn first_of(&self, rule: &Rule, out: &mut IndexSet<TokenKind>) {
        match rule {
            Rule::Terminal(kind) => {
                out.insert(*kind);
            }
            Rule::IdentLike => {
                out.extend(IDENT_FIRST.iter().copied());
            }
            Rule::Sequence(items) => {
                for item in items {
                    self.first_of(item, out);
                    if !self.nullable(item) {
                        break;
                    }
                }
            }
            Rule::Alt(branches) => {
                for branch in branches {
                    self.first_of(branch, out);
                }
            }
            Rule::Optional(inner) | Rule::Many(inner) | Rule::Many1(inner) => {
                self.first_of(inner, out);
            }
            Rule::SepBy { elem, .. } => self.first_of(elem, out),
            Rule::Ref(name) => {
                if let Some(first) = self.first.get(name) {
                    out.extend(first.iter().copied());
                }
            }
            Rule::Peek { rule, .. } => self.first_of(rule, out),
        }
    }

    /// FIRST set of a named rule.
    pub fn rule_first(&self, name: &str) -> &IndexSet<TokenKind> {
        &self.first[name]
    }

    /// Whether `rule` can start with a token of `kind`.
    pub fn starts_with(&self, rule: &Rule, kind: TokenKind) -> bool {
        match rule {
            Rule::Terminal(k) => *k == kind,
            Rule::IdentLike => is_ident_like(kind),
            Rule::Ref(name) => self.first[name].contains(&kind),
            Rule::Alt(branches) => branches.iter().any(|b| self.starts_with(b, kind)),
            Rule::Peek { rule, .. } => self.starts_with(rule, kind),
            _ => {
                let mut set = IndexSet::new();
                self.first_of(rule, &mut set);
                set.contains(&kind)
            }
        }
    }

    fn compute_nullable(&mut self) {
        let names: Vec<&'static str> = self.rules.keys().copied().collect();
        for name in names {
            self.nullable.insert(name, false);
        }
        loop {
            let updates: Vec<(&'static str, bool)> = self
                .rules
                .iter()
                .map(|(name, rule)| (*name, self.nullable(rule)))
                .collect();
            let changed = updates
                .iter()
                .any(|(name, value)| *value != self.nullable[name]);
            for (name, value) in updates {
                self.nullable.insert(name, value);
            }
            if !changed {
                break;
            }
        }
    }

    fn compute_first(&mut self) {
        let bodies: Vec<(&'static str, Rule)> = self
            .rules
            .iter()
            .map(|(name, rule)| (*name, rule.clone()))
            .collect();
        for (name, _) in &bodies {
            self.first.insert(*name, IndexSet::new());
        }
        loop {
            let mut changed = false;
            for (name, rule) in &bodies {
                let mut set = IndexSet::new();
                self.first_of(rule, &mut set);
                if set.len() != self.first[name].len() {
                    changed = true;
                    self.first.insert(*name, set);
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Every `Ref` must resolve; a typo'd rule name is a programmer error
    /// caught the first time the grammar is built.
    fn check_refs(&self) {
        fn walk(grammar: &Grammar, rule: &Rule) {
            match rule {
                Rule::Terminal(_) | Rule::IdentLike => {}
                Rule::Sequence(items) | Rule::Alt(items) => {
                    items.iter().for_each(|item| walk(grammar, item))
                }
                Rule::Optional(inner) | Rule::Many(inner) | Rule::Many1(inner) => {
                    walk(grammar, inner)
                }
                Rule::SepBy { elem, sep } => {
                    walk(grammar, elem);
                    walk(grammar, sep);
                }
                Rule::Ref(name) => {
                    assert!(
                        grammar.rules.contains_key(name),
                        "grammar references unknown rule `{name}`"
                    );
                }
                Rule::Peek { rule, .. } => walk(grammar, rule),
            }
        }
        for rule in self.rules.values() {
            walk(self, rule);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_builds_and_refs_resolve() {
        let grammar = &*GRAMMAR;
        assert!(grammar.rule_names().count() > 50);
    }

    #[test]
    fn select_first_set() {
        let first = GRAMMAR.rule_first("selectStatement");
        assert!(first.contains(&TokenKind::Keyword(Keyword::Select)));
        assert!(first.contains(&TokenKind::Keyword(Keyword::With)));
        assert!(first.contains(&TokenKind::Keyword(Keyword::Declare)));
        // Implicit selects start at a table name or a subquery.
        assert!(first.contains(&TokenKind::Identifier));
        assert!(first.contains(&TokenKind::LParen));
    }

    #[test]
    fn expr_is_not_nullable() {
        assert!(!GRAMMAR.nullable(&Rule::Ref("expr")));
        assert!(GRAMMAR.nullable(&Rule::Ref("queryTail")));
    }

    #[test]
    fn ident_like_admits_identifier_keywords() {
        assert!(is_ident_like(TokenKind::Keyword(Keyword::Wal)));
        assert!(is_ident_like(TokenKind::Keyword(Keyword::Timestamp)));
        assert!(!is_ident_like(TokenKind::Keyword(Keyword::Select)));
        assert!(is_ident_like(TokenKind::QuotedIdentifier));
    }
}
