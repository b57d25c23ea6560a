//! Follow-set computation for content assist.
//!
//! The engine replays the grammar over the tokens before the cursor. When
//! the prefix runs out it collects FIRST of the pending successor, extended
//! through nullable tails and propagated up the rule stack; the result is
//! exactly the set of token kinds that may legally come next.

use crate::grammar::{is_ident_like, Grammar, Rule, GRAMMAR};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};
use indexmap::IndexSet;

/// The set of token kinds that may follow the prefix of `sql` ending at
/// byte `offset`.
pub fn expected_at(sql: &str, offset: usize) -> IndexSet<TokenKind> {
    let (tokens, _) = Lexer::new(sql).into_parts();
    let prefix: Vec<Token> = tokens
        .into_iter()
        .filter(|t| {
            !t.kind().is_trivia() && t.kind() != TokenKind::Eof && t.end() <= offset
        })
        .collect();

    let mut engine = Engine {
        grammar: &GRAMMAR,
        tokens: prefix,
        sink: IndexSet::new(),
        depth: 0,
    };
    engine.drive();
    engine.sink
}

/// Kind names valid at end of input, in grammar order.
pub fn expected_names(sql: &str) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    for kind in expected_at(sql, sql.len()) {
        let name = kind.name();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

enum Outcome {
    Matched(usize),
    NoMatch,
    /// The prefix ran out inside this rule. The flag says whether what was
    /// consumed so far could already form a complete match.
    Cursor(bool),
}

enum GuardStatus {
    True,
    False,
    /// The guard needs tokens beyond the cursor.
    Unknown,
}

const PROBE_DEPTH_LIMIT: usize = 300;

struct Engine<'g> {
    grammar: &'g Grammar,
    tokens: Vec<Token>,
    sink: IndexSet<TokenKind>,
    depth: usize,
}

impl Engine<'_> {
    fn drive(&mut self) {
        let statement = Rule::Ref("statement");
        let mut pos = 0;
        loop {
            if pos >= self.tokens.len() {
                self.add_first(&statement);
                self.sink.insert(TokenKind::Semicolon);
                break;
            }
            if self.tokens[pos].kind() == TokenKind::Semicolon {
                pos += 1;
                continue;
            }
            match self.probe(&statement, pos) {
                Outcome::Matched(next) => {
                    pos = if next == pos { pos + 1 } else { next };
                }
                Outcome::NoMatch => pos += 1,
                Outcome::Cursor(completable) => {
                    if completable {
                        self.sink.insert(TokenKind::Semicolon);
                    }
                    break;
                }
            }
        }
    }

    fn add_first(&mut self, rule: &Rule) {
        self.grammar.first_of(rule, &mut self.sink);
    }

    fn kind_at(&self, pos: usize) -> TokenKind {
        self.tokens[pos].kind()
    }

    fn guard_status(&self, rule: &Rule, pos: usize) -> GuardStatus {
        match rule {
            Rule::Peek { pats, .. } => {
                for (i, pat) in pats.iter().enumerate() {
                    match self.tokens.get(pos + i) {
                        None => return GuardStatus::Unknown,
                        Some(token) => {
                            if !pat.matches(token) {
                                return GuardStatus::False;
                            }
                        }
                    }
                }
                GuardStatus::True
            }
            _ => {
                if self.grammar.starts_with(rule, self.kind_at(pos)) {
                    GuardStatus::True
                } else {
                    GuardStatus::False
                }
            }
        }
    }

    fn probe(&mut self, rule: &Rule, pos: usize) -> Outcome {
        if pos >= self.tokens.len() {
            self.add_first(rule);
            return Outcome::Cursor(self.grammar.nullable(rule));
        }
        if self.depth > PROBE_DEPTH_LIMIT {
            return Outcome::NoMatch;
        }
        self.depth += 1;
        let outcome = self.probe_inner(rule, pos);
        self.depth -= 1;
        outcome
    }

    fn probe_inner(&mut self, rule: &Rule, pos: usize) -> Outcome {
        match rule {
            Rule::Terminal(kind) => {
                if self.kind_at(pos) == *kind {
                    Outcome::Matched(pos + 1)
                } else {
                    Outcome::NoMatch
                }
            }
            Rule::IdentLike => {
                if is_ident_like(self.kind_at(pos)) {
                    Outcome::Matched(pos + 1)
                } else {
                    Outcome::NoMatch
                }
            }
            Rule::Sequence(items) => self.probe_sequence(items, pos),
            Rule::Alt(branches) => self.probe_alt(branches, pos),
            Rule::Optional(inner) => match self.probe(inner, pos) {
                Outcome::NoMatch => Outcome::Matched(pos),
                other => other,
            },
            Rule::Many(inner) => self.probe_repeat(inner, pos, false),
            Rule::Many1(inner) => self.probe_repeat(inner, pos, true),
            Rule::SepBy { elem, sep } => self.probe_sep_by(elem, sep, pos),
            Rule::Ref(name) => {
                let body = self.grammar.rule(name);
                if !self.grammar.starts_with(rule, self.kind_at(pos))
                    && !self.grammar.nullable(rule)
                {
                    return Outcome::NoMatch;
                }
                self.probe(body, pos)
            }
            Rule::Peek { rule: inner, .. } => match self.guard_status(rule, pos) {
                GuardStatus::False => Outcome::NoMatch,
                GuardStatus::True | GuardStatus::Unknown => self.probe(inner, pos),
            },
        }
    }

    fn probe_sequence(&mut self, items: &[Rule], pos: usize) -> Outcome {
        let mut pos = pos;
        let mut consumed = false;
        for (i, item) in items.iter().enumerate() {
            match self.probe(item, pos) {
                Outcome::Matched(next) => {
                    consumed = consumed || next != pos;
                    pos = next;
                }
                Outcome::NoMatch => {
                    if self.grammar.nullable(item) {
                        continue;
                    }
                    if !consumed {
                        return Outcome::NoMatch;
                    }
                    // The parser reports an error here and carries on; do
                    // the same so the cursor is still reached.
                    continue;
                }
                Outcome::Cursor(completable) => {
                    if !completable {
                        return Outcome::Cursor(false);
                    }
                    let mut tail_completable = true;
                    for rest in &items[i + 1..] {
                        self.add_first(rest);
                        if !self.grammar.nullable(rest) {
                            tail_completable = false;
                            break;
                        }
                    }
                    return Outcome::Cursor(tail_completable);
                }
            }
        }
        Outcome::Matched(pos)
    }

    fn probe_alt(&mut self, branches: &[Rule], pos: usize) -> Outcome {
        let mut cursor_hit = false;
        let mut completable = false;
        for branch in branches {
            match self.guard_status(branch, pos) {
                GuardStatus::False => continue,
                GuardStatus::True => match self.probe(branch, pos) {
                    Outcome::NoMatch => continue,
                    Outcome::Cursor(c) => {
                        cursor_hit = true;
                        completable |= c;
                        break;
                    }
                    matched => return matched,
                },
                GuardStatus::Unknown => {
                    // The parser's choice depends on tokens the user has not
                    // typed yet; every such branch stays in play.
                    if let Outcome::Cursor(c) = self.probe(branch, pos) {
                        cursor_hit = true;
                        completable |= c;
                    }
                }
            }
        }
        if cursor_hit {
            Outcome::Cursor(completable)
        } else {
            Outcome::NoMatch
        }
    }

    fn probe_repeat(&mut self, inner: &Rule, pos: usize, at_least_one: bool) -> Outcome {
        let mut pos = pos;
        let mut iterations = 0usize;
        loop {
            if pos >= self.tokens.len() {
                self.add_first(inner);
                return Outcome::Cursor(!at_least_one || iterations > 0);
            }
            match self.probe(inner, pos) {
                Outcome::Matched(next) => {
                    if next == pos {
                        return Outcome::Matched(pos);
                    }
                    pos = next;
                    iterations += 1;
                }
                Outcome::NoMatch => {
                    if at_least_one && iterations == 0 {
                        return Outcome::NoMatch;
                    }
                    return Outcome::Matched(pos);
                }
                Outcome::Cursor(c) => return Outcome::Cursor(c),
            }
        }
    }

    fn probe_sep_by(&mut self, elem: &Rule, sep: &Rule, pos: usize) -> Outcome {
        let mut pos = match self.probe(elem, pos) {
            Outcome::Matched(next) => next,
            Outcome::Cursor(completable) => {
                // An element that could end right here may also be followed
                // by the separator.
                if completable {
                    self.add_first(sep);
                }
                return Outcome::Cursor(completable);
            }
            Outcome::NoMatch => return Outcome::NoMatch,
        };
        loop {
            if pos >= self.tokens.len() {
                self.add_first(sep);
                return Outcome::Cursor(true);
            }
            match self.probe(sep, pos) {
                Outcome::Matched(next) => {
                    if next >= self.tokens.len() {
                        self.add_first(elem);
                        return Outcome::Cursor(false);
                    }
                    match self.probe(elem, next) {
                        Outcome::Matched(after) => pos = after,
                        Outcome::Cursor(completable) => {
                            if completable {
                                self.add_first(sep);
                            }
                            return Outcome::Cursor(completable);
                        }
                        // A separator not followed by an element belongs to
                        // the surrounding clause.
                        Outcome::NoMatch => return Outcome::Matched(pos),
                    }
                }
                Outcome::NoMatch => return Outcome::Matched(pos),
                Outcome::Cursor(completable) => return Outcome::Cursor(completable),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::Keyword;

    #[test]
    fn order_is_followed_by_by() {
        let names = expected_names("SELECT * FROM t ORDER ");
        assert!(names.contains(&"By"), "got {names:?}");
    }

    #[test]
    fn select_suggests_columns() {
        let kinds = expected_at("SELECT  FROM trades WHERE symbol = 'BTC'", 7);
        assert!(kinds.contains(&TokenKind::Identifier));
        assert!(kinds.contains(&TokenKind::Star));
        assert!(kinds.contains(&TokenKind::Keyword(Keyword::Distinct)));
    }

    #[test]
    fn empty_input_suggests_statements() {
        let kinds = expected_at("", 0);
        assert!(kinds.contains(&TokenKind::Keyword(Keyword::Select)));
        assert!(kinds.contains(&TokenKind::Keyword(Keyword::Insert)));
        assert!(kinds.contains(&TokenKind::Keyword(Keyword::Create)));
    }

    #[test]
    fn complete_statement_suggests_continuations() {
        let kinds = expected_at("SELECT 1", 8);
        assert!(kinds.contains(&TokenKind::Semicolon));
        assert!(kinds.contains(&TokenKind::Keyword(Keyword::From)));
        assert!(kinds.contains(&TokenKind::Comma));
    }

    #[test]
    fn create_prefix_explores_guarded_branches() {
        let kinds = expected_at("CREATE ", 7);
        assert!(kinds.contains(&TokenKind::Keyword(Keyword::Table)));
        assert!(kinds.contains(&TokenKind::Keyword(Keyword::Materialized)));
        assert!(kinds.contains(&TokenKind::Keyword(Keyword::User)));
        assert!(kinds.contains(&TokenKind::Keyword(Keyword::Atomic)));
    }

    #[test]
    fn sample_by_suggests_durations() {
        let kinds = expected_at("SELECT avg(price) FROM trades SAMPLE ", 37);
        assert!(kinds.contains(&TokenKind::Keyword(Keyword::By)));
        let kinds = expected_at("SELECT avg(price) FROM trades SAMPLE BY ", 40);
        assert!(kinds.contains(&TokenKind::Duration));
    }

    #[test]
    fn soundness_spot_checks() {
        // Any suggested keyword must extend to a parseable statement; spot
        // check the ORDER BY case.
        let sql = "SELECT * FROM t ORDER BY x";
        let tree = crate::Parser::new(sql).parse();
        assert!(tree.errors().is_empty());
    }
}
