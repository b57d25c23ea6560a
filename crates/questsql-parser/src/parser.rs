use crate::error::Error;
use crate::grammar::{is_ident_like, Grammar, Rule, GRAMMAR};
use crate::keyword::Keyword;
use crate::lexer::Lexer;
use crate::limit::LimitTracker;
use crate::syntax::{SyntaxElement, SyntaxNode, SyntaxTree};
use crate::token::{Token, TokenKind};
use indexmap::IndexSet;

/// Parse QuestDB SQL into a lossless CST.
///
/// The parser is a predictive evaluator of the grammar's rule graph. It
/// never fails: lexical and syntactic errors are accumulated and returned
/// alongside the best tree it could build.
///
/// ```rust
/// use questsql_parser::Parser;
///
/// let sql = "SELECT * FROM trades WHERE symbol = 'BTC-USD'";
/// let tree = Parser::new(sql).parse();
/// assert!(tree.errors().is_empty());
/// assert_eq!(tree.statements().count(), 1);
/// ```
pub struct Parser {
    grammar: &'static Grammar,
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<Error>,
    recursion: LimitTracker,
    limited: bool,
    last_error_pos: Option<usize>,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("pos", &self.pos)
            .field("errors", &self.errors)
            .field("recursion", &self.recursion)
            .finish_non_exhaustive()
    }
}

const DEFAULT_RECURSION_LIMIT: usize = 500;

/// Keywords the parser resynchronizes on after a statement went off the
/// rails: anything that can start a new statement.
const SYNC_KEYWORDS: &[Keyword] = &[
    Keyword::Select,
    Keyword::Insert,
    Keyword::Update,
    Keyword::Create,
    Keyword::Alter,
    Keyword::Drop,
    Keyword::Rename,
    Keyword::Truncate,
    Keyword::Show,
    Keyword::Explain,
    Keyword::With,
    Keyword::Declare,
    Keyword::Grant,
    Keyword::Revoke,
    Keyword::Refresh,
    Keyword::Vacuum,
    Keyword::Reindex,
    Keyword::Copy,
    Keyword::Cancel,
    Keyword::Checkpoint,
    Keyword::Snapshot,
    Keyword::Backup,
    Keyword::Compile,
];

impl Parser {
    /// Create a parser over `input`. Lex errors surface in the parse result.
    pub fn new(input: &str) -> Self {
        let (tokens, errors) = Lexer::new(input).into_parts();
        Self {
            grammar: &GRAMMAR,
            tokens,
            pos: 0,
            errors,
            recursion: LimitTracker::new(DEFAULT_RECURSION_LIMIT),
            limited: false,
            last_error_pos: None,
        }
    }

    /// Configure the recursion limit to use while parsing.
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion = LimitTracker::new(limit);
        self
    }

    /// Parse the input to a syntax tree. Always returns; check
    /// [`SyntaxTree::errors`] before trusting the tree's shape.
    pub fn parse(mut self) -> SyntaxTree {
        let mut root = SyntaxNode::new("statementList");
        loop {
            match self.peek_kind() {
                TokenKind::Eof => {
                    self.bump_into(&mut root);
                    break;
                }
                TokenKind::Semicolon => {
                    self.bump_into(&mut root);
                }
                _ if self.would_match(&Rule::Ref("statement")) => {
                    self.attach_trivia(&mut root);
                    let before = self.pos;
                    let stmt = self.parse_rule("statement");
                    if !stmt.children.is_empty() {
                        root.children.push(SyntaxElement::Node(stmt));
                    }
                    if self.pos == before {
                        self.error_expected(&Rule::Ref("statement"));
                        self.bump_into(&mut root);
                        continue;
                    }
                    let kind = self.peek_kind();
                    if kind != TokenKind::Semicolon && kind != TokenKind::Eof {
                        self.error_expected(&Rule::Terminal(TokenKind::Semicolon));
                        self.synchronize(&mut root);
                    }
                }
                _ => {
                    self.error_expected(&Rule::Ref("statement"));
                    self.bump_into(&mut root);
                }
            }
        }
        SyntaxTree {
            root,
            errors: self.errors,
            recursion_limit: self.recursion,
        }
    }

    /// Skip tokens until a statement boundary or a synchronizing keyword.
    fn synchronize(&mut self, node: &mut SyntaxNode) {
        loop {
            match self.peek_kind() {
                TokenKind::Eof | TokenKind::Semicolon => break,
                TokenKind::Keyword(kw) if SYNC_KEYWORDS.contains(&kw) => break,
                _ => self.bump_into(node),
            }
        }
    }

    fn parse_rule(&mut self, name: &'static str) -> SyntaxNode {
        let mut node = SyntaxNode::new(name);
        if self.recursion.check_and_increment() {
            if !self.limited {
                self.limited = true;
                let token = self.peek_token().clone();
                self.errors.push(Error::new(
                    "parser recursion limit reached",
                    token.text().to_string(),
                    token.index(),
                    token.line(),
                    token.column(),
                ));
            }
            self.recursion.decrement();
            return node;
        }
        let rule = self.grammar.rule(name);
        self.run(rule, &mut node);
        self.recursion.decrement();
        node
    }

    fn run(&mut self, rule: &Rule, node: &mut SyntaxNode) -> bool {
        if self.limited {
            return false;
        }
        match rule {
            Rule::Terminal(kind) => {
                if self.peek_kind() == *kind {
                    self.bump_into(node);
                    true
                } else {
                    false
                }
            }
            Rule::IdentLike => {
                if is_ident_like(self.peek_kind()) {
                    self.bump_into(node);
                    true
                } else {
                    false
                }
            }
            Rule::Sequence(items) => self.run_sequence(items, node),
            Rule::Alt(branches) => {
                for branch in branches {
                    if self.would_match(branch) {
                        return self.run(branch, node);
                    }
                }
                false
            }
            Rule::Optional(inner) => {
                if self.would_match(inner) {
                    self.run(inner, node);
                }
                true
            }
            Rule::Many(inner) => {
                self.run_repeat(inner, node);
                true
            }
            Rule::Many1(inner) => {
                let before = self.pos;
                if !self.run(inner, node) && self.pos == before {
                    return false;
                }
                self.run_repeat(inner, node);
                true
            }
            Rule::SepBy { elem, sep } => self.run_sep_by(elem, sep, node),
            Rule::Ref(name) => {
                let nullable = self.grammar.nullable(rule);
                if !self.would_match(rule) {
                    return nullable;
                }
                // Trivia between tokens belongs to the innermost node that
                // was current when it was seen, not to the child about to
                // start.
                self.attach_trivia(node);
                let child = self.parse_rule(*name);
                let matched = !child.children.is_empty();
                if matched {
                    node.children.push(SyntaxElement::Node(child));
                }
                matched || nullable
            }
            Rule::Peek { rule, .. } => self.run(rule, node),
        }
    }

    fn run_sequence(&mut self, items: &[Rule], node: &mut SyntaxNode) -> bool {
        let mut consumed = false;
        for item in items {
            let before = self.pos;
            if self.run(item, node) {
                consumed = consumed || self.pos != before;
                continue;
            }
            if self.pos != before {
                // A partial match inside the item already reported what it
                // was missing; keep going with the rest of the sequence.
                consumed = true;
                continue;
            }
            if self.grammar.nullable(item) {
                continue;
            }
            if !consumed {
                return false;
            }
            self.error_expected(item);
        }
        true
    }

    fn run_repeat(&mut self, inner: &Rule, node: &mut SyntaxNode) {
        loop {
            if !self.would_match(inner) {
                break;
            }
            let before = self.pos;
            if !self.run(inner, node) || self.pos == before {
                break;
            }
        }
    }

    fn run_sep_by(&mut self, elem: &Rule, sep: &Rule, node: &mut SyntaxNode) -> bool {
        if !self.would_match(elem) {
            return false;
        }
        let before = self.pos;
        if !self.run(elem, node) && self.pos == before {
            return false;
        }
        loop {
            if !self.would_match(sep) {
                break;
            }
            // Only commit to the separator when another element follows;
            // a dangling separator belongs to the surrounding clause.
            if !self.would_match_at(elem, 1) {
                break;
            }
            self.run(sep, node);
            let before = self.pos;
            if !self.run(elem, node) || self.pos == before {
                break;
            }
        }
        true
    }

    /// Whether `rule` can apply at the current token, honouring lookahead
    /// guards.
    fn would_match(&self, rule: &Rule) -> bool {
        self.would_match_at(rule, 0)
    }

    fn would_match_at(&self, rule: &Rule, skip: usize) -> bool {
        match rule {
            Rule::Peek { pats, .. } => pats
                .iter()
                .enumerate()
                .all(|(i, pat)| pat.matches(self.peek_nth(skip + i))),
            Rule::Alt(branches) => branches.iter().any(|b| self.would_match_at(b, skip)),
            Rule::Optional(inner) | Rule::Many(inner) => self.would_match_at(inner, skip),
            _ => self.grammar.starts_with(rule, self.peek_nth(skip).kind()),
        }
    }

    fn error_expected(&mut self, rule: &Rule) {
        let at = self.peek_index();
        if self.last_error_pos == Some(at) {
            return;
        }
        self.last_error_pos = Some(at);
        let expected = self.describe(rule);
        let token = &self.tokens[at];
        let err = if token.kind() == TokenKind::Eof {
            Error::eof(
                format!("expected {expected}"),
                token.index(),
                token.line(),
                token.column(),
            )
        } else {
            Error::new(
                format!("expected {expected}, found `{}`", token.text()),
                token.text().to_string(),
                token.index(),
                token.line(),
                token.column(),
            )
        };
        self.errors.push(err);
    }

    /// A compact rendering of the token kinds `rule` could accept.
    fn describe(&self, rule: &Rule) -> String {
        if let Rule::Terminal(kind) = rule {
            return format!("{}", kind.name());
        }
        if matches!(rule, Rule::IdentLike) {
            return "an identifier".to_string();
        }
        let mut first = IndexSet::new();
        self.grammar.first_of(rule, &mut first);
        let collapse_idents = first.contains(&TokenKind::Identifier);
        let mut names: Vec<&str> = Vec::new();
        if collapse_idents {
            names.push("an identifier");
        }
        for kind in &first {
            match kind {
                TokenKind::Identifier | TokenKind::QuotedIdentifier => {}
                TokenKind::Keyword(kw) if collapse_idents && !kw.is_reserved() => {}
                other => names.push(other.name()),
            }
        }
        names.truncate(8);
        format!("one of {}", names.join(", "))
    }

    // -- token stream helpers ------------------------------------------------

    /// Index of the next non-trivia token.
    fn peek_index(&self) -> usize {
        let mut i = self.pos;
        while i < self.tokens.len() && self.tokens[i].kind().is_trivia() {
            i += 1;
        }
        i.min(self.tokens.len() - 1)
    }

    fn peek_token(&self) -> &Token {
        &self.tokens[self.peek_index()]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek_token().kind()
    }

    /// The `n`th non-trivia token from the current position.
    fn peek_nth(&self, n: usize) -> &Token {
        let mut remaining = n;
        let mut i = self.pos;
        loop {
            if i >= self.tokens.len() {
                return self.tokens.last().expect("token stream ends with Eof");
            }
            if !self.tokens[i].kind().is_trivia() {
                if remaining == 0 {
                    return &self.tokens[i];
                }
                remaining -= 1;
            }
            i += 1;
        }
    }

    /// Attach pending trivia to `node` without consuming anything else.
    fn attach_trivia(&mut self, node: &mut SyntaxNode) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind().is_trivia() {
            node.children
                .push(SyntaxElement::Token(self.tokens[self.pos].clone()));
            self.pos += 1;
        }
    }

    /// Attach pending trivia and one non-trivia token to `node`.
    fn bump_into(&mut self, node: &mut SyntaxNode) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind().is_trivia() {
            node.children
                .push(SyntaxElement::Token(self.tokens[self.pos].clone()));
            self.pos += 1;
        }
        if self.pos < self.tokens.len() {
            node.children
                .push(SyntaxElement::Token(self.tokens[self.pos].clone()));
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn parses_a_simple_select() {
        let tree = Parser::new("SELECT * FROM trades WHERE symbol = 'BTC-USD'").parse();
        assert_eq!(tree.errors(), &[] as &[Error]);

        let cst = expect![[r#"
            statementList@0..45
              statement@0..45
                selectStatement@0..45
                  selectBody@0..45
                    Select@0..6 "SELECT"
                    selectColumns@7..8
                      selectColumn@7..8
                        Star@7..8 "*"
                    From@9..13 "FROM"
                    fromClause@14..20
                      tableRef@14..20
                        tableSource@14..20
                          qualifiedName@14..20
                            Identifier@14..20 "trades"
                    queryTail@21..45
                      whereClause@21..45
                        Where@21..26 "WHERE"
                        expr@27..45
                          orExpr@27..45
                            andExpr@27..45
                              notExpr@27..45
                                compareExpr@27..45
                                  addExpr@27..33
                                    mulExpr@27..33
                                      unaryExpr@27..33
                                        postfixExpr@27..33
                                          primaryExpr@27..33
                                            qualifiedName@27..33
                                              Identifier@27..33 "symbol"
                                  compareTail@34..45
                                    Eq@34..35 "="
                                    addExpr@36..45
                                      mulExpr@36..45
                                        unaryExpr@36..45
                                          postfixExpr@36..45
                                            primaryExpr@36..45
                                              literal@36..45
                                                String@36..45 "'BTC-USD'"
              Eof@45..45 ""
        "#]];
        cst.assert_eq(&format!("{:?}", tree.root()));
    }

    #[test]
    fn never_panics_on_garbage() {
        let tree = Parser::new("SELECT FROM WHERE ;; ^^^ 123 garbage").parse();
        assert!(!tree.errors().is_empty());
    }

    #[test]
    fn recovers_between_statements() {
        let tree = Parser::new("SELECT 1 garbage garbage; SELECT 2").parse();
        assert!(!tree.errors().is_empty());
        assert_eq!(tree.statements().count(), 2);
    }

    #[test]
    fn errors_carry_positions() {
        let tree = Parser::new("SELECT a FROM").parse();
        let errors = tree.errors();
        assert!(!errors.is_empty());
        assert_eq!(errors[0].line(), 1);
    }

    #[test]
    fn recursion_limit_reports_once() {
        let mut sql = String::from("SELECT ");
        sql.push_str(&"(".repeat(600));
        sql.push('1');
        sql.push_str(&")".repeat(600));
        let tree = Parser::new(&sql).recursion_limit(50).parse();
        let limit_errors = tree
            .errors()
            .iter()
            .filter(|e| e.message().contains("recursion limit"))
            .count();
        assert_eq!(limit_errors, 1);
    }

    #[test]
    fn cst_is_lossless() {
        let sql = "SELECT a, -- keep me\n  b FROM t;";
        let tree = Parser::new(sql).parse();
        assert_eq!(tree.root().source_text(), sql);
    }
}
