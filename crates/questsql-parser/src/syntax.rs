use crate::error::Error;
use crate::keyword::Keyword;
use crate::limit::LimitTracker;
use crate::token::{Token, TokenKind};
use std::fmt;

/// A concrete syntax tree node: one node per named grammar rule entered by
/// the parser.
///
/// The tree is lossless — every consumed token, trivia included, appears as
/// a child of exactly one node. Under error recovery a node may be missing
/// expected children; navigation helpers therefore all return `Option` or
/// iterators.
#[derive(Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub(crate) rule: &'static str,
    pub(crate) children: Vec<SyntaxElement>,
}

/// A child of a [`SyntaxNode`].
#[derive(Clone, PartialEq, Eq)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(Token),
}

impl SyntaxNode {
    pub(crate) fn new(rule: &'static str) -> Self {
        Self {
            rule,
            children: Vec::new(),
        }
    }

    /// The grammar rule this node was produced by.
    pub fn rule(&self) -> &'static str {
        self.rule
    }

    pub fn children(&self) -> &[SyntaxElement] {
        &self.children
    }

    /// Direct child nodes, in source order.
    pub fn nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter_map(|el| match el {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        })
    }

    /// The first direct child node produced by `rule`.
    pub fn node(&self, rule: &str) -> Option<&SyntaxNode> {
        self.nodes().find(|node| node.rule == rule)
    }

    /// All direct child nodes produced by `rule`.
    pub fn nodes_named<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a SyntaxNode> {
        self.nodes().filter(move |node| node.rule == rule)
    }

    /// Direct child tokens, trivia excluded.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(|el| match el {
            SyntaxElement::Token(token) if !token.kind().is_trivia() => Some(token),
            _ => None,
        })
    }

    /// The first direct child token of `kind`.
    pub fn token(&self, kind: TokenKind) -> Option<&Token> {
        self.tokens().find(|token| token.kind() == kind)
    }

    /// The first direct child keyword token equal to `kw`.
    pub fn keyword(&self, kw: Keyword) -> Option<&Token> {
        self.token(TokenKind::Keyword(kw))
    }

    pub fn has_keyword(&self, kw: Keyword) -> bool {
        self.keyword(kw).is_some()
    }

    /// The first token anywhere under this node, trivia included.
    pub fn first_token(&self) -> Option<&Token> {
        self.children.iter().find_map(|el| match el {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(node) => node.first_token(),
        })
    }

    /// The last token anywhere under this node, trivia included.
    pub fn last_token(&self) -> Option<&Token> {
        self.children.iter().rev().find_map(|el| match el {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(node) => node.last_token(),
        })
    }

    /// Byte offset where this node's text begins.
    pub fn start(&self) -> usize {
        self.first_token().map_or(0, Token::index)
    }

    /// Byte offset one past this node's text.
    pub fn end(&self) -> usize {
        self.last_token().map_or(0, Token::end)
    }

    /// Whether `offset` falls within this node's span, end inclusive.
    pub fn contains(&self, offset: usize) -> bool {
        self.start() <= offset && offset <= self.end()
    }

    /// Reconstructs the source slice this node covers, trivia included.
    pub fn source_text(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    fn write_source(&self, out: &mut String) {
        for el in &self.children {
            match el {
                SyntaxElement::Token(token) => out.push_str(token.text()),
                SyntaxElement::Node(node) => node.write_source(out),
            }
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{}@{}..{}",
            "",
            self.rule,
            self.start(),
            self.end(),
            indent = depth * 2
        )?;
        for el in &self.children {
            match el {
                SyntaxElement::Node(node) => node.fmt_indented(f, depth + 1)?,
                SyntaxElement::Token(token) => {
                    if token.kind() == TokenKind::Whitespace {
                        continue;
                    }
                    writeln!(
                        f,
                        "{:indent$}{}@{}..{} {:?}",
                        "",
                        token.kind().name(),
                        token.index(),
                        token.end(),
                        token.text(),
                        indent = (depth + 1) * 2
                    )?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// The result of a parse: the root CST node plus accumulated errors.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    pub(crate) root: SyntaxNode,
    pub(crate) errors: Vec<Error>,
    pub(crate) recursion_limit: LimitTracker,
}

impl SyntaxTree {
    /// The root node; its rule is `statementList`.
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    /// Recursion-limit usage observed during the parse.
    pub fn recursion_limit(&self) -> LimitTracker {
        self.recursion_limit
    }

    /// The parsed statement nodes, empty statements skipped.
    pub fn statements(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.root.nodes_named("statement")
    }
}
