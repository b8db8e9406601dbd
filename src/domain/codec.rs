//! Bracketed text format and DOT export.
//!
//! ```text
//! node     := leaf | interior
//! leaf     := '"' text '"'
//! interior := '(' '"' text '"' node node ')'
//! ```
//!
//! Whitespace (space, tab, CR, LF) between tokens is ignored. Strings have
//! no escapes, so text can never contain a double quote.

use std::fmt::{self, Write};

use tracing::{debug, instrument};

use crate::domain::arena::ArenaOptions;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::leaf_index::LeafIndex;
use crate::domain::node::{NodeId, NodeStore};
use crate::domain::tree::KnowledgeBase;

/// Default indentation per depth level of the text form.
pub const DEFAULT_INDENT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Spaces per depth level in the text form
    pub indent: usize,
    /// Deepest nesting the parser accepts, None for unbounded
    pub max_depth: Option<usize>,
    /// Write the whole tree on a single line
    pub compact: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            max_depth: None,
            compact: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Text(&'a str),
}

fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn skip_space(&mut self) {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() && is_space(bytes[self.pos]) {
            self.pos += 1;
        }
    }

    /// Next token with its starting offset, None at end of input.
    fn next_token(&mut self) -> DomainResult<Option<(usize, Token<'a>)>> {
        self.skip_space();
        let src = self.src;
        let start = self.pos;
        let bytes = src.as_bytes();
        let Some(&byte) = bytes.get(start) else {
            return Ok(None);
        };

        let token = match byte {
            b'(' => {
                self.pos += 1;
                Token::Open
            }
            b')' => {
                self.pos += 1;
                Token::Close
            }
            b'"' => {
                let body = start + 1;
                let len = bytes[body..]
                    .iter()
                    .position(|&b| b == b'"')
                    .ok_or_else(|| DomainError::malformed(start, "unterminated string"))?;
                self.pos = body + len + 1;
                Token::Text(&src[body..body + len])
            }
            other => {
                return Err(DomainError::malformed(
                    start,
                    format!("unexpected character {:?}", char::from(other)),
                ))
            }
        };
        Ok(Some((start, token)))
    }

    fn expect_token(&mut self, what: &str) -> DomainResult<(usize, Token<'a>)> {
        let end = self.src.len();
        self.next_token()?.ok_or_else(|| {
            DomainError::malformed(end, format!("unexpected end of input, expected {what}"))
        })
    }
}

/// Interior form whose children are still being parsed.
struct Frame<'a> {
    question: &'a str,
    on_yes: Option<(NodeId, usize)>,
}

struct Parser<'a> {
    tokens: Tokenizer<'a>,
    store: NodeStore,
    index: LeafIndex,
    max_depth: Option<usize>,
}

impl<'a> Parser<'a> {
    /// Parse one node; returns its id and the size of its subtree.
    ///
    /// Open interiors live on an explicit stack, so nesting depth is bounded
    /// by memory rather than by the call stack.
    fn parse_node(&mut self) -> DomainResult<(NodeId, usize)> {
        let mut open: Vec<Frame<'a>> = Vec::new();
        loop {
            let (offset, token) = self.tokens.expect_token("a node")?;
            let mut done = match token {
                Token::Text(name) => {
                    let leaf = self.store.allocate_leaf(name)?;
                    self.index.insert(&mut self.store, leaf)?;
                    (leaf, 1)
                }
                Token::Open => {
                    if let Some(limit) = self.max_depth {
                        if open.len() >= limit {
                            return Err(DomainError::malformed(
                                offset,
                                format!("nesting deeper than {limit}"),
                            ));
                        }
                    }
                    let question = match self.tokens.expect_token("a question")? {
                        (_, Token::Text(text)) => text,
                        (at, _) => return Err(DomainError::malformed(at, "expected a quoted question")),
                    };
                    open.push(Frame {
                        question,
                        on_yes: None,
                    });
                    continue;
                }
                Token::Close => return Err(DomainError::malformed(offset, "unexpected ')'")),
            };

            // fold finished subtrees into their enclosing interiors
            loop {
                let Some(frame) = open.last_mut() else {
                    return Ok(done);
                };
                let Some((on_yes, yes_count)) = frame.on_yes else {
                    frame.on_yes = Some(done);
                    break;
                };
                let question = frame.question;
                open.pop();

                match self.tokens.expect_token("')'")? {
                    (_, Token::Close) => {}
                    (at, _) => return Err(DomainError::malformed(at, "expected ')'")),
                }
                let (on_no, no_count) = done;
                let node = self.store.allocate_interior(question, on_yes, on_no)?;
                self.store.node_mut(on_yes).set_parent(Some(node));
                self.store.node_mut(on_no).set_parent(Some(node));
                done = (node, yes_count + no_count + 1);
            }
        }
    }
}

/// Write `width` spaces.
fn pad<W: Write>(out: &mut W, width: usize) -> fmt::Result {
    const SPACES: &str = "                                ";
    let mut left = width;
    while left > 0 {
        let n = left.min(SPACES.len());
        out.write_str(&SPACES[..n])?;
        left -= n;
    }
    Ok(())
}

impl KnowledgeBase {
    /// Parse a document with default options.
    pub fn parse(text: &str) -> DomainResult<Self> {
        Self::parse_with(text, ArenaOptions::default(), &CodecOptions::default())
    }

    /// Parse a whole document into a fresh knowledge base.
    ///
    /// Any error discards everything allocated so far; no partial tree is
    /// ever returned.
    #[instrument(level = "debug", skip(text), fields(len = text.len()))]
    pub fn parse_with(text: &str, arena: ArenaOptions, codec: &CodecOptions) -> DomainResult<Self> {
        let mut parser = Parser {
            tokens: Tokenizer::new(text),
            store: NodeStore::new(arena),
            index: LeafIndex::new(),
            max_depth: codec.max_depth,
        };

        let (root, size) = parser.parse_node()?;
        if let Some((offset, _)) = parser.tokens.next_token()? {
            return Err(DomainError::malformed(offset, "trailing content after root node"));
        }

        debug!(size, leaves = parser.index.len(), "parsed knowledge base");
        Ok(KnowledgeBase::from_parts(parser.store, root, size, parser.index))
    }

    /// Write the bracketed text form.
    pub fn dump_text<W: Write>(&self, out: &mut W, options: &CodecOptions) -> fmt::Result {
        if options.compact {
            return self.dump_compact(out);
        }

        enum Step {
            Enter(NodeId, usize),
            Close(usize),
        }

        let mut stack = vec![Step::Enter(self.root(), 0)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id, depth) => {
                    pad(out, depth.saturating_mul(options.indent))?;
                    match self.children(id) {
                        None => writeln!(out, "\"{}\"", self.text(id))?,
                        Some((yes, no)) => {
                            writeln!(out, "(\"{}\"", self.text(id))?;
                            stack.push(Step::Close(depth));
                            stack.push(Step::Enter(no, depth + 1));
                            stack.push(Step::Enter(yes, depth + 1));
                        }
                    }
                }
                Step::Close(depth) => {
                    pad(out, depth.saturating_mul(options.indent))?;
                    writeln!(out, ")")?;
                }
            }
        }
        Ok(())
    }

    fn dump_compact<W: Write>(&self, out: &mut W) -> fmt::Result {
        enum Step {
            Enter(NodeId),
            Close,
        }

        let mut stack = vec![Step::Enter(self.root())];
        let mut first = true;
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    if !first {
                        out.write_char(' ')?;
                    }
                    first = false;
                    match self.children(id) {
                        None => write!(out, "\"{}\"", self.text(id))?,
                        Some((yes, no)) => {
                            write!(out, "(\"{}\"", self.text(id))?;
                            stack.push(Step::Close);
                            stack.push(Step::Enter(no));
                            stack.push(Step::Enter(yes));
                        }
                    }
                }
                Step::Close => out.write_char(')')?,
            }
        }
        Ok(())
    }

    /// Text form as a string.
    pub fn to_text(&self, options: &CodecOptions) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.dump_text(&mut out, options);
        out
    }

    /// Write a DOT digraph; nodes are numbered from 1 in pre-order.
    ///
    /// The two edges of a question follow its whole subtree.
    pub fn dump_graph<W: Write>(&self, out: &mut W) -> fmt::Result {
        enum Step {
            Enter(NodeId),
            EnterNo { this: usize, no: NodeId },
            Edges { this: usize, no_id: usize },
        }

        writeln!(out, "digraph {{")?;
        let mut next_id = 1;
        let mut stack = vec![Step::Enter(self.root())];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    let this = next_id;
                    next_id += 1;
                    match self.children(id) {
                        None => writeln!(
                            out,
                            "    node{this} [label = \"{}\", shape = box];",
                            self.text(id)
                        )?,
                        Some((yes, no)) => {
                            writeln!(out, "    node{this} [label = \"{}?\"];", self.text(id))?;
                            stack.push(Step::EnterNo { this, no });
                            stack.push(Step::Enter(yes));
                        }
                    }
                }
                Step::EnterNo { this, no } => {
                    stack.push(Step::Edges {
                        this,
                        no_id: next_id,
                    });
                    stack.push(Step::Enter(no));
                }
                Step::Edges { this, no_id } => {
                    // the yes child is always numbered right after its question
                    writeln!(out, "    node{this} -> node{} [label = \"yes\"];", this + 1)?;
                    writeln!(out, "    node{this} -> node{no_id} [label = \"no\"];")?;
                }
            }
        }
        writeln!(out, "}}")
    }

    pub fn to_graph(&self) -> String {
        let mut out = String::new();
        let _ = self.dump_graph(&mut out);
        out
    }
}
