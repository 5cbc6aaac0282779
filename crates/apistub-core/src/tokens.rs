//! Token stream sink.
//!
//! [`ApiView`] is the single output channel every node writes into. It is an
//! append-only sequence of [`Token`]s: tokens are stored in emission order and
//! are never reordered or deduplicated here. Ordering fidelity is the
//! responsibility of the node tree.
//!
//! Besides the tokens, the view tracks the current indentation level so nodes
//! can emit layout whitespace without knowing their depth.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::TypeExpr;

/// Width of one indentation level.
pub const INDENT: &str = "    ";

// ============================================================================
// Token
// ============================================================================

/// Kind tag of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Language keyword (`class`, `def`, `ivar`).
    Keyword,
    /// Identifier or other plain text.
    Text,
    /// Type name.
    TypeName,
    /// Punctuation.
    Punctuation,
    /// Quoted string literal.
    StringLiteral,
    /// Any other literal.
    Literal,
    /// Layout whitespace.
    Whitespace,
    /// End of line.
    Newline,
    /// Non-rendering anchor that lets diff tooling locate a line.
    LineIdMarker,
}

/// One atomic unit of rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Kind tag.
    pub kind: TokenKind,
    /// Display text.
    pub value: String,
    /// Identity used for addressing and diffing; `None` for decorative tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_id: Option<String>,
    /// Identity of the declaration this token links to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<String>,
    /// Render a space before the value.
    #[serde(default, skip_serializing_if = "is_false")]
    pub prefix_space: bool,
    /// Render a space after the value.
    #[serde(default, skip_serializing_if = "is_false")]
    pub postfix_space: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Token {
    /// Create a token with no identity and no layout hints.
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Token {
            kind,
            value: value.into(),
            definition_id: None,
            navigate_to: None,
            prefix_space: false,
            postfix_space: false,
        }
    }

    /// Attach a definition id.
    pub fn with_definition_id(mut self, id: Option<&str>) -> Self {
        self.definition_id = id.map(str::to_string);
        self
    }

    /// Attach layout hints.
    pub fn with_spacing(mut self, prefix_space: bool, postfix_space: bool) -> Self {
        self.prefix_space = prefix_space;
        self.postfix_space = postfix_space;
        self
    }
}

// ============================================================================
// ApiView
// ============================================================================

/// Append-only token sink.
#[derive(Debug, Default)]
pub struct ApiView {
    tokens: Vec<Token>,
    indent: usize,
    anchored: BTreeSet<String>,
    duplicates: Vec<String>,
}

impl ApiView {
    /// Create an empty view.
    pub fn new() -> Self {
        ApiView::default()
    }

    /// Tokens emitted so far.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Consume the view, returning its tokens.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Current indentation level.
    pub fn indent_level(&self) -> usize {
        self.indent
    }

    /// Line anchor ids that were emitted more than once.
    ///
    /// Two siblings sharing name and type produce the same qualified id. The
    /// collision is kept in the stream and surfaced here.
    pub fn duplicate_definitions(&self) -> &[String] {
        &self.duplicates
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Increase indentation for the tokens that follow.
    pub fn begin_group(&mut self) {
        self.indent += 1;
    }

    /// Decrease indentation.
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Emit whitespace for the current indentation level.
    pub fn add_whitespace(&mut self) {
        if self.indent > 0 {
            let indent = INDENT.repeat(self.indent);
            self.push(Token::new(TokenKind::Whitespace, indent));
        }
    }

    /// Emit an end of line.
    pub fn add_newline(&mut self) {
        self.push(Token::new(TokenKind::Newline, "\n"));
    }

    /// Emit a keyword.
    pub fn add_keyword(&mut self, keyword: &str, prefix_space: bool, postfix_space: bool) {
        let token = Token::new(TokenKind::Keyword, keyword);
        self.push(token.with_spacing(prefix_space, postfix_space));
    }

    /// Emit plain text, optionally tied to a definition id.
    pub fn add_text(&mut self, definition_id: Option<&str>, text: &str) {
        let token = Token::new(TokenKind::Text, text);
        self.push(token.with_definition_id(definition_id));
    }

    /// Emit punctuation.
    pub fn add_punctuation(&mut self, value: &str, prefix_space: bool, postfix_space: bool) {
        let token = Token::new(TokenKind::Punctuation, value);
        self.push(token.with_spacing(prefix_space, postfix_space));
    }

    /// Emit a quoted string literal.
    ///
    /// Backslashes and double quotes in `value` are escaped, so the token
    /// text always reads back as a single literal.
    pub fn add_string_literal(&mut self, value: &str) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        let literal = format!("\"{}\"", escaped);
        self.push(Token::new(TokenKind::StringLiteral, literal));
    }

    /// Emit a non-string literal.
    pub fn add_literal(&mut self, value: &str) {
        self.push(Token::new(TokenKind::Literal, value));
    }

    /// Emit a line anchor for `id`.
    pub fn add_line_marker(&mut self, id: &str) {
        if !self.anchored.insert(id.to_string()) {
            warn!("duplicate definition id '{}' in token stream", id);
            self.duplicates.push(id.to_string());
        }
        let token = Token::new(TokenKind::LineIdMarker, "");
        self.push(token.with_definition_id(Some(id)));
    }

    /// Emit a single type name, linking it to `navigate_to` when known.
    pub fn add_type_name(&mut self, name: &str, navigate_to: Option<&str>) {
        let mut token = Token::new(TokenKind::TypeName, name);
        token.navigate_to = navigate_to.map(str::to_string);
        self.push(token);
    }

    /// Emit a structured type expression.
    ///
    /// The emitted values concatenate to exactly `expr.render(pkg_root)`.
    /// Package-local names link to their qualified name. Unresolved
    /// annotations emit nothing; callers record the diagnostic.
    pub fn add_type(&mut self, expr: &TypeExpr, pkg_root: &str) {
        match expr {
            TypeExpr::Named { args, .. } => {
                let name = expr.display_name(pkg_root).unwrap_or_default();
                let navigate = expr.is_package_local(pkg_root).then(|| name.clone());
                self.add_type_name(&name, navigate.as_deref());
                self.add_type_args(args, pkg_root);
            }
            TypeExpr::Union { members } => {
                self.add_type_name("Union", None);
                self.add_type_args(members, pkg_root);
            }
            TypeExpr::Optional { inner } => {
                self.add_type_name("Optional", None);
                self.add_punctuation("[", false, false);
                self.add_type(inner, pkg_root);
                self.add_punctuation("]", false, false);
            }
            TypeExpr::Literal { text } => self.add_type_name(text, None),
            TypeExpr::Unresolved { .. } => {}
        }
    }

    fn add_type_args(&mut self, args: &[TypeExpr], pkg_root: &str) {
        if args.is_empty() {
            return;
        }
        self.add_punctuation("[", false, false);
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.add_punctuation(",", false, true);
            }
            self.add_type(arg, pkg_root);
        }
        self.add_punctuation("]", false, false);
    }

    /// Emit `(name=value, ...)` for a list of attribute pairs.
    ///
    /// Names are tied to `definition_id`; values are plain text. Parentheses
    /// are emitted even when `pairs` is empty.
    pub fn add_attribute_pairs(
        &mut self,
        definition_id: Option<&str>,
        pairs: &[(String, String)],
    ) {
        self.add_punctuation("(", false, false);
        for (i, (name, value)) in pairs.iter().enumerate() {
            self.add_text(definition_id, name);
            self.add_punctuation("=", false, false);
            self.add_text(None, value);
            if i < pairs.len() - 1 {
                self.add_punctuation(",", false, true);
            }
        }
        self.add_punctuation(")", false, false);
    }

    /// Render the stream as plain text, honouring layout hints.
    pub fn render_text(&self) -> String {
        render_text(&self.tokens)
    }
}

/// Render a token slice as plain text.
pub fn render_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        if token.prefix_space {
            out.push(' ');
        }
        out.push_str(&token.value);
        if token.postfix_space {
            out.push(' ');
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
