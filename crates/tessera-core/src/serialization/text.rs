// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Hand-written parser and emitter for the indentation-structured document
//! format.
//!
//! A document is a preamble followed by blocks:
//!
//! ```text
//! %YAML 1.1
//! %TAG !u! tag:unity3d.com,2011:
//! --- !u!1 &100000
//! GameObject:
//!   m_Name: Cube
//!   m_Component:
//!   - component: {fileID: 400000}
//! ```
//!
//! Each block header carries the type tag (`!u!1`) and the local file id
//! (`&100000`). The body is a single root key, the type name, whose value is
//! the field map. Only the subset of the format that object documents and
//! sidecar files use is supported: block and flow collections, plain and
//! quoted single-line scalars, and `#` comments.

use std::fmt::Write as _;

use super::{Node, SyntaxError};
use crate::object::{LocalFileId, TypeTag};

/// Written at the top of every document.
pub const PREAMBLE: &str = "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n";

/// A parsed document: an ordered sequence of tagged blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Blocks in document order.
    pub blocks: Vec<Block>,
}

/// One object's worth of document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Type tag from the block header.
    pub type_tag: TypeTag,
    /// Local file id from the block header.
    pub file_id: LocalFileId,
    /// The root key of the body.
    pub type_name: String,
    /// The object's fields in document order.
    pub fields: Vec<(String, Node)>,
    /// Whether the header carried the `stripped` marker.
    pub stripped: bool,
    /// 1-based line of the header, 0 for blocks built in memory.
    pub line: usize,
}

impl Block {
    /// Creates an in-memory block.
    pub fn new(
        type_tag: TypeTag,
        file_id: LocalFileId,
        type_name: impl Into<String>,
        fields: Vec<(String, Node)>,
    ) -> Self {
        Self {
            type_tag,
            file_id,
            type_name: type_name.into(),
            fields,
            stripped: false,
            line: 0,
        }
    }
}

impl Document {
    /// Parses document text.
    pub fn parse(text: &str) -> Result<Self, SyntaxError> {
        let mut blocks = Vec::new();
        let mut current: Option<(Header, Vec<Line>)> = None;

        for (index, raw) in text.lines().enumerate() {
            let number = index + 1;
            if raw.starts_with('%') || raw.trim_end() == "..." {
                continue;
            }
            if raw.starts_with("---") {
                if let Some((header, lines)) = current.take() {
                    blocks.push(finish_block(header, lines)?);
                }
                current = Some((Header::parse(raw, number)?, Vec::new()));
                continue;
            }
            let Some(line) = Line::new(raw, number)? else {
                continue;
            };
            match current.as_mut() {
                Some((_, lines)) => lines.push(line),
                None => {
                    return Err(SyntaxError::new(
                        number,
                        "content before the first block header",
                    ))
                }
            }
        }
        if let Some((header, lines)) = current {
            blocks.push(finish_block(header, lines)?);
        }
        Ok(Self { blocks })
    }

    /// Renders the document, preamble included.
    pub fn to_text(&self) -> String {
        let mut out = String::from(PREAMBLE);
        for block in &self.blocks {
            let _ = write!(out, "--- !u!{} &{}", block.type_tag, block.file_id);
            if block.stripped {
                out.push_str(" stripped");
            }
            out.push('\n');
            out.push_str(&format_scalar(&block.type_name));
            out.push(':');
            if block.fields.is_empty() {
                out.push_str(" {}\n");
            } else {
                out.push('\n');
                write_entries(&mut out, &block.fields, 2);
            }
        }
        out
    }
}

/// Parses a plain (header-less) document such as a sidecar file into one node.
///
/// Empty text yields an empty map.
pub fn parse_node(text: &str) -> Result<Node, SyntaxError> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        if raw.starts_with('%') || raw.starts_with("---") || raw.trim_end() == "..." {
            continue;
        }
        if let Some(line) = Line::new(raw, index + 1)? {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        return Ok(Node::Map(Vec::new()));
    }
    BlockParser::new(lines).parse_root()
}

/// Renders a node as a plain (header-less) document.
pub fn emit_node(node: &Node) -> String {
    let mut out = String::new();
    match node {
        Node::Map(entries) if !entries.is_empty() => write_entries(&mut out, entries, 0),
        Node::Sequence(items) if !items.is_empty() => write_items(&mut out, items, 0),
        Node::Map(_) => out.push_str("{}\n"),
        Node::Sequence(_) => out.push_str("[]\n"),
        Node::Scalar(text) => {
            out.push_str(&format_scalar(text));
            out.push('\n');
        }
    }
    out
}

// --- Reading ---

struct Header {
    type_tag: TypeTag,
    file_id: LocalFileId,
    stripped: bool,
    line: usize,
}

impl Header {
    fn parse(raw: &str, line: usize) -> Result<Self, SyntaxError> {
        let mut type_tag = None;
        let mut file_id = None;
        let mut stripped = false;

        for token in strip_comment(&raw[3..]).split_whitespace() {
            if let Some(tag) = token.strip_prefix("!u!") {
                let tag = tag
                    .parse::<u32>()
                    .map_err(|_| SyntaxError::new(line, format!("invalid type tag '{tag}'")))?;
                type_tag = Some(TypeTag(tag));
            } else if let Some(id) = token.strip_prefix('&') {
                let id = id
                    .parse::<i64>()
                    .map_err(|_| SyntaxError::new(line, format!("invalid file id '{id}'")))?;
                file_id = Some(LocalFileId(id));
            } else if token == "stripped" {
                stripped = true;
            } else {
                return Err(SyntaxError::new(
                    line,
                    format!("unexpected '{token}' in block header"),
                ));
            }
        }

        match (type_tag, file_id) {
            (Some(type_tag), Some(file_id)) => Ok(Self {
                type_tag,
                file_id,
                stripped,
                line,
            }),
            (None, _) => Err(SyntaxError::new(line, "block header has no type tag")),
            (_, None) => Err(SyntaxError::new(line, "block header has no file id")),
        }
    }
}

fn finish_block(header: Header, lines: Vec<Line>) -> Result<Block, SyntaxError> {
    if lines.is_empty() {
        return Err(SyntaxError::new(header.line, "block has no body"));
    }
    let root = BlockParser::new(lines).parse_root()?;
    let mut entries = match root {
        Node::Map(entries) if entries.len() == 1 => entries,
        _ => {
            return Err(SyntaxError::new(
                header.line,
                "block body must be a single 'TypeName:' entry",
            ))
        }
    };
    let (type_name, fields) = entries.remove(0);
    let fields = match fields {
        Node::Map(fields) => fields,
        Node::Scalar(text) if text.is_empty() => Vec::new(),
        other => {
            return Err(SyntaxError::new(
                header.line,
                format!("fields of '{type_name}' must be a map, found a {}", other.kind()),
            ))
        }
    };
    Ok(Block {
        type_tag: header.type_tag,
        file_id: header.file_id,
        type_name,
        fields,
        stripped: header.stripped,
        line: header.line,
    })
}

/// A significant line: indentation counted, comment and trailing space removed.
#[derive(Debug, Clone)]
struct Line {
    number: usize,
    indent: usize,
    text: String,
}

impl Line {
    fn new(raw: &str, number: usize) -> Result<Option<Self>, SyntaxError> {
        let content = raw.trim_start_matches(' ');
        let indent = raw.len() - content.len();
        if content.starts_with('\t') {
            return Err(SyntaxError::new(number, "tabs are not allowed in indentation"));
        }
        let text = strip_comment(content).trim_end();
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            number,
            indent,
            text: text.to_string(),
        }))
    }
}

fn is_item(text: &str) -> bool {
    text == "-" || text.starts_with("- ")
}

/// Recursive descent over the significant lines of one block.
struct BlockParser {
    lines: Vec<Line>,
    pos: usize,
}

impl BlockParser {
    fn new(lines: Vec<Line>) -> Self {
        Self { lines, pos: 0 }
    }

    fn peek(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    fn parse_root(mut self) -> Result<Node, SyntaxError> {
        let Some(indent) = self.peek().map(|line| line.indent) else {
            return Ok(Node::Map(Vec::new()));
        };
        let node = self.parse_block(indent)?;
        match self.peek() {
            Some(line) => Err(SyntaxError::new(line.number, "unexpected indentation")),
            None => Ok(node),
        }
    }

    fn parse_block(&mut self, indent: usize) -> Result<Node, SyntaxError> {
        match self.peek() {
            Some(line) if is_item(&line.text) => self.parse_sequence(indent),
            _ => self.parse_map(indent),
        }
    }

    /// Parses the value of a key whose text ended at the colon.
    ///
    /// A block sequence may sit at the key's own indentation (the compact
    /// form) except directly under a sequence dash.
    fn parse_nested(&mut self, parent: usize, allow_compact: bool) -> Result<Node, SyntaxError> {
        let Some((indent, item)) = self
            .peek()
            .map(|line| (line.indent, is_item(&line.text)))
        else {
            return Ok(Node::Scalar(String::new()));
        };
        if indent > parent {
            self.parse_block(indent)
        } else if allow_compact && indent == parent && item {
            self.parse_sequence(indent)
        } else {
            Ok(Node::Scalar(String::new()))
        }
    }

    fn parse_map(&mut self, indent: usize) -> Result<Node, SyntaxError> {
        let mut entries: Vec<(String, Node)> = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(SyntaxError::new(line.number, "unexpected indentation"));
            }
            if is_item(&line.text) {
                return Err(SyntaxError::new(
                    line.number,
                    "sequence item where a key was expected",
                ));
            }
            let number = line.number;
            let (key, rest) = split_key(&line.text, number)?.ok_or_else(|| {
                SyntaxError::new(number, format!("expected 'key: value', found '{}'", line.text))
            })?;
            let rest = rest.trim().to_string();
            self.pos += 1;

            if entries.iter().any(|(existing, _)| *existing == key) {
                return Err(SyntaxError::new(number, format!("duplicate key '{key}'")));
            }
            let value = if rest.is_empty() {
                self.parse_nested(indent, true)?
            } else {
                parse_inline(&rest, number)?
            };
            entries.push((key, value));
        }
        Ok(Node::Map(entries))
    }

    fn parse_sequence(&mut self, indent: usize) -> Result<Node, SyntaxError> {
        let mut items = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent != indent || !is_item(&line.text) {
                if line.indent > indent {
                    return Err(SyntaxError::new(line.number, "unexpected indentation"));
                }
                break;
            }
            let number = line.number;
            let rest = line.text[1..].trim_start().to_string();
            let column = indent + (line.text.len() - rest.len());

            let item = if rest.is_empty() {
                self.pos += 1;
                self.parse_nested(indent, false)?
            } else if is_item(&rest) || split_key(&rest, number)?.is_some() {
                // The item's content opens a nested collection at the column
                // after the dash; re-home the line there and parse it in place.
                self.lines[self.pos] = Line {
                    number,
                    indent: column,
                    text: rest,
                };
                self.parse_block(column)?
            } else {
                self.pos += 1;
                parse_inline(&rest, number)?
            };
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }
}

/// Splits `key: rest` into its key and the text after the colon.
///
/// Returns `None` when the text is not a mapping entry.
fn split_key(text: &str, line: usize) -> Result<Option<(String, &str)>, SyntaxError> {
    match text.chars().next() {
        None | Some('{') | Some('[') => Ok(None),
        Some('\'') | Some('"') => {
            let (key, rest) = parse_quoted(text).map_err(|message| SyntaxError::new(line, message))?;
            let rest = rest.trim_start();
            match rest.strip_prefix(':') {
                Some(after) if after.is_empty() || after.starts_with(' ') => Ok(Some((key, after))),
                _ => Ok(None),
            }
        }
        Some(_) => {
            let bytes = text.as_bytes();
            let colon = bytes.iter().enumerate().position(|(i, &b)| {
                b == b':' && (i + 1 == bytes.len() || bytes[i + 1] == b' ')
            });
            match colon {
                Some(at) if !text[..at].trim().is_empty() => {
                    Ok(Some((text[..at].trim_end().to_string(), &text[at + 1..])))
                }
                _ => Ok(None),
            }
        }
    }
}

fn parse_inline(text: &str, line: usize) -> Result<Node, SyntaxError> {
    match text.chars().next() {
        Some('{') | Some('[') => {
            let mut parser = FlowParser::new(text, line);
            let node = parser.parse_value()?;
            parser.skip_whitespace();
            if !parser.rest().is_empty() {
                return Err(parser.error("unexpected text after flow collection"));
            }
            Ok(node)
        }
        Some('\'') | Some('"') => {
            let (value, rest) =
                parse_quoted(text).map_err(|message| SyntaxError::new(line, message))?;
            if !rest.trim().is_empty() {
                return Err(SyntaxError::new(line, "unexpected text after quoted scalar"));
            }
            Ok(Node::Scalar(value))
        }
        _ => Ok(Node::Scalar(text.trim().to_string())),
    }
}

/// Parser for `{a: 1, b: [x, y]}` style collections on a single line.
struct FlowParser<'t> {
    text: &'t str,
    pos: usize,
    line: usize,
}

impl<'t> FlowParser<'t> {
    fn new(text: &'t str, line: usize) -> Self {
        Self { text, pos: 0, line }
    }

    fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.line, message)
    }

    fn expect(&mut self, expected: char) -> Result<(), SyntaxError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of line"))),
        }
    }

    fn parse_value(&mut self) -> Result<Node, SyntaxError> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.parse_map(),
            Some('[') => self.parse_sequence(),
            Some('\'') | Some('"') => self.parse_quoted().map(Node::Scalar),
            _ => Ok(Node::Scalar(self.parse_plain(false))),
        }
    }

    fn parse_quoted(&mut self) -> Result<String, SyntaxError> {
        let (value, rest) = parse_quoted(self.rest()).map_err(|message| self.error(message))?;
        self.pos = self.text.len() - rest.len();
        Ok(value)
    }

    fn parse_plain(&mut self, is_key: bool) -> String {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|&(_, c)| matches!(c, ',' | ']' | '}') || (is_key && c == ':'))
            .map(|(at, _)| at)
            .unwrap_or(rest.len());
        self.pos += end;
        rest[..end].trim().to_string()
    }

    fn parse_map(&mut self) -> Result<Node, SyntaxError> {
        self.expect('{')?;
        let mut entries: Vec<(String, Node)> = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.pos += 1;
                break;
            }
            let key = match self.peek() {
                Some('\'') | Some('"') => self.parse_quoted()?,
                _ => self.parse_plain(true),
            };
            if key.is_empty() {
                return Err(self.error("empty key in flow map"));
            }
            if entries.iter().any(|(existing, _)| *existing == key) {
                return Err(self.error(format!("duplicate key '{key}'")));
            }
            self.expect(':')?;
            let value = self.parse_value()?;
            entries.push((key, value));

            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("expected ',' or '}' in flow map")),
            }
        }
        Ok(Node::Map(entries))
    }

    fn parse_sequence(&mut self) -> Result<Node, SyntaxError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(']') {
                self.pos += 1;
                break;
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("expected ',' or ']' in flow sequence")),
            }
        }
        Ok(Node::Sequence(items))
    }
}

/// Parses a single- or double-quoted scalar at the start of `text`.
///
/// Returns the unescaped value and the text following the closing quote.
fn parse_quoted(text: &str) -> Result<(String, &str), String> {
    let mut chars = text.char_indices();
    let quote = match chars.next() {
        Some((_, c @ ('\'' | '"'))) => c,
        _ => return Err("expected a quoted scalar".to_string()),
    };
    let mut value = String::new();

    if quote == '\'' {
        while let Some((at, c)) = chars.next() {
            if c != '\'' {
                value.push(c);
            } else if text[at + 1..].starts_with('\'') {
                value.push('\'');
                chars.next();
            } else {
                return Ok((value, &text[at + 1..]));
            }
        }
    } else {
        while let Some((at, c)) = chars.next() {
            match c {
                '"' => return Ok((value, &text[at + 1..])),
                '\\' => {
                    let escaped = match chars.next() {
                        Some((_, 'n')) => '\n',
                        Some((_, 't')) => '\t',
                        Some((_, 'r')) => '\r',
                        Some((_, '0')) => '\0',
                        Some((_, '\\')) => '\\',
                        Some((_, '"')) => '"',
                        Some((_, '/')) => '/',
                        Some((_, 'u')) => {
                            let digits: String = chars.by_ref().take(4).map(|(_, d)| d).collect();
                            u32::from_str_radix(&digits, 16)
                                .ok()
                                .and_then(char::from_u32)
                                .ok_or_else(|| format!("invalid escape '\\u{digits}'"))?
                        }
                        Some((_, other)) => return Err(format!("unknown escape '\\{other}'")),
                        None => break,
                    };
                    value.push(escaped);
                }
                c => value.push(c),
            }
        }
    }
    Err("unterminated quoted scalar".to_string())
}

/// Removes a trailing `# comment`, ignoring `#` inside quoted scalars.
fn strip_comment(text: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        match quote {
            Some('\'') => {
                if c == '\'' {
                    if chars.peek().map(|&(_, next)| next) == Some('\'') {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            Some(_) => match c {
                '\\' => {
                    chars.next();
                }
                '"' => quote = None,
                _ => {}
            },
            None => {
                let at_token_start =
                    prev.map_or(true, |p| p.is_whitespace() || matches!(p, '[' | '{' | ','));
                match c {
                    '#' if prev.map_or(true, char::is_whitespace) => return &text[..at],
                    '\'' | '"' if at_token_start => quote = Some(c),
                    _ => {}
                }
            }
        }
        prev = Some(c);
    }
    text
}

// --- Writing ---

fn write_entries(out: &mut String, entries: &[(String, Node)], indent: usize) {
    for (key, value) in entries {
        push_indent(out, indent);
        out.push_str(&format_scalar(key));
        out.push(':');
        write_value(out, value, indent);
    }
}

/// Writes the value of an entry whose key sits at `indent`.
fn write_value(out: &mut String, value: &Node, indent: usize) {
    match value {
        Node::Scalar(text) => {
            out.push(' ');
            out.push_str(&format_scalar(text));
            out.push('\n');
        }
        Node::Sequence(items) if items.is_empty() => out.push_str(" []\n"),
        Node::Map(entries) if entries.is_empty() => out.push_str(" {}\n"),
        Node::Map(entries) if indent > 0 && is_flat(entries) => {
            out.push(' ');
            write_flow_map(out, entries);
            out.push('\n');
        }
        Node::Map(entries) => {
            out.push('\n');
            write_entries(out, entries, indent + 2);
        }
        Node::Sequence(items) => {
            out.push('\n');
            write_items(out, items, indent);
        }
    }
}

fn write_items(out: &mut String, items: &[Node], indent: usize) {
    for item in items {
        match item {
            Node::Map(entries) if !entries.is_empty() && is_flat(entries) => {
                push_indent(out, indent);
                out.push_str("- ");
                write_flow_map(out, entries);
                out.push('\n');
            }
            Node::Map(entries) if !entries.is_empty() => {
                let start = out.len();
                write_entries(out, entries, indent + 2);
                out.replace_range(start + indent..start + indent + 2, "- ");
            }
            Node::Sequence(nested) if !nested.is_empty() => {
                push_indent(out, indent);
                out.push_str("-\n");
                write_items(out, nested, indent + 2);
            }
            Node::Scalar(text) => {
                push_indent(out, indent);
                out.push_str("- ");
                out.push_str(&format_scalar(text));
                out.push('\n');
            }
            Node::Map(_) => {
                push_indent(out, indent);
                out.push_str("- {}\n");
            }
            Node::Sequence(_) => {
                push_indent(out, indent);
                out.push_str("- []\n");
            }
        }
    }
}

fn write_flow_map(out: &mut String, entries: &[(String, Node)]) {
    out.push('{');
    for (index, (key, value)) in entries.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        // Plain flow keys end at the first colon.
        if key.contains(':') && !key.chars().any(char::is_control) {
            let _ = write!(out, "'{}'", key.replace('\'', "''"));
        } else {
            out.push_str(&format_scalar(key));
        }
        out.push_str(": ");
        if let Node::Scalar(text) = value {
            out.push_str(&format_scalar(text));
        }
    }
    out.push('}');
}

fn is_flat(entries: &[(String, Node)]) -> bool {
    entries
        .iter()
        .all(|(_, value)| matches!(value, Node::Scalar(_)))
}

fn push_indent(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

/// Renders a scalar, quoting it when the plain form would not read back
/// unchanged.
fn format_scalar(text: &str) -> String {
    if text.chars().any(|c| c.is_control()) {
        let mut quoted = String::with_capacity(text.len() + 2);
        quoted.push('"');
        for c in text.chars() {
            match c {
                '"' => quoted.push_str("\\\""),
                '\\' => quoted.push_str("\\\\"),
                '\n' => quoted.push_str("\\n"),
                '\t' => quoted.push_str("\\t"),
                '\r' => quoted.push_str("\\r"),
                '\0' => quoted.push_str("\\0"),
                c if c.is_control() => {
                    let _ = write!(quoted, "\\u{:04x}", c as u32);
                }
                c => quoted.push(c),
            }
        }
        quoted.push('"');
        quoted
    } else if needs_quotes(text) {
        format!("'{}'", text.replace('\'', "''"))
    } else {
        text.to_string()
    }
}

fn needs_quotes(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return true;
    };
    if first.is_whitespace() || text.ends_with(char::is_whitespace) {
        return true;
    }
    if matches!(
        first,
        '!' | '&' | '*' | '?' | '|' | '>' | '\'' | '"' | '%' | '@' | '`' | '#' | ':'
    ) {
        return true;
    }
    if text == "-" || text.starts_with("- ") || text.starts_with("---") || text == "..." {
        return true;
    }
    text.contains(": ")
        || text.contains(" #")
        || text.contains(" '")
        || text.contains(" \"")
        || text.ends_with(':')
        || text.contains([',', '[', ']', '{', '}'])
}
