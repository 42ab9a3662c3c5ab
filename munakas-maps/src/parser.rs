//! Radar configuration parser
//!
//! Parses the KeyValues-style text files that describe how a radar image
//! maps onto world coordinates:
//!
//! ```text
//! "de_nuke"
//! {
//!     "pos_x"     "-3453"
//!     "pos_y"     "2887"
//!     "scale"     "7"
//!     "verticalsections"
//!     {
//!         "default" // upper level
//!         {
//!             "AltitudeMax"   "10000"
//!             "AltitudeMin"   "-495"
//!         }
//!         "lower"
//!         {
//!             "AltitudeMax"   "-495"
//!             "AltitudeMin"   "-10000"
//!         }
//!     }
//! }
//! ```
//!
//! Parsing never fails: unknown keys are ignored and malformed or missing
//! values leave the field at its default.

use std::path::Path;

use crate::error::{MapsError, Result};
use crate::metadata::{MapMetadata, VerticalSection};

/// Read and parse the config file for `id`.
///
/// Only an unreadable file is an error; its contents are parsed leniently.
pub fn load_map_config(path: &Path, id: &str) -> Result<MapMetadata> {
    let content = std::fs::read(path).map_err(|source| MapsError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_map_config(id, &String::from_utf8_lossy(&content)))
}

/// Parse config text into metadata for `id`.
///
/// Known keys are found anywhere on a line, each followed by its value, so
/// `{ "scale" "4.0" }` and `"pos_x" "1" "pos_y" "2"` are both read.
pub fn parse_map_config(id: &str, content: &str) -> MapMetadata {
    let lines: Vec<&str> = content.lines().collect();
    let mut metadata = MapMetadata::with_defaults(id);

    let mut index = 0;
    while index < lines.len() {
        let tokens = tokenize(strip_comment(lines[index]));
        let mut opens_block = false;

        let mut pos = 0;
        while pos < tokens.len() {
            let Some(key) = tokens[pos].quoted() else {
                pos += 1;
                continue;
            };
            let value = tokens.get(pos + 1).and_then(Token::text);

            match key.to_ascii_lowercase().as_str() {
                "pos_x" => assign(&mut metadata.origin_x, value),
                "pos_y" => assign(&mut metadata.origin_y, value),
                "rotate" => assign(&mut metadata.rotation, value),
                "scale" => {
                    // A zero scale would collapse every projected coordinate
                    if let Some(scale) = value.and_then(parse_number).filter(|s| *s != 0.0) {
                        metadata.scale = scale;
                    }
                }
                "verticalsections" => {
                    opens_block = true;
                    break;
                }
                _ => {
                    pos += 1;
                    continue;
                }
            }

            pos += if value.is_some() { 2 } else { 1 };
        }

        if opens_block {
            let (updated, next) = parse_vertical_sections(&lines, index, metadata);
            metadata = updated;
            index = next;
        } else {
            index += 1;
        }
    }

    metadata
}

/// Parse the `verticalsections` block whose keyword is on `lines[start]`.
///
/// Returns the metadata with every completed section added, and the index
/// of the first line after the block. A block that never closes consumes
/// the rest of the input; sections committed before the end are kept.
pub fn parse_vertical_sections(
    lines: &[&str],
    start: usize,
    mut metadata: MapMetadata,
) -> (MapMetadata, usize) {
    let mut block = SectionBlock::default();
    let mut opened = false;

    for (index, raw) in lines.iter().enumerate().skip(start) {
        let tokens = tokenize(strip_comment(raw));
        let mut rest = tokens.as_slice();

        if index == start {
            let keyword = rest.iter().position(|t| {
                t.quoted().is_some_and(|k| k.eq_ignore_ascii_case("verticalsections"))
            });
            if let Some(pos) = keyword {
                rest = &rest[pos + 1..];
            }
        }

        if !opened {
            let Some(pos) = rest.iter().position(|t| *t == Token::Open) else {
                continue;
            };
            opened = true;
            rest = &rest[pos + 1..];
        }

        if block.feed(rest, &mut metadata) {
            return (metadata, index + 1);
        }
    }

    (metadata, lines.len())
}

/// Brace tracking state inside a `verticalsections` block.
///
/// Depth 1 is the block itself, depth 2 the body of a named section.
struct SectionBlock {
    depth: usize,
    pending_name: Option<String>,
    current: Option<(String, VerticalSection)>,
}

impl Default for SectionBlock {
    fn default() -> Self {
        Self {
            depth: 1,
            pending_name: None,
            current: None,
        }
    }
}

impl SectionBlock {
    /// Consume the tokens of one line left to right. Returns true once the
    /// block has closed.
    fn feed(&mut self, tokens: &[Token<'_>], metadata: &mut MapMetadata) -> bool {
        let mut pos = 0;
        while pos < tokens.len() {
            match tokens[pos] {
                Token::Open => {
                    self.depth += 1;
                    if self.depth == 2 {
                        self.current = self
                            .pending_name
                            .take()
                            .map(|name| (name, VerticalSection::default()));
                    }
                }
                Token::Close => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 1 {
                        if let Some((name, section)) = self.current.take() {
                            metadata.vertical_sections.insert(name, section);
                        }
                    }
                    if self.depth == 0 {
                        return true;
                    }
                }
                Token::Quoted(word) | Token::Bare(word) => {
                    let value = tokens.get(pos + 1).and_then(Token::text);
                    match (self.depth, value) {
                        // `"name" "value"` directly in the block is not a section
                        (1, Some(_)) => {
                            self.pending_name = None;
                            pos += 1;
                        }
                        (1, None) => self.pending_name = Some(word.to_string()),
                        (2, Some(value)) => {
                            if let Some((_, section)) = self.current.as_mut() {
                                if word.eq_ignore_ascii_case("AltitudeMin") {
                                    assign(&mut section.altitude_min, Some(value));
                                } else if word.eq_ignore_ascii_case("AltitudeMax") {
                                    assign(&mut section.altitude_max, Some(value));
                                }
                            }
                            pos += 1;
                        }
                        _ => {}
                    }
                }
            }
            pos += 1;
        }

        false
    }
}

/// Lexical unit of a config line
#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Quoted(&'a str),
    Bare(&'a str),
    Open,
    Close,
}

impl<'a> Token<'a> {
    fn quoted(&self) -> Option<&'a str> {
        match *self {
            Token::Quoted(s) => Some(s),
            _ => None,
        }
    }

    /// Quoted or bare word
    fn text(&self) -> Option<&'a str> {
        match *self {
            Token::Quoted(s) | Token::Bare(s) => Some(s),
            _ => None,
        }
    }
}

/// Split a comment-free line into tokens. An unterminated quote ends the line.
fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = line;

    loop {
        rest = rest.trim_start();
        let Some(first) = rest.chars().next() else {
            break;
        };

        match first {
            '{' => {
                tokens.push(Token::Open);
                rest = &rest[1..];
            }
            '}' => {
                tokens.push(Token::Close);
                rest = &rest[1..];
            }
            '"' => {
                let Some(len) = rest[1..].find('"') else {
                    break;
                };
                tokens.push(Token::Quoted(&rest[1..1 + len]));
                rest = &rest[len + 2..];
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || matches!(c, '"' | '{' | '}'))
                    .unwrap_or(rest.len());
                tokens.push(Token::Bare(&rest[..end]));
                rest = &rest[end..];
            }
        }
    }

    tokens
}

/// Contents of every quoted token on a line, in order.
///
/// An unterminated trailing quote is ignored.
pub fn quoted_tokens(line: &str) -> Vec<&str> {
    tokenize(line).iter().filter_map(Token::quoted).collect()
}

/// Drop a trailing `//` comment that sits outside quotes, and trim.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut prev_slash = false;

    for (i, c) in line.char_indices() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                prev_slash = false;
            }
            '/' if !in_quotes => {
                if prev_slash {
                    return line[..i - 1].trim();
                }
                prev_slash = true;
            }
            _ => prev_slash = false,
        }
    }

    line.trim()
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn assign(field: &mut f64, value: Option<&str>) {
    if let Some(v) = value.and_then(parse_number) {
        *field = v;
    }
}
