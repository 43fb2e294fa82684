//! Complex fields and field instructions.
//!
//! A complex field spans several runs: a `fldChar` of type `begin`, runs of
//! `instrText`, an optional `separate`, the result runs, and an `end`.
//! [`annotate_fields`] numbers the fields of a part and records, for every
//! run and every other paragraph child, the fields it sits in. The transform
//! groups adjacent content by the outermost field and renders `HYPERLINK`
//! fields as anchors.

use crate::source::{FieldFrame, NodeId, Part};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Instruction,
    Result,
}

/// Number every complex field of the part and attach field frames.
pub fn annotate_fields(part: &mut Part) {
    let mut stack: Vec<(u32, Phase)> = Vec::new();
    let mut next_id = 0u32;
    let mut frames: Vec<(NodeId, Vec<FieldFrame>)> = Vec::new();
    let mut instructions: Vec<(u32, String)> = Vec::new();

    let root = part.root();
    for node in root.descendants_trimmed(|n| n.is_w("pPr") || n.is_w("rPr")) {
        if node.is_w("r") {
            let mut ids: Vec<u32> = stack.iter().map(|(id, _)| *id).collect();
            for child in node.elements() {
                if child.is_w("fldChar") {
                    match child.w_attr("fldCharType") {
                        Some("begin") => {
                            next_id += 1;
                            stack.push((next_id, Phase::Instruction));
                            ids.push(next_id);
                        }
                        Some("separate") => {
                            if let Some(top) = stack.last_mut() {
                                top.1 = Phase::Result;
                            }
                        }
                        Some("end") => {
                            stack.pop();
                        }
                        _ => {}
                    }
                } else if child.is_w("instrText") {
                    if let Some((id, Phase::Instruction)) = stack.last() {
                        instructions.push((*id, child.value()));
                    }
                }
            }
            frames.push((node.id(), ids.into_iter().map(|id| FieldFrame { id }).collect()));
        } else if node.parent().is_some_and(|p| p.is_w("p")) && !stack.is_empty() {
            frames.push((
                node.id(),
                stack.iter().map(|(id, _)| FieldFrame { id: *id }).collect(),
            ));
        }
    }

    if next_id > 0 {
        log::debug!("annotated {next_id} complex fields");
    }
    for (node, frames) in frames {
        part.annotations.set_fields(node, frames);
    }
    for (field, text) in instructions {
        part.annotations.push_instruction(field, &text);
    }
}

/// A parsed field instruction such as `HYPERLINK "http://x" \l "top"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldInstruction {
    /// Upper-cased field keyword.
    pub field_type: String,
    pub arguments: Vec<String>,
    /// Switch name without the backslash, with the value that followed it.
    pub switches: Vec<(String, Option<String>)>,
}

impl FieldInstruction {
    pub fn parse(text: &str) -> Self {
        let text = text.trim().trim_start_matches('{').trim_end_matches('}');
        let mut tokens = tokenize(text).into_iter();
        let mut instruction = FieldInstruction {
            field_type: tokens
                .next()
                .map(|t| t.text.to_uppercase())
                .unwrap_or_default(),
            ..Default::default()
        };

        let mut tokens = tokens.peekable();
        while let Some(token) = tokens.next() {
            if token.quoted || !token.text.starts_with('\\') {
                instruction.arguments.push(token.text);
                continue;
            }
            let name = token.text[1..].to_string();
            let value = match tokens.peek() {
                Some(next) if next.quoted || !next.text.starts_with('\\') => {
                    tokens.next().map(|t| t.text)
                }
                _ => None,
            };
            instruction.switches.push((name, value));
        }
        instruction
    }

    pub fn has_switch(&self, name: &str) -> bool {
        self.switches.iter().any(|(n, _)| n == name)
    }

    pub fn switch_value(&self, name: &str) -> Option<&str> {
        self.switches
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Link target of a `HYPERLINK` field; `\l` names a location in the
    /// target document, or in this document when there is no address.
    pub fn hyperlink_href(&self) -> Option<String> {
        if self.field_type != "HYPERLINK" {
            return None;
        }
        match (self.arguments.first(), self.switch_value("l")) {
            (Some(address), Some(anchor)) => Some(format!("{address}#{anchor}")),
            (Some(address), None) => Some(address.clone()),
            (None, Some(anchor)) => Some(format!("#{anchor}")),
            (None, None) => None,
        }
    }
}

struct Token {
    text: String,
    quoted: bool,
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' {
            chars.next();
            let mut quoted = String::new();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                quoted.push(c);
            }
            tokens.push(Token {
                text: quoted,
                quoted: true,
            });
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '"' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token {
                text: word,
                quoted: false,
            });
        }
    }
    tokens
}
