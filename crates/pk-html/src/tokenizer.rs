//! Markup tokenizer. Start tags come out as ready-built [`Element`]s so the
//! tree builder only has to place them.

use pk_dom::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Start { element: Element, self_closing: bool },
    End(String),
    Text(String),
}

pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = source;

    while !rest.is_empty() {
        let Some(open) = rest.find('<') else {
            push_text(&mut tokens, rest);
            break;
        };
        push_text(&mut tokens, &rest[..open]);
        let markup = &rest[open..];

        rest = if let Some(comment) = markup.strip_prefix("<!--") {
            comment.split_once("-->").map_or("", |(_, tail)| tail)
        } else if let Some(declaration) = markup.strip_prefix("<!") {
            declaration.split_once('>').map_or("", |(_, tail)| tail)
        } else if let Some((name, tail)) = markup.strip_prefix("</").and_then(end_tag) {
            tokens.push(Token::End(name));
            tail
        } else if let Some((element, self_closing, tail)) = start_tag(&markup[1..]) {
            let raw = !self_closing && is_raw_text(&element.tag);
            let tag = element.tag.clone();
            tokens.push(Token::Start {
                element,
                self_closing,
            });
            if raw {
                let (body, tail) = split_raw_text(tail, &tag);
                if !body.is_empty() {
                    tokens.push(Token::Text(body.to_owned()));
                }
                tokens.push(Token::End(tag));
                tail
            } else {
                tail
            }
        } else {
            // `<` that opens nothing is literal text.
            push_text(&mut tokens, "<");
            &markup[1..]
        };
    }

    tokens
}

fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }
    match tokens.last_mut() {
        Some(Token::Text(existing)) => existing.push_str(text),
        _ => tokens.push(Token::Text(text.to_owned())),
    }
}

fn tag_name_len(input: &str) -> usize {
    input
        .find(|ch: char| !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':')))
        .unwrap_or(input.len())
}

/// Parses `name ...>` after `</`.
fn end_tag(input: &str) -> Option<(String, &str)> {
    let input = input.trim_start();
    let len = tag_name_len(input);
    if len == 0 {
        return None;
    }
    let (_, tail) = input[len..].split_once('>')?;
    Some((input[..len].to_ascii_lowercase(), tail))
}

/// Parses `name attr=value ...>` after `<`.
fn start_tag(input: &str) -> Option<(Element, bool, &str)> {
    let len = tag_name_len(input);
    if len == 0 {
        return None;
    }
    let (name, mut rest) = input.split_at(len);
    let mut attributes = Vec::new();

    let self_closing = loop {
        rest = rest.trim_start();
        if let Some(tail) = rest.strip_prefix("/>") {
            rest = tail;
            break true;
        }
        if let Some(tail) = rest.strip_prefix('>') {
            rest = tail;
            break false;
        }
        if rest.is_empty() {
            return None;
        }
        if let Some(tail) = rest.strip_prefix(['/', '=']) {
            rest = tail;
            continue;
        }

        let name_end = rest
            .find(|ch: char| ch.is_whitespace() || matches!(ch, '>' | '/' | '='))
            .unwrap_or(rest.len());
        let (attribute, tail) = rest.split_at(name_end);
        let tail = tail.trim_start();
        let (value, tail) = match tail.strip_prefix('=') {
            Some(after) => attribute_value(after.trim_start()),
            None => ("", tail),
        };
        attributes.push((attribute.to_ascii_lowercase(), decode_entities(value)));
        rest = tail;
    };

    Some((Element::with_attributes(name, attributes), self_closing, rest))
}

fn attribute_value(input: &str) -> (&str, &str) {
    for quote in ['"', '\''] {
        if let Some(body) = input.strip_prefix(quote) {
            return body.split_once(quote).unwrap_or((body, ""));
        }
    }
    let end = input
        .find(|ch: char| ch.is_whitespace() || ch == '>')
        .unwrap_or(input.len());
    input.split_at(end)
}

/// Splits `body</tag>tail` for elements whose content is not markup.
fn split_raw_text<'a>(input: &'a str, tag: &str) -> (&'a str, &'a str) {
    let closing = format!("</{tag}");
    // ASCII lowercasing keeps byte offsets aligned with `input`.
    let lowered = input.to_ascii_lowercase();
    let mut from = 0;
    while let Some(found) = lowered[from..].find(&closing) {
        let at = from + found;
        let after = &input[at + closing.len()..];
        if let Some(tail) = after.trim_start().strip_prefix('>') {
            return (&input[..at], tail);
        }
        from = at + closing.len();
    }
    (input, "")
}

fn is_raw_text(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

pub(crate) fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

/// Replaces character references. Unknown references are left as written.
pub(crate) fn decode_entities(input: &str) -> String {
    let Some(first) = input.find('&') else {
        return input.to_owned();
    };
    let mut out = String::with_capacity(input.len());
    out.push_str(&input[..first]);
    let mut rest = &input[first..];

    while let Some(after) = rest.strip_prefix('&') {
        let decoded = after
            .split_once(';')
            .and_then(|(reference, tail)| Some((reference_char(reference)?, tail)));
        rest = match decoded {
            Some((ch, tail)) => {
                out.push(ch);
                tail
            }
            None => {
                out.push('&');
                after
            }
        };
        let literal = rest.find('&').unwrap_or(rest.len());
        out.push_str(&rest[..literal]);
        rest = &rest[literal..];
    }
    out
}

fn reference_char(reference: &str) -> Option<char> {
    let code = match reference {
        "amp" => return Some('&'),
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "quot" => return Some('"'),
        "apos" => return Some('\''),
        "nbsp" => return Some('\u{a0}'),
        _ => reference.strip_prefix('#')?,
    };
    let value = match code.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => code.parse().ok()?,
    };
    char::from_u32(value)
}
