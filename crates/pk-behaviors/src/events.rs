//! DOM events and the inline handlers the portal markup uses.
//!
//! Templates wire the carousel arrows and the report forms with inline
//! attributes such as `onclick="plusSlides(-1)"` and
//! `onsubmit="return validateCaptcha()"`. Only these calls are understood;
//! anything else in an inline handler is ignored.

use pk_dom::NodeId;

/// Inline handlers longer than this are not parsed.
pub const MAX_INLINE_HANDLER_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEventKind {
    Click,
    Submit,
}

impl DomEventKind {
    pub fn handler_attribute(self) -> &'static str {
        match self {
            Self::Click => "onclick",
            Self::Submit => "onsubmit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: DomEventKind,
    pub target: NodeId,
}

impl DomEvent {
    pub fn click(target: NodeId) -> Self {
        Self {
            kind: DomEventKind::Click,
            target,
        }
    }

    pub fn submit(target: NodeId) -> Self {
        Self {
            kind: DomEventKind::Submit,
            target,
        }
    }
}

/// What happened while an event was dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// At least one listener or inline handler ran.
    pub handled: bool,
    /// A handler returned false; the default action (form submission)
    /// must not happen.
    pub default_prevented: bool,
}

/// A call recognized inside an inline handler attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineCall {
    PlusSlides(i64),
    GenerateCaptcha,
    ValidateCaptcha,
}

/// One statement of an inline handler. `returns` is set for
/// `return call()`, whose false result cancels the default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineStatement {
    pub call: InlineCall,
    pub returns: bool,
}

/// Parses the recognized statements of an inline handler, in order.
pub fn parse_inline_handler(source: &str) -> Vec<InlineStatement> {
    if source.len() > MAX_INLINE_HANDLER_BYTES {
        tracing::warn!(bytes = source.len(), "inline handler too large, ignored");
        return Vec::new();
    }
    source
        .split(';')
        .filter_map(|statement| {
            let statement = statement.trim();
            let (returns, expression) = match statement.strip_prefix("return") {
                Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest.trim()),
                _ => (false, statement),
            };
            parse_call(expression).map(|call| InlineStatement { call, returns })
        })
        .collect()
}

fn parse_call(expression: &str) -> Option<InlineCall> {
    let (name, rest) = expression.split_once('(')?;
    let argument = rest.trim_end().strip_suffix(')')?.trim();
    match (name.trim(), argument) {
        ("plusSlides", argument) => argument.parse::<i64>().ok().map(InlineCall::PlusSlides),
        ("generateCaptcha", "") => Some(InlineCall::GenerateCaptcha),
        ("validateCaptcha", "") => Some(InlineCall::ValidateCaptcha),
        _ => None,
    }
}
