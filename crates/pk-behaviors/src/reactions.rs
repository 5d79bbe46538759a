//! Like-style reaction toggles.
//!
//! Each control keeps its own typed state. The count shown on the page and
//! the `active` class are rendered from that state on every click; the DOM
//! is only read once, when the control is wired.

use crate::config::ReactionConfig;
use pk_core::PageResult;
use pk_dom::Document;
use pk_dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionState {
    /// Count without this visitor's reaction.
    pub base_count: i64,
    pub active: bool,
}

impl ReactionState {
    /// Seeds state from what the page rendered. A control rendered as active
    /// already includes this visitor's reaction in its count.
    pub fn from_rendered(displayed: i64, active: bool) -> Self {
        Self {
            base_count: if active {
                displayed.saturating_sub(1)
            } else {
                displayed
            },
            active,
        }
    }

    pub fn count(&self) -> i64 {
        self.base_count.saturating_add(i64::from(self.active))
    }

    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionControl {
    pub node: NodeId,
    pub count_node: Option<NodeId>,
    pub state: ReactionState,
}

#[derive(Debug, Clone)]
pub struct Reactions {
    config: ReactionConfig,
    controls: Vec<ReactionControl>,
}

impl Reactions {
    pub fn new(config: ReactionConfig) -> Self {
        Self {
            config,
            controls: Vec::new(),
        }
    }

    pub fn controls(&self) -> &[ReactionControl] {
        &self.controls
    }

    pub fn control(&self, node: NodeId) -> Option<&ReactionControl> {
        self.controls.iter().find(|control| control.node == node)
    }

    /// Attaches to every control currently in the document. Controls that
    /// were already wired keep their state. Returns the number of newly
    /// wired controls.
    pub fn wire(&mut self, document: &Document) -> usize {
        let mut wired = 0;
        for node in document.get_elements_by_class_name(&self.config.control_class) {
            if self.control(node).is_some() {
                continue;
            }
            let count_node = document.find_descendant_by_class(node, &self.config.count_class);
            let displayed = count_node
                .map(|count| parse_count(&document.text_content(count)))
                .unwrap_or(0);
            let active = document
                .element(node)
                .is_some_and(|element| element.has_class(&self.config.active_class));
            self.controls.push(ReactionControl {
                node,
                count_node,
                state: ReactionState::from_rendered(displayed, active),
            });
            wired += 1;
        }
        tracing::debug!(wired, total = self.controls.len(), "reaction controls wired");
        wired
    }

    /// Handles a click on a wired control. Returns the new state, or `None`
    /// when `node` is not a wired control.
    pub fn click(
        &mut self,
        document: &mut Document,
        node: NodeId,
    ) -> PageResult<Option<ReactionState>> {
        let Some(control) = self.controls.iter_mut().find(|control| control.node == node) else {
            return Ok(None);
        };

        control.state.toggle();
        let state = control.state;
        let count_node = control.count_node;

        if let Some(element) = document.element_mut(node) {
            if state.active {
                element.add_class(&self.config.active_class);
                element.set_style_property("color", self.config.active_color.as_str());
            } else {
                element.remove_class(&self.config.active_class);
                element.set_style_property("color", self.config.inactive_color.as_str());
            }
        }
        if let Some(count_node) = count_node {
            document.set_text_content(count_node, state.count().to_string())?;
        }

        tracing::debug!(node, active = state.active, count = state.count(), "reaction toggled");
        Ok(Some(state))
    }
}

fn parse_count(text: &str) -> i64 {
    // Leading-integer parse: "12 likes" reads as 12.
    let trimmed = text.trim();
    let end = trimmed
        .char_indices()
        .find(|(index, ch)| !(ch.is_ascii_digit() || (*index == 0 && (*ch == '-' || *ch == '+'))))
        .map(|(index, _)| index)
        .unwrap_or(trimmed.len());
    match trimmed[..end].parse::<i64>() {
        Ok(count) => count,
        Err(_) => {
            tracing::warn!(text, "reaction count is not a number, starting from 0");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReactionState;
    use super::Reactions;
    use super::parse_count;
    use crate::config::ReactionConfig;
    use pk_dom::Document;
    use pk_html::HtmlParser;

    const PAGE: &str = r#"
        <button class="reaction-btn" id="a">Like <span class="count">4</span></button>
        <button class="reaction-btn active" id="b">Like <span class="count">10</span></button>
    "#;

    fn count_text(doc: &Document, id: &str) -> String {
        doc.get_element_by_id(id)
            .and_then(|node| doc.find_descendant_by_class(node, "count"))
            .map(|node| doc.text_content(node))
            .unwrap_or_default()
    }

    fn node(doc: &Document, id: &str) -> usize {
        match doc.get_element_by_id(id) {
            Some(node) => node,
            None => panic!("missing #{id}"),
        }
    }

    #[test]
    fn toggling_twice_restores_count_and_class() {
        let mut doc = HtmlParser.parse(PAGE);
        let mut reactions = Reactions::new(ReactionConfig::default());
        assert_eq!(reactions.wire(&doc), 2);
        let a = node(&doc, "a");

        let first = reactions.click(&mut doc, a);
        assert_eq!(
            first,
            Ok(Some(ReactionState {
                base_count: 4,
                active: true
            }))
        );
        assert_eq!(count_text(&doc, "a"), "5");
        assert!(doc.element(a).is_some_and(|el| el.has_class("active")));
        assert_eq!(
            doc.element(a).and_then(|el| el.style_property("color")),
            Some("#3498db")
        );

        assert!(reactions.click(&mut doc, a).is_ok());
        assert_eq!(count_text(&doc, "a"), "4");
        assert!(doc.element(a).is_some_and(|el| !el.has_class("active")));
        assert_eq!(
            doc.element(a).and_then(|el| el.style_property("color")),
            Some("#333")
        );
    }

    #[test]
    fn controls_are_independent() {
        let mut doc = HtmlParser.parse(PAGE);
        let mut reactions = Reactions::new(ReactionConfig::default());
        reactions.wire(&doc);
        let a = node(&doc, "a");
        assert!(reactions.click(&mut doc, a).is_ok());
        assert_eq!(count_text(&doc, "a"), "5");
        assert_eq!(count_text(&doc, "b"), "10");
    }

    #[test]
    fn rendered_active_control_unlikes_first() {
        let mut doc = HtmlParser.parse(PAGE);
        let mut reactions = Reactions::new(ReactionConfig::default());
        reactions.wire(&doc);
        let b = node(&doc, "b");
        assert!(reactions.click(&mut doc, b).is_ok());
        assert_eq!(count_text(&doc, "b"), "9");
        assert!(doc.element(b).is_some_and(|el| !el.has_class("active")));
    }

    #[test]
    fn unwired_nodes_are_ignored() {
        let mut doc = HtmlParser.parse(PAGE);
        let mut reactions = Reactions::new(ReactionConfig::default());
        let a = node(&doc, "a");
        assert_eq!(reactions.click(&mut doc, a), Ok(None));
        assert_eq!(count_text(&doc, "a"), "4");
    }

    #[test]
    fn rewiring_skips_known_controls() {
        let doc = HtmlParser.parse(PAGE);
        let mut reactions = Reactions::new(ReactionConfig::default());
        assert_eq!(reactions.wire(&doc), 2);
        assert_eq!(reactions.wire(&doc), 0);
        assert_eq!(reactions.controls().len(), 2);
    }

    #[test]
    fn parses_leading_integers() {
        assert_eq!(parse_count(" 12 "), 12);
        assert_eq!(parse_count("7 likes"), 7);
        assert_eq!(parse_count("-3"), -3);
        assert_eq!(parse_count("many"), 0);
        assert_eq!(parse_count(""), 0);
    }
}
