//! DOM tree data structures.
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Detached nodes stay in the arena; lookups that model
//! `document.getElementById` and friends only see nodes still connected to
//! the root.

use pk_core::PageError;
use pk_core::PageResult;

/// ID used to address nodes in the DOM arena.
pub type NodeId = usize;

/// Payload of a single arena node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

/// Arena node with its tree links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

/// Element data. `class` and `style` attributes are kept in parsed form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    style: Vec<(String, String)>,
    value: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_attributes(tag: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        let mut element = Self::new(tag);
        for (name, value) in attributes {
            element.set_attribute(&name, value);
        }
        element
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Returns a plain attribute. `class` and `style` are exposed through
    /// [`Element::has_class`] and [`Element::style_property`] instead.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "class" => {
                self.classes.clear();
                for class in value.split_whitespace() {
                    self.add_class(class);
                }
            }
            "style" => {
                self.style = parse_style_declarations(&value);
            }
            _ => {
                if name == "value" {
                    self.value = value.clone();
                }
                if let Some(slot) = self.attributes.iter_mut().find(|(key, _)| *key == name) {
                    slot.1 = value;
                } else {
                    self.attributes.push((name, value));
                }
            }
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|existing| existing == class)
    }

    /// Returns true if the class was not present before.
    pub fn add_class(&mut self, class: &str) -> bool {
        if class.is_empty() || self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_owned());
        true
    }

    /// Returns true if the class was present before.
    pub fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|existing| existing != class);
        before != self.classes.len()
    }

    pub fn style_property(&self, name: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_style_property(&mut self, name: &str, value: impl Into<String>) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.into();
        if let Some(slot) = self.style.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.style.push((name, value));
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.style_property("display")
            .is_some_and(|display| display.trim().eq_ignore_ascii_case("none"))
    }

    /// Current form value (`<input value>` until changed by the user).
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

fn parse_style_declarations(input: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for declaration in input.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        if let Some(slot) = out.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value.to_owned();
        } else {
            out.push((name, value.to_owned()));
        }
    }
    out
}

/// Document model: an arena of nodes rooted at [`Document::ROOT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    pub const ROOT: NodeId = 0;

    pub fn empty() -> Self {
        Self {
            title: String::new(),
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Arena size, detached nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push_node(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Text(text.into()))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Appends `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> PageResult<()> {
        let Some(parent_node) = self.nodes.get(parent) else {
            return Err(unknown_node(parent));
        };
        if matches!(parent_node.kind, NodeKind::Text(_)) {
            return Err(PageError::new(
                "dom.hierarchy",
                format!("text node {parent} cannot have children"),
            ));
        }
        if child == Self::ROOT || self.nodes.get(child).is_none() {
            return Err(unknown_node(child));
        }
        if self.self_and_ancestors(parent).any(|id| id == child) {
            return Err(PageError::new(
                "dom.hierarchy",
                format!("node {child} is an ancestor of {parent}"),
            ));
        }

        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Removes `node` from its parent. The subtree stays in the arena but is
    /// no longer reachable from the root.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node).and_then(|entry| entry.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|candidate| *candidate != node);
        }
        if let Some(entry) = self.nodes.get_mut(node) {
            entry.parent = None;
        }
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.self_and_ancestors(node)
            .last()
            .is_some_and(|top| top == Self::ROOT)
    }

    /// Walks from `node` up to the topmost reachable ancestor.
    pub fn self_and_ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.nodes.get(node).map(|_| node);
        std::iter::successors(start, move |current| {
            self.nodes.get(*current).and_then(|entry| entry.parent)
        })
    }

    /// Pre-order descendants of `node`, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(node) {
            Some(entry) => entry.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(entry) = self.nodes.get(current) {
                stack.extend(entry.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.descendants(Self::ROOT)
            .into_iter()
            .find(|node| self.element(*node).and_then(Element::id) == Some(id))
    }

    /// Connected elements carrying `class`, in document order.
    pub fn get_elements_by_class_name(&self, class: &str) -> Vec<NodeId> {
        self.descendants(Self::ROOT)
            .into_iter()
            .filter(|node| {
                self.element(*node)
                    .is_some_and(|element| element.has_class(class))
            })
            .collect()
    }

    /// First descendant of `node` carrying `class`.
    pub fn find_descendant_by_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(node).into_iter().find(|candidate| {
            self.element(*candidate)
                .is_some_and(|element| element.has_class(class))
        })
    }

    pub fn text_content(&self, node: NodeId) -> String {
        let Some(entry) = self.nodes.get(node) else {
            return String::new();
        };
        if let NodeKind::Text(text) = &entry.kind {
            return text.clone();
        }

        let mut out = String::new();
        for descendant in self.descendants(node) {
            if let Some(Node {
                kind: NodeKind::Text(text),
                ..
            }) = self.nodes.get(descendant)
            {
                out.push_str(text);
            }
        }
        out
    }

    /// Replaces the children of `node` with a single text node. A text child
    /// already present is rewritten and reattached, so repeated updates keep
    /// the arena size flat.
    pub fn set_text_content(&mut self, node: NodeId, text: impl Into<String>) -> PageResult<()> {
        let text = text.into();
        let Some(entry) = self.nodes.get_mut(node) else {
            return Err(unknown_node(node));
        };
        if let NodeKind::Text(existing) = &mut entry.kind {
            *existing = text;
            return Ok(());
        }

        let children = std::mem::take(&mut entry.children);
        let mut reusable = None;
        for child in children {
            let Some(child_node) = self.nodes.get_mut(child) else {
                continue;
            };
            child_node.parent = None;
            if reusable.is_none() && matches!(child_node.kind, NodeKind::Text(_)) {
                reusable = Some(child);
            }
        }

        let text_node = match reusable {
            Some(child) => {
                if let Some(child_node) = self.nodes.get_mut(child) {
                    child_node.kind = NodeKind::Text(text);
                }
                child
            }
            None if text.is_empty() => return Ok(()),
            None => self.create_text(text),
        };
        self.append_child(node, text_node)
    }
}

fn unknown_node(id: NodeId) -> PageError {
    PageError::new("dom.unknown_node", format!("node {id} does not exist"))
}
