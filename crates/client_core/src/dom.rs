//! In-memory page model the controllers render into.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Removing a node
//! detaches it (and its subtree) from the tree; detached nodes are never
//! returned by queries. Alerts raised by controllers are recorded on the
//! document instead of blocking.

use std::{collections::BTreeMap, fmt::Write as _};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    /// `visibility: hidden`: keeps its layout slot.
    hidden: bool,
    /// `display: none`.
    collapsed: bool,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Description of an element to insert.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: Option<String>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            text: None,
        }
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        match self.attrs.get_mut("class") {
            Some(existing) if !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(&class);
            }
            _ => {
                self.attrs.insert("class".to_string(), class);
            }
        }
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    alerts: Vec<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
            }],
            root: NodeId(0),
            alerts: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Appends a new element as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let ElementSpec { tag, attrs, text } = spec;
        let id = self.push_node(
            parent,
            NodeKind::Element(Element {
                tag,
                attrs,
                hidden: false,
                collapsed: false,
            }),
        );
        if let Some(text) = text {
            self.append_text(id, text);
        }
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push_node(parent, NodeKind::Text(text.into()))
    }

    /// Detaches `node` from its parent. Removing an already detached node is a no-op.
    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != node);
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(element) = self.element_mut(node) {
            element.attrs.insert(name.to_string(), value.into());
        }
    }

    pub fn value(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "value")
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Attached nodes below `scope` in document order, `scope` excluded.
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.attr(*node, "id") == Some(id))
    }

    pub fn all_by_class(&self, class: &str) -> Vec<NodeId> {
        self.all_by_class_within(self.root, class)
    }

    pub fn first_by_class(&self, class: &str) -> Option<NodeId> {
        self.all_by_class(class).into_iter().next()
    }

    pub fn all_by_class_within(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.has_class(*node, class))
            .collect()
    }

    pub fn all_by_tag_within(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.tag(*node) == Some(tag))
            .collect()
    }

    pub fn first_by_tag_within(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.all_by_tag_within(scope, tag).into_iter().next()
    }

    /// Nearest ancestor (or `node` itself) with the given tag.
    pub fn closest(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.tag(candidate) == Some(tag) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// `content` of `<meta name="...">`.
    pub fn meta_content(&self, name: &str) -> Option<&str> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.tag(*node) == Some("meta") && self.attr(*node, "name") == Some(name))
            .and_then(|node| self.attr(node, "content"))
    }

    pub fn text_content(&self, node: NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.clone(),
            _ => self
                .descendants(node)
                .into_iter()
                .filter_map(|child| match &self.nodes[child.0].kind {
                    NodeKind::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Replaces all children of `node` with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
        self.append_text(node, text);
    }

    /// Reorders the children of `parent`; `order` must be a permutation of them.
    pub fn reorder_children(&mut self, parent: NodeId, order: Vec<NodeId>) {
        debug_assert_eq!(order.len(), self.nodes[parent.0].children.len());
        self.nodes[parent.0].children = order;
    }

    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        if let Some(element) = self.element_mut(node) {
            element.hidden = hidden;
        }
    }

    pub fn set_collapsed(&mut self, node: NodeId, collapsed: bool) {
        if let Some(element) = self.element_mut(node) {
            element.collapsed = collapsed;
        }
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.element(node)
            .map(|e| !e.hidden && !e.collapsed)
            .unwrap_or(true)
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    /// Serializes `node` and its subtree.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Root => {
                for child in &self.nodes[node.0].children {
                    self.write_html(*child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Element(element) => {
                let _ = write!(out, "<{}", element.tag);
                for (name, value) in &element.attrs {
                    let _ = write!(out, " {}=\"{}\"", name, escape_html(value));
                }
                match (element.hidden, element.collapsed) {
                    (_, true) => out.push_str(" style=\"display: none\""),
                    (true, false) => out.push_str(" style=\"visibility: hidden\""),
                    (false, false) => {}
                }
                out.push('>');
                if is_void(&element.tag) {
                    return;
                }
                for child in &self.nodes[node.0].children {
                    self.write_html(*child, out);
                }
                let _ = write!(out, "</{}>", element.tag);
            }
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "input" | "meta" | "img" | "hr" | "link")
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/dom_tests.rs"]
mod tests;
