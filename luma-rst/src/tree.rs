//! Arena-backed document tree.
//!
//! Nodes live in one `Vec` and refer to their children by [`NodeId`]. A tree
//! is built by a single conversion and dropped with it.

/// Index of a node inside its [`MarkupTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A node of the document tree.
///
/// Inline nodes carry their text directly; block nodes own children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
  /// The root. Its children are the top-level blocks.
  Document,

  /// Inline children.
  Paragraph,

  Text(String),
  Bold(String),
  Italic(String),
  InlineCode(String),
  /// `` `interpreted text` `` without a role.
  TitleRef(String),
  Hyperlink {
    text: String,
    url:  String,
  },

  LiteralBlock {
    text:     String,
    language: Option<String>,
  },

  /// Lines of a `>>>` session, prompts and output alike.
  DoctestBlock(Vec<String>),

  /// Children are [`MarkupNode::ListItem`]s.
  BulletList {
    ordered: bool,
  },

  /// Block children.
  ListItem,

  /// Block children.
  BlockQuote,

  /// Block children. `title` is only set on generic `admonition`s.
  Admonition {
    kind:  String,
    title: Option<String>,
  },
}

#[derive(Debug, Clone)]
struct Slot {
  node:     MarkupNode,
  children: Vec<NodeId>,
}

/// A parsed document.
#[derive(Debug, Clone)]
pub struct MarkupTree {
  slots: Vec<Slot>,
}

impl Default for MarkupTree {
  fn default() -> Self {
    Self::new()
  }
}

impl MarkupTree {
  /// An empty document holding only its root.
  #[must_use]
  pub fn new() -> Self {
    Self {
      slots: vec![Slot {
        node:     MarkupNode::Document,
        children: Vec::new(),
      }],
    }
  }

  #[must_use]
  pub const fn root(&self) -> NodeId {
    NodeId(0)
  }

  /// Append `node` as the last child of `parent`.
  pub fn push(&mut self, parent: NodeId, node: MarkupNode) -> NodeId {
    let id = NodeId(self.slots.len());
    self.slots.push(Slot {
      node,
      children: Vec::new(),
    });
    if let Some(slot) = self.slots.get_mut(parent.0) {
      slot.children.push(id);
    }
    id
  }

  /// The node stored at `id`; the root for ids from another tree.
  #[must_use]
  pub fn node(&self, id: NodeId) -> &MarkupNode {
    self
      .slots
      .get(id.0)
      .map_or(&MarkupNode::Document, |slot| &slot.node)
  }

  /// Children of `id`, in document order.
  #[must_use]
  pub fn children(&self, id: NodeId) -> &[NodeId] {
    self
      .slots
      .get(id.0)
      .map(|slot| slot.children.as_slice())
      .unwrap_or_default()
  }

  /// Number of nodes, root included.
  #[must_use]
  pub fn len(&self) -> usize {
    self.slots.len()
  }

  /// Whether the document has no content below its root.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.children(self.root()).is_empty()
  }
}
