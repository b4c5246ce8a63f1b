//! DOM Tree (arena-based allocation)
//!
//! Slots are reused after [`DomTree::release`]; every reuse bumps the slot
//! generation, which invalidates old [`NodeId`]s.

use crate::observer::MutationObserver;
use crate::{
    DomError, DomResult, ElementData, MutationObserverInit, MutationRecord, Node, NodeData,
    NodeId,
};

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

fn slot_node(slots: &[Slot], id: NodeId) -> Option<&Node> {
    if !id.is_valid() {
        return None;
    }
    let slot = slots.get(id.index() as usize)?;
    if slot.generation != id.generation() {
        return None;
    }
    slot.node.as_ref()
}

/// Inclusive ancestry test over raw slots
fn contains_in(slots: &[Slot], ancestor: NodeId, node: NodeId) -> bool {
    if slot_node(slots, ancestor).is_none() {
        return false;
    }
    let mut current = node;
    while let Some(n) = slot_node(slots, current) {
        if current == ancestor {
            return true;
        }
        current = n.parent;
    }
    false
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    observer: MutationObserver,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            observer: MutationObserver::default(),
        };
        tree.alloc(Node::document());
        tree
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID; `None` for stale or unknown handles
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        slot_node(&self.slots, id)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !id.is_valid() {
            return None;
        }
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Whether the handle still refers to a live node
    #[inline]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn alloc(&mut self, mut node: Node) -> NodeId {
        node.parent = NodeId::NONE;
        node.first_child = NodeId::NONE;
        node.last_child = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId::new(index, 0)
        }
    }

    /// Allocate a detached node
    pub fn create_node(&mut self, node: Node) -> NodeId {
        self.alloc(node)
    }

    /// Allocate a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::element(tag))
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::text(text))
    }

    /// Allocate a detached comment
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::comment(text))
    }

    /// Allocate a detached doctype
    pub fn create_doctype(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(Node::doctype(name))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.option()
    }

    /// Iterate direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    /// Pre-order iteration of all descendants (root excluded)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Descendants {
            tree: self,
            root: id,
            next,
        }
    }

    /// Inclusive ancestry test, like `Node.contains`
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        contains_in(&self.slots, ancestor, node)
    }

    /// Element data for an element node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    /// Mutable element data for an element node
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id)?.as_element_mut()
    }

    /// Tag name of an element node
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::tag)
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id) {
            Some(Node {
                data: NodeData::Text(text),
                ..
            }) => text.clone(),
            Some(_) => self
                .descendants(id)
                .filter_map(|d| self.get(d).and_then(Node::as_text))
                .collect(),
            None => String::new(),
        }
    }

    /// Descendant elements carrying `class`
    pub fn elements_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.element(id).is_some_and(|e| e.has_class(class)))
            .collect()
    }

    /// Descendant elements with tag `tag`
    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.tag_name(id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append a child node
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (append when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        if reference == Some(child) {
            return Ok(());
        }
        self.check_insert(parent, child, reference)?;
        self.detach_recorded(child)?;
        self.link_before(parent, child, reference.unwrap_or(NodeId::NONE))?;
        self.notify(MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(())
    }

    /// Remove a child node (it stays allocated until released)
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.node(parent)?;
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.unlink(child)?;
        self.notify(MutationRecord::child_list(parent, Vec::new(), vec![child]));
        Ok(())
    }

    /// Replace `old` with `replacements`, in order, as one mutation
    pub fn replace_with(&mut self, old: NodeId, replacements: &[NodeId]) -> DomResult<()> {
        let parent = self.node(old)?.parent;
        if !parent.is_valid() {
            return Err(DomError::NotAChild {
                parent,
                child: old,
            });
        }
        for &node in replacements {
            if node == old {
                return Err(DomError::HierarchyRequest { parent, child: node });
            }
            self.check_insert(parent, node, Some(old))?;
        }

        for &node in replacements {
            self.detach_recorded(node)?;
            self.link_before(parent, node, old)?;
        }
        self.unlink(old)?;
        self.notify(MutationRecord::child_list(
            parent,
            replacements.to_vec(),
            vec![old],
        ));
        Ok(())
    }

    /// Replace a text node's content
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> DomResult<()> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(content) => *content = text.into(),
            _ => return Err(DomError::InvalidNodeType(id)),
        }
        self.notify(MutationRecord::character_data(id));
        Ok(())
    }

    /// Detach a node and free it together with its subtree. Returns the
    /// number of nodes freed; every handle into the subtree becomes stale.
    pub fn release(&mut self, id: NodeId) -> DomResult<usize> {
        self.node(id)?;
        if id == NodeId::ROOT {
            return Err(DomError::InvalidNodeType(id));
        }
        self.detach_recorded(id)?;

        let mut doomed: Vec<NodeId> = self.descendants(id).collect();
        doomed.push(id);
        for node in &doomed {
            let slot = &mut self.slots[node.index() as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(node.index());
        }
        self.live -= doomed.len();
        Ok(doomed.len())
    }

    fn check_insert(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if !parent_node.can_have_children() || matches!(child_node.data, NodeData::Document) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.node(reference)?.parent != parent {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }
        Ok(())
    }

    /// Unlink from the current parent, recording the removal
    fn detach_recorded(&mut self, child: NodeId) -> DomResult<()> {
        if let Some(old_parent) = self.unlink(child)? {
            self.notify(MutationRecord::child_list(old_parent, Vec::new(), vec![child]));
        }
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) -> DomResult<Option<NodeId>> {
        let (parent, prev, next) = {
            let n = self.node(child)?;
            (n.parent, n.prev_sibling, n.next_sibling)
        };
        if !parent.is_valid() {
            return Ok(None);
        }

        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = next;
        } else {
            self.node_mut(parent)?.first_child = next;
        }
        if next.is_valid() {
            self.node_mut(next)?.prev_sibling = prev;
        } else {
            self.node_mut(parent)?.last_child = prev;
        }

        let n = self.node_mut(child)?;
        n.parent = NodeId::NONE;
        n.prev_sibling = NodeId::NONE;
        n.next_sibling = NodeId::NONE;
        Ok(Some(parent))
    }

    /// Link a detached `child` before `reference` (NONE appends)
    fn link_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> DomResult<()> {
        let prev = if reference.is_valid() {
            self.node(reference)?.prev_sibling
        } else {
            self.node(parent)?.last_child
        };

        {
            let n = self.node_mut(child)?;
            n.parent = parent;
            n.prev_sibling = prev;
            n.next_sibling = reference;
        }

        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = child;
        } else {
            self.node_mut(parent)?.first_child = child;
        }
        if reference.is_valid() {
            self.node_mut(reference)?.prev_sibling = child;
        } else {
            self.node_mut(parent)?.last_child = child;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Start (or update) observing `target`
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) {
        tracing::trace!("observing {} with {:?}", target, options);
        self.observer.observe(target, options);
    }

    /// Stop observing and drop pending records
    pub fn disconnect(&mut self) {
        self.observer.disconnect();
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_observing()
    }

    /// Take queued mutation records
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        self.observer.take_records()
    }

    fn notify(&mut self, record: MutationRecord) {
        if !self.observer.is_observing() {
            return;
        }
        let slots = &self.slots;
        self.observer
            .record(record, |ancestor, node| contains_in(slots, ancestor, node));
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.option()?;
        self.next = self
            .tree
            .get(current)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(current)
    }
}

/// Pre-order iterator bounded by a subtree root
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.option()?;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(cursor) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
            }
        };
        Some(current)
    }
}
