//! The AVL index itself: search, insert and delete over node records
//! reachable through a [`PageSource`], plus the in-order cursor used to
//! drive `inorder-first`/`inorder-next`.
//!
//! Every operation takes the collection's root `NodeRef` as a parameter and,
//! where the root can change, hands back the new one — the caller (the
//! owning key's `subkey_root`/`value_root` field, or the store header's top
//! level root) is responsible for persisting it. The root is just a node
//! reference stored by whoever owns the collection, which keeps `Index`
//! itself stateless between calls.
//!
//! To avoid holding raw pointers to nodes across a suspension point,
//! nothing here keeps a page guard alive past the single read or write that
//! needed it: every step decodes a [`Node`] to an owned value, drops the
//! guard, and only re-acquires a guard for the next page it actually
//! touches. That retires the original hand-over-hand locking discipline
//! naturally, since nothing is ever left pointing into a page that could be
//! evicted out from under it.

use crate::backtrace::{Backtrace, MAX_HEIGHT, Side};
use crate::errors::search_error::SearchError;
use crate::errors::tree_op_error::TreeError;
use crate::node::{Node, NodeValue};
use crate::node_ref::NodeRef;
use crate::page_source::PageSource;
use std::cmp::Ordering;

/// An AVL index operating over node records reached through `S`.
pub struct Index<'s, S: PageSource> {
    source: &'s S,
}

impl<'s, S: PageSource> Index<'s, S> {
    pub fn new(source: &'s S) -> Self {
        Self { source }
    }

    /// Reads and decodes the node at `reference`.
    pub fn read_node(&self, reference: NodeRef) -> Result<Node, TreeError> {
        let page = self
            .source
            .read(reference.page_number)
            .map_err(|e| TreeError::page_source(reference, e))?;
        let bytes = page
            .row(reference.slot)
            .map_err(|e| TreeError::page_source(reference, e))?;
        Node::decode(bytes).map_err(|e| {
            TreeError::Search(SearchError::Decode {
                reference,
                source: e,
            })
        })
    }

    fn write_node(&self, reference: NodeRef, node: &Node) -> Result<(), TreeError> {
        let bytes = node.encode()?;
        let mut page = self
            .source
            .write(reference.page_number)
            .map_err(|e| TreeError::page_source(reference, e))?;
        page.update_row(reference.slot as usize, bytes)
            .map_err(|e| TreeError::page_source(reference, e))
    }

    /// Replaces the payload of the node at `reference`, leaving its name,
    /// children and balance factor untouched. Used by `storage-api`'s
    /// `update_*` operations and by back-link maintenance, neither of which
    /// changes the tree's shape.
    pub fn update_value(&self, reference: NodeRef, value: NodeValue) -> Result<(), TreeError> {
        let mut node = self.read_node(reference)?;
        node.value = value;
        self.write_node(reference, &node)
    }

    fn set_child(&self, reference: NodeRef, side: Side, child: NodeRef) -> Result<(), TreeError> {
        let mut node = self.read_node(reference)?;
        match side {
            Side::Left => node.left = child,
            Side::Right => node.right = child,
        }
        self.write_node(reference, &node)
    }

    fn free_node(&self, reference: NodeRef) -> Result<(), TreeError> {
        let mut page = self
            .source
            .write(reference.page_number)
            .map_err(|e| TreeError::page_source(reference, e))?;
        page.delete_row(reference.slot as usize, false)
            .map_err(|e| TreeError::page_source(reference, e))
    }

    /// Allocates storage for a brand new node, preferring `preferred_page`
    /// (the page holding the traversal's last-visited node, or a page-hint
    /// pool suggestion when the collection is empty) and falling back to a
    /// freshly allocated page when it has no room.
    fn alloc_node(&self, preferred_page: Option<u32>, node: &Node) -> Result<NodeRef, TreeError> {
        let bytes = node.encode()?;
        if let Some(page_number) = preferred_page {
            let mut page = self
                .source
                .write(page_number)
                .map_err(|e| TreeError::page_source(NodeRef::new(page_number, 0), e))?;
            if let Ok(slot) = page.insert_row(bytes.clone()) {
                return Ok(NodeRef::new(page_number, slot));
            }
        }
        let (page_number, mut page) = self
            .source
            .allocate()
            .map_err(|e| TreeError::page_source(NodeRef::NULL, e))?;
        let slot = page
            .insert_row(bytes)
            .map_err(|e| TreeError::page_source(NodeRef::new(page_number, 0), e))?;
        Ok(NodeRef::new(page_number, slot))
    }

    /// Finds the node named `name` in the collection rooted at `root`.
    pub fn search(&self, root: NodeRef, name: &[u8]) -> Result<Option<NodeRef>, TreeError> {
        let mut current = root;
        while !current.is_null() {
            let node = self.read_node(current)?;
            match name.cmp(node.name.as_slice()) {
                Ordering::Equal => return Ok(Some(current)),
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
        }
        Ok(None)
    }

    fn descend(
        &self,
        root: NodeRef,
        name: &[u8],
    ) -> Result<(Backtrace, NodeRef, Option<u32>), TreeError> {
        let mut stack: Backtrace = Vec::new();
        let mut current = root;
        let mut last_visited_page = None;
        loop {
            if current.is_null() {
                return Ok((stack, current, last_visited_page));
            }
            let node = self.read_node(current)?;
            last_visited_page = Some(current.page_number);
            let side = match name.cmp(node.name.as_slice()) {
                Ordering::Equal => return Ok((stack, current, last_visited_page)),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            if stack.len() >= MAX_HEIGHT {
                return Err(TreeError::Search(SearchError::BacktraceOverflow {
                    at: current,
                    max: MAX_HEIGHT,
                }));
            }
            stack.push((current, side));
            current = match side {
                Side::Left => node.left,
                Side::Right => node.right,
            };
        }
    }

    /// Inserts a new node named `name` under `root`, returning `(new_root,
    /// new_node_ref)`. `preferred_page` is a page-hint-pool suggestion used
    /// only when the collection is empty; otherwise the page of the
    /// traversal's last visited ancestor is preferred.
    pub fn insert(
        &self,
        root: NodeRef,
        preferred_page: Option<u32>,
        name: Vec<u8>,
        value: NodeValue,
    ) -> Result<(NodeRef, NodeRef), TreeError> {
        let (mut stack, found, last_visited_page) = self.descend(root, &name)?;
        if !found.is_null() {
            return Err(TreeError::Exists {
                parent: root,
                name,
            });
        }

        let new_node = Node::new(name, value)?;
        let new_ref = self.alloc_node(last_visited_page.or(preferred_page), &new_node)?;

        let Some(&(parent_ref, side)) = stack.last() else {
            // The collection was empty; the new node is the new root.
            return Ok((new_ref, new_ref));
        };
        self.set_child(parent_ref, side, new_ref)?;

        let mut new_root = root;
        while let Some((ancestor_ref, side)) = stack.pop() {
            let mut ancestor = self.read_node(ancestor_ref)?;
            let delta: i8 = match side {
                Side::Left => -1,
                Side::Right => 1,
            };
            ancestor.balance_factor += delta;
            match ancestor.balance_factor {
                0 => {
                    self.write_node(ancestor_ref, &ancestor)?;
                    break;
                }
                -1 | 1 => {
                    self.write_node(ancestor_ref, &ancestor)?;
                }
                -2 | 2 => {
                    let (new_subtree_root, _) = self.rotate(ancestor_ref, ancestor)?;
                    match stack.last() {
                        Some(&(grand_ref, grand_side)) => {
                            self.set_child(grand_ref, grand_side, new_subtree_root)?
                        }
                        None => new_root = new_subtree_root,
                    }
                    break;
                }
                _ => unreachable!("balance factor out of -2..=2 range"),
            }
        }
        Ok((new_root, new_ref))
    }

    /// Deletes the node named `name` from `root`, returning the new root.
    pub fn delete(&self, root: NodeRef, name: &[u8]) -> Result<NodeRef, TreeError> {
        let (mut stack, target_ref, _) = self.descend(root, name)?;
        if target_ref.is_null() {
            return Err(TreeError::NotFound { parent: root });
        }
        let target = self.read_node(target_ref)?;
        let mut new_root = root;

        if !target.left.is_null() && !target.right.is_null() {
            // Two children: the in-order successor (leftmost node of the
            // right subtree) is transplanted into target's structural
            // position, keeping its own offset. Only the originally targeted
            // node's slot is freed, so a Handle or back-link pointing at any
            // other node never has its offset silently retired.
            let target_parent = stack.last().copied();
            let succ_slot = stack.len();
            stack.push((target_ref, Side::Right));
            let mut succ_ref = target.right;
            let mut succ = self.read_node(succ_ref)?;
            while !succ.left.is_null() {
                stack.push((succ_ref, Side::Left));
                succ_ref = succ.left;
                succ = self.read_node(succ_ref)?;
            }

            let &(succ_parent_ref, succ_parent_side) =
                stack.last().expect("just pushed target_ref or succ_ref above");
            if succ_parent_ref != target_ref {
                // succ was found deeper down the right child's left spine:
                // its own right child takes its place there, and succ
                // inherits target's right child instead.
                self.set_child(succ_parent_ref, succ_parent_side, succ.right)?;
                succ.right = target.right;
            }
            succ.left = target.left;
            succ.balance_factor = target.balance_factor;
            self.write_node(succ_ref, &succ)?;
            stack[succ_slot].0 = succ_ref;

            match target_parent {
                Some((parent_ref, parent_side)) => self.set_child(parent_ref, parent_side, succ_ref)?,
                None => new_root = succ_ref,
            }
            self.free_node(target_ref)?;
        } else {
            let only_child = if target.left.is_null() {
                target.right
            } else {
                target.left
            };
            match stack.last() {
                Some(&(parent_ref, side)) => self.set_child(parent_ref, side, only_child)?,
                None => {
                    self.free_node(target_ref)?;
                    return Ok(only_child);
                }
            }
            self.free_node(target_ref)?;
        }

        while let Some((ancestor_ref, side)) = stack.pop() {
            let mut ancestor = self.read_node(ancestor_ref)?;
            let delta: i8 = match side {
                Side::Left => 1,
                Side::Right => -1,
            };
            ancestor.balance_factor += delta;
            match ancestor.balance_factor {
                1 | -1 => {
                    self.write_node(ancestor_ref, &ancestor)?;
                    break;
                }
                0 => {
                    self.write_node(ancestor_ref, &ancestor)?;
                }
                2 | -2 => {
                    let (new_subtree_root, height_decreased) =
                        self.rotate(ancestor_ref, ancestor)?;
                    match stack.last() {
                        Some(&(grand_ref, grand_side)) => {
                            self.set_child(grand_ref, grand_side, new_subtree_root)?
                        }
                        None => new_root = new_subtree_root,
                    }
                    if !height_decreased {
                        break;
                    }
                }
                _ => unreachable!("balance factor out of -2..=2 range"),
            }
        }
        Ok(new_root)
    }

    /// Rebalances a subtree rooted at `a_ref` (already read as `a`, with an
    /// out-of-range balance factor of ±2) via the four classic rotation
    /// cases, returning the new subtree root and whether the subtree's
    /// height decreased by one relative to before the rotation (used by
    /// `delete`'s climb to decide whether to keep climbing; `insert` always
    /// stops at the first rotation regardless).
    fn rotate(&self, a_ref: NodeRef, mut a: Node) -> Result<(NodeRef, bool), TreeError> {
        if a.balance_factor == 2 {
            let b_ref = a.right;
            let mut b = self.read_node(b_ref)?;
            if b.balance_factor >= 0 {
                let b_bf_before = b.balance_factor;
                a.right = b.left;
                b.left = a_ref;
                if b_bf_before == 0 {
                    a.balance_factor = 1;
                    b.balance_factor = -1;
                } else {
                    a.balance_factor = 0;
                    b.balance_factor = 0;
                }
                self.write_node(a_ref, &a)?;
                self.write_node(b_ref, &b)?;
                Ok((b_ref, b_bf_before != 0))
            } else {
                let c_ref = b.left;
                let mut c = self.read_node(c_ref)?;
                a.right = c.left;
                b.left = c.right;
                c.left = a_ref;
                c.right = b_ref;
                match c.balance_factor {
                    1 => {
                        a.balance_factor = -1;
                        b.balance_factor = 0;
                    }
                    -1 => {
                        a.balance_factor = 0;
                        b.balance_factor = 1;
                    }
                    _ => {
                        a.balance_factor = 0;
                        b.balance_factor = 0;
                    }
                }
                c.balance_factor = 0;
                self.write_node(a_ref, &a)?;
                self.write_node(b_ref, &b)?;
                self.write_node(c_ref, &c)?;
                Ok((c_ref, true))
            }
        } else {
            let b_ref = a.left;
            let mut b = self.read_node(b_ref)?;
            if b.balance_factor <= 0 {
                let b_bf_before = b.balance_factor;
                a.left = b.right;
                b.right = a_ref;
                if b_bf_before == 0 {
                    a.balance_factor = -1;
                    b.balance_factor = 1;
                } else {
                    a.balance_factor = 0;
                    b.balance_factor = 0;
                }
                self.write_node(a_ref, &a)?;
                self.write_node(b_ref, &b)?;
                Ok((b_ref, b_bf_before != 0))
            } else {
                let c_ref = b.right;
                let mut c = self.read_node(c_ref)?;
                a.left = c.right;
                b.right = c.left;
                c.left = b_ref;
                c.right = a_ref;
                match c.balance_factor {
                    -1 => {
                        a.balance_factor = 1;
                        b.balance_factor = 0;
                    }
                    1 => {
                        a.balance_factor = 0;
                        b.balance_factor = -1;
                    }
                    _ => {
                        a.balance_factor = 0;
                        b.balance_factor = 0;
                    }
                }
                c.balance_factor = 0;
                self.write_node(a_ref, &a)?;
                self.write_node(b_ref, &b)?;
                self.write_node(c_ref, &c)?;
                Ok((c_ref, true))
            }
        }
    }

    /// Builds a cursor positioned at the first node the in-order walk
    /// visits (leftmost when `ascending`, rightmost otherwise), optionally
    /// starting from the first node whose name is `>= start` (ascending) or
    /// `<= start` (descending), and returns it along with that node, if any.
    pub fn inorder_first(
        &self,
        root: NodeRef,
        start: Option<&[u8]>,
        ascending: bool,
    ) -> Result<(InorderCursor, Option<NodeRef>), TreeError> {
        let mut cursor = InorderCursor {
            stack: Vec::new(),
            ascending,
        };
        match start {
            None => self.push_spine(&mut cursor, root)?,
            Some(key) => self.push_bound_spine(&mut cursor, root, key)?,
        }
        let first = self.inorder_next(&mut cursor)?;
        Ok((cursor, first))
    }

    /// Advances the cursor, returning the next node in in-order sequence.
    pub fn inorder_next(&self, cursor: &mut InorderCursor) -> Result<Option<NodeRef>, TreeError> {
        let Some(current) = cursor.stack.pop() else {
            return Ok(None);
        };
        let node = self.read_node(current)?;
        let far_side = if cursor.ascending { node.right } else { node.left };
        self.push_spine(cursor, far_side)?;
        Ok(Some(current))
    }

    fn push_spine(&self, cursor: &mut InorderCursor, mut current: NodeRef) -> Result<(), TreeError> {
        while !current.is_null() {
            let node = self.read_node(current)?;
            let near_side = if cursor.ascending { node.left } else { node.right };
            cursor.stack.push(current);
            current = near_side;
        }
        Ok(())
    }

    fn push_bound_spine(
        &self,
        cursor: &mut InorderCursor,
        mut current: NodeRef,
        key: &[u8],
    ) -> Result<(), TreeError> {
        while !current.is_null() {
            let node = self.read_node(current)?;
            match key.cmp(node.name.as_slice()) {
                Ordering::Equal => {
                    cursor.stack.push(current);
                    return Ok(());
                }
                Ordering::Less => {
                    if cursor.ascending {
                        cursor.stack.push(current);
                    }
                    current = node.left;
                }
                Ordering::Greater => {
                    if !cursor.ascending {
                        cursor.stack.push(current);
                    }
                    current = node.right;
                }
            }
        }
        Ok(())
    }
}

/// Cursor state for an in-order walk (`inorder-first`/`inorder-next`):
/// the stack of ancestors still to be visited.
pub struct InorderCursor {
    stack: Vec<NodeRef>,
    ascending: bool,
}
