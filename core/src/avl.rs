//! Height-balanced binary search tree shared by the term dictionary and the
//! document vectors.
//!
//! Nodes live in a `Vec` arena and link to each other through [`NodeId`]s, so
//! rotations only swap indices. Nothing is ever removed, which makes the arena
//! slot of a node equal to its insertion rank.

use std::cmp::Ordering;
use std::collections::TryReserveError;

use thiserror::Error;

/// An item stored in an [`AvlTree`]: its ordering key plus what to do when an
/// item with an equal key is inserted again.
pub trait Keyed {
    type Key: Ord + ?Sized;

    fn key(&self) -> &Self::Key;

    /// Fold `duplicate` into the item already stored under the same key.
    fn merge(&mut self, duplicate: Self)
    where
        Self: Sized;
}

/// Position of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// `None` once the arena has outgrown the 32-bit id space.
    fn from_slot(slot: usize) -> Option<Self> {
        u32::try_from(slot).ok().map(Self)
    }

    fn slot(self) -> usize {
        self.0 as usize
    }
}

/// The arena could not take another node.
#[derive(Debug, Error)]
pub enum GrowError {
    #[error("node storage could not be reserved")]
    Reserve(#[from] TryReserveError),
    #[error("arena is full at {0} nodes")]
    Exhausted(usize),
}

/// Outcome of [`AvlTree::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The key was new; a leaf was added.
    Inserted,
    /// The key was present; the item was merged into the existing node.
    Merged,
}

#[derive(Debug, Clone)]
struct Node<T> {
    item: T,
    height: u32,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct AvlTree<T> {
    nodes: Vec<Node<T>>,
    root: Option<NodeId>,
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self { nodes: Vec::new(), root: None }
    }
}

impl<T: Keyed> AvlTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the whole tree; 0 when empty.
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// Insert `item`, or merge it into the node that already holds its key.
    ///
    /// Fails only when the arena cannot grow.
    pub fn insert(&mut self, item: T) -> Result<Insertion, GrowError> {
        let next = NodeId::from_slot(self.nodes.len()).ok_or(GrowError::Exhausted(self.nodes.len()))?;
        self.nodes.try_reserve(1)?;
        let (root, inserted) = self.insert_at(self.root, item, next);
        self.root = Some(root);
        Ok(match inserted {
            Some(_) => Insertion::Inserted,
            None => Insertion::Merged,
        })
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        let mut at = self.root;
        while let Some(id) = at {
            let node = self.node(id);
            at = match key.cmp(node.item.key()) {
                Ordering::Equal => return Some(&node.item),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.get(key).is_some()
    }

    /// The `slot`-th item ever inserted (0-based).
    pub fn get_by_slot(&self, slot: usize) -> Option<&T> {
        self.nodes.get(slot).map(|node| &node.item)
    }

    /// Items in ascending key order.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter { tree: self, stack: Vec::new() };
        iter.push_left_spine(self.root);
        iter
    }

    /// Visit every item in ascending key order with mutable access.
    ///
    /// `f` must not change the key.
    pub fn for_each_in_order_mut(&mut self, mut f: impl FnMut(&mut T)) {
        let order: Vec<NodeId> = self.in_order_ids();
        for id in order {
            f(&mut self.nodes[id.slot()].item);
        }
    }

    /// Check ordering, stored heights and the AVL balance bound at every node.
    pub fn is_balanced(&self) -> bool {
        self.check(self.root, None, None).is_some()
    }

    fn check(&self, at: Option<NodeId>, lower: Option<&T::Key>, upper: Option<&T::Key>) -> Option<u32> {
        let Some(id) = at else { return Some(0) };
        let node = self.node(id);
        let key = node.item.key();
        if lower.is_some_and(|lo| key <= lo) || upper.is_some_and(|hi| key >= hi) {
            return None;
        }
        let left = self.check(node.left, lower, Some(key))?;
        let right = self.check(node.right, Some(key), upper)?;
        let height = left.max(right) + 1;
        (left.abs_diff(right) <= 1 && height == node.height).then_some(height)
    }

    fn in_order_ids(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        let mut at = self.root;
        loop {
            while let Some(id) = at {
                stack.push(id);
                at = self.node(id).left;
            }
            let Some(id) = stack.pop() else { break };
            order.push(id);
            at = self.node(id).right;
        }
        order
    }

    /// Returns the new subtree root and, when a leaf was added, its id.
    /// A new leaf always lands in arena slot `next`.
    fn insert_at(&mut self, at: Option<NodeId>, item: T, next: NodeId) -> (NodeId, Option<NodeId>) {
        let Some(id) = at else {
            self.nodes.push(Node { item, height: 1, left: None, right: None });
            return (next, Some(next));
        };

        let added = match item.key().cmp(self.node(id).item.key()) {
            Ordering::Equal => {
                self.node_mut(id).item.merge(item);
                return (id, None);
            }
            Ordering::Less => {
                let (child, added) = self.insert_at(self.node(id).left, item, next);
                self.node_mut(id).left = Some(child);
                added
            }
            Ordering::Greater => {
                let (child, added) = self.insert_at(self.node(id).right, item, next);
                self.node_mut(id).right = Some(child);
                added
            }
        };
        // A merge leaves every height untouched.
        let Some(new) = added else { return (id, None) };

        self.update_height(id);
        (self.rebalance(id, new), added)
    }

    /// Restore the balance of `id` after `new` was inserted below it.
    fn rebalance(&mut self, id: NodeId, new: NodeId) -> NodeId {
        let balance = self.balance(id);
        if balance > 1 {
            if let Some(left) = self.node(id).left {
                if self.key_cmp(new, left) == Ordering::Less {
                    return self.rotate_right(id, left);
                }
                if let Some(pivot) = self.node(left).right {
                    let left = self.rotate_left(left, pivot);
                    self.node_mut(id).left = Some(left);
                    return self.rotate_right(id, left);
                }
            }
        } else if balance < -1 {
            if let Some(right) = self.node(id).right {
                if self.key_cmp(new, right) == Ordering::Greater {
                    return self.rotate_left(id, right);
                }
                if let Some(pivot) = self.node(right).left {
                    let right = self.rotate_right(right, pivot);
                    self.node_mut(id).right = Some(right);
                    return self.rotate_left(id, right);
                }
            }
        }
        id
    }

    /// `pivot` is the left child of `id`; it becomes the subtree root.
    fn rotate_right(&mut self, id: NodeId, pivot: NodeId) -> NodeId {
        self.node_mut(id).left = self.node(pivot).right;
        self.node_mut(pivot).right = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    /// `pivot` is the right child of `id`; it becomes the subtree root.
    fn rotate_left(&mut self, id: NodeId, pivot: NodeId) -> NodeId {
        self.node_mut(id).right = self.node(pivot).left;
        self.node_mut(pivot).left = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    fn key_cmp(&self, a: NodeId, b: NodeId) -> Ordering {
        self.node(a).item.key().cmp(self.node(b).item.key())
    }

    fn balance(&self, id: NodeId) -> i64 {
        let node = self.node(id);
        i64::from(self.height_of(node.left)) - i64::from(self.height_of(node.right))
    }

    fn update_height(&mut self, id: NodeId) {
        let node = self.node(id);
        let height = self.height_of(node.left).max(self.height_of(node.right)) + 1;
        self.node_mut(id).height = height;
    }

    fn height_of(&self, at: Option<NodeId>) -> u32 {
        at.map_or(0, |id| self.node(id).height)
    }

    fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.slot()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.slot()]
    }
}

/// In-order iterator over an [`AvlTree`].
pub struct Iter<'a, T> {
    tree: &'a AvlTree<T>,
    stack: Vec<NodeId>,
}

impl<T> Iter<'_, T> {
    fn push_left_spine(&mut self, mut at: Option<NodeId>) {
        while let Some(id) = at {
            self.stack.push(id);
            at = self.tree.nodes[id.slot()].left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let node = &tree.nodes[id.slot()];
        self.push_left_spine(node.right);
        Some(&node.item)
    }
}

impl<'a, T: Keyed> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
