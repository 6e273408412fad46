//! Arena-backed singly linked breakpoint chain.
//!
//! Nodes live in a `SlotMap` and link to each other by `NodeKey`. Keys stay
//! valid across insertions, so a cursor held by an envelope survives
//! structural edits. The arena may also hold detached runs (an ADSR release
//! stage) that are not reachable from `first`.

use slotmap::SlotMap;

use crate::breakpoint::Breakpoint;

slotmap::new_key_type! {
    /// Stable handle to a node in a `BreakpointChain`.
    pub struct NodeKey;
}

#[derive(Clone, Debug)]
struct Node {
    breakpoint: Breakpoint,
    next: Option<NodeKey>,
}

/// Ordered chain of breakpoints.
#[derive(Clone, Debug, Default)]
pub struct BreakpointChain {
    nodes: SlotMap<NodeKey, Node>,
    first: Option<NodeKey>,
}

impl BreakpointChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain in iteration order. No sorting is performed.
    pub fn from_breakpoints(points: impl IntoIterator<Item = Breakpoint>) -> Self {
        let mut chain = Self::new();
        let mut tail = None;
        for bp in points {
            tail = Some(chain.insert_after(tail, bp));
        }
        chain
    }

    /// Head of the chain.
    pub fn first(&self) -> Option<NodeKey> {
        self.first
    }

    /// Successor of `key`.
    pub fn next(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|n| n.next)
    }

    pub fn get(&self, key: NodeKey) -> Option<&Breakpoint> {
        self.nodes.get(key).map(|n| &n.breakpoint)
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut Breakpoint> {
        self.nodes.get_mut(key).map(|n| &mut n.breakpoint)
    }

    /// Whether `key` refers to a live node (attached or detached).
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of breakpoints reachable from `first`.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no breakpoint is reachable from `first`.
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Last node reachable from `first`.
    pub fn last(&self) -> Option<NodeKey> {
        self.iter().last().map(|(key, _)| key)
    }

    /// Iterate breakpoints from `first`.
    pub fn iter(&self) -> Iter<'_> {
        Iter { chain: self, cursor: self.first }
    }

    /// Iterate breakpoints starting at `key` (works for detached runs).
    pub fn iter_from(&self, key: NodeKey) -> Iter<'_> {
        Iter { chain: self, cursor: Some(key).filter(|k| self.contains(*k)) }
    }

    /// Node whose successor is `key`, walking from `first`.
    pub fn predecessor(&self, key: NodeKey) -> Option<NodeKey> {
        self.iter().map(|(k, _)| k).find(|&k| self.next(k) == Some(key))
    }

    /// Append a breakpoint after the current last node.
    pub fn push_back(&mut self, bp: Breakpoint) -> NodeKey {
        let tail = self.last();
        self.insert_after(tail, bp)
    }

    /// Splice `bp` in directly after `prev`, or at the head when `prev` is `None`.
    /// An unknown `prev` is treated as `None`.
    pub fn insert_after(&mut self, prev: Option<NodeKey>, bp: Breakpoint) -> NodeKey {
        match prev.filter(|k| self.nodes.contains_key(*k)) {
            Some(prev) => {
                let next = self.nodes[prev].next;
                let key = self.nodes.insert(Node { breakpoint: bp, next });
                self.nodes[prev].next = Some(key);
                key
            }
            None => {
                let key = self.nodes.insert(Node { breakpoint: bp, next: self.first });
                self.first = Some(key);
                key
            }
        }
    }

    /// The node a breakpoint at `time` should follow: the last node whose
    /// time is `<= time`. `None` means the new node becomes the head.
    pub fn insertion_point(&self, time: f64) -> Option<NodeKey> {
        let mut prev = None;
        for (key, bp) in self.iter() {
            if bp.time <= time {
                prev = Some(key);
            } else {
                break;
            }
        }
        prev
    }

    /// Insert keeping the chain sorted by time. Equal times go after
    /// existing nodes at that time.
    pub fn insert(&mut self, bp: Breakpoint) -> NodeKey {
        let prev = self.insertion_point(bp.time);
        self.insert_after(prev, bp)
    }

    /// Unlink and free a node reachable from `first`.
    pub fn remove(&mut self, key: NodeKey) -> Option<Breakpoint> {
        if self.first == Some(key) {
            self.first = self.nodes.get(key)?.next;
        } else {
            let prev = self.predecessor(key)?;
            self.nodes[prev].next = self.nodes.get(key)?.next;
        }
        self.nodes.remove(key).map(|n| n.breakpoint)
    }

    /// Store a run of breakpoints that is not reachable from `first`.
    /// Returns the head of the run.
    pub fn push_detached(&mut self, points: impl IntoIterator<Item = Breakpoint>) -> Option<NodeKey> {
        let mut head = None;
        let mut tail: Option<NodeKey> = None;
        for bp in points {
            let key = self.nodes.insert(Node { breakpoint: bp, next: None });
            match tail {
                Some(t) => self.nodes[t].next = Some(key),
                None => head = Some(key),
            }
            tail = Some(key);
        }
        head
    }

    /// Apply `f` to every breakpoint reachable from `first`.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Breakpoint)) {
        let mut cursor = self.first;
        while let Some(key) = cursor {
            let node = &mut self.nodes[key];
            f(&mut node.breakpoint);
            cursor = node.next;
        }
    }

    /// Apply `f` to every breakpoint of the run starting at `head`.
    pub fn for_each_from_mut(&mut self, head: NodeKey, mut f: impl FnMut(&mut Breakpoint)) {
        let mut cursor = Some(head);
        while let Some(key) = cursor {
            let Some(node) = self.nodes.get_mut(key) else { return };
            f(&mut node.breakpoint);
            cursor = node.next;
        }
    }
}

/// Iterator over `(key, breakpoint)` pairs of a run.
pub struct Iter<'a> {
    chain: &'a BreakpointChain,
    cursor: Option<NodeKey>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (NodeKey, &'a Breakpoint);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        let node = self.chain.nodes.get(key)?;
        self.cursor = node.next;
        Some((key, &node.breakpoint))
    }
}
