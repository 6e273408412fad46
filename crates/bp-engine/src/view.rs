//! Read-only views over a breakpoint arena.
//!
//! The seek engine walks a `ChainView` rather than a `BreakpointChain`
//! directly, so an ADSR envelope can present its sustain chain followed by
//! its release run as one sequence without relinking any node.

use bp_ir::{Breakpoint, BreakpointChain, NodeKey};

/// A singly linked sequence of breakpoints.
pub trait ChainView {
    /// First node of the sequence.
    fn head(&self) -> Option<NodeKey>;
    /// Successor of `key` within this view.
    fn next(&self, key: NodeKey) -> Option<NodeKey>;
    /// Breakpoint stored at `key`.
    fn breakpoint(&self, key: NodeKey) -> Option<&Breakpoint>;

    /// Walk the view from its head.
    fn walk(&self) -> Walk<'_, Self>
    where
        Self: Sized,
    {
        Walk { view: self, cursor: self.head() }
    }
}

impl ChainView for BreakpointChain {
    fn head(&self) -> Option<NodeKey> {
        self.first()
    }

    fn next(&self, key: NodeKey) -> Option<NodeKey> {
        BreakpointChain::next(self, key)
    }

    fn breakpoint(&self, key: NodeKey) -> Option<&Breakpoint> {
        self.get(key)
    }
}

/// Iterator over a view's `(key, breakpoint)` pairs.
pub struct Walk<'a, V> {
    view: &'a V,
    cursor: Option<NodeKey>,
}

impl<'a, V: ChainView> Iterator for Walk<'a, V> {
    type Item = (NodeKey, &'a Breakpoint);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        let bp = self.view.breakpoint(key)?;
        self.cursor = self.view.next(key);
        Some((key, bp))
    }
}

/// Where a detached run joins the main chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Splice {
    /// Last main-chain node at or before the run's start time. `None` when
    /// the run starts before the main chain does.
    pub cut: Option<NodeKey>,
    /// Head of the detached run.
    pub head: NodeKey,
}

impl Splice {
    /// Join the run at `head` after every main-chain node that does not
    /// come later than the run's first breakpoint.
    pub fn locate(chain: &BreakpointChain, head: NodeKey) -> Option<Self> {
        let start = chain.get(head)?.time;
        let cut = chain.iter().take_while(|(_, bp)| bp.time <= start).last().map(|(key, _)| key);
        Some(Self { cut, head })
    }
}

/// A main chain followed by a detached run, joined at a `Splice`.
///
/// Main-chain nodes after the cut are not part of the view.
#[derive(Clone, Copy)]
pub struct MergedView<'a> {
    chain: &'a BreakpointChain,
    splice: Splice,
}

impl<'a> MergedView<'a> {
    pub fn new(chain: &'a BreakpointChain, splice: Splice) -> Self {
        Self { chain, splice }
    }
}

impl ChainView for MergedView<'_> {
    fn head(&self) -> Option<NodeKey> {
        match self.splice.cut {
            Some(_) => self.chain.first(),
            None => Some(self.splice.head),
        }
    }

    fn next(&self, key: NodeKey) -> Option<NodeKey> {
        if self.splice.cut == Some(key) {
            Some(self.splice.head)
        } else {
            self.chain.next(key)
        }
    }

    fn breakpoint(&self, key: NodeKey) -> Option<&Breakpoint> {
        self.chain.get(key)
    }
}
