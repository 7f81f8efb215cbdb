//! Branch records and their synchronisation with the grammar string.
//!
//! Every `[` in the symbol string opens one branch. The [`BranchBook`] keeps
//! one [`Branch`] per bracket, in the order the brackets appear (a pre-order
//! walk of the bracket tree), and refreshes their symbols after each rewrite
//! without touching geometry that has already been grown.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Identifier of a branch, unique within one plant.
pub type BranchId = u32;

/// A leaf placed on the lateral surface of a grown segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    /// World-space position of the leaf's centre.
    pub position: Vec3,
    /// Unit normal the leaf faces.
    pub orientation: Vec3,
}

/// The portion of the grammar string between a `[` and the next bracket,
/// together with the geometry grown for it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Branch {
    /// Stable identifier, kept across resyncs.
    pub id: BranchId,

    /// Generation at which this branch's opening bracket entered the string.
    pub creation_depth: u32,

    /// Symbols between this branch's `[` and the next bracket.
    pub symbol: String,

    /// Number of enclosing brackets (0 for the root branch).
    pub nesting: usize,

    /// Index of the enclosing branch in the book, if any.
    pub parent: Option<usize>,

    /// Polyline of grown nodes. Empty until grown.
    pub nodes: Vec<Vec3>,

    /// Leaves scattered along the polyline.
    pub leaves: Vec<Leaf>,
}

impl Branch {
    /// Creates an ungrown branch with an empty symbol.
    pub fn new(id: BranchId, creation_depth: u32) -> Self {
        Self {
            id,
            creation_depth,
            symbol: String::new(),
            nesting: 0,
            parent: None,
            nodes: Vec::new(),
            leaves: Vec::new(),
        }
    }

    /// Whether geometry has been computed. Grown branches are never regrown.
    pub fn is_grown(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// First node of the polyline.
    pub fn start(&self) -> Option<Vec3> {
        self.nodes.first().copied()
    }

    /// Last node of the polyline.
    pub fn end(&self) -> Option<Vec3> {
        self.nodes.last().copied()
    }

    /// `end - start`, or `None` if ungrown.
    pub fn net_direction(&self) -> Option<Vec3> {
        Some(self.end()? - self.start()?)
    }

    /// Iterates the leaf positions, parallel to [`leaf_orientations`](Self::leaf_orientations).
    pub fn leaf_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.leaves.iter().map(|l| l.position)
    }

    pub fn leaf_orientations(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.leaves.iter().map(|l| l.orientation)
    }
}

/// Ordered collection of branches kept in step with the symbol string.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BranchBook {
    branches: Vec<Branch>,
    next_id: BranchId,
}

impl BranchBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book for `symbols`, every branch created at `depth`.
    pub fn from_symbols(symbols: &str, depth: u32) -> Self {
        let mut book = Self::new();
        book.resync(symbols, depth);
        book
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Branch> {
        self.branches.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Branch> {
        self.branches.get(index)
    }

    pub fn as_slice(&self) -> &[Branch] {
        &self.branches
    }

    pub fn as_mut_slice(&mut self) -> &mut [Branch] {
        &mut self.branches
    }

    fn allocate_id(&mut self) -> BranchId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Inserts `count` ungrown placeholders at `position` (clamped to the end).
    ///
    /// Called with the insertions reported by [`rewrite`](crate::rewrite) so
    /// that new branches sit between the existing ones they follow in the
    /// rewritten string.
    pub fn insert_placeholders(&mut self, count: usize, position: usize, depth: u32) {
        let mut at = position.min(self.branches.len());
        for _ in 0..count {
            let id = self.allocate_id();
            self.branches.insert(at, Branch::new(id, depth));
            at += 1;
        }
    }

    /// Reconciles the book with `symbols`.
    ///
    /// The i-th `[` maps to the i-th branch. Existing branches have their
    /// symbol, nesting and parent refreshed in place (geometry is kept);
    /// missing ones are appended with `creation_depth = depth`; surplus records
    /// are dropped so that `len()` equals the number of `[` in `symbols`.
    pub fn resync(&mut self, symbols: &str, depth: u32) {
        let mut open: Vec<usize> = Vec::new();
        let mut index = 0;

        for (pos, c) in symbols.char_indices() {
            match c {
                '[' => {
                    let body = &symbols[pos + 1..];
                    let end = body.find(['[', ']']).unwrap_or(body.len());
                    let symbol = &body[..end];

                    if index == self.branches.len() {
                        let id = self.allocate_id();
                        self.branches.push(Branch::new(id, depth));
                    }
                    let branch = &mut self.branches[index];
                    branch.symbol.clear();
                    branch.symbol.push_str(symbol);
                    branch.nesting = open.len();
                    branch.parent = open.last().copied();

                    open.push(index);
                    index += 1;
                }
                ']' => {
                    open.pop();
                }
                _ => {}
            }
        }

        if self.branches.len() > index {
            trace!(
                dropped = self.branches.len() - index,
                "dropping branches with no bracket"
            );
            self.branches.truncate(index);
        }
    }

    /// Rebuilds a symbol string from the branch records.
    ///
    /// Exact for strings where no symbols follow a closing bracket; any such
    /// trailing text is not owned by a branch and is lost.
    pub fn to_symbol_string(&self) -> String {
        let mut out = String::new();
        let mut open = 0;
        for branch in &self.branches {
            while open > branch.nesting {
                out.push(']');
                open -= 1;
            }
            out.push('[');
            out.push_str(&branch.symbol);
            open += 1;
        }
        for _ in 0..open {
            out.push(']');
        }
        out
    }
}

impl<'a> IntoIterator for &'a BranchBook {
    type Item = &'a Branch;
    type IntoIter = std::slice::Iter<'a, Branch>;

    fn into_iter(self) -> Self::IntoIter {
        self.branches.iter()
    }
}
