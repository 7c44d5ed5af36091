use std::collections::TryReserveError;
use std::fmt;
use std::ops::{Index, Range};

use tinyvec::TinyVec;

use super::{Color, Player};

pub type NodeIndex = usize;

/// The successors of a node; most nodes only have a few.
pub type Successors = TinyVec<[NodeIndex; 4]>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Node<L> {
    successors: Successors,
    owner: Player,
    color: Color,
    label: Option<L>,
}

impl<L> Node<L> {
    pub fn new(owner: Player, color: Color) -> Self {
        Node {
            successors: Successors::default(),
            owner,
            color,
            label: None,
        }
    }

    pub fn with_label(mut self, label: L) -> Self {
        self.label = Some(label);
        self
    }

    pub fn add_successor(&mut self, successor: NodeIndex) {
        self.successors.push(successor);
    }

    pub fn owner(&self) -> Player {
        self.owner
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// The display label of the node; nodes without one are labelled with their index.
    pub fn label(&self) -> Option<&L> {
        self.label.as_ref()
    }

    pub fn successors(&self) -> &[NodeIndex] {
        &self.successors
    }
}

impl<L> Extend<NodeIndex> for Node<L> {
    fn extend<T: IntoIterator<Item = NodeIndex>>(&mut self, iter: T) {
        self.successors.extend(iter)
    }
}

/// A parity game whose node indices are allocated ahead of the nodes.
///
/// Indices are handed out in increasing order by [`LabelledParityGame::allocate`],
/// and the node for an index is added later. Nodes are written in the order in
/// which they were added, not in index order.
#[derive(Debug)]
pub struct LabelledParityGame<L> {
    nodes: Vec<Option<Node<L>>>,
    order: Vec<NodeIndex>,
}

impl<L> Default for LabelledParityGame<L> {
    fn default() -> Self {
        LabelledParityGame {
            nodes: Vec::with_capacity(4096),
            order: Vec::with_capacity(4096),
        }
    }
}

impl<L> LabelledParityGame<L> {
    /// Allocates the given number of consecutive fresh node indices.
    pub fn allocate(&mut self, count: usize) -> Range<NodeIndex> {
        let start = self.nodes.len();
        self.nodes.resize_with(start + count, || None);
        start..self.nodes.len()
    }

    /// Reserves memory for at least the given number of additional nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory can not be allocated.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.nodes.try_reserve(additional)?;
        self.order.try_reserve(additional)
    }

    /// Adds the node for an allocated index.
    ///
    /// # Panics
    ///
    /// Panics if the index was not allocated or already has a node.
    pub fn add_node(&mut self, index: NodeIndex, node: Node<L>) {
        let slot = &mut self.nodes[index];
        assert!(slot.is_none(), "node {} added twice", index);
        *slot = Some(node);
        self.order.push(index);
    }

    /// The number of allocated node indices.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.nodes().map(|(_, node)| node.successors().len()).sum()
    }

    /// The highest allocated node index, if any index has been allocated.
    pub fn max_index(&self) -> Option<NodeIndex> {
        self.nodes.len().checked_sub(1)
    }

    /// Returns true if every allocated index has a node.
    pub fn is_complete(&self) -> bool {
        self.order.len() == self.nodes.len()
    }

    /// The nodes with their indices in the order in which they were added.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node<L>)> + '_ {
        self.order.iter().map(move |&index| (index, &self[index]))
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Node<L>> {
        self.nodes.get(index).and_then(Option::as_ref)
    }
}

impl<L> Index<NodeIndex> for LabelledParityGame<L> {
    type Output = Node<L>;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        match self.get(index) {
            Some(node) => node,
            None => panic!("no node with index {}", index),
        }
    }
}

/// Writes a label as a quoted string for the PGSolver format.
fn write_label(f: &mut fmt::Formatter<'_>, label: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in label.chars() {
        if c == '"' || c == '\\' {
            write!(f, "\\")?;
        }
        write!(f, "{}", c)?;
    }
    write!(f, "\"")
}

/// Writes the game in PGSolver format, declaring the highest node index in the header.
impl<L: fmt::Display> fmt::Display for LabelledParityGame<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "parity {};", self.max_index().unwrap_or(0))?;
        for (i, node) in self.nodes() {
            write!(f, "{} {} {} ", i, node.color(), u32::from(node.owner()))?;
            for (j, succ) in node.successors().iter().enumerate() {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", succ)?;
            }
            write!(f, " ")?;
            match node.label() {
                Some(label) => write_label(f, &label.to_string())?,
                None => write_label(f, &i.to_string())?,
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
