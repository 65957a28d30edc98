//! Path-encoded quadtree node ids.
//!
//! The root is `1`; the children of `id` are `(id << 2) | quadrant`. Bit 1 of
//! the quadrant selects the max-X half and bit 0 the max-Y half, so an id is
//! both the path from the root and the node's index in the flat bounds array.

/// Identifier of a node in the LOD quadtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node.
    pub const ROOT: NodeId = NodeId(1);

    /// Wrap a raw id.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw path code.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index of this node in the flat bounds array.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The child in `quadrant` (masked to its low two bits).
    pub const fn child(self, quadrant: u32) -> NodeId {
        NodeId(child_id(self.0, quadrant))
    }

    /// The parent node, or `None` for the root.
    pub const fn parent(self) -> Option<NodeId> {
        if self.0 <= 1 {
            None
        } else {
            Some(NodeId(self.0 >> 2))
        }
    }

    /// Which quadrant of its parent this node occupies.
    pub const fn quadrant(self) -> u32 {
        self.0 & 0b11
    }

    /// Number of levels between this node and the root (root = 0).
    pub const fn depth(self) -> u32 {
        (31 - self.0.leading_zeros()) / 2
    }
}

/// Id of the child of `parent` in `quadrant`. Out-of-range quadrants are masked.
pub const fn child_id(parent: u32, quadrant: u32) -> u32 {
    (parent << 2) | (quadrant & 0b11)
}

/// Whether `quadrant` is on the max-X side of its parent.
pub const fn is_child_max_x(quadrant: u32) -> bool {
    quadrant & 0b10 != 0
}

/// Whether `quadrant` is on the max-Y side of its parent.
pub const fn is_child_max_y(quadrant: u32) -> bool {
    quadrant & 0b01 != 0
}

/// Number of nodes in a full tree of the given depth: `Σ 4^l` for `l = 0..=max_depth`.
pub const fn total_node_count(max_depth: u32) -> u64 {
    ((1u64 << (2 * (max_depth + 1))) - 1) / 3
}

/// Length of a bounds array that can be indexed by every id of a tree of the
/// given depth: the largest id (`2·4^max_depth - 1`) plus one.
pub const fn id_capacity(max_depth: u32) -> usize {
    pow2(2 * max_depth + 1) as usize
}

/// `2^power` by exponentiation by squaring. Powers of 32 and above wrap to zero.
pub const fn pow2(power: u32) -> u32 {
    let mut result: u32 = 1;
    let mut term: u32 = 2;
    let mut remaining = power;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = result.wrapping_mul(term);
        }
        remaining >>= 1;
        term = term.wrapping_mul(term);
    }
    result
}
