//! Position arithmetic for a Merkle Mountain Range.
//!
//! Every position holds one entry. Positions are laid out in post-order
//! within each mountain, mountains left to right:
//! ```text
//! Height 3:                 14
//!                       /        \
//! Height 2:        6                13
//!                 / \              /  \
//! Height 1:      2   5           9     12
//!               / \ / \         / \   /  \
//! Height 0:    0  1 3  4       7   8 10  11
//! ```
//! Nothing here touches stored data: every function depends on its
//! arguments alone.

use weave_core::{Error, Result};

/// Height of the node at `pos` (leaves are height 0).
///
/// Strips the largest all-ones mountain size that fits, repeatedly, until
/// what remains is the height.
pub fn height(pos: u64) -> u32 {
    if pos < 2 {
        return 0;
    }

    let mut offset = pos;
    let mut peak_size = u64::MAX >> pos.leading_zeros();
    while peak_size != 0 {
        if offset >= peak_size {
            offset -= peak_size;
        }
        peak_size >>= 1;
    }
    offset as u32
}

/// Number of nodes in a perfect mountain of the given height.
pub fn mountain_size(height: u32) -> u64 {
    (1u64 << (height + 1)) - 1
}

/// The two children of an internal node, left then right.
///
/// Returns `None` for leaves (`height == 0`) and for heights that cannot
/// fit below `pos`.
pub fn children(pos: u64, height: u32) -> Option<(u64, u64)> {
    if height == 0 {
        return None;
    }
    let left = pos.checked_sub(1u64.checked_shl(height)?)?;
    Some((left, pos - 1))
}

/// Position of the parent of `pos` in the unbounded forest.
///
/// A right child sits immediately before its parent; a left child is one
/// sibling offset further back.
pub fn parent(pos: u64) -> u64 {
    let h = height(pos);
    if height(pos + 1) == h + 1 {
        pos + 1
    } else {
        pos + (1u64 << (h + 1))
    }
}

/// First position covered by the subtree rooted at `pos`.
pub fn subtree_start(pos: u64) -> u64 {
    pos + 1 - mountain_size(height(pos))
}

/// Peak positions of a forest of `n` nodes, in increasing order.
pub fn peaks(n: u64) -> Vec<u64> {
    let mut peaks = Vec::new();
    let mut partition = 0u64;

    while n > partition {
        // Largest 2^k - 1 not exceeding what is left.
        let remaining = (n - partition) as u128 + 1;
        let k = 127 - remaining.leading_zeros();
        let size = ((1u128 << k) - 1) as u64;

        peaks.push(partition + size - 1);
        partition += size;
    }

    peaks
}

/// The peak of a forest of `n` nodes whose mountain holds `pos`.
pub fn peak_of(n: u64, pos: u64) -> Option<u64> {
    peaks(n).into_iter().find(|&peak| peak >= pos)
}

/// Nodes needed to show a forest of `from` nodes is a prefix of one of `to`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyNodes {
    /// Nodes entirely after `from`, supplied by digest.
    pub siblings: Vec<u64>,
    /// Nodes straddling `from`, rebuilt from their children and supplied entry.
    pub ancestors: Vec<u64>,
}

impl ConsistencyNodes {
    /// True when the old peaks are already all new peaks.
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty() && self.ancestors.is_empty()
    }
}

/// Plan a consistency proof between forest sizes `from <= to`.
///
/// Walks down from every `to` peak. A node below `from` is necessarily an
/// old peak and is already committed to by the old summary; a node whose
/// whole subtree is new contributes its digest; anything else straddles the
/// boundary and is rebuilt from its children plus its own entry.
pub fn consistency_nodes(from: u64, to: u64) -> Result<ConsistencyNodes> {
    if from > to {
        return Err(Error::invalid_index(format!(
            "consistency from {} to smaller size {}",
            from, to
        )));
    }

    let mut nodes = ConsistencyNodes::default();
    let mut stack = peaks(to);

    while let Some(pos) = stack.pop() {
        if pos < from {
            continue;
        }
        if subtree_start(pos) >= from {
            nodes.siblings.push(pos);
            continue;
        }

        nodes.ancestors.push(pos);
        let (left, right) = children(pos, height(pos)).ok_or_else(|| {
            Error::internal(format!("straddling node {} has no children", pos))
        })?;
        stack.push(left);
        stack.push(right);
    }

    nodes.siblings.sort_unstable();
    nodes.ancestors.sort_unstable();
    Ok(nodes)
}
