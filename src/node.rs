//! Nodes of the tree and the small vocabulary the balancing code is written in.

use alloc::boxed::Box;
use core::fmt;
use core::ptr::NonNull;

/// A raw pointer to a live node.
pub(crate) type NodePtr<K> = NonNull<RbNode<K>>;

/// A child or parent link. `None` stands for the black nil leaf (or, for a parent link, the
/// absence of a parent).
pub(crate) type Link<K> = Option<NodePtr<K>>;

/// A direction for a node to be in, in a binary tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Get the opposite of a direction.
    pub(crate) fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// The colour of an RbNode. Absent children count as black.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Colour {
    Red,
    Black,
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colour::Red => f.write_str("red"),
            Colour::Black => f.write_str("black"),
        }
    }
}

/// A single key of the set together with its colour and links.
pub(crate) struct RbNode<K> {
    pub(crate) key: K,
    /// The colour of this node. Every node has a colour for balancing purposes.
    pub(crate) colour: Colour,

    /// A raw pointer to the parent of this node. This pointer is None iff the node is the root
    /// node. It never owns anything.
    pub(crate) parent: Link<K>,
    /// Our two child nodes. These are owned by this node.
    pub(crate) child: [Link<K>; 2],
}

impl<K> RbNode<K> {
    /// Allocate a detached node and leak it into a raw pointer. Ownership is handed to whichever
    /// link the caller stores it in; `free` takes it back.
    pub(crate) fn alloc(key: K, colour: Colour, parent: Link<K>) -> NodePtr<K> {
        let node = Box::new(RbNode {
            key,
            colour,
            parent,
            child: [None, None],
        });
        NonNull::from(Box::leak(node))
    }

    /// Reclaim a node created by `alloc`, returning its key.
    ///
    /// ## Safety
    /// - `node` must have come from `alloc` and must no longer be reachable from the tree.
    pub(crate) unsafe fn free(node: NodePtr<K>) -> K {
        let node = Box::from_raw(node.as_ptr());
        node.key
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.child == [None, None]
    }

    /// The only child of this node, if it has at most one.
    pub(crate) fn sole_child(&self) -> Option<Link<K>> {
        match self.child {
            [Some(_), Some(_)] => None,
            [left, right] => Some(left.or(right)),
        }
    }
}

/// The colour of a link, treating an absent node as a black nil leaf.
pub(crate) fn colour_of<K>(link: Link<K>) -> Colour {
    // SAFETY: links stored in the tree are either None or point at live nodes.
    link.map_or(Colour::Black, |n| unsafe { (*n.as_ptr()).colour })
}

/// The child of `node` on side `dir`.
///
/// ## Safety
/// - `node` must be valid.
pub(crate) unsafe fn link<K>(node: NodePtr<K>, dir: Direction) -> Link<K> {
    (&*node.as_ptr())[dir]
}

/// Point the `dir` child slot of `node` at `child`. Parent links are left alone.
///
/// ## Safety
/// - `node` must be valid, and nothing else may be borrowing it.
pub(crate) unsafe fn set_link<K>(node: NodePtr<K>, dir: Direction, child: Link<K>) {
    (&mut *node.as_ptr())[dir] = child;
}

/// Which side of `parent` the node `child` hangs from.
///
/// ## Safety
/// - `parent` must be valid, and `child` must be one of its children.
pub(crate) unsafe fn side_of<K>(parent: NodePtr<K>, child: NodePtr<K>) -> Direction {
    if link(parent, Direction::Left) == Some(child) {
        Direction::Left
    } else {
        debug_assert!(link(parent, Direction::Right) == Some(child));
        Direction::Right
    }
}

/// Unwrap a link the balancing code relies on being present. An absent node here means the
/// colouring invariants were already broken before the operation started, so there is nothing
/// sensible left to do.
#[track_caller]
pub(crate) fn present<K>(link: Link<K>, what: &str) -> NodePtr<K> {
    match link {
        Some(node) => node,
        None => panic!("red-black invariant broken: expected a {what} node"),
    }
}

impl<K> core::ops::Index<Direction> for RbNode<K> {
    type Output = Link<K>;

    fn index(&self, index: Direction) -> &Self::Output {
        match index {
            Direction::Left => &self.child[0],
            Direction::Right => &self.child[1],
        }
    }
}

impl<K> core::ops::IndexMut<Direction> for RbNode<K> {
    fn index_mut(&mut self, index: Direction) -> &mut Self::Output {
        match index {
            Direction::Left => &mut self.child[0],
            Direction::Right => &mut self.child[1],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_node_predicates() {
        let root = RbNode::alloc(2, Colour::Black, None);
        let left = RbNode::alloc(1, Colour::Red, Some(root));
        unsafe {
            assert!((&*root.as_ptr()).is_leaf());
            assert_eq!((&*root.as_ptr()).sole_child(), Some(None));

            set_link(root, Direction::Left, Some(left));
            assert!(!(&*root.as_ptr()).is_leaf());
            assert_eq!((&*root.as_ptr()).sole_child(), Some(Some(left)));
            assert_eq!(side_of(root, left), Direction::Left);

            let right = RbNode::alloc(3, Colour::Red, Some(root));
            set_link(root, Direction::Right, Some(right));
            assert_eq!((&*root.as_ptr()).sole_child(), None);
            assert_eq!(side_of(root, right), Direction::Right);

            assert_eq!(colour_of(Some(right)), Colour::Red);
            assert_eq!(colour_of::<i32>(None), Colour::Black);

            assert_eq!(RbNode::free(right), 3);
            assert_eq!(RbNode::free(left), 1);
            assert_eq!(RbNode::free(root), 2);
        }
    }

    #[test]
    fn test_links() {
        let root = RbNode::alloc('b', Colour::Black, None);
        let right = RbNode::alloc('c', Colour::Red, Some(root));
        unsafe {
            assert_eq!(link(root, Direction::Left), None);
            set_link(root, Direction::Right, Some(right));
            assert_eq!(link(root, Direction::Right), Some(right));
            assert_eq!(link(root, Direction::Left), None);
            assert_eq!((&*right.as_ptr()).parent, Some(root));

            set_link(root, Direction::Right, None);
            assert!((&*root.as_ptr()).is_leaf());

            assert_eq!(RbNode::free(right), 'c');
            assert_eq!(RbNode::free(root), 'b');
        }
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(alloc::format!("{} {}", Colour::Red, Colour::Black), "red black");
    }

    #[test]
    #[should_panic(expected = "expected a sibling node")]
    fn test_present_fails_fast() {
        present::<u8>(None, "sibling");
    }
}
