use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::Hash;
use core::mem::ManuallyDrop;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::iter::{IntoIter, Iter};
use crate::node::{
    colour_of, link, present, set_link, side_of, Colour, Direction, Link, NodePtr, RbNode,
};

/// A Red-Black tree for use as an ordered set. See the root level documentation for more info.
pub struct RbSet<K: Ord> {
    /// The root node of the tree.
    pub(crate) root: Link<K>,
    /// The amount of nodes in the tree.
    pub(crate) len: usize,
}

/// Where a key lives in the tree, or where it would have to go.
enum Search<K> {
    /// The tree has no nodes at all.
    Empty,
    /// A node holding an equal key.
    Found(NodePtr<K>),
    /// The key is missing. It would become the child of this node on this side.
    Vacant(NodePtr<K>, Direction),
}

impl<K: Ord> RbSet<K> {
    /// Create a new empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotate a subtree of the tree in a direction. Rotating in `Direction::Left` is a left
    /// rotation: the right child of `root` takes its place and `root` becomes that child's left
    /// child. Colours are left alone.
    ///
    /// ## Safety
    /// - All pointers must be either valid or null
    /// - The child in the opposite direction of dir of node must be non null.
    unsafe fn rotate(&mut self, root: NodePtr<K>, dir: Direction) -> NodePtr<K> {
        trace!("rotating {dir:?}");
        let parent = (*root.as_ptr()).parent;
        let pivot = present(link(root, dir.opposite()), "rotation pivot");
        let middle = link(pivot, dir);

        set_link(root, dir.opposite(), middle);
        if let Some(middle) = middle {
            (*middle.as_ptr()).parent = Some(root);
        }
        set_link(pivot, dir, Some(root));
        (*root.as_ptr()).parent = Some(pivot);
        (*pivot.as_ptr()).parent = parent;
        match parent {
            Some(parent) => {
                let parent_dir = side_of(parent, root);
                set_link(parent, parent_dir, Some(pivot));
            }
            None => self.root = Some(pivot),
        }

        pivot
    }

    /// Replace a node in the tree with another subtree (or with nothing). The caller is
    /// responsible for freeing `point` after this operation.
    ///
    /// ## Safety
    /// - All pointers must be either valid or null
    unsafe fn transplant(&mut self, point: NodePtr<K>, new: Link<K>) {
        match (*point.as_ptr()).parent {
            None => {
                self.root = new;
            }
            Some(parent) => {
                let dir = side_of(parent, point);
                set_link(parent, dir, new);
            }
        }
        if let Some(new) = new {
            (*new.as_ptr()).parent = (*point.as_ptr()).parent;
        }
    }

    /// Follow `dir` links down from `node` until there are none left.
    pub(crate) fn extreme(mut node: NodePtr<K>, dir: Direction) -> NodePtr<K> {
        // SAFETY: all pointers should be kept valid in this data structure.
        while let Some(next) = unsafe { link(node, dir) } {
            node = next;
        }
        node
    }

    /// Walk down from the root looking for `key`.
    fn search<Q>(&self, key: &Q) -> Search<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut node) = self.root else {
            return Search::Empty;
        };

        // SAFETY: all pointers should be kept valid in this data structure.
        loop {
            let node_key = unsafe { &(*node.as_ptr()).key };
            let dir = match key.cmp(node_key.borrow()) {
                Ordering::Less => Direction::Left,
                Ordering::Equal => return Search::Found(node),
                Ordering::Greater => Direction::Right,
            };
            match unsafe { link(node, dir) } {
                Some(next) => node = next,
                None => return Search::Vacant(node, dir),
            }
        }
    }

    /// Get a reference to the key stored in the set that is equal to `key`.
    ///
    /// ```rust
    /// # use rbset::RbSet;
    ///
    /// let set = RbSet::from([4, 5, 6]);
    ///
    /// assert_eq!(set.get(&5), Some(&5));
    /// assert_eq!(set.get(&7), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Found(node) => Some(unsafe { &(*node.as_ptr()).key }),
            Search::Empty | Search::Vacant(..) => None,
        }
    }

    /// Returns whether an equal key is stored in the set.
    ///
    /// ```rust
    /// # use rbset::RbSet;
    ///
    /// let mut set = RbSet::new();
    /// assert!(!set.contains(&1));
    ///
    /// set.insert(1);
    /// assert!(set.contains(&1));
    /// ```
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        matches!(self.search(key), Search::Found(_))
    }

    /// Insert a key into the set. Returns `false`, and leaves the set untouched, if an equal key
    /// is already present.
    ///
    /// ```rust
    /// # use rbset::RbSet;
    ///
    /// let mut set = RbSet::new();
    ///
    /// assert!(set.insert(4));
    /// assert!(set.insert(5));
    /// assert!(!set.insert(4));
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        let (parent, dir) = match self.search(&key) {
            Search::Found(_) => return false,
            Search::Empty => {
                // The first node is the root, so it starts out black.
                self.root = Some(RbNode::alloc(key, Colour::Black, None));
                self.len = 1;
                trace!("inserted root");
                return true;
            }
            Search::Vacant(parent, dir) => (parent, dir),
        };

        // New nodes start out red, which can only break the red property. That is corrected
        // afterwards if needed.
        let node = RbNode::alloc(key, Colour::Red, Some(parent));
        unsafe { set_link(parent, dir, Some(node)) };
        self.len += 1;
        unsafe { self.insert_fixup(node) };
        trace!("inserted key, len now {}", self.len);
        true
    }

    /// Restore the red property after `node` was attached as a red leaf.
    ///
    /// ## Safety
    /// - `node` must be a live node of this tree.
    unsafe fn insert_fixup(&mut self, mut node: NodePtr<K>) {
        while let Some(parent) = (*node.as_ptr()).parent {
            if (*parent.as_ptr()).colour == Colour::Black {
                break;
            }
            debug_assert!((*node.as_ptr()).colour == Colour::Red);
            // A red node is never the root, so a red parent always has a parent of its own.
            let grandparent = present((*parent.as_ptr()).parent, "grandparent");
            let side = side_of(grandparent, parent);
            let uncle = link(grandparent, side.opposite());

            if let (Colour::Red, Some(uncle)) = (colour_of(uncle), uncle) {
                // Push the red up to the grandparent and look at it next. The grandparent must
                // be black since the uncle is red.
                trace!("insert fix-up: red uncle");
                (*uncle.as_ptr()).colour = Colour::Black;
                (*parent.as_ptr()).colour = Colour::Black;
                (*grandparent.as_ptr()).colour = Colour::Red;
                node = grandparent;
                continue;
            }

            let mut parent = parent;
            if side_of(parent, node) != side {
                // Zig-zag. Rotate it into a zig-zig so that a single rotation finishes the job.
                trace!("insert fix-up: inner grandchild");
                self.rotate(parent, side);
                parent = node;
            }
            trace!("insert fix-up: outer grandchild");
            (*parent.as_ptr()).colour = Colour::Black;
            (*grandparent.as_ptr()).colour = Colour::Red;
            self.rotate(grandparent, side.opposite());
            break;
        }
        // Finally we correct the root node to be black.
        if let Some(root) = self.root {
            (*root.as_ptr()).colour = Colour::Black;
        }
    }

    /// Remove a key from the set, returning whether it was present.
    ///
    /// ```rust
    /// # use rbset::RbSet;
    ///
    /// let mut set = RbSet::from([4]);
    ///
    /// assert!(set.remove(&4));
    /// assert!(!set.remove(&4));
    /// assert!(set.is_empty());
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Remove a key from the set and hand back the stored key (if it exists).
    ///
    /// ```rust
    /// # use rbset::RbSet;
    ///
    /// let mut set = RbSet::from([String::from("a"), String::from("b")]);
    ///
    /// assert_eq!(set.take("a"), Some(String::from("a")));
    /// assert_eq!(set.take("a"), None);
    /// ```
    pub fn take<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Search::Found(node) = self.search(key) else {
            return None;
        };
        let key = unsafe { self.remove_node(node) };
        trace!("removed key, len now {}", self.len);
        Some(key)
    }

    /// Unlink and free the node holding a key, rebalancing afterwards.
    ///
    /// ## Safety
    /// - `node` must be a live node of this tree.
    unsafe fn remove_node(&mut self, node: NodePtr<K>) -> K {
        // A node with two children is not unlinked itself. Its key swaps places with the
        // in-order successor, which has no left child, and the successor's node goes instead.
        let target = match (&*node.as_ptr()).sole_child() {
            Some(_) => node,
            None => {
                trace!("remove: two children, unlinking the successor");
                let right = present(link(node, Direction::Right), "right child");
                let successor = Self::extreme(right, Direction::Left);
                core::mem::swap(&mut (*node.as_ptr()).key, &mut (*successor.as_ptr()).key);
                successor
            }
        };

        let replacement = present_sole_child(target);
        let colour = (*target.as_ptr()).colour;
        // The hole left behind is described by its parent and side, whether or not a
        // replacement node ends up filling it.
        let hole = match (*target.as_ptr()).parent {
            Some(parent) => Some((parent, side_of(parent, target))),
            None => None,
        };
        match (hole, (&*target.as_ptr()).is_leaf()) {
            (None, true) => trace!("remove: last node"),
            (Some(_), true) => trace!("remove: leaf"),
            (_, false) => trace!("remove: one child"),
        }
        self.transplant(target, replacement);
        let removed = RbNode::free(target);
        self.len -= 1;

        // Removing a red node cannot change any black height.
        if colour == Colour::Black {
            match hole {
                Some((parent, dir)) => self.remove_fixup(parent, dir),
                // The root went away; whatever replaced it is the new root and must be black.
                None => {
                    if let Some(root) = self.root {
                        (*root.as_ptr()).colour = Colour::Black;
                    }
                }
            }
        }
        removed
    }

    /// Restore the black height property after a black node was removed from
    /// `parent[dir]`. Whatever sits in that slot now (possibly nothing) is one black short.
    ///
    /// ## Safety
    /// - `parent` must be a live node of this tree.
    unsafe fn remove_fixup(&mut self, mut parent: NodePtr<K>, mut dir: Direction) {
        let settled = loop {
            let node = link(parent, dir);
            if colour_of(node) == Colour::Red {
                break node;
            }

            let sibling_dir = dir.opposite();
            // The short side has black height at least one less than the other side, so by the
            // black height property there has to be a real sibling.
            let mut sibling = present(link(parent, sibling_dir), "sibling");
            if (*sibling.as_ptr()).colour == Colour::Red {
                trace!("remove fix-up: red sibling");
                (*sibling.as_ptr()).colour = Colour::Black;
                (*parent.as_ptr()).colour = Colour::Red;
                self.rotate(parent, dir);
                // The old sibling's inner child is the new sibling. It is black and real,
                // since it carried the same black height as the red sibling.
                sibling = present(link(parent, sibling_dir), "sibling");
            }

            // From this point, we know that the sibling is black.
            let near = link(sibling, dir);
            let far = link(sibling, sibling_dir);
            if colour_of(near) == Colour::Black && colour_of(far) == Colour::Black {
                // Taking one black off the sibling's side evens both sides out, then the
                // parent is the one that is short.
                trace!("remove fix-up: black sibling with black children");
                (*sibling.as_ptr()).colour = Colour::Red;
                match (*parent.as_ptr()).parent {
                    Some(grandparent) => {
                        dir = side_of(grandparent, parent);
                        parent = grandparent;
                    }
                    None => break Some(parent),
                }
                continue;
            }

            if colour_of(far) == Colour::Black {
                // The near child is red. Rotate it up so that the far child is red instead.
                trace!("remove fix-up: red near nephew");
                let near = present(near, "near nephew");
                (*near.as_ptr()).colour = Colour::Black;
                (*sibling.as_ptr()).colour = Colour::Red;
                self.rotate(sibling, sibling_dir);
                sibling = near;
            }

            // The far child of the sibling is red. Rotating about the parent gives the short
            // side one more black ancestor while the far side keeps its count through the
            // recoloured far child.
            trace!("remove fix-up: red far nephew");
            (*sibling.as_ptr()).colour = (*parent.as_ptr()).colour;
            (*parent.as_ptr()).colour = Colour::Black;
            let far = present(link(sibling, sibling_dir), "far nephew");
            (*far.as_ptr()).colour = Colour::Black;
            self.rotate(parent, dir);
            break self.root;
        };
        if let Some(node) = settled {
            (*node.as_ptr()).colour = Colour::Black;
        }
    }

    /// Removes every key from the set.
    pub fn clear(&mut self) {
        debug!("clearing set of {} keys", self.len);
        *self = Self::new();
    }

    /// The smallest key in the set.
    ///
    /// ```rust
    /// # use rbset::{Error, RbSet};
    ///
    /// let mut set = RbSet::new();
    /// assert_eq!(set.min_key(), Err(Error::Empty));
    ///
    /// set.extend([3, 1, 2]);
    /// assert_eq!(set.min_key(), Ok(&1));
    /// ```
    pub fn min_key(&self) -> Result<&K> {
        let root = self.root.ok_or(Error::Empty)?;
        let node = Self::extreme(root, Direction::Left);
        Ok(unsafe { &(*node.as_ptr()).key })
    }

    /// The largest key in the set.
    ///
    /// ```rust
    /// # use rbset::{Error, RbSet};
    ///
    /// let mut set = RbSet::new();
    /// assert_eq!(set.max_key(), Err(Error::Empty));
    ///
    /// set.extend([3, 1, 2]);
    /// assert_eq!(set.max_key(), Ok(&3));
    /// ```
    pub fn max_key(&self) -> Result<&K> {
        let root = self.root.ok_or(Error::Empty)?;
        let node = Self::extreme(root, Direction::Right);
        Ok(unsafe { &(*node.as_ptr()).key })
    }

    /// Returns the amount of elements stored in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of edges on the longest path from the root down to a leaf, or `None` if the
    /// set is empty.
    ///
    /// ```rust
    /// # use rbset::RbSet;
    ///
    /// assert_eq!(RbSet::<u8>::new().height(), None);
    /// assert_eq!(RbSet::from([1]).height(), Some(0));
    /// assert_eq!(RbSet::from([1, 2, 3]).height(), Some(1));
    /// ```
    pub fn height(&self) -> Option<usize> {
        let mut stack = Vec::new();
        stack.push((self.root?, 0));
        let mut height = 0;
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            for child in unsafe { (*node.as_ptr()).child }.into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        Some(height)
    }

    /// Copy every key out into a vector, in ascending order.
    ///
    /// ```rust
    /// # use rbset::RbSet;
    ///
    /// let set = RbSet::from([5, 1, 4, 1]);
    /// assert_eq!(set.to_vec(), vec![1, 4, 5]);
    /// ```
    pub fn to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut keys = Vec::with_capacity(self.len);
        keys.extend(self.iter().cloned());
        debug_assert_eq!(keys.len(), self.len);
        keys
    }

    /// Return a borrowing iterator over the keys of the set, in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self.root, self.len)
    }
}

/// The child of a node that is known to have at most one.
///
/// ## Safety
/// - `node` must be valid.
unsafe fn present_sole_child<K>(node: NodePtr<K>) -> Link<K> {
    match (&*node.as_ptr()).sole_child() {
        Some(child) => child,
        None => panic!("red-black invariant broken: unlinking a node with two children"),
    }
}

impl<K: Ord> Drop for RbSet<K> {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            for child in unsafe { (*node.as_ptr()).child }.into_iter().flatten() {
                stack.push(child);
            }

            drop(unsafe { RbNode::free(node) });
        }
    }
}

impl<K: Ord> Default for RbSet<K> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<K: Ord + Clone> Clone for RbSet<K> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<K: Ord + Debug> Debug for RbSet<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self).finish()
    }
}

impl<K: Ord> PartialEq for RbSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<K: Ord> Eq for RbSet<K> {}

impl<K: Ord> FromIterator<K> for RbSet<K> {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut set = RbSet::new();
        set.extend(iter);
        set
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for RbSet<K> {
    fn from(keys: [K; N]) -> Self {
        Self::from_iter(keys)
    }
}

impl<K: Ord> Extend<K> for RbSet<K> {
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: Ord + Copy> Extend<&'a K> for RbSet<K> {
    fn extend<T: IntoIterator<Item = &'a K>>(&mut self, iter: T) {
        for &key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> PartialOrd for RbSet<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for RbSet<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl<K: Ord + Hash> Hash for RbSet<K> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for key in self {
            key.hash(state);
        }
    }
}

impl<'a, K: Ord> IntoIterator for &'a RbSet<K> {
    type Item = &'a K;

    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord> IntoIterator for RbSet<K> {
    type Item = K;

    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        let set = ManuallyDrop::new(self);
        IntoIter::new(set.root, set.len)
    }
}
