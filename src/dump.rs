//! Human readable renderings of a set, for debugging. The formats are not stable.

use alloc::vec::Vec;
use core::fmt::{self, Display};

use crate::node::Direction;
use crate::set::RbSet;

/// Renders the keys of a set in ascending order, separated by spaces.
///
/// Returned by [`RbSet::in_order`].
pub struct InOrder<'a, K: Ord> {
    set: &'a RbSet<K>,
}

/// Renders the nodes of a set in pre-order, one line per node, along with each node's colour
/// and the key of its parent.
///
/// Returned by [`RbSet::pre_order`].
pub struct PreOrder<'a, K: Ord> {
    set: &'a RbSet<K>,
}

impl<K: Ord> RbSet<K> {
    /// An in-order dump of the keys.
    ///
    /// ```rust
    /// # use rbset::RbSet;
    ///
    /// let set = RbSet::from([3, 1, 2]);
    /// assert_eq!(set.in_order().to_string(), "1 2 3");
    /// ```
    pub fn in_order(&self) -> InOrder<'_, K> {
        InOrder { set: self }
    }

    /// A pre-order dump of the tree structure.
    pub fn pre_order(&self) -> PreOrder<'_, K> {
        PreOrder { set: self }
    }
}

impl<K: Ord + Display> Display for InOrder<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.set.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            key.fmt(f)?;
        }
        Ok(())
    }
}

impl<K: Ord + Display> Display for PreOrder<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = Vec::new();
        stack.extend(self.set.root);
        while let Some(node) = stack.pop() {
            let node = unsafe { &*node.as_ptr() };
            write!(f, "{} is {}, parent ", node.key, node.colour)?;
            match node.parent {
                Some(parent) => writeln!(f, "{}", unsafe { &(*parent.as_ptr()).key })?,
                None => writeln!(f, "none")?,
            }
            // Right goes on the stack first so the left subtree is printed first.
            stack.extend(node[Direction::Right]);
            stack.extend(node[Direction::Left]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::RbSet;

    #[test]
    fn test_in_order() {
        assert_eq!(RbSet::<i32>::new().in_order().to_string(), "");
        let set = RbSet::from_iter((1..=5).rev());
        assert_eq!(set.in_order().to_string(), "1 2 3 4 5");
    }

    #[test]
    fn test_pre_order() {
        assert_eq!(RbSet::<i32>::new().pre_order().to_string(), "");

        let set = RbSet::from([1, 2, 3, 4]);
        assert_eq!(
            set.pre_order().to_string(),
            "2 is black, parent none\n\
             1 is black, parent 2\n\
             3 is black, parent 2\n\
             4 is red, parent 3\n"
        );
    }
}
