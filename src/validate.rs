//! Whole-tree checks of the red-black properties.

use log::warn;

use crate::error::{Error, Result};
use crate::node::{Colour, NodePtr};
use crate::set::RbSet;

impl<K: Ord> RbSet<K> {
    /// The number of black nodes on every path from the root down to a nil leaf.
    ///
    /// Every path is walked, so this doubles as a check of the black height property: if two
    /// paths disagree, the counts of the first offending node's subtrees are returned as an
    /// error.
    ///
    /// ```rust
    /// # use rbset::RbSet;
    ///
    /// assert_eq!(RbSet::<u8>::new().black_height(), Ok(0));
    /// assert_eq!(RbSet::from([1]).black_height(), Ok(1));
    /// assert_eq!(RbSet::from([1, 2, 3, 4]).black_height(), Ok(2));
    /// ```
    pub fn black_height(&self) -> Result<usize> {
        match self.root {
            None => Ok(0),
            Some(root) => unsafe { black_height_of(root) },
        }
    }

    /// Check every structural and colouring invariant of the tree: parent links match child
    /// links, the root is black, no red node has a red child, all paths have the same black
    /// height, keys ascend strictly in order, and the recorded length matches the node count.
    pub fn validate(&self) -> Result<()> {
        let result = self.check();
        if let Err(err) = &result {
            warn!("tree failed validation: {err}");
        }
        result
    }

    fn check(&self) -> Result<()> {
        let mut counted = 0;
        if let Some(root) = self.root {
            let root_ref = unsafe { &*root.as_ptr() };
            if root_ref.parent.is_some() {
                return Err(Error::BrokenParentLink);
            }
            if root_ref.colour == Colour::Red {
                return Err(Error::RedRoot);
            }
            unsafe { check_subtree(root, &mut counted)? };
        }
        if counted != self.len {
            return Err(Error::LenMismatch {
                counted,
                recorded: self.len,
            });
        }

        // Only walk in order once the length is known to be right, the iterator relies on it.
        let mut prev = None;
        for key in self.iter() {
            if prev.is_some_and(|prev| prev >= key) {
                return Err(Error::OutOfOrder);
            }
            prev = Some(key);
        }
        Ok(())
    }
}

/// Black height of the subtree rooted at `node`, counting `node` itself.
///
/// ## Safety
/// - `node` must be valid, and so must everything below it.
unsafe fn black_height_of<K>(node: NodePtr<K>) -> Result<usize> {
    let node = &*node.as_ptr();
    let mut heights = [0; 2];
    for (height, child) in heights.iter_mut().zip(node.child) {
        if let Some(child) = child {
            *height = black_height_of(child)?;
        }
    }
    finish_black_height(node.colour, heights)
}

/// Like `black_height_of`, but also checks links and the red property, and counts nodes.
///
/// ## Safety
/// - `node` must be valid, and so must everything below it.
unsafe fn check_subtree<K>(node: NodePtr<K>, counted: &mut usize) -> Result<usize> {
    *counted += 1;
    let this = &*node.as_ptr();
    let mut heights = [0; 2];
    for (height, child) in heights.iter_mut().zip(this.child) {
        let Some(child) = child else {
            continue;
        };
        let child_ref = &*child.as_ptr();
        if child_ref.parent != Some(node) {
            return Err(Error::BrokenParentLink);
        }
        if this.colour == Colour::Red && child_ref.colour == Colour::Red {
            return Err(Error::RedChildOfRed);
        }
        *height = check_subtree(child, counted)?;
    }
    finish_black_height(this.colour, heights)
}

fn finish_black_height(colour: Colour, [left, right]: [usize; 2]) -> Result<usize> {
    if left != right {
        return Err(Error::BlackHeightMismatch { left, right });
    }
    Ok(left + usize::from(colour == Colour::Black))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::node::{link, Direction};
    use crate::test_util::init_logging;

    fn child<K: Ord>(set: &RbSet<K>, path: &[Direction]) -> NodePtr<K> {
        let mut node = set.root.unwrap();
        for &dir in path {
            node = unsafe { link(node, dir).unwrap() };
        }
        node
    }

    #[test]
    fn test_valid_trees() {
        assert_eq!(RbSet::<i32>::new().validate(), Ok(()));
        for len in 0..200 {
            let set = RbSet::from_iter(0..len);
            assert_eq!(set.validate(), Ok(()));
            assert!(set.black_height().is_ok());
        }
    }

    #[test]
    fn test_red_root() {
        init_logging();
        let set = RbSet::from([1, 2, 3]);
        unsafe { (*set.root.unwrap().as_ptr()).colour = Colour::Red };
        assert_eq!(set.validate(), Err(Error::RedRoot));
    }

    #[test]
    fn test_black_height_mismatch() {
        // 2 is black with two red children.
        let set = RbSet::from([1, 2, 3]);
        assert_eq!(set.black_height(), Ok(1));

        let left = child(&set, &[Direction::Left]);
        unsafe { (*left.as_ptr()).colour = Colour::Black };
        let err = Error::BlackHeightMismatch { left: 1, right: 0 };
        assert_eq!(set.black_height(), Err(err));
        assert_eq!(set.validate(), Err(err));
    }

    #[test]
    fn test_red_child_of_red() {
        // 2 black, 1 and 3 black, 4 red under 3.
        let set = RbSet::from([1, 2, 3, 4]);
        assert_eq!(set.validate(), Ok(()));

        let three = child(&set, &[Direction::Right]);
        unsafe { (*three.as_ptr()).colour = Colour::Red };
        assert_eq!(set.validate(), Err(Error::RedChildOfRed));
    }

    #[test]
    fn test_out_of_order() {
        let set = RbSet::from([1, 2, 3]);
        let left = child(&set, &[Direction::Left]);
        let right = child(&set, &[Direction::Right]);
        unsafe { core::mem::swap(&mut (*left.as_ptr()).key, &mut (*right.as_ptr()).key) };
        assert_eq!(set.validate(), Err(Error::OutOfOrder));
    }

    #[test]
    fn test_broken_parent_link() {
        let set = RbSet::from([1, 2, 3]);
        let right = child(&set, &[Direction::Right]);
        unsafe { (*right.as_ptr()).parent = Some(right) };
        assert_eq!(set.validate(), Err(Error::BrokenParentLink));
        unsafe { (*right.as_ptr()).parent = set.root };
        assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn test_len_mismatch() {
        let mut set = RbSet::from([1, 2, 3]);
        set.len += 1;
        assert_eq!(
            set.validate(),
            Err(Error::LenMismatch {
                counted: 3,
                recorded: 4
            })
        );
        set.len -= 1;
        assert_eq!(set.validate(), Ok(()));
    }
}
