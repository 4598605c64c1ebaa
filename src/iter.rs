use alloc::vec::Vec;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use crate::node::{link, Direction, Link, NodePtr, RbNode};

/// Push `next` and its chain of left children, so the smallest key ends up on top.
fn push_left_spine<K>(stack: &mut Vec<NodePtr<K>>, mut next: Link<K>) {
    while let Some(node) = next {
        stack.push(node);
        next = unsafe { link(node, Direction::Left) };
    }
}

/// A borrowing iterator over the keys of an `RbSet`, in ascending order.
pub struct Iter<'a, K: Ord> {
    stack: Vec<NodePtr<K>>,
    len: usize,
    _lifetime: PhantomData<&'a K>,
}

impl<K: Ord> Iter<'_, K> {
    pub(crate) fn new(root: Link<K>, len: usize) -> Self {
        let mut stack = Vec::new();
        push_left_spine(&mut stack, root);
        Iter {
            stack,
            len,
            _lifetime: PhantomData,
        }
    }
}

impl<'a, K: Ord + 'a> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.stack.pop()?;
        push_left_spine(&mut self.stack, unsafe { link(cur, Direction::Right) });

        self.len -= 1;

        unsafe { Some(&(*cur.as_ptr()).key) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K: Ord + 'a> ExactSizeIterator for Iter<'a, K> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K: Ord + 'a> FusedIterator for Iter<'a, K> {}

/// An owning iterator over the keys of an `RbSet`, in ascending order.
///
/// Nodes are freed as soon as their key is handed out.
pub struct IntoIter<K: Ord> {
    stack: Vec<NodePtr<K>>,
    len: usize,
}

impl<K: Ord> IntoIter<K> {
    /// Take ownership of a detached tree.
    pub(crate) fn new(root: Link<K>, len: usize) -> Self {
        let mut stack = Vec::new();
        push_left_spine(&mut stack, root);
        IntoIter { stack, len }
    }
}

impl<K: Ord> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.stack.pop()?;
        // The left subtree is already gone at this point, only the right one is still needed.
        push_left_spine(&mut self.stack, unsafe { link(cur, Direction::Right) });

        self.len -= 1;

        Some(unsafe { RbNode::free(cur) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K: Ord> ExactSizeIterator for IntoIter<K> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<K: Ord> FusedIterator for IntoIter<K> {}

impl<K: Ord> Drop for IntoIter<K> {
    fn drop(&mut self) {
        for _ in self {}
    }
}
