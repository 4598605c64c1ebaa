//! This crate implements an ordered set on top of a Red-Black tree.
//!
//! Keys only need to implement [`Ord`]. Lookups, insertions and removals all take
//! `O(log n)` time in the worst case, since the colouring rules keep the height of the tree
//! below `2 * log2(n + 1)`:
//!
//! 1. Every node is either red or black.
//! 2. The root is black.
//! 3. Missing children count as black leaves.
//! 4. A red node only has black children.
//! 5. Every path from a node down to a missing child passes the same number of black nodes.
//!
//! ```rust
//! use rbset::RbSet;
//!
//! let mut set = RbSet::new();
//! for key in [5, 3, 8, 1, 4] {
//!     set.insert(key);
//! }
//!
//! assert!(set.contains(&4));
//! assert!(set.remove(&3));
//! assert_eq!(set.to_vec(), vec![1, 4, 5, 8]);
//! assert_eq!(set.min_key(), Ok(&1));
//! assert!(set.validate().is_ok());
//! ```
//!
//! The set is meant for single threaded use. Structural steps are reported through the `log`
//! facade at trace level.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

extern crate alloc;

mod dump;
mod error;
mod iter;
mod node;
mod set;
mod validate;

pub use dump::{InOrder, PreOrder};
pub use error::{Error, Result};
pub use iter::{IntoIter, Iter};
pub use set::RbSet;

#[cfg(test)]
pub(crate) mod test_util {
    use simplelog::{Config, LevelFilter, TestLogger};

    /// Route log output into the test harness. Later calls are no-ops.
    pub(crate) fn init_logging() {
        let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    }
}
