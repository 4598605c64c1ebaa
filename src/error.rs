use core::fmt;

/// Everything that can go wrong when querying or checking an `RbSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The operation needs at least one key, but the set is empty.
    Empty,
    /// The root node is red.
    RedRoot,
    /// A red node has a red child.
    RedChildOfRed,
    /// Two root-to-nil paths count a different number of black nodes.
    BlackHeightMismatch {
        /// Black height of the left subtree of the offending node.
        left: usize,
        /// Black height of the right subtree of the offending node.
        right: usize,
    },
    /// An in-order walk produced a key that is not strictly greater than its predecessor.
    OutOfOrder,
    /// A node's parent link does not point at the node that owns it.
    BrokenParentLink,
    /// The recorded length differs from the number of reachable nodes.
    LenMismatch {
        /// Nodes actually reachable from the root.
        counted: usize,
        /// The length the set reports.
        recorded: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Empty => f.write_str("the set is empty"),
            Error::RedRoot => f.write_str("the root node is red"),
            Error::RedChildOfRed => f.write_str("a red node has a red child"),
            Error::BlackHeightMismatch { left, right } => write!(
                f,
                "black height differs between subtrees (left {left}, right {right})"
            ),
            Error::OutOfOrder => f.write_str("keys are not in strictly ascending order"),
            Error::BrokenParentLink => f.write_str("a parent link does not match its owner"),
            Error::LenMismatch { counted, recorded } => write!(
                f,
                "set records {recorded} keys but {counted} nodes are reachable"
            ),
        }
    }
}

impl core::error::Error for Error {}

/// Shorthand for results carrying this crate's `Error`.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Error::Empty.to_string(), "the set is empty");
        assert_eq!(
            Error::BlackHeightMismatch { left: 2, right: 3 }.to_string(),
            "black height differs between subtrees (left 2, right 3)"
        );
        assert_eq!(
            Error::LenMismatch {
                counted: 4,
                recorded: 5
            }
            .to_string(),
            "set records 5 keys but 4 nodes are reachable"
        );
    }

    #[test]
    fn test_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(Error::RedRoot);
        assert_eq!(err.to_string(), "the root node is red");
    }
}
