//! Contains [MenuError], the errors that can occur while building or running a trigger menu.
use std::fmt;

/// Which bit vector a [MenuError::BitVectorTooShort] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitsKind {
    /// Raw L1 decisions, input to the seed resolver
    L1Raw,
    /// Resolved L1 express bits, one per distinct seed expression
    L1Express,
    /// HLT path decisions
    Hlt,
}

impl fmt::Display for BitsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitsKind::L1Raw => write!(f, "L1"),
            BitsKind::L1Express => write!(f, "L1 express"),
            BitsKind::Hlt => write!(f, "HLT"),
        }
    }
}

/// Errors from building a menu, processing an event, or merging results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    /// Two paths in the menu share a name
    DuplicatePathName(Box<str>),
    /// A group refers to a path index that does not exist in the menu
    GroupPathIndexOutOfRange {
        /// Name of the group
        group: Box<str>,
        /// The offending index
        index: usize,
        /// Number of paths in the menu
        nr_paths: usize,
    },
    /// An event bit vector is narrower than what the menu configuration indexes into
    BitVectorTooShort {
        /// The bit vector in question
        kind: BitsKind,
        /// Minimum width required by the configuration
        required: usize,
        /// Width of the supplied vector
        got: usize,
    },
    /// A configured path is not in the list of HLT paths
    UnknownHltPath(Box<str>),
    /// A configured L1 seed is not in the L1 seed map
    UnknownL1Seed {
        /// Name of the path requesting the seed
        path: Box<str>,
        /// Name of the seed
        seed: Box<str>,
    },
    /// Attempted to merge results with a different structure
    MergeMismatch(Box<str>),
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuError::DuplicatePathName(name) => write!(f, "Duplicate path name: {name}"),
            MenuError::GroupPathIndexOutOfRange {
                group,
                index,
                nr_paths,
            } => write!(
                f,
                "Group {group} refers to path index {index} but the menu has {nr_paths} paths"
            ),
            MenuError::BitVectorTooShort {
                kind,
                required,
                got,
            } => write!(
                f,
                "{kind} bit vector has width {got} but the menu requires at least {required}"
            ),
            MenuError::UnknownHltPath(name) => {
                write!(f, "Path {name} not found in the HLT path list")
            }
            MenuError::UnknownL1Seed { path, seed } => {
                write!(f, "L1 seed {seed} of path {path} not found in the L1 seed map")
            }
            MenuError::MergeMismatch(reason) => write!(f, "Cannot merge results: {reason}"),
        }
    }
}

impl std::error::Error for MenuError {}

impl From<MenuError> for std::io::Error {
    fn from(e: MenuError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    }
}
