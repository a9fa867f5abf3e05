//! SAI object identifiers.
//!
//! Orchs talk to the ASIC through SAI callbacks. When no callback is
//! installed (unit tests, dry runs) they fall back to virtual object ids
//! handed out by an [`ObjectIdAllocator`], encoded the way sairedis encodes
//! virtual ids: the object type in the upper 16 bits and a running index
//! below it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Raw SAI object ID value.
pub type RawSaiObjectId = u64;

/// The null object ID.
pub const SAI_NULL_OBJECT_ID: RawSaiObjectId = 0;

const OBJECT_TYPE_SHIFT: u32 = 48;
const INDEX_MASK: u64 = (1 << OBJECT_TYPE_SHIFT) - 1;

/// SAI object types used by the orchs in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SaiObjectType {
    Port,
    AclTable,
    AclEntry,
    AclCounter,
    Samplepacket,
}

impl SaiObjectType {
    /// Returns the numeric SAI object type value.
    pub fn value(&self) -> u64 {
        match self {
            Self::Port => 1,
            Self::AclTable => 7,
            Self::AclEntry => 8,
            Self::AclCounter => 9,
            Self::Samplepacket => 13,
        }
    }

    fn from_value(value: u64) -> Option<Self> {
        match value {
            1 => Some(Self::Port),
            7 => Some(Self::AclTable),
            8 => Some(Self::AclEntry),
            9 => Some(Self::AclCounter),
            13 => Some(Self::Samplepacket),
            _ => None,
        }
    }
}

impl fmt::Display for SaiObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Port => write!(f, "SAI_OBJECT_TYPE_PORT"),
            Self::AclTable => write!(f, "SAI_OBJECT_TYPE_ACL_TABLE"),
            Self::AclEntry => write!(f, "SAI_OBJECT_TYPE_ACL_ENTRY"),
            Self::AclCounter => write!(f, "SAI_OBJECT_TYPE_ACL_COUNTER"),
            Self::Samplepacket => write!(f, "SAI_OBJECT_TYPE_SAMPLEPACKET"),
        }
    }
}

/// Decodes the object type of a virtual object ID.
pub fn object_type_of(oid: RawSaiObjectId) -> Option<SaiObjectType> {
    SaiObjectType::from_value(oid >> OBJECT_TYPE_SHIFT)
}

/// Allocator of virtual SAI object IDs.
///
/// Indices start at 1 so an allocated ID is never `SAI_NULL_OBJECT_ID`.
#[derive(Debug)]
pub struct ObjectIdAllocator {
    next_index: AtomicU64,
}

impl Default for ObjectIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectIdAllocator {
    /// Creates a new allocator.
    pub fn new() -> Self {
        Self {
            next_index: AtomicU64::new(1),
        }
    }

    /// Allocates a new object ID of the given type.
    pub fn allocate(&self, object_type: SaiObjectType) -> RawSaiObjectId {
        let index = self.next_index.fetch_add(1, Ordering::Relaxed) & INDEX_MASK;
        (object_type.value() << OBJECT_TYPE_SHIFT) | index
    }
}
