//! TestPortal - inspection accessors for orchagent internals
//!
//! This crate is the `TestPortal` namespace. Each accessor group is a unit
//! struct with associated functions over one orch type:
//!
//! - [`AclRuleInternal`]: rule OID, match and action tables
//! - [`AclOrchInternal`]: the ACL table registry
//! - [`CrmOrchInternal`]: the CRM resource map, counter keys and the
//!   available counter refresh
//! - [`SflowOrchInternal`]: global status, rate and port maps
//! - [`DirectoryInternal`]: reset and emptiness of a
//!   [`Directory`](sonic_orch_common::Directory)
//!
//! Accessors return owned snapshots by default. The `*_ref` variants borrow
//! the inspected value, so the borrow has to end before the orch is mutated
//! again.
//!
//! The groups forward to inspection methods that orchagent only compiles
//! with its `test-portal` feature, which this crate enables. Nothing here
//! belongs on a production path.
//!
//! ```
//! use sonic_orch_portal::DirectoryInternal;
//! use sonic_orch_common::Directory;
//!
//! let mut dir: Directory<u32> = Directory::new();
//! dir.insert("answer", 42);
//! DirectoryInternal::clear(&mut dir);
//! assert!(DirectoryInternal::is_empty(&dir));
//! ```

mod acl;
mod crm;
mod directory;
mod sflow;

pub use acl::{AclOrchInternal, AclRuleInternal};
pub use crm::CrmOrchInternal;
pub use directory::DirectoryInternal;
pub use sflow::SflowOrchInternal;
