//! Common orchestration abstractions for SONiC.
//!
//! This crate holds the containers shared by orchestration modules in the
//! SONiC control plane:
//!
//! - [`Directory`]: process-wide registry through which orchs find each
//!   other, keyed by name or by type
//!
//! # Architecture
//!
//! ```text
//!   OrchDaemon
//!       │ set::<AclOrch>(..), set::<CrmOrch>(..)
//!       ▼
//!   Directory<Handle> ──get::<CrmOrch>()──> AclOrch
//! ```

mod directory;

pub use directory::{Directory, DirectoryError};
