//! SONiC Orchagent - ACL, CRM and sFlow orchestration
//!
//! Each orch owns its internal state and reaches SAI, the databases and its
//! peers through callbacks installed by the daemon that hosts it.
//!
//! ```text
//! [CONFIG_DB/APPL_DB] ──> [AclOrch] ──> SAI ACL API
//!                             │
//!                             └──> [CrmOrch] ──> COUNTERS_DB / threshold events
//!
//! [APPL_DB:SFLOW_*] ──> [SflowOrch] ──> SAI Samplepacket/Port API
//! ```
//!
//! # Feature Flags
//!
//! - `full` (default): all orchs
//! - `mod-acl`, `mod-crm`, `mod-sflow`: individual orchs. `mod-crm` pulls in
//!   `mod-acl` for the ACL stage and bind point types.
//! - `test-portal`: compiles the read-only inspection methods that
//!   `sonic-orch-portal` uses. Never enabled in production builds.

#[cfg(feature = "mod-acl")]
pub mod acl;
#[cfg(feature = "mod-crm")]
pub mod crm;
pub mod oid;
#[cfg(feature = "mod-sflow")]
pub mod sflow;
