//! AclOrch - Access Control List orchestration for SONiC.
//!
//! This module manages ACL tables and rules, including:
//! - ACL table creation with configurable match fields and actions
//! - ACL rule management with match conditions and actions
//! - Port binding for ingress/egress ACL enforcement
//! - CRM usage reporting through callbacks
//!
//! # Architecture
//!
//! ```text
//! CONFIG_DB:ACL_TABLE / ACL_RULE
//!        │
//!        ▼
//!    AclOrch ──────> SAI ACL API (callbacks)
//!        │
//!        └──> CrmOrch (ACL_TABLE / ACL_ENTRY / ACL_COUNTER usage)
//! ```
//!
//! # Key Components
//!
//! - [`AclTable`]: An ACL table with match/action capabilities
//! - [`AclRule`]: A rule within a table with match conditions and actions
//! - [`AclOrch`]: Orchestrator owning every table, keyed by SAI table OID
//! - [`AclTableType`]: Table capabilities (matches, actions, bind points)

mod orch;
mod rule;
mod table;
mod table_type;
mod types;

pub use orch::{AclOrch, AclOrchCallbacks, AclOrchConfig, AclOrchError, AclOrchStats, AclTableSpec};
pub use rule::{
    AclActionMap, AclActionValue, AclMatchMap, AclMatchValue, AclRedirectTarget, AclRule,
    AclRuleAction, AclRuleMatch, AclRuleType,
};
pub use table::{AclTable, AclTableConfig, PortBinding};
pub use table_type::{AclTableType, AclTableTypeBuilder};
pub use types::{
    table_type_names, AclActionType, AclBindPointType, AclMatchField, AclPacketAction, AclPriority,
    AclRuleId, AclStage, AclTableId, MetaDataValue,
};
