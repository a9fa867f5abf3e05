//! CrmOrch - Capacity Resource Management orchestration for SONiC.
//!
//! This module tracks used and available counters for ASIC resources and
//! raises alerts when configurable thresholds are crossed.
//!
//! # Architecture
//!
//! ```text
//! CONFIG_DB:CRM
//!      │
//!      ▼
//!   CrmOrch ───> SAI Switch API (availability queries)
//!      │
//!      ├──> COUNTERS_DB (CRM:STATS, ACL_STATS, ACL_TABLE_STATS)
//!      ├──> Event system (threshold alerts)
//!      └──> Timer (periodic polling at 5-minute default)
//! ```
//!
//! # Counter keys
//!
//! - Global resources use a single `STATS` counter
//! - ACL tables and groups are counted per stage and bind point,
//!   `ACL_STATS:<STAGE>:<BIND_POINT>`
//! - ACL entries and counters are counted per table,
//!   `ACL_TABLE_STATS:0x<table oid>`

mod orch;
mod types;

pub use orch::{CrmOrch, CrmOrchCallbacks, CrmOrchConfig, CrmOrchError, CrmOrchStats};
pub use types::{
    CrmCounterMap, CrmResourceCounter, CrmResourceEntry, CrmResourceMap, CrmResourceType,
    CrmThresholdField, CrmThresholdType, ThresholdCheck, CRM_COUNTERS_TABLE_KEY,
    CRM_EXCEEDED_MSG_MAX, DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD, DEFAULT_POLLING_INTERVAL,
};
