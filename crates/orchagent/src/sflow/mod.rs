//! SflowOrch - sFlow packet sampling orchestration for SONiC.
//!
//! # Architecture
//!
//! ```text
//! APPL_DB:SFLOW_TABLE|global (admin_state)
//!      │
//!      ▼
//!   SflowOrch
//!      │
//!      ├──> SAI Samplepacket API (create sessions)
//!      └──> SAI Port API (enable/disable sampling)
//!
//! APPL_DB:SFLOW_SESSION_TABLE (per-port)
//!      │
//!      └──> SflowOrch (port configuration)
//! ```
//!
//! # Session Sharing
//!
//! Ports sampling at the same rate share a single SAI samplepacket session:
//! - When the first port at rate R is configured, a session is created
//! - Subsequent ports at rate R reuse the existing session
//! - When the last port using rate R is removed, the session is destroyed

mod orch;
mod types;

pub use orch::{SflowOrch, SflowOrchCallbacks, SflowOrchConfig, SflowOrchError, SflowOrchStats};
pub use types::{
    PortSflowInfo, SampleDirection, SflowConfig, SflowPortInfoMap, SflowRateSampleMap,
    SflowSession,
};
