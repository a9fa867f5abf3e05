//! sFlow accessor group.

use sonic_orchagent::sflow::{SflowOrch, SflowPortInfoMap, SflowRateSampleMap};

/// Accessors over the sampling state of a [`SflowOrch`].
pub struct SflowOrchInternal;

impl SflowOrchInternal {
    pub fn is_enabled(orch: &SflowOrch) -> bool {
        orch.is_enabled()
    }

    /// Snapshot of the sample rate to session map.
    pub fn get_sample_rate_map(orch: &SflowOrch) -> SflowRateSampleMap {
        orch.inspect_sample_rate_map().clone()
    }

    /// Snapshot of the port to sampling state map.
    pub fn get_port_info_map(orch: &SflowOrch) -> SflowPortInfoMap {
        orch.inspect_port_info_map().clone()
    }
}
