//! CRM accessor group.

use sonic_orchagent::acl::{AclBindPointType, AclStage};
use sonic_orchagent::crm::{CrmOrch, CrmResourceMap};
use sonic_orchagent::oid::RawSaiObjectId;

/// Accessors over the resource accounting of a [`CrmOrch`].
pub struct CrmOrchInternal;

impl CrmOrchInternal {
    pub fn get_resource_map(orch: &CrmOrch) -> CrmResourceMap {
        orch.inspect_resource_map().clone()
    }

    pub fn get_resource_map_ref(orch: &CrmOrch) -> &CrmResourceMap {
        orch.inspect_resource_map()
    }

    /// Counter key CrmOrch uses for ACL tables and groups at (stage, bind point).
    pub fn derive_acl_bind_key(
        orch: &CrmOrch,
        stage: AclStage,
        bind_point: AclBindPointType,
    ) -> String {
        orch.acl_key(stage, bind_point)
    }

    /// Counter key CrmOrch uses for ACL entries and counters of a table.
    pub fn derive_acl_table_key(orch: &CrmOrch, table_id: RawSaiObjectId) -> String {
        orch.acl_table_key(table_id)
    }

    /// Runs the availability refresh the polling timer normally triggers.
    ///
    /// Only `available` counters change. Nothing is written to COUNTERS_DB
    /// and no thresholds are checked.
    pub fn refresh_available_counters(orch: &mut CrmOrch) {
        orch.refresh_available_counters();
    }
}
