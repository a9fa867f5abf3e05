//! CrmOrch implementation.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::acl::{AclBindPointType, AclStage};
use crate::oid::RawSaiObjectId;

use super::types::{
    crm_acl_key, crm_acl_table_key, CrmResourceCounter, CrmResourceEntry, CrmResourceMap,
    CrmResourceType, CrmThresholdField, CrmThresholdType, ThresholdCheck, CRM_COUNTERS_TABLE_KEY,
    DEFAULT_POLLING_INTERVAL,
};

/// CRM orchestrator error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrmOrchError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(CrmResourceType),
    #[error("Counter not found: {0}")]
    CounterNotFound(String),
    #[error("Counter underflow: {0}")]
    Underflow(String),
    #[error("{0} cannot be counted this way")]
    WrongResourceKind(CrmResourceType),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Callbacks for CrmOrch to reach SAI, COUNTERS_DB and the event channel.
pub trait CrmOrchCallbacks: Send + Sync {
    /// Publishes a threshold event.
    fn publish_threshold_event(
        &self,
        resource: &str,
        counter_key: &str,
        used: u32,
        available: u32,
        threshold: u32,
        exceeded: bool,
    );

    /// Queries the number of available entries of a global resource.
    fn query_resource_availability(&self, resource_type: CrmResourceType) -> Option<u32>;

    /// Queries available ACL tables or groups at one (stage, bind point).
    fn query_acl_availability(
        &self,
        resource_type: CrmResourceType,
        stage: AclStage,
        bind_point: AclBindPointType,
    ) -> Option<u32>;

    /// Queries available ACL entries or counters inside one ACL table.
    fn query_acl_table_availability(
        &self,
        resource_type: CrmResourceType,
        table_id: RawSaiObjectId,
    ) -> Option<u32>;

    /// Writes counters to COUNTERS_DB.
    fn write_counters(&self, resource: &str, key: &str, used: u32, available: u32);
}

/// CRM orchestrator configuration.
#[derive(Debug, Clone)]
pub struct CrmOrchConfig {
    /// Polling interval for resource monitoring.
    pub polling_interval: Duration,
}

impl Default for CrmOrchConfig {
    fn default() -> Self {
        Self {
            polling_interval: Duration::from_secs(DEFAULT_POLLING_INTERVAL),
        }
    }
}

impl CrmOrchConfig {
    pub fn with_polling_interval(interval: Duration) -> Self {
        Self {
            polling_interval: interval,
        }
    }
}

/// CRM orchestrator statistics.
#[derive(Debug, Clone, Default)]
pub struct CrmOrchStats {
    pub timer_expirations: u64,
    pub threshold_events: u64,
    pub config_updates: u64,
    pub increments: u64,
    pub decrements: u64,
}

/// CRM orchestrator for capacity resource management.
///
/// `used` counters are owned by the increment/decrement calls made by other
/// orchs. `available` counters are refreshed from SAI on every timer tick.
pub struct CrmOrch {
    config: CrmOrchConfig,
    resources: CrmResourceMap,
    callbacks: Option<Arc<dyn CrmOrchCallbacks>>,
    stats: CrmOrchStats,
}

impl std::fmt::Debug for CrmOrch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmOrch")
            .field("config", &self.config)
            .field("resources_count", &self.resources.len())
            .field("has_callbacks", &self.callbacks.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}

impl CrmOrch {
    /// Creates a new CrmOrch tracking every resource type.
    pub fn new(config: CrmOrchConfig) -> Self {
        let resources = CrmResourceType::ALL
            .iter()
            .map(|&res_type| (res_type, CrmResourceEntry::new(res_type)))
            .collect();

        Self {
            config,
            resources,
            callbacks: None,
            stats: CrmOrchStats::default(),
        }
    }

    pub fn set_callbacks(&mut self, callbacks: Arc<dyn CrmOrchCallbacks>) {
        self.callbacks = Some(callbacks);
    }

    pub fn config(&self) -> &CrmOrchConfig {
        &self.config
    }

    pub fn polling_interval(&self) -> Duration {
        self.config.polling_interval
    }

    pub fn set_polling_interval(&mut self, interval: Duration) {
        self.config.polling_interval = interval;
        self.stats.config_updates += 1;
    }

    pub fn stats(&self) -> &CrmOrchStats {
        &self.stats
    }

    pub fn get_resource(&self, resource_type: CrmResourceType) -> Option<&CrmResourceEntry> {
        self.resources.get(&resource_type)
    }

    fn entry_mut(
        &mut self,
        resource_type: CrmResourceType,
    ) -> Result<&mut CrmResourceEntry, CrmOrchError> {
        self.resources
            .get_mut(&resource_type)
            .ok_or(CrmOrchError::ResourceNotFound(resource_type))
    }

    fn decrement_counter(
        &mut self,
        resource_type: CrmResourceType,
        key: &str,
    ) -> Result<u32, CrmOrchError> {
        let counter = self
            .entry_mut(resource_type)?
            .get_counter_mut(key)
            .ok_or_else(|| CrmOrchError::CounterNotFound(key.to_string()))?;

        let used = counter.decrement_used().ok_or_else(|| {
            error!("CRM {} counter {} is already 0", resource_type, key);
            CrmOrchError::Underflow(format!("{} {}", resource_type, key))
        })?;
        self.stats.decrements += 1;
        Ok(used)
    }

    // ========== Counter Increment/Decrement Operations ==========

    /// Increments the used counter for a global resource.
    pub fn increment_used(&mut self, resource_type: CrmResourceType) -> Result<u32, CrmOrchError> {
        if resource_type.is_acl_resource() {
            return Err(CrmOrchError::WrongResourceKind(resource_type));
        }
        let used = self
            .entry_mut(resource_type)?
            .get_or_create_counter(CRM_COUNTERS_TABLE_KEY)
            .increment_used();
        self.stats.increments += 1;
        Ok(used)
    }

    /// Decrements the used counter for a global resource.
    pub fn decrement_used(&mut self, resource_type: CrmResourceType) -> Result<u32, CrmOrchError> {
        if resource_type.is_acl_resource() {
            return Err(CrmOrchError::WrongResourceKind(resource_type));
        }
        self.decrement_counter(resource_type, CRM_COUNTERS_TABLE_KEY)
    }

    /// Increments the used counter for ACL tables or groups at (stage, bind point).
    pub fn increment_acl_used(
        &mut self,
        resource_type: CrmResourceType,
        stage: AclStage,
        bind_point: AclBindPointType,
    ) -> Result<u32, CrmOrchError> {
        if !resource_type.is_bind_point_resource() {
            return Err(CrmOrchError::WrongResourceKind(resource_type));
        }

        let key = crm_acl_key(stage, bind_point);
        let used = self
            .entry_mut(resource_type)?
            .get_or_create_counter(&key)
            .increment_used();
        self.stats.increments += 1;
        Ok(used)
    }

    /// Decrements the used counter for ACL tables or groups at (stage, bind point).
    ///
    /// For ACL tables, the per-table entry and counter statistics of
    /// `table_id` are dropped as well.
    pub fn decrement_acl_used(
        &mut self,
        resource_type: CrmResourceType,
        stage: AclStage,
        bind_point: AclBindPointType,
        table_id: RawSaiObjectId,
    ) -> Result<u32, CrmOrchError> {
        if !resource_type.is_bind_point_resource() {
            return Err(CrmOrchError::WrongResourceKind(resource_type));
        }

        let used = self.decrement_counter(resource_type, &crm_acl_key(stage, bind_point))?;

        if resource_type == CrmResourceType::AclTable {
            let table_key = crm_acl_table_key(table_id);
            for per_table in [CrmResourceType::AclEntry, CrmResourceType::AclCounter] {
                if let Some(entry) = self.resources.get_mut(&per_table) {
                    entry.remove_counter(&table_key);
                }
            }
        }

        Ok(used)
    }

    /// Increments the used counter for ACL entries or counters in a table.
    pub fn increment_acl_table_used(
        &mut self,
        resource_type: CrmResourceType,
        table_id: RawSaiObjectId,
    ) -> Result<u32, CrmOrchError> {
        if !resource_type.is_per_table_resource() {
            return Err(CrmOrchError::WrongResourceKind(resource_type));
        }

        let key = crm_acl_table_key(table_id);
        let counter = self.entry_mut(resource_type)?.get_or_create_counter(&key);
        counter.id = table_id;
        let used = counter.increment_used();
        self.stats.increments += 1;
        Ok(used)
    }

    /// Decrements the used counter for ACL entries or counters in a table.
    pub fn decrement_acl_table_used(
        &mut self,
        resource_type: CrmResourceType,
        table_id: RawSaiObjectId,
    ) -> Result<u32, CrmOrchError> {
        if !resource_type.is_per_table_resource() {
            return Err(CrmOrchError::WrongResourceKind(resource_type));
        }
        self.decrement_counter(resource_type, &crm_acl_table_key(table_id))
    }

    // ========== Configuration Operations ==========

    pub fn set_threshold_type(
        &mut self,
        resource_type: CrmResourceType,
        threshold_type: CrmThresholdType,
    ) -> Result<(), CrmOrchError> {
        self.entry_mut(resource_type)?.threshold_type = threshold_type;
        self.stats.config_updates += 1;
        Ok(())
    }

    pub fn set_low_threshold(
        &mut self,
        resource_type: CrmResourceType,
        value: u32,
    ) -> Result<(), CrmOrchError> {
        self.entry_mut(resource_type)?.low_threshold = value;
        self.stats.config_updates += 1;
        Ok(())
    }

    pub fn set_high_threshold(
        &mut self,
        resource_type: CrmResourceType,
        value: u32,
    ) -> Result<(), CrmOrchError> {
        self.entry_mut(resource_type)?.high_threshold = value;
        self.stats.config_updates += 1;
        Ok(())
    }

    /// Handles one field of the CONFIG_DB `CRM|Config` entry.
    pub fn handle_config_field(&mut self, field: &str, value: &str) -> Result<(), CrmOrchError> {
        if field == "polling_interval" {
            let interval: u64 = value
                .parse()
                .map_err(|_| CrmOrchError::ParseError(format!("Invalid interval: {}", value)))?;
            info!("CRM polling interval set to {}s", interval);
            self.set_polling_interval(Duration::from_secs(interval));
            return Ok(());
        }

        let (resource_name, field_type) = CrmThresholdField::parse_field(field)
            .ok_or_else(|| CrmOrchError::ParseError(format!("Unknown field: {}", field)))?;

        let resource_type: CrmResourceType =
            resource_name.parse().map_err(CrmOrchError::ParseError)?;

        match field_type {
            CrmThresholdField::Type => {
                let threshold_type: CrmThresholdType =
                    value.parse().map_err(CrmOrchError::ParseError)?;
                self.set_threshold_type(resource_type, threshold_type)
            }
            CrmThresholdField::Low | CrmThresholdField::High => {
                let threshold: u32 = value
                    .parse()
                    .map_err(|_| CrmOrchError::ParseError(format!("Invalid value: {}", value)))?;
                if field_type == CrmThresholdField::Low {
                    self.set_low_threshold(resource_type, threshold)
                } else {
                    self.set_high_threshold(resource_type, threshold)
                }
            }
        }
    }

    // ========== Timer/Polling Operations ==========

    /// Handles timer expiration: refreshes available counters, writes
    /// COUNTERS_DB and checks thresholds.
    pub fn handle_timer_expiration(&mut self) {
        self.stats.timer_expirations += 1;
        self.get_resource_available_counters();
        self.update_counters_table();
        self.check_thresholds();
    }

    /// Queries SAI for resource availability and updates `available`.
    ///
    /// Global resources are queried once, ACL tables and groups for every
    /// (stage, bind point), ACL entries and counters for every tracked table.
    /// Unanswered queries leave the previous value in place.
    fn get_resource_available_counters(&mut self) {
        let callbacks = match &self.callbacks {
            Some(cb) => Arc::clone(cb),
            None => return,
        };

        for (res_type, entry) in self.resources.iter_mut() {
            let res_type = *res_type;

            if res_type.is_bind_point_resource() {
                for stage in AclStage::ALL {
                    for bind_point in AclBindPointType::ALL {
                        if let Some(available) =
                            callbacks.query_acl_availability(res_type, stage, bind_point)
                        {
                            entry
                                .get_or_create_counter(&crm_acl_key(stage, bind_point))
                                .available = available;
                        }
                    }
                }
            } else if res_type.is_per_table_resource() {
                for counter in entry.counters.values_mut() {
                    if let Some(available) =
                        callbacks.query_acl_table_availability(res_type, counter.id)
                    {
                        counter.available = available;
                    }
                }
            } else if let Some(available) = callbacks.query_resource_availability(res_type) {
                entry.get_or_create_counter(CRM_COUNTERS_TABLE_KEY).available = available;
            }
        }

        debug!("CRM available counters refreshed");
    }

    /// Writes every counter to COUNTERS_DB.
    fn update_counters_table(&self) {
        let callbacks = match &self.callbacks {
            Some(cb) => cb,
            None => return,
        };

        for (res_type, entry) in &self.resources {
            for (key, counter) in &entry.counters {
                callbacks.write_counters(res_type.name(), key, counter.used, counter.available);
            }
        }
    }

    /// Checks thresholds and publishes events for any violations.
    fn check_thresholds(&mut self) {
        let callbacks = match &self.callbacks {
            Some(cb) => Arc::clone(cb),
            None => return,
        };

        for (res_type, entry) in &mut self.resources {
            let threshold_type = entry.threshold_type;
            let high = entry.high_threshold;
            let low = entry.low_threshold;

            for (key, counter) in &mut entry.counters {
                if counter.used == 0 && counter.available == 0 {
                    continue;
                }

                let (threshold, exceeded) = match counter.check_threshold(threshold_type, high, low)
                {
                    ThresholdCheck::Exceeded {
                        utilization,
                        threshold,
                    } => {
                        warn!(
                            "{} THRESHOLD_EXCEEDED for {} {}% Used count {} free count {}",
                            res_type, key, utilization, counter.used, counter.available
                        );
                        (threshold, true)
                    }
                    ThresholdCheck::Recovered {
                        utilization,
                        threshold,
                    } => {
                        info!(
                            "{} THRESHOLD_CLEAR for {} {}% Used count {} free count {}",
                            res_type, key, utilization, counter.used, counter.available
                        );
                        (threshold, false)
                    }
                    ThresholdCheck::Normal => continue,
                };

                self.stats.threshold_events += 1;
                callbacks.publish_threshold_event(
                    res_type.name(),
                    key,
                    counter.used,
                    counter.available,
                    threshold,
                    exceeded,
                );
            }
        }
    }

    /// Returns the used counter of a global resource.
    pub fn get_used(&self, resource_type: CrmResourceType) -> Option<u32> {
        self.global_counter(resource_type).map(|c| c.used)
    }

    /// Returns the available counter of a global resource.
    pub fn get_available(&self, resource_type: CrmResourceType) -> Option<u32> {
        self.global_counter(resource_type).map(|c| c.available)
    }

    fn global_counter(&self, resource_type: CrmResourceType) -> Option<&CrmResourceCounter> {
        self.resources
            .get(&resource_type)
            .and_then(|entry| entry.get_counter(CRM_COUNTERS_TABLE_KEY))
    }

    /// Returns the counter of ACL tables or groups at (stage, bind point).
    pub fn get_acl_counter(
        &self,
        resource_type: CrmResourceType,
        stage: AclStage,
        bind_point: AclBindPointType,
    ) -> Option<&CrmResourceCounter> {
        self.resources
            .get(&resource_type)
            .and_then(|entry| entry.get_counter(&crm_acl_key(stage, bind_point)))
    }
}

// ============ Testing Facade ============

#[cfg(any(test, feature = "test-portal"))]
impl CrmOrch {
    /// The full resource map.
    pub fn inspect_resource_map(&self) -> &CrmResourceMap {
        &self.resources
    }

    /// Counter key used for ACL tables/groups at (stage, bind point).
    pub fn acl_key(&self, stage: AclStage, bind_point: AclBindPointType) -> String {
        crm_acl_key(stage, bind_point)
    }

    /// Counter key used for ACL entries/counters of a table.
    pub fn acl_table_key(&self, table_id: RawSaiObjectId) -> String {
        crm_acl_table_key(table_id)
    }

    /// Refreshes `available` counters from SAI without writing COUNTERS_DB
    /// or checking thresholds.
    pub fn refresh_available_counters(&mut self) {
        self.get_resource_available_counters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct TestCallbacks {
        global: HashMap<CrmResourceType, u32>,
        acl: HashMap<(CrmResourceType, AclStage, AclBindPointType), u32>,
        per_table: HashMap<(CrmResourceType, RawSaiObjectId), u32>,
        events: Mutex<Vec<(String, String, bool)>>,
        writes: Mutex<Vec<(String, String, u32, u32)>>,
    }

    impl CrmOrchCallbacks for TestCallbacks {
        fn publish_threshold_event(
            &self,
            resource: &str,
            counter_key: &str,
            _used: u32,
            _available: u32,
            _threshold: u32,
            exceeded: bool,
        ) {
            self.events.lock().unwrap().push((
                resource.to_string(),
                counter_key.to_string(),
                exceeded,
            ));
        }

        fn query_resource_availability(&self, resource_type: CrmResourceType) -> Option<u32> {
            self.global.get(&resource_type).copied()
        }

        fn query_acl_availability(
            &self,
            resource_type: CrmResourceType,
            stage: AclStage,
            bind_point: AclBindPointType,
        ) -> Option<u32> {
            self.acl.get(&(resource_type, stage, bind_point)).copied()
        }

        fn query_acl_table_availability(
            &self,
            resource_type: CrmResourceType,
            table_id: RawSaiObjectId,
        ) -> Option<u32> {
            self.per_table.get(&(resource_type, table_id)).copied()
        }

        fn write_counters(&self, resource: &str, key: &str, used: u32, available: u32) {
            self.writes.lock().unwrap().push((
                resource.to_string(),
                key.to_string(),
                used,
                available,
            ));
        }
    }

    #[test]
    fn test_crm_orch_new() {
        let orch = CrmOrch::new(CrmOrchConfig::default());
        assert_eq!(
            orch.polling_interval(),
            Duration::from_secs(DEFAULT_POLLING_INTERVAL)
        );
        for res_type in CrmResourceType::ALL {
            assert!(orch.get_resource(res_type).is_some());
        }
        assert_eq!(orch.inspect_resource_map().len(), CrmResourceType::ALL.len());
    }

    #[test]
    fn test_increment_decrement_global() {
        let mut orch = CrmOrch::new(CrmOrchConfig::default());

        assert_eq!(orch.increment_used(CrmResourceType::Ipv4Route), Ok(1));
        assert_eq!(orch.increment_used(CrmResourceType::Ipv4Route), Ok(2));
        assert_eq!(orch.decrement_used(CrmResourceType::Ipv4Route), Ok(1));

        assert_eq!(orch.stats().increments, 2);
        assert_eq!(orch.stats().decrements, 1);
    }

    #[test]
    fn test_decrement_underflow() {
        let mut orch = CrmOrch::new(CrmOrchConfig::default());
        assert!(matches!(
            orch.decrement_used(CrmResourceType::Ipv4Route),
            Err(CrmOrchError::Underflow(_))
        ));
        assert_eq!(orch.get_used(CrmResourceType::Ipv4Route), Some(0));
        assert_eq!(orch.stats().decrements, 0);
    }

    #[test]
    fn test_acl_increment_decrement() {
        let mut orch = CrmOrch::new(CrmOrchConfig::default());

        let used = orch
            .increment_acl_used(
                CrmResourceType::AclTable,
                AclStage::Ingress,
                AclBindPointType::Port,
            )
            .unwrap();
        assert_eq!(used, 1);
        assert!(orch
            .inspect_resource_map()
            .get(&CrmResourceType::AclTable)
            .unwrap()
            .counters
            .contains_key("ACL_STATS:INGRESS:PORT"));

        let used = orch
            .decrement_acl_used(
                CrmResourceType::AclTable,
                AclStage::Ingress,
                AclBindPointType::Port,
                0x7000000000001,
            )
            .unwrap();
        assert_eq!(used, 0);
    }

    #[test]
    fn test_table_removal_drops_per_table_counters() {
        let mut orch = CrmOrch::new(CrmOrchConfig::default());
        let table_id = 0x7000000000001;

        orch.increment_acl_used(
            CrmResourceType::AclTable,
            AclStage::Ingress,
            AclBindPointType::Lag,
        )
        .unwrap();
        orch.increment_acl_table_used(CrmResourceType::AclEntry, table_id)
            .unwrap();
        orch.increment_acl_table_used(CrmResourceType::AclCounter, table_id)
            .unwrap();

        let key = orch.acl_table_key(table_id);
        let entries = orch.get_resource(CrmResourceType::AclEntry).unwrap();
        assert_eq!(entries.get_counter(&key).map(|c| c.id), Some(table_id));

        orch.decrement_acl_used(
            CrmResourceType::AclTable,
            AclStage::Ingress,
            AclBindPointType::Lag,
            table_id,
        )
        .unwrap();

        for res in [CrmResourceType::AclEntry, CrmResourceType::AclCounter] {
            assert!(orch.get_resource(res).unwrap().get_counter(&key).is_none());
        }
    }

    #[test]
    fn test_wrong_resource_kind() {
        let mut orch = CrmOrch::new(CrmOrchConfig::default());

        assert_eq!(
            orch.increment_acl_used(
                CrmResourceType::Ipv4Route,
                AclStage::Ingress,
                AclBindPointType::Port
            ),
            Err(CrmOrchError::WrongResourceKind(CrmResourceType::Ipv4Route))
        );
        assert!(orch
            .increment_acl_table_used(CrmResourceType::AclTable, 0x1234)
            .is_err());
        assert!(orch.increment_used(CrmResourceType::AclEntry).is_err());
    }

    #[test]
    fn test_handle_config_field() {
        let mut orch = CrmOrch::new(CrmOrchConfig::default());

        orch.handle_config_field("polling_interval", "60").unwrap();
        assert_eq!(orch.polling_interval(), Duration::from_secs(60));

        orch.handle_config_field("ipv4_route_threshold_type", "used")
            .unwrap();
        orch.handle_config_field("ipv4_route_low_threshold", "50")
            .unwrap();
        orch.handle_config_field("ipv4_route_high_threshold", "95")
            .unwrap();

        let entry = orch.get_resource(CrmResourceType::Ipv4Route).unwrap();
        assert_eq!(entry.threshold_type, CrmThresholdType::Used);
        assert_eq!(entry.low_threshold, 50);
        assert_eq!(entry.high_threshold, 95);
        assert_eq!(orch.stats().config_updates, 4);

        assert!(orch.handle_config_field("bogus_low_threshold", "1").is_err());
        assert!(orch.handle_config_field("acl_entry_high_threshold", "x").is_err());
        assert!(orch.handle_config_field("polling", "1").is_err());
    }

    #[test]
    fn test_refresh_writes_available_only() {
        let mut orch = CrmOrch::new(CrmOrchConfig::default());
        let table_id = 0x7000000000001;
        let mut cb = TestCallbacks::default();
        cb.global.insert(CrmResourceType::Ipv4Route, 1000);
        cb.acl.insert(
            (CrmResourceType::AclTable, AclStage::Egress, AclBindPointType::Vlan),
            5,
        );
        cb.per_table.insert((CrmResourceType::AclEntry, table_id), 200);
        orch.set_callbacks(Arc::new(cb));

        orch.increment_used(CrmResourceType::Ipv4Route).unwrap();
        orch.increment_acl_table_used(CrmResourceType::AclEntry, table_id)
            .unwrap();

        orch.refresh_available_counters();

        assert_eq!(orch.get_used(CrmResourceType::Ipv4Route), Some(1));
        assert_eq!(orch.get_available(CrmResourceType::Ipv4Route), Some(1000));
        let vlan = orch
            .get_acl_counter(
                CrmResourceType::AclTable,
                AclStage::Egress,
                AclBindPointType::Vlan,
            )
            .unwrap();
        assert_eq!((vlan.used, vlan.available), (0, 5));
        let entry = orch
            .get_resource(CrmResourceType::AclEntry)
            .unwrap()
            .get_counter(&orch.acl_table_key(table_id))
            .unwrap();
        assert_eq!((entry.used, entry.available), (1, 200));
        assert_eq!(orch.get_available(CrmResourceType::Ipv6Route), Some(0));
    }

    #[test]
    fn test_refresh_without_callbacks_is_noop() {
        let mut orch = CrmOrch::new(CrmOrchConfig::default());
        let before = orch.inspect_resource_map().clone();
        orch.refresh_available_counters();
        assert_eq!(orch.inspect_resource_map(), &before);
    }

    #[test]
    fn test_timer_publishes_events() {
        let mut orch = CrmOrch::new(CrmOrchConfig::default());
        let mut cb = TestCallbacks::default();
        cb.global.insert(CrmResourceType::FdbEntry, 1);
        let cb = Arc::new(cb);
        orch.set_callbacks(cb.clone());

        for _ in 0..9 {
            orch.increment_used(CrmResourceType::FdbEntry).unwrap();
        }
        orch.handle_timer_expiration();

        assert_eq!(
            *cb.events.lock().unwrap(),
            vec![("fdb_entry".to_string(), "STATS".to_string(), true)]
        );
        assert!(cb
            .writes
            .lock()
            .unwrap()
            .contains(&("fdb_entry".to_string(), "STATS".to_string(), 9, 1)));
        assert_eq!(orch.stats().threshold_events, 1);
        assert_eq!(orch.stats().timer_expirations, 1);
    }

    #[test]
    fn test_acl_key_facade() {
        let orch = CrmOrch::new(CrmOrchConfig::default());
        assert_eq!(
            orch.acl_key(AclStage::Ingress, AclBindPointType::Switch),
            "ACL_STATS:INGRESS:SWITCH"
        );
        assert_eq!(orch.acl_table_key(0xabc), "ACL_TABLE_STATS:0xabc");
    }
}
