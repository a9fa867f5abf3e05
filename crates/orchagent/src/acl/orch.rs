//! AclOrch - Main ACL orchestrator.
//!
//! The AclOrch manages all ACL tables and rules in the switch. It handles:
//! - Table creation and deletion
//! - Rule creation, update, and deletion
//! - Port binding and unbinding
//! - CRM usage reporting for tables, entries and counters
//!
//! Tables are keyed by their SAI table OID. A name index maps CONFIG_DB
//! table names to that OID.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::oid::{ObjectIdAllocator, RawSaiObjectId, SaiObjectType, SAI_NULL_OBJECT_ID};

use super::rule::AclRule;
use super::table::{AclTable, AclTableConfig};
use super::table_type::{builtin_table_types, AclTableType};
use super::types::{AclBindPointType, AclPriority, AclStage, AclTableId, MetaDataValue};

/// Error type for AclOrch operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclOrchError {
    #[error("ACL table not found: {0}")]
    TableNotFound(String),
    #[error("ACL rule {1} not found in table {0}")]
    RuleNotFound(String, String),
    #[error("ACL table already exists: {0}")]
    TableAlreadyExists(String),
    #[error("ACL rule {1} already exists in table {0}")]
    RuleAlreadyExists(String, String),
    #[error("ACL table type not found: {0}")]
    TableTypeNotFound(String),
    #[error("ACL table {0} still has rules")]
    TableNotEmpty(String),
    #[error("Invalid ACL config: {0}")]
    InvalidConfig(String),
    #[error("SAI error: {0}")]
    SaiError(String),
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type alias for AclOrch operations.
pub type Result<T> = std::result::Result<T, AclOrchError>;

type SaiResult<T> = std::result::Result<T, String>;
type SaiCreateTable = Arc<dyn Fn(&AclTableSpec) -> SaiResult<RawSaiObjectId> + Send + Sync>;
type SaiCreateEntry =
    Arc<dyn Fn(RawSaiObjectId, &AclRule) -> SaiResult<RawSaiObjectId> + Send + Sync>;
type SaiUpdateEntry = Arc<dyn Fn(RawSaiObjectId, &AclRule) -> SaiResult<()> + Send + Sync>;
type SaiRemove = Arc<dyn Fn(RawSaiObjectId) -> SaiResult<()> + Send + Sync>;

/// Callbacks for AclOrch to reach SAI, PortsOrch and CrmOrch.
///
/// Missing SAI callbacks fall back to virtual object IDs. Missing CRM
/// callbacks mean usage is not reported.
#[derive(Clone, Default)]
pub struct AclOrchCallbacks {
    /// Creates the SAI ACL table.
    pub create_acl_table: Option<SaiCreateTable>,
    /// Removes the SAI ACL table.
    pub remove_acl_table: Option<SaiRemove>,
    /// Creates a SAI ACL entry in the given table.
    pub create_acl_entry: Option<SaiCreateEntry>,
    /// Rewrites the attributes of an existing SAI ACL entry.
    pub update_acl_entry: Option<SaiUpdateEntry>,
    /// Removes a SAI ACL entry.
    pub remove_acl_entry: Option<SaiRemove>,
    /// Get port OID by alias.
    pub get_port_oid: Option<Arc<dyn Fn(&str) -> Option<RawSaiObjectId> + Send + Sync>>,
    /// CRM: one more ACL table at (stage, bind point).
    pub incr_acl_table_used: Option<Arc<dyn Fn(AclStage, AclBindPointType) + Send + Sync>>,
    /// CRM: one ACL table less at (stage, bind point); the table OID is gone.
    pub decr_acl_table_used:
        Option<Arc<dyn Fn(AclStage, AclBindPointType, RawSaiObjectId) + Send + Sync>>,
    /// CRM: ACL entry added to the table.
    pub incr_acl_entry_used: Option<Arc<dyn Fn(RawSaiObjectId) + Send + Sync>>,
    /// CRM: ACL entry removed from the table.
    pub decr_acl_entry_used: Option<Arc<dyn Fn(RawSaiObjectId) + Send + Sync>>,
    /// CRM: ACL counter attached in the table.
    pub incr_acl_counter_used: Option<Arc<dyn Fn(RawSaiObjectId) + Send + Sync>>,
    /// CRM: ACL counter detached in the table.
    pub decr_acl_counter_used: Option<Arc<dyn Fn(RawSaiObjectId) + Send + Sync>>,
}

/// What SAI needs to create an ACL table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclTableSpec {
    pub stage: AclStage,
    pub bind_points: Vec<AclBindPointType>,
}

impl std::fmt::Debug for AclOrchCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclOrchCallbacks")
            .field("create_acl_table", &self.create_acl_table.is_some())
            .field("create_acl_entry", &self.create_acl_entry.is_some())
            .field("get_port_oid", &self.get_port_oid.is_some())
            .field("incr_acl_table_used", &self.incr_acl_table_used.is_some())
            .finish()
    }
}

/// Configuration for AclOrch.
#[derive(Debug, Clone)]
pub struct AclOrchConfig {
    pub min_priority: AclPriority,
    pub max_priority: AclPriority,
    /// Maximum number of tables.
    pub max_tables: usize,
    pub metadata_supported: bool,
    pub metadata_min: u16,
    pub metadata_max: u16,
}

impl Default for AclOrchConfig {
    fn default() -> Self {
        Self {
            min_priority: 0,
            max_priority: 999999,
            max_tables: 1024,
            metadata_supported: true,
            metadata_min: MetaDataValue::MIN,
            metadata_max: MetaDataValue::MAX,
        }
    }
}

/// Statistics for AclOrch operations.
#[derive(Debug, Clone, Default)]
pub struct AclOrchStats {
    pub tables_created: u64,
    pub tables_deleted: u64,
    pub rules_created: u64,
    pub rules_deleted: u64,
    pub rules_updated: u64,
    pub sai_errors: u64,
}

/// AclOrch - Main ACL orchestration structure.
#[derive(Debug)]
pub struct AclOrch {
    config: AclOrchConfig,
    callbacks: Option<Arc<AclOrchCallbacks>>,

    // ============ Table Type Registry ============
    table_types: HashMap<String, Arc<AclTableType>>,

    // ============ Tables ============
    /// ACL tables keyed by SAI table OID.
    tables: BTreeMap<RawSaiObjectId, AclTable>,
    /// CONFIG_DB table name -> SAI table OID.
    table_ids: HashMap<AclTableId, RawSaiObjectId>,

    // ============ Metadata Management ============
    /// Allocated metadata values: value -> reference count.
    metadata_refs: HashMap<u16, u32>,

    oids: ObjectIdAllocator,
    stats: AclOrchStats,
}

impl AclOrch {
    /// Creates a new AclOrch with the built-in table types registered.
    pub fn new(config: AclOrchConfig) -> Self {
        let table_types = builtin_table_types()
            .into_iter()
            .map(|tt| (tt.name.clone(), Arc::new(tt)))
            .collect();

        Self {
            config,
            callbacks: None,
            table_types,
            tables: BTreeMap::new(),
            table_ids: HashMap::new(),
            metadata_refs: HashMap::new(),
            oids: ObjectIdAllocator::new(),
            stats: AclOrchStats::default(),
        }
    }

    pub fn set_callbacks(&mut self, callbacks: AclOrchCallbacks) {
        self.callbacks = Some(Arc::new(callbacks));
    }

    // ============ Table Type Operations ============

    pub fn get_table_type(&self, name: &str) -> Option<Arc<AclTableType>> {
        self.table_types.get(name).cloned()
    }

    /// Registers a custom table type.
    pub fn register_table_type(&mut self, table_type: AclTableType) -> Result<()> {
        if self.table_types.contains_key(&table_type.name) {
            return Err(AclOrchError::InvalidConfig(format!(
                "Table type {} already exists",
                table_type.name
            )));
        }
        self.table_types
            .insert(table_type.name.clone(), Arc::new(table_type));
        Ok(())
    }

    /// Unregisters a custom table type. Built-in types cannot be removed.
    pub fn unregister_table_type(&mut self, name: &str) -> Result<()> {
        match self.table_types.get(name) {
            Some(tt) if tt.is_builtin => Err(AclOrchError::InvalidConfig(format!(
                "Cannot remove built-in table type {}",
                name
            ))),
            Some(_) => {
                self.table_types.remove(name);
                Ok(())
            }
            None => Err(AclOrchError::TableTypeNotFound(name.to_string())),
        }
    }

    // ============ Table Operations ============

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn has_table(&self, table_id: &str) -> bool {
        self.table_ids.contains_key(table_id)
    }

    /// Returns the SAI OID of a table.
    pub fn table_oid(&self, table_id: &str) -> Option<RawSaiObjectId> {
        self.table_ids.get(table_id).copied()
    }

    pub fn get_table(&self, table_id: &str) -> Option<&AclTable> {
        self.table_oid(table_id)
            .and_then(|oid| self.tables.get(&oid))
    }

    pub fn get_table_by_oid(&self, oid: RawSaiObjectId) -> Option<&AclTable> {
        self.tables.get(&oid)
    }

    fn table_mut(&mut self, table_id: &str) -> Result<&mut AclTable> {
        let oid = self
            .table_oid(table_id)
            .ok_or_else(|| AclOrchError::TableNotFound(table_id.to_string()))?;
        self.tables
            .get_mut(&oid)
            .ok_or_else(|| AclOrchError::TableNotFound(table_id.to_string()))
    }

    /// Creates a new ACL table from configuration.
    ///
    /// Reports one ACL_TABLE use to CRM per bind point of the table type.
    pub fn create_table(&mut self, config: &AclTableConfig) -> Result<RawSaiObjectId> {
        let (table_id, type_name, _) = config.validate().map_err(AclOrchError::InvalidConfig)?;

        if self.table_ids.contains_key(table_id) {
            return Err(AclOrchError::TableAlreadyExists(table_id.to_string()));
        }

        if self.tables.len() >= self.config.max_tables {
            return Err(AclOrchError::ResourceExhausted(
                "Max tables reached".to_string(),
            ));
        }

        let table_type = self
            .get_table_type(type_name)
            .ok_or_else(|| AclOrchError::TableTypeNotFound(type_name.to_string()))?;

        let mut table =
            AclTable::from_config(config, table_type).map_err(AclOrchError::ValidationError)?;

        let spec = AclTableSpec {
            stage: table.stage,
            bind_points: table.table_type.bind_points.iter().copied().collect(),
        };
        let oid = match self.callbacks.as_ref().and_then(|cb| cb.create_acl_table.clone()) {
            Some(create) => create(&spec).map_err(|e| {
                self.stats.sai_errors += 1;
                AclOrchError::SaiError(format!("Failed to create ACL table {}: {}", table.id, e))
            })?,
            None => self.oids.allocate(SaiObjectType::AclTable),
        };
        table.set_sai_id(oid);

        if let Some(callbacks) = &self.callbacks {
            if let Some(incr) = &callbacks.incr_acl_table_used {
                for bp in &spec.bind_points {
                    incr(spec.stage, *bp);
                }
            }
        }

        info!(
            "Created ACL table {} type {} stage {} oid 0x{:x}",
            table.id, table.table_type.name, table.stage, oid
        );
        self.table_ids.insert(table.id.clone(), oid);
        self.tables.insert(oid, table);
        self.stats.tables_created += 1;

        Ok(oid)
    }

    /// Removes an ACL table. The table must have no rules.
    pub fn remove_table(&mut self, table_id: &str) -> Result<()> {
        let table = self
            .get_table(table_id)
            .ok_or_else(|| AclOrchError::TableNotFound(table_id.to_string()))?;

        if !table.is_empty() {
            warn!(
                "Refusing to remove ACL table {} with {} rules",
                table_id,
                table.rule_count()
            );
            return Err(AclOrchError::TableNotEmpty(table_id.to_string()));
        }

        let oid = table.sai_id();
        let stage = table.stage;
        let bind_points: Vec<_> = table.table_type.bind_points.iter().copied().collect();

        if let Some(remove) = self.callbacks.as_ref().and_then(|cb| cb.remove_acl_table.clone()) {
            remove(oid).map_err(|e| {
                self.stats.sai_errors += 1;
                AclOrchError::SaiError(format!("Failed to remove ACL table {}: {}", table_id, e))
            })?;
        }

        if let Some(callbacks) = &self.callbacks {
            if let Some(decr) = &callbacks.decr_acl_table_used {
                for bp in bind_points {
                    decr(stage, bp, oid);
                }
            }
        }

        self.tables.remove(&oid);
        self.table_ids.remove(table_id);
        self.stats.tables_deleted += 1;
        info!("Removed ACL table {} oid 0x{:x}", table_id, oid);

        Ok(())
    }

    /// Replaces a table's configured port set.
    pub fn update_table_ports(
        &mut self,
        table_id: &str,
        new_ports: Vec<String>,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let table = self.table_mut(table_id)?;
        let new_port_set: HashSet<_> = new_ports.into_iter().collect();
        Ok(table.update_ports(&new_port_set))
    }

    /// Returns all table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.table_ids.keys().cloned().collect();
        names.sort();
        names
    }

    // ============ Rule Operations ============

    pub fn total_rule_count(&self) -> usize {
        self.tables.values().map(|t| t.rule_count()).sum()
    }

    pub fn get_rule(&self, table_id: &str, rule_id: &str) -> Option<&AclRule> {
        self.get_table(table_id).and_then(|t| t.get_rule(rule_id))
    }

    /// Adds a rule to a table and programs its SAI entry.
    ///
    /// The entry OID is assigned here and stays with the rule until it is
    /// removed. A rule that still carries an entry OID is rejected.
    pub fn add_rule(&mut self, table_id: &str, mut rule: AclRule) -> Result<()> {
        rule.validate(self.config.min_priority, self.config.max_priority)
            .map_err(AclOrchError::ValidationError)?;
        if rule.is_created() {
            return Err(AclOrchError::ValidationError(format!(
                "Rule {} is already programmed as entry 0x{:x}",
                rule.id(),
                rule.oid()
            )));
        }

        let table = self
            .get_table(table_id)
            .ok_or_else(|| AclOrchError::TableNotFound(table_id.to_string()))?;
        if table.get_rule(rule.id()).is_some() {
            return Err(AclOrchError::RuleAlreadyExists(
                table_id.to_string(),
                rule.id().to_string(),
            ));
        }
        table
            .check_rule(&rule)
            .map_err(AclOrchError::ValidationError)?;
        let table_oid = table.sai_id();

        let entry_oid = match self.callbacks.as_ref().and_then(|cb| cb.create_acl_entry.clone()) {
            Some(create) => create(table_oid, &rule).map_err(|e| {
                self.stats.sai_errors += 1;
                AclOrchError::SaiError(format!(
                    "Failed to create ACL rule {} in table {}: {}",
                    rule.id(),
                    table_id,
                    e
                ))
            })?,
            None => self.oids.allocate(SaiObjectType::AclEntry),
        };
        rule.assign_oid(entry_oid);
        let counter = rule.counter_enabled();
        debug!(
            "Created ACL rule {} in table {} oid 0x{:x}",
            rule.id(),
            table_id,
            entry_oid
        );

        self.table_mut(table_id)?
            .add_rule(rule)
            .map_err(AclOrchError::ValidationError)?;

        if let Some(callbacks) = &self.callbacks {
            if let Some(incr) = &callbacks.incr_acl_entry_used {
                incr(table_oid);
            }
            if counter {
                if let Some(incr) = &callbacks.incr_acl_counter_used {
                    incr(table_oid);
                }
            }
        }

        self.stats.rules_created += 1;
        Ok(())
    }

    /// Removes a rule from a table and its SAI entry.
    ///
    /// The returned rule no longer carries the entry OID and can be added
    /// again.
    pub fn remove_rule(&mut self, table_id: &str, rule_id: &str) -> Result<AclRule> {
        let table = self
            .get_table(table_id)
            .ok_or_else(|| AclOrchError::TableNotFound(table_id.to_string()))?;
        let table_oid = table.sai_id();
        let entry_oid = table
            .get_rule(rule_id)
            .map(AclRule::oid)
            .ok_or_else(|| AclOrchError::RuleNotFound(table_id.to_string(), rule_id.to_string()))?;

        if let Some(remove) = self.callbacks.as_ref().and_then(|cb| cb.remove_acl_entry.clone()) {
            remove(entry_oid).map_err(|e| {
                self.stats.sai_errors += 1;
                AclOrchError::SaiError(format!(
                    "Failed to remove ACL rule {} from table {}: {}",
                    rule_id, table_id, e
                ))
            })?;
        }

        let mut rule = self.table_mut(table_id)?.remove_rule(rule_id).ok_or_else(|| {
            AclOrchError::RuleNotFound(table_id.to_string(), rule_id.to_string())
        })?;
        rule.clear_oid();

        if let Some(callbacks) = &self.callbacks {
            if let Some(decr) = &callbacks.decr_acl_entry_used {
                decr(table_oid);
            }
            if rule.counter_enabled() {
                if let Some(decr) = &callbacks.decr_acl_counter_used {
                    decr(table_oid);
                }
            }
        }

        debug!("Removed ACL rule {} from table {}", rule_id, table_id);
        self.stats.rules_deleted += 1;
        Ok(rule)
    }

    /// Updates a rule in place.
    ///
    /// Priority, counter flag, matches and actions are taken from `rule`;
    /// the existing SAI entry OID is kept. The rule type cannot change.
    pub fn update_rule(&mut self, table_id: &str, rule: AclRule) -> Result<()> {
        rule.validate(self.config.min_priority, self.config.max_priority)
            .map_err(AclOrchError::ValidationError)?;

        let table = self
            .get_table(table_id)
            .ok_or_else(|| AclOrchError::TableNotFound(table_id.to_string()))?;
        let table_oid = table.sai_id();
        let existing = table.get_rule(rule.id()).ok_or_else(|| {
            AclOrchError::RuleNotFound(table_id.to_string(), rule.id().to_string())
        })?;
        if existing.rule_type() != rule.rule_type() {
            return Err(AclOrchError::ValidationError(format!(
                "Rule {} cannot change type from {} to {}",
                rule.id(),
                existing.rule_type(),
                rule.rule_type()
            )));
        }
        table
            .check_rule(&rule)
            .map_err(AclOrchError::ValidationError)?;
        let entry_oid = existing.oid();
        let counter_before = existing.counter_enabled();

        if let Some(update) = self.callbacks.as_ref().and_then(|cb| cb.update_acl_entry.clone()) {
            update(entry_oid, &rule).map_err(|e| {
                self.stats.sai_errors += 1;
                AclOrchError::SaiError(format!(
                    "Failed to update ACL rule {} in table {}: {}",
                    rule.id(),
                    table_id,
                    e
                ))
            })?;
        }

        let rule_id = rule.id().to_string();
        let counter_after = rule.counter_enabled();
        self.table_mut(table_id)?
            .get_rule_mut(&rule_id)
            .ok_or_else(|| AclOrchError::RuleNotFound(table_id.to_string(), rule_id.clone()))?
            .update_from(rule);

        if counter_before != counter_after {
            if let Some(callbacks) = &self.callbacks {
                let hook = if counter_after {
                    &callbacks.incr_acl_counter_used
                } else {
                    &callbacks.decr_acl_counter_used
                };
                if let Some(hook) = hook {
                    hook(table_oid);
                }
            }
        }

        debug!("Updated ACL rule {} in table {}", rule_id, table_id);
        self.stats.rules_updated += 1;
        Ok(())
    }

    // ============ Port Binding Operations ============

    /// Binds a port to a table, resolving the port OID through PortsOrch.
    pub fn bind_port(&mut self, table_id: &str, port_alias: &str) -> Result<()> {
        let port_oid = self
            .callbacks
            .as_ref()
            .and_then(|cb| cb.get_port_oid.as_ref())
            .and_then(|get| get(port_alias))
            .ok_or_else(|| {
                AclOrchError::InvalidConfig(format!("Port {} not ready", port_alias))
            })?;

        let table = self.table_mut(table_id)?;
        table.bind_port(port_alias, port_oid, SAI_NULL_OBJECT_ID);
        debug!("Bound port {} to ACL table {}", port_alias, table_id);
        Ok(())
    }

    /// Unbinds a port from a table.
    pub fn unbind_port(&mut self, table_id: &str, port_alias: &str) -> Result<()> {
        let table = self.table_mut(table_id)?;
        table.unbind_port(port_alias);
        Ok(())
    }

    // ============ Metadata Operations ============

    /// Allocates an unused metadata value.
    pub fn allocate_metadata(&mut self) -> Result<MetaDataValue> {
        if !self.config.metadata_supported {
            return Err(AclOrchError::InvalidConfig(
                "Metadata not supported on this platform".to_string(),
            ));
        }

        let value = (self.config.metadata_min..=self.config.metadata_max)
            .find(|v| !self.metadata_refs.contains_key(v))
            .and_then(MetaDataValue::new)
            .ok_or_else(|| AclOrchError::ResourceExhausted("No free metadata values".to_string()))?;

        self.metadata_refs.insert(value.value(), 1);
        Ok(value)
    }

    pub fn incr_metadata_ref(&mut self, value: MetaDataValue) {
        *self.metadata_refs.entry(value.value()).or_insert(0) += 1;
    }

    /// Decrements the reference count for a metadata value.
    /// Returns true if the value is now free.
    pub fn decr_metadata_ref(&mut self, value: MetaDataValue) -> bool {
        if let Some(count) = self.metadata_refs.get_mut(&value.value()) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.metadata_refs.remove(&value.value());
                return true;
            }
        }
        false
    }

    pub fn is_metadata_allocated(&self, value: MetaDataValue) -> bool {
        self.metadata_refs.contains_key(&value.value())
    }

    pub fn config(&self) -> &AclOrchConfig {
        &self.config
    }

    pub fn stats(&self) -> &AclOrchStats {
        &self.stats
    }
}

// ============ Testing Facade ============

#[cfg(any(test, feature = "test-portal"))]
impl AclOrch {
    /// The table registry keyed by SAI table OID.
    pub fn inspect_tables(&self) -> &BTreeMap<RawSaiObjectId, AclTable> {
        &self.tables
    }
}
