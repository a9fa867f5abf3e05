//! ACL table management.
//!
//! An ACL table is a collection of ACL rules that share the same type
//! (match fields, actions, bind points).

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::oid::{RawSaiObjectId, SAI_NULL_OBJECT_ID};

use super::rule::AclRule;
use super::table_type::AclTableType;
use super::types::{AclRuleId, AclStage, AclTableId};

/// ACL table configuration from CONFIG_DB.
#[derive(Debug, Clone, Default)]
pub struct AclTableConfig {
    /// Table ID (name).
    pub id: Option<String>,
    /// Table type name (e.g., "L3", "MIRROR").
    pub type_name: Option<String>,
    pub stage: Option<AclStage>,
    /// Ports to bind to.
    pub ports: Vec<String>,
    pub description: Option<String>,
}

impl AclTableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_stage(mut self, stage: AclStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_ports(mut self, ports: Vec<String>) -> Self {
        self.ports = ports;
        self
    }

    /// Parses a field of an `ACL_TABLE` CONFIG_DB entry.
    ///
    /// Unknown fields are ignored.
    pub fn parse_field(&mut self, field: &str, value: &str) -> Result<(), String> {
        match field.to_uppercase().as_str() {
            "TYPE" => self.type_name = Some(value.to_string()),
            "STAGE" => self.stage = Some(value.parse()?),
            "PORTS" | "PORTS@" => {
                self.ports = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "POLICY_DESC" | "DESCRIPTION" => self.description = Some(value.to_string()),
            _ => {}
        }
        Ok(())
    }

    /// Checks the required fields and returns `(id, type name, stage)`.
    pub fn validate(&self) -> Result<(&str, &str, AclStage), String> {
        let id = self.id.as_deref().ok_or("Table ID is required")?;
        let type_name = self.type_name.as_deref().ok_or("Table type is required")?;
        let stage = self.stage.ok_or("Table stage is required")?;
        Ok((id, type_name, stage))
    }
}

/// Binding of a port to an ACL table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBinding {
    pub port_oid: RawSaiObjectId,
    /// ACL group member OID for this port-table binding.
    pub group_member_oid: RawSaiObjectId,
}

/// ACL table structure.
///
/// Tables contain rules that share the same type and can be bound to ports.
/// The SAI table OID is assigned by [`AclOrch`](super::AclOrch) when the
/// table is created.
#[derive(Debug, Clone)]
pub struct AclTable {
    /// Table ID (unique name).
    pub id: AclTableId,
    pub table_type: Arc<AclTableType>,
    pub stage: AclStage,
    pub description: String,
    table_oid: RawSaiObjectId,
    /// Port bindings: port alias -> binding info.
    pub port_bindings: BTreeMap<String, PortBinding>,
    /// Ports in configuration (may not be bound yet).
    pub configured_ports: BTreeSet<String>,
    rules: BTreeMap<AclRuleId, AclRule>,
}

impl AclTable {
    /// Creates a new ACL table.
    pub fn new(id: impl Into<String>, table_type: Arc<AclTableType>, stage: AclStage) -> Self {
        Self {
            id: id.into(),
            table_type,
            stage,
            description: String::new(),
            table_oid: SAI_NULL_OBJECT_ID,
            port_bindings: BTreeMap::new(),
            configured_ports: BTreeSet::new(),
            rules: BTreeMap::new(),
        }
    }

    /// Creates a table from a configuration.
    pub fn from_config(
        config: &AclTableConfig,
        table_type: Arc<AclTableType>,
    ) -> Result<Self, String> {
        let (id, _, stage) = config.validate()?;

        if !table_type.supports_stage(stage) {
            return Err(format!(
                "Table type {} does not support stage {}",
                table_type.name, stage
            ));
        }

        let mut table = Self::new(id, table_type, stage);
        if let Some(desc) = &config.description {
            table.description = desc.clone();
        }
        table.configured_ports = config.ports.iter().cloned().collect();

        Ok(table)
    }

    /// Returns the SAI table OID.
    pub fn sai_id(&self) -> RawSaiObjectId {
        self.table_oid
    }

    pub(crate) fn set_sai_id(&mut self, oid: RawSaiObjectId) {
        self.table_oid = oid;
    }

    /// Returns true if the table is created in SAI.
    pub fn is_created(&self) -> bool {
        self.table_oid != SAI_NULL_OBJECT_ID
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get_rule(&self, rule_id: &str) -> Option<&AclRule> {
        self.rules.get(rule_id)
    }

    pub(crate) fn get_rule_mut(&mut self, rule_id: &str) -> Option<&mut AclRule> {
        self.rules.get_mut(rule_id)
    }

    /// Returns all rule IDs in order.
    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Checks a rule's matches and actions against the table type.
    pub fn check_rule(&self, rule: &AclRule) -> Result<(), String> {
        self.table_type.validate_matches(&rule.match_fields())?;
        self.table_type.validate_actions(&rule.action_types())
    }

    /// Adds a rule to the table.
    ///
    /// Returns an error if a rule with the same ID already exists.
    pub fn add_rule(&mut self, rule: AclRule) -> Result<(), String> {
        self.check_rule(&rule)?;

        if self.rules.contains_key(rule.id()) {
            return Err(format!(
                "Rule {} already exists in table {}",
                rule.id(),
                self.id
            ));
        }

        self.rules.insert(rule.id().to_string(), rule);
        Ok(())
    }

    /// Removes a rule from the table.
    pub fn remove_rule(&mut self, rule_id: &str) -> Option<AclRule> {
        self.rules.remove(rule_id)
    }

    /// Records a port binding. The SAI binding is done by the orch.
    pub fn bind_port(
        &mut self,
        port_alias: &str,
        port_oid: RawSaiObjectId,
        group_member_oid: RawSaiObjectId,
    ) {
        self.port_bindings.insert(
            port_alias.to_string(),
            PortBinding {
                port_oid,
                group_member_oid,
            },
        );
    }

    pub fn unbind_port(&mut self, port_alias: &str) -> Option<PortBinding> {
        self.port_bindings.remove(port_alias)
    }

    pub fn is_port_bound(&self, port_alias: &str) -> bool {
        self.port_bindings.contains_key(port_alias)
    }

    /// Returns true if a port is configured but not bound yet.
    pub fn is_port_pending(&self, port_alias: &str) -> bool {
        self.configured_ports.contains(port_alias) && !self.is_port_bound(port_alias)
    }

    /// Replaces the configured port set.
    ///
    /// Returns (ports_to_add, ports_to_remove).
    pub fn update_ports(&mut self, new_ports: &HashSet<String>) -> (Vec<String>, Vec<String>) {
        let add: Vec<String> = new_ports
            .iter()
            .filter(|p| !self.configured_ports.contains(*p))
            .cloned()
            .collect();
        let remove: Vec<String> = self
            .configured_ports
            .iter()
            .filter(|p| !new_ports.contains(*p))
            .cloned()
            .collect();

        self.configured_ports = new_ports.iter().cloned().collect();
        (add, remove)
    }
}

impl fmt::Display for AclTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AclTable({}, type={}, stage={}, oid=0x{:x}, rules={}, bound_ports={})",
            self.id,
            self.table_type.name,
            self.stage,
            self.table_oid,
            self.rules.len(),
            self.port_bindings.len()
        )
    }
}
