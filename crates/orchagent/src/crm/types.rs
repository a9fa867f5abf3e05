//! CRM types and data structures.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::acl::{AclBindPointType, AclStage};
use crate::oid::RawSaiObjectId;

/// CRM resource type enumeration.
///
/// Declaration order is the iteration order of [`CrmResourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CrmResourceType {
    // IP routing resources
    Ipv4Route,
    Ipv6Route,

    // Nexthop resources
    Ipv4Nexthop,
    Ipv6Nexthop,
    NexthopGroupMember,
    NexthopGroup,

    // Neighbor resources
    Ipv4Neighbor,
    Ipv6Neighbor,

    // ACL resources
    AclTable,
    AclGroup,
    AclEntry,
    AclCounter,

    // Forwarding resources
    FdbEntry,
    IpmcEntry,

    // NAT resources
    SnatEntry,
    DnatEntry,

    // MPLS resources
    MplsInseg,
    MplsNexthop,

    // SRv6 resources
    Srv6MySidEntry,
    Srv6Nexthop,

    TwampEntry,
}

impl CrmResourceType {
    /// All resource types, in map order.
    pub const ALL: [CrmResourceType; 21] = [
        Self::Ipv4Route,
        Self::Ipv6Route,
        Self::Ipv4Nexthop,
        Self::Ipv6Nexthop,
        Self::NexthopGroupMember,
        Self::NexthopGroup,
        Self::Ipv4Neighbor,
        Self::Ipv6Neighbor,
        Self::AclTable,
        Self::AclGroup,
        Self::AclEntry,
        Self::AclCounter,
        Self::FdbEntry,
        Self::IpmcEntry,
        Self::SnatEntry,
        Self::DnatEntry,
        Self::MplsInseg,
        Self::MplsNexthop,
        Self::Srv6MySidEntry,
        Self::Srv6Nexthop,
        Self::TwampEntry,
    ];

    /// Returns the CONFIG_DB / COUNTERS_DB name of this resource type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ipv4Route => "ipv4_route",
            Self::Ipv6Route => "ipv6_route",
            Self::Ipv4Nexthop => "ipv4_nexthop",
            Self::Ipv6Nexthop => "ipv6_nexthop",
            Self::NexthopGroupMember => "nexthop_group_member",
            Self::NexthopGroup => "nexthop_group",
            Self::Ipv4Neighbor => "ipv4_neighbor",
            Self::Ipv6Neighbor => "ipv6_neighbor",
            Self::AclTable => "acl_table",
            Self::AclGroup => "acl_group",
            Self::AclEntry => "acl_entry",
            Self::AclCounter => "acl_counter",
            Self::FdbEntry => "fdb_entry",
            Self::IpmcEntry => "ipmc_entry",
            Self::SnatEntry => "snat_entry",
            Self::DnatEntry => "dnat_entry",
            Self::MplsInseg => "mpls_inseg",
            Self::MplsNexthop => "mpls_nexthop",
            Self::Srv6MySidEntry => "srv6_my_sid_entry",
            Self::Srv6Nexthop => "srv6_nexthop",
            Self::TwampEntry => "twamp_entry",
        }
    }

    /// Returns true for resources counted per (stage, bind point) or per table.
    pub fn is_acl_resource(&self) -> bool {
        matches!(
            self,
            Self::AclTable | Self::AclGroup | Self::AclEntry | Self::AclCounter
        )
    }

    /// Returns true for resources counted per (stage, bind point).
    pub fn is_bind_point_resource(&self) -> bool {
        matches!(self, Self::AclTable | Self::AclGroup)
    }

    /// Returns true for resources counted per ACL table.
    pub fn is_per_table_resource(&self) -> bool {
        matches!(self, Self::AclEntry | Self::AclCounter)
    }
}

impl FromStr for CrmResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.name() == lower)
            .ok_or_else(|| format!("Unknown CRM resource type: {}", s))
    }
}

impl fmt::Display for CrmResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// CRM threshold type for resource monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrmThresholdType {
    /// Percentage of total capacity.
    #[default]
    Percentage,
    /// Absolute number of entries used.
    Used,
    /// Absolute number of entries available.
    Free,
}

impl CrmThresholdType {
    pub fn config_value(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Used => "used",
            Self::Free => "free",
        }
    }
}

impl FromStr for CrmThresholdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "percentage" => Ok(Self::Percentage),
            "used" => Ok(Self::Used),
            "free" => Ok(Self::Free),
            _ => Err(format!("Unknown threshold type: {}", s)),
        }
    }
}

impl fmt::Display for CrmThresholdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_value())
    }
}

/// Counter data for a single CRM resource context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrmResourceCounter {
    /// SAI object ID (the ACL table for per-table counters).
    pub id: RawSaiObjectId,
    pub available: u32,
    pub used: u32,
    /// Exceeded log counter (for rate limiting, max 10).
    pub exceeded_log_count: u32,
}

impl CrmResourceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the utilization percentage (0-100).
    pub fn utilization_percent(&self) -> u32 {
        let total = self.used.saturating_add(self.available);
        if total == 0 {
            0
        } else {
            ((self.used as u64 * 100) / total as u64) as u32
        }
    }

    /// Increments the used counter, returning the new value.
    pub fn increment_used(&mut self) -> u32 {
        self.used = self.used.saturating_add(1);
        self.used
    }

    /// Decrements the used counter, returning the new value.
    /// Returns None if the counter would underflow.
    pub fn decrement_used(&mut self) -> Option<u32> {
        self.used = self.used.checked_sub(1)?;
        Some(self.used)
    }

    /// Checks the counter against its thresholds and updates the log counter.
    pub fn check_threshold(
        &mut self,
        threshold_type: CrmThresholdType,
        high: u32,
        low: u32,
    ) -> ThresholdCheck {
        let utilization = match threshold_type {
            CrmThresholdType::Percentage => self.utilization_percent(),
            CrmThresholdType::Used => self.used,
            CrmThresholdType::Free => self.available,
        };

        if utilization >= high && self.exceeded_log_count < CRM_EXCEEDED_MSG_MAX {
            self.exceeded_log_count += 1;
            ThresholdCheck::Exceeded {
                utilization,
                threshold: high,
            }
        } else if utilization <= low && self.exceeded_log_count > 0 {
            self.exceeded_log_count = 0;
            ThresholdCheck::Recovered {
                utilization,
                threshold: low,
            }
        } else {
            ThresholdCheck::Normal
        }
    }
}

/// Maximum number of exceeded messages before rate limiting.
pub const CRM_EXCEEDED_MSG_MAX: u32 = 10;

/// Result of threshold check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdCheck {
    Normal,
    Exceeded { utilization: u32, threshold: u32 },
    Recovered { utilization: u32, threshold: u32 },
}

pub const DEFAULT_LOW_THRESHOLD: u32 = 70;

pub const DEFAULT_HIGH_THRESHOLD: u32 = 85;

/// Default polling interval in seconds (5 minutes).
pub const DEFAULT_POLLING_INTERVAL: u64 = 5 * 60;

/// Counter key for global resources.
pub const CRM_COUNTERS_TABLE_KEY: &str = "STATS";

/// Counters of one resource, keyed by context
/// (e.g. "STATS", "ACL_STATS:INGRESS:PORT", "ACL_TABLE_STATS:0x7000000000001").
pub type CrmCounterMap = BTreeMap<String, CrmResourceCounter>;

/// CRM resource entry tracking thresholds and counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmResourceEntry {
    pub resource_type: CrmResourceType,
    pub threshold_type: CrmThresholdType,
    pub low_threshold: u32,
    pub high_threshold: u32,
    pub counters: CrmCounterMap,
}

impl CrmResourceEntry {
    /// Creates a new resource entry with default thresholds.
    ///
    /// Global resources start with a "STATS" counter; ACL resources get their
    /// counters as tables and bind points appear.
    pub fn new(resource_type: CrmResourceType) -> Self {
        let mut counters = CrmCounterMap::new();
        if !resource_type.is_acl_resource() {
            counters.insert(CRM_COUNTERS_TABLE_KEY.to_string(), CrmResourceCounter::new());
        }
        Self {
            resource_type,
            threshold_type: CrmThresholdType::default(),
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            counters,
        }
    }

    pub fn get_or_create_counter(&mut self, key: &str) -> &mut CrmResourceCounter {
        self.counters.entry(key.to_string()).or_default()
    }

    pub fn get_counter(&self, key: &str) -> Option<&CrmResourceCounter> {
        self.counters.get(key)
    }

    pub fn get_counter_mut(&mut self, key: &str) -> Option<&mut CrmResourceCounter> {
        self.counters.get_mut(key)
    }

    pub fn remove_counter(&mut self, key: &str) -> Option<CrmResourceCounter> {
        self.counters.remove(key)
    }
}

/// The full resource map of a CrmOrch.
pub type CrmResourceMap = BTreeMap<CrmResourceType, CrmResourceEntry>;

/// CRM spelling of a bind point. Router interfaces are "RIF".
fn crm_bind_point_name(bind_point: AclBindPointType) -> &'static str {
    match bind_point {
        AclBindPointType::Port => "PORT",
        AclBindPointType::Lag => "LAG",
        AclBindPointType::Vlan => "VLAN",
        AclBindPointType::RouterInterface => "RIF",
        AclBindPointType::Switch => "SWITCH",
    }
}

/// Counter key of ACL table/group usage at one (stage, bind point).
pub(crate) fn crm_acl_key(stage: AclStage, bind_point: AclBindPointType) -> String {
    format!("ACL_STATS:{}:{}", stage.as_str(), crm_bind_point_name(bind_point))
}

/// Counter key of ACL entry/counter usage in one table.
pub(crate) fn crm_acl_table_key(table_id: RawSaiObjectId) -> String {
    format!("ACL_TABLE_STATS:0x{:x}", table_id)
}

/// CRM threshold field types for configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrmThresholdField {
    Type,
    Low,
    High,
}

impl CrmThresholdField {
    /// Returns the CONFIG_DB field suffix.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Type => "_threshold_type",
            Self::Low => "_low_threshold",
            Self::High => "_high_threshold",
        }
    }

    /// Splits a CONFIG_DB field name into resource name and field type.
    pub fn parse_field(field: &str) -> Option<(&str, CrmThresholdField)> {
        [Self::Type, Self::Low, Self::High]
            .into_iter()
            .find_map(|f| field.strip_suffix(f.suffix()).map(|res| (res, f)))
    }
}
