//! ACL rule types and implementation.
//!
//! An ACL rule represents a single entry in an ACL table, consisting of:
//! - Match conditions (what packets to match)
//! - Actions (what to do with matched packets)
//! - Priority (which rule wins on multiple matches)
//!
//! The SAI entry OID and the condition tables are private. Production code
//! queries single conditions through [`AclRule::get_match`] and
//! [`AclRule::get_action`]; whole-table inspection is only compiled into
//! test builds.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::net::IpAddr;

use crate::oid::{RawSaiObjectId, SAI_NULL_OBJECT_ID};

use super::types::{
    AclActionType, AclMatchField, AclPacketAction, AclPriority, AclRuleId, MetaDataValue,
};

/// Match conditions of a rule, ordered by SAI field.
pub type AclMatchMap = BTreeMap<AclMatchField, AclRuleMatch>;

/// Actions of a rule, ordered by SAI action.
pub type AclActionMap = BTreeMap<AclActionType, AclRuleAction>;

/// ACL rule type (determines what actions are available).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AclRuleType {
    /// Standard packet forwarding/dropping rule.
    #[default]
    Packet,
    /// Mirror rule (associated with a mirror session).
    Mirror,
}

impl fmt::Display for AclRuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Packet => write!(f, "Packet"),
            Self::Mirror => write!(f, "Mirror"),
        }
    }
}

/// Match value for an ACL rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclMatchValue {
    /// IP address with optional mask.
    Ip { addr: IpAddr, mask: Option<IpAddr> },
    /// IP prefix.
    IpPrefix { addr: IpAddr, prefix_len: u8 },
    /// Single unsigned 8-bit value (protocol, DSCP, etc.).
    U8(u8),
    /// Single unsigned 16-bit value (L4 port, ether type).
    U16(u16),
    /// Single unsigned 32-bit value.
    U32(u32),
    /// Port range (min, max).
    Range { min: u32, max: u32 },
    /// List of port OIDs (for IN_PORTS, OUT_PORTS).
    PortList(Vec<RawSaiObjectId>),
    /// TCP flags with mask.
    TcpFlags { flags: u8, mask: u8 },
}

impl fmt::Display for AclMatchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip { addr, mask: Some(m) } => write!(f, "{}/{}", addr, m),
            Self::Ip { addr, mask: None } => write!(f, "{}", addr),
            Self::IpPrefix { addr, prefix_len } => write!(f, "{}/{}", addr, prefix_len),
            Self::U8(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::Range { min, max } => write!(f, "{}-{}", min, max),
            Self::PortList(ports) => write!(f, "[{} ports]", ports.len()),
            Self::TcpFlags { flags, mask } => write!(f, "0x{:02x}/0x{:02x}", flags, mask),
        }
    }
}

/// A match condition in an ACL rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclRuleMatch {
    /// Match field type.
    pub field: AclMatchField,
    /// Match value.
    pub value: AclMatchValue,
}

impl AclRuleMatch {
    /// Creates a new match condition.
    pub fn new(field: AclMatchField, value: AclMatchValue) -> Self {
        Self { field, value }
    }

    /// Creates a source IP prefix match (v4 or v6 field picked from the address).
    pub fn src_ip_prefix(addr: IpAddr, prefix_len: u8) -> Self {
        let field = if addr.is_ipv4() {
            AclMatchField::SrcIp
        } else {
            AclMatchField::SrcIpv6
        };
        Self::new(field, AclMatchValue::IpPrefix { addr, prefix_len })
    }

    /// Creates a destination IP prefix match.
    pub fn dst_ip_prefix(addr: IpAddr, prefix_len: u8) -> Self {
        let field = if addr.is_ipv4() {
            AclMatchField::DstIp
        } else {
            AclMatchField::DstIpv6
        };
        Self::new(field, AclMatchValue::IpPrefix { addr, prefix_len })
    }

    /// Creates an IP protocol match.
    pub fn ip_protocol(protocol: u8) -> Self {
        Self::new(AclMatchField::IpProtocol, AclMatchValue::U8(protocol))
    }

    /// Creates a DSCP match.
    pub fn dscp(value: u8) -> Self {
        Self::new(AclMatchField::Dscp, AclMatchValue::U8(value))
    }

    /// Creates an L4 source port match.
    pub fn l4_src_port(port: u16) -> Self {
        Self::new(AclMatchField::L4SrcPort, AclMatchValue::U16(port))
    }

    /// Creates an L4 destination port match.
    pub fn l4_dst_port(port: u16) -> Self {
        Self::new(AclMatchField::L4DstPort, AclMatchValue::U16(port))
    }

    /// Creates an L4 destination port range match.
    pub fn l4_dst_port_range(min: u32, max: u32) -> Self {
        Self::new(
            AclMatchField::L4DstPortRange,
            AclMatchValue::Range { min, max },
        )
    }

    /// Creates an IN_PORTS match.
    pub fn in_ports(ports: Vec<RawSaiObjectId>) -> Self {
        Self::new(AclMatchField::InPorts, AclMatchValue::PortList(ports))
    }

    /// Creates a TCP flags match.
    pub fn tcp_flags(flags: u8, mask: u8) -> Self {
        Self::new(
            AclMatchField::TcpFlags,
            AclMatchValue::TcpFlags { flags, mask },
        )
    }

    /// Creates an ether type match.
    pub fn ether_type(etype: u16) -> Self {
        Self::new(AclMatchField::EtherType, AclMatchValue::U16(etype))
    }

    /// Creates a traffic class match.
    pub fn tc(tc: u8) -> Self {
        Self::new(AclMatchField::Tc, AclMatchValue::U8(tc))
    }
}

/// Redirect target for ACL redirect action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclRedirectTarget {
    /// Redirect to a next-hop.
    NextHop(String),
    /// Redirect to a next-hop group.
    NextHopGroup(String),
    /// Redirect to a port (by alias).
    Port(String),
    /// Redirect to a port (by OID).
    PortOid(RawSaiObjectId),
}

impl fmt::Display for AclRedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NextHop(nh) => write!(f, "NH:{}", nh),
            Self::NextHopGroup(nhg) => write!(f, "NHG:{}", nhg),
            Self::Port(alias) => write!(f, "PORT:{}", alias),
            Self::PortOid(oid) => write!(f, "PORT:0x{:x}", oid),
        }
    }
}

/// Action value for an ACL rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclActionValue {
    /// Packet action (forward, drop, etc.).
    PacketAction(AclPacketAction),
    /// Redirect to target.
    Redirect(AclRedirectTarget),
    /// Mirror session name.
    Mirror(String),
    /// DSCP value to set.
    SetDscp(u8),
    /// Traffic class to set.
    SetTc(u8),
    /// Metadata value to set.
    SetMetaData(MetaDataValue),
    /// Counter enable/disable.
    Counter(bool),
}

impl fmt::Display for AclActionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PacketAction(action) => write!(f, "{}", action),
            Self::Redirect(target) => write!(f, "{}", target),
            Self::Mirror(session) => write!(f, "MIRROR:{}", session),
            Self::SetDscp(dscp) => write!(f, "DSCP:{}", dscp),
            Self::SetTc(tc) => write!(f, "TC:{}", tc),
            Self::SetMetaData(meta) => write!(f, "META:{}", meta),
            Self::Counter(enabled) => write!(f, "COUNTER:{}", enabled),
        }
    }
}

/// An action in an ACL rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclRuleAction {
    /// Action type.
    pub action_type: AclActionType,
    /// Action value.
    pub value: AclActionValue,
}

impl AclRuleAction {
    /// Creates a new action.
    pub fn new(action_type: AclActionType, value: AclActionValue) -> Self {
        Self { action_type, value }
    }

    /// Creates a packet action (forward/drop/etc).
    pub fn packet_action(action: AclPacketAction) -> Self {
        Self::new(
            AclActionType::PacketAction,
            AclActionValue::PacketAction(action),
        )
    }

    /// Creates a drop action.
    pub fn drop() -> Self {
        Self::packet_action(AclPacketAction::Drop)
    }

    /// Creates a forward action.
    pub fn forward() -> Self {
        Self::packet_action(AclPacketAction::Forward)
    }

    /// Creates a redirect action.
    pub fn redirect(target: AclRedirectTarget) -> Self {
        Self::new(AclActionType::Redirect, AclActionValue::Redirect(target))
    }

    /// Creates a mirror action (ingress).
    pub fn mirror_ingress(session: impl Into<String>) -> Self {
        Self::new(
            AclActionType::MirrorIngress,
            AclActionValue::Mirror(session.into()),
        )
    }

    /// Creates a set DSCP action.
    pub fn set_dscp(dscp: u8) -> Self {
        Self::new(AclActionType::SetDscp, AclActionValue::SetDscp(dscp))
    }

    /// Creates a set metadata action.
    pub fn set_metadata(meta: MetaDataValue) -> Self {
        Self::new(
            AclActionType::SetAclMetaData,
            AclActionValue::SetMetaData(meta),
        )
    }
}

/// ACL rule structure.
///
/// This represents a single rule within an ACL table. Each rule has:
/// - A unique ID within the table
/// - A priority (higher = more specific)
/// - Match conditions
/// - Actions to take on match
///
/// The SAI entry OID is null until the owning [`AclOrch`](super::AclOrch)
/// programs the rule, and is never changed after that.
#[derive(Debug, Clone)]
pub struct AclRule {
    id: AclRuleId,
    rule_type: AclRuleType,
    priority: AclPriority,
    matches: AclMatchMap,
    actions: AclActionMap,
    rule_oid: RawSaiObjectId,
    counter_enabled: bool,
}

impl AclRule {
    /// Creates a new ACL rule with the given ID and type.
    pub fn new(id: impl Into<String>, rule_type: AclRuleType) -> Self {
        Self {
            id: id.into(),
            rule_type,
            priority: 0,
            matches: BTreeMap::new(),
            actions: BTreeMap::new(),
            rule_oid: SAI_NULL_OBJECT_ID,
            counter_enabled: false,
        }
    }

    /// Creates a new packet rule.
    pub fn packet(id: impl Into<String>) -> Self {
        Self::new(id, AclRuleType::Packet)
    }

    /// Creates a new mirror rule.
    pub fn mirror(id: impl Into<String>) -> Self {
        Self::new(id, AclRuleType::Mirror)
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: AclPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a match condition.
    pub fn with_match(mut self, match_cond: AclRuleMatch) -> Self {
        self.matches.insert(match_cond.field, match_cond);
        self
    }

    /// Adds an action.
    pub fn with_action(mut self, action: AclRuleAction) -> Self {
        self.actions.insert(action.action_type, action);
        self
    }

    /// Enables the counter.
    pub fn with_counter(mut self, enabled: bool) -> Self {
        self.counter_enabled = enabled;
        self
    }

    /// Returns the rule ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the rule type.
    pub fn rule_type(&self) -> AclRuleType {
        self.rule_type
    }

    /// Returns the priority.
    pub fn priority(&self) -> AclPriority {
        self.priority
    }

    /// Returns true if the counter is enabled.
    pub fn counter_enabled(&self) -> bool {
        self.counter_enabled
    }

    /// Returns true if the rule has the given match field.
    pub fn has_match(&self, field: AclMatchField) -> bool {
        self.matches.contains_key(&field)
    }

    /// Returns true if the rule has the given action type.
    pub fn has_action(&self, action_type: AclActionType) -> bool {
        self.actions.contains_key(&action_type)
    }

    /// Returns the match value for a field (if present).
    pub fn get_match(&self, field: AclMatchField) -> Option<&AclRuleMatch> {
        self.matches.get(&field)
    }

    /// Returns the action for a type (if present).
    pub fn get_action(&self, action_type: AclActionType) -> Option<&AclRuleAction> {
        self.actions.get(&action_type)
    }

    /// Returns true if the rule is created in SAI.
    pub fn is_created(&self) -> bool {
        self.rule_oid != SAI_NULL_OBJECT_ID
    }

    /// Returns all match fields used by this rule.
    pub fn match_fields(&self) -> HashSet<AclMatchField> {
        self.matches.keys().copied().collect()
    }

    /// Returns all action types used by this rule.
    pub fn action_types(&self) -> HashSet<AclActionType> {
        self.actions.keys().copied().collect()
    }

    /// Replaces the match and action tables.
    ///
    /// Both tables are replaced as a whole: conditions absent from the new
    /// tables are dropped. The rule ID and SAI OID are unchanged.
    pub fn update(&mut self, matches: AclMatchMap, actions: AclActionMap) {
        self.matches = matches;
        self.actions = actions;
    }

    /// Takes the configurable parts of `other`, keeping ID, type and SAI OID.
    pub(crate) fn update_from(&mut self, other: AclRule) {
        self.priority = other.priority;
        self.counter_enabled = other.counter_enabled;
        self.update(other.matches, other.actions);
    }

    pub(crate) fn oid(&self) -> RawSaiObjectId {
        self.rule_oid
    }

    /// Records the SAI entry OID. Only the first assignment takes effect.
    pub(crate) fn assign_oid(&mut self, oid: RawSaiObjectId) -> bool {
        if self.rule_oid != SAI_NULL_OBJECT_ID {
            return false;
        }
        self.rule_oid = oid;
        true
    }

    /// Forgets the SAI entry OID once the entry has been removed.
    pub(crate) fn clear_oid(&mut self) {
        self.rule_oid = SAI_NULL_OBJECT_ID;
    }

    /// Validates the rule.
    pub fn validate(
        &self,
        min_priority: AclPriority,
        max_priority: AclPriority,
    ) -> Result<(), String> {
        if self.priority < min_priority || self.priority > max_priority {
            return Err(format!(
                "Priority {} out of range ({}-{})",
                self.priority, min_priority, max_priority
            ));
        }

        if self.matches.is_empty() && self.actions.is_empty() {
            return Err("Rule must have at least one match or action".to_string());
        }

        if self.rule_type == AclRuleType::Mirror
            && !self.has_action(AclActionType::MirrorIngress)
            && !self.has_action(AclActionType::MirrorEgress)
        {
            return Err("Mirror rule must have a mirror action".to_string());
        }

        Ok(())
    }
}

impl fmt::Display for AclRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AclRule({}, type={}, priority={}, matches={}, actions={})",
            self.id,
            self.rule_type,
            self.priority,
            self.matches.len(),
            self.actions.len()
        )
    }
}

// ============ Testing Facade ============

#[cfg(any(test, feature = "test-portal"))]
impl AclRule {
    /// SAI entry OID of the rule.
    pub fn inspect_rule_oid(&self) -> RawSaiObjectId {
        self.rule_oid
    }

    /// The complete match table.
    pub fn inspect_matches(&self) -> &AclMatchMap {
        &self.matches
    }

    /// The complete action table.
    pub fn inspect_actions(&self) -> &AclActionMap {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_rule_basic() {
        let rule = AclRule::packet("rule1")
            .with_priority(100)
            .with_match(AclRuleMatch::ip_protocol(6))
            .with_match(AclRuleMatch::l4_dst_port(80))
            .with_action(AclRuleAction::drop())
            .with_counter(true);

        assert_eq!(rule.id(), "rule1");
        assert_eq!(rule.rule_type(), AclRuleType::Packet);
        assert_eq!(rule.priority(), 100);
        assert!(rule.has_match(AclMatchField::IpProtocol));
        assert!(rule.has_match(AclMatchField::L4DstPort));
        assert!(rule.has_action(AclActionType::PacketAction));
        assert!(rule.counter_enabled());
        assert!(!rule.is_created());
    }

    #[test]
    fn test_rule_validate() {
        let rule = AclRule::packet("rule1")
            .with_priority(100)
            .with_action(AclRuleAction::drop());

        assert!(rule.validate(0, 1000).is_ok());
        assert!(rule.validate(200, 1000).is_err());
        assert!(rule.validate(0, 50).is_err());

        let empty_rule = AclRule::packet("empty");
        assert!(empty_rule.validate(0, 1000).is_err());
    }

    #[test]
    fn test_mirror_rule_validate() {
        let rule = AclRule::mirror("mirror1")
            .with_priority(100)
            .with_match(AclRuleMatch::dscp(8));
        assert!(rule.validate(0, 1000).is_err());

        let rule = AclRule::mirror("mirror1")
            .with_priority(100)
            .with_action(AclRuleAction::mirror_ingress("session1"));
        assert!(rule.validate(0, 1000).is_ok());
    }

    #[test]
    fn test_assign_oid_once() {
        let mut rule = AclRule::packet("rule1");
        assert!(rule.assign_oid(0x8000_0000_0001));
        assert!(!rule.assign_oid(0x8000_0000_0002));
        assert_eq!(rule.oid(), 0x8000_0000_0001);
        assert!(rule.is_created());

        rule.clear_oid();
        assert!(!rule.is_created());
        assert!(rule.assign_oid(0x8000_0000_0003));
        assert_eq!(rule.oid(), 0x8000_0000_0003);
    }

    #[test]
    fn test_update_replaces_tables() {
        let mut rule = AclRule::packet("rule1")
            .with_match(AclRuleMatch::ip_protocol(6))
            .with_match(AclRuleMatch::l4_dst_port(80))
            .with_action(AclRuleAction::drop());
        rule.assign_oid(0x42);

        let mut matches = AclMatchMap::new();
        let dscp = AclRuleMatch::dscp(46);
        matches.insert(dscp.field, dscp);
        let mut actions = AclActionMap::new();
        let fwd = AclRuleAction::forward();
        actions.insert(fwd.action_type, fwd);

        rule.update(matches, actions);

        assert_eq!(rule.match_fields(), HashSet::from([AclMatchField::Dscp]));
        assert_eq!(rule.action_types(), HashSet::from([AclActionType::PacketAction]));
        assert_eq!(
            rule.get_action(AclActionType::PacketAction).map(|a| &a.value),
            Some(&AclActionValue::PacketAction(AclPacketAction::Forward))
        );
        assert_eq!(rule.oid(), 0x42);
    }

    #[test]
    fn test_update_from_keeps_identity() {
        let mut rule = AclRule::packet("rule1")
            .with_priority(10)
            .with_action(AclRuleAction::drop());
        rule.assign_oid(0x42);

        let replacement = AclRule::packet("ignored")
            .with_priority(20)
            .with_match(AclRuleMatch::tc(3))
            .with_action(AclRuleAction::set_dscp(10));
        rule.update_from(replacement);

        assert_eq!(rule.id(), "rule1");
        assert_eq!(rule.oid(), 0x42);
        assert_eq!(rule.priority(), 20);
        assert!(rule.has_match(AclMatchField::Tc));
        assert!(!rule.has_action(AclActionType::PacketAction));
    }

    #[test]
    fn test_ip_prefix_field_selection() {
        let v4 = AclRuleMatch::src_ip_prefix(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0)), 8);
        assert_eq!(v4.field, AclMatchField::SrcIp);
        assert_eq!(v4.value.to_string(), "10.0.0.0/8");

        let v6 = AclRuleMatch::dst_ip_prefix("2001:db8::".parse().unwrap(), 32);
        assert_eq!(v6.field, AclMatchField::DstIpv6);
    }

    #[test]
    fn test_facade_exposes_tables() {
        let rule = AclRule::packet("rule1")
            .with_match(AclRuleMatch::l4_dst_port(22))
            .with_match(AclRuleMatch::ip_protocol(6))
            .with_action(AclRuleAction::drop());

        let fields: Vec<_> = rule.inspect_matches().keys().copied().collect();
        assert_eq!(fields, vec![AclMatchField::L4DstPort, AclMatchField::IpProtocol]);
        assert_eq!(rule.inspect_actions().len(), 1);
        assert_eq!(rule.inspect_rule_oid(), SAI_NULL_OBJECT_ID);
    }

    #[test]
    fn test_redirect_target_display() {
        let t = AclRedirectTarget::NextHop("10.0.0.1@Ethernet0".to_string());
        assert_eq!(t.to_string(), "NH:10.0.0.1@Ethernet0");

        let t = AclRedirectTarget::PortOid(0x1000);
        assert_eq!(t.to_string(), "PORT:0x1000");
    }
}
