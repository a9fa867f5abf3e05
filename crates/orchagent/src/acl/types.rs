//! ACL types and enums.
//!
//! Match and action tags are totally ordered so a rule's condition tables
//! iterate in SAI attribute order, matching the ordered maps the C++ rule
//! keeps per `sai_acl_entry_attr_t`.

use std::fmt;
use std::str::FromStr;

/// ACL stage (ingress or egress).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AclStage {
    /// Ingress ACL (applied to incoming packets).
    #[default]
    Ingress,
    /// Egress ACL (applied to outgoing packets).
    Egress,
}

impl AclStage {
    /// All stages, in SAI order.
    pub const ALL: [AclStage; 2] = [AclStage::Ingress, AclStage::Egress];

    /// Returns the CONFIG_DB spelling of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingress => "INGRESS",
            Self::Egress => "EGRESS",
        }
    }
}

impl fmt::Display for AclStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AclStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INGRESS" => Ok(Self::Ingress),
            "EGRESS" => Ok(Self::Egress),
            _ => Err(format!("Unknown ACL stage: {}", s)),
        }
    }
}

/// ACL bind point type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AclBindPointType {
    /// Bind to physical port.
    Port,
    /// Bind to LAG.
    Lag,
    /// Bind to VLAN.
    Vlan,
    /// Bind to router interface.
    RouterInterface,
    /// Bind to switch (global).
    Switch,
}

impl AclBindPointType {
    /// All bind point types, in SAI order.
    pub const ALL: [AclBindPointType; 5] = [
        AclBindPointType::Port,
        AclBindPointType::Lag,
        AclBindPointType::Vlan,
        AclBindPointType::RouterInterface,
        AclBindPointType::Switch,
    ];
}

impl fmt::Display for AclBindPointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Port => write!(f, "PORT"),
            Self::Lag => write!(f, "LAG"),
            Self::Vlan => write!(f, "VLAN"),
            Self::RouterInterface => write!(f, "ROUTER_INTERFACE"),
            Self::Switch => write!(f, "SWITCH"),
        }
    }
}

impl FromStr for AclBindPointType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PORT" => Ok(Self::Port),
            "LAG" => Ok(Self::Lag),
            "VLAN" => Ok(Self::Vlan),
            "ROUTER_INTERFACE" | "RIF" => Ok(Self::RouterInterface),
            "SWITCH" => Ok(Self::Switch),
            _ => Err(format!("Unknown ACL bind point type: {}", s)),
        }
    }
}

/// ACL match field types.
///
/// These correspond to SAI ACL entry field attributes. Declaration order
/// is the ordering used by rule match tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AclMatchField {
    SrcIpv6,
    DstIpv6,
    SrcIp,
    DstIp,
    InPorts,
    OutPorts,
    L4SrcPort,
    L4DstPort,
    EtherType,
    IpProtocol,
    Ipv6NextHeader,
    Dscp,
    TcpFlags,
    Tc,
    IcmpType,
    IcmpCode,
    Icmpv6Type,
    Icmpv6Code,
    VlanId,
    L4SrcPortRange,
    L4DstPortRange,
    AclMetaData,
}

impl fmt::Display for AclMatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SrcIpv6 => "SRC_IPV6",
            Self::DstIpv6 => "DST_IPV6",
            Self::SrcIp => "SRC_IP",
            Self::DstIp => "DST_IP",
            Self::InPorts => "IN_PORTS",
            Self::OutPorts => "OUT_PORTS",
            Self::L4SrcPort => "L4_SRC_PORT",
            Self::L4DstPort => "L4_DST_PORT",
            Self::EtherType => "ETHER_TYPE",
            Self::IpProtocol => "IP_PROTOCOL",
            Self::Ipv6NextHeader => "NEXT_HEADER",
            Self::Dscp => "DSCP",
            Self::TcpFlags => "TCP_FLAGS",
            Self::Tc => "TC",
            Self::IcmpType => "ICMP_TYPE",
            Self::IcmpCode => "ICMP_CODE",
            Self::Icmpv6Type => "ICMPV6_TYPE",
            Self::Icmpv6Code => "ICMPV6_CODE",
            Self::VlanId => "VLAN_ID",
            Self::L4SrcPortRange => "L4_SRC_PORT_RANGE",
            Self::L4DstPortRange => "L4_DST_PORT_RANGE",
            Self::AclMetaData => "ACL_META_DATA",
        };
        f.write_str(name)
    }
}

impl FromStr for AclMatchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SRC_IPV6" => Ok(Self::SrcIpv6),
            "DST_IPV6" => Ok(Self::DstIpv6),
            "SRC_IP" => Ok(Self::SrcIp),
            "DST_IP" => Ok(Self::DstIp),
            "IN_PORTS" => Ok(Self::InPorts),
            "OUT_PORTS" => Ok(Self::OutPorts),
            "L4_SRC_PORT" => Ok(Self::L4SrcPort),
            "L4_DST_PORT" => Ok(Self::L4DstPort),
            "ETHER_TYPE" => Ok(Self::EtherType),
            "IP_PROTOCOL" => Ok(Self::IpProtocol),
            "NEXT_HEADER" | "IPV6_NEXT_HEADER" => Ok(Self::Ipv6NextHeader),
            "DSCP" => Ok(Self::Dscp),
            "TCP_FLAGS" => Ok(Self::TcpFlags),
            "TC" => Ok(Self::Tc),
            "ICMP_TYPE" => Ok(Self::IcmpType),
            "ICMP_CODE" => Ok(Self::IcmpCode),
            "ICMPV6_TYPE" => Ok(Self::Icmpv6Type),
            "ICMPV6_CODE" => Ok(Self::Icmpv6Code),
            "VLAN_ID" => Ok(Self::VlanId),
            "L4_SRC_PORT_RANGE" => Ok(Self::L4SrcPortRange),
            "L4_DST_PORT_RANGE" => Ok(Self::L4DstPortRange),
            "ACL_META_DATA" | "META_DATA" => Ok(Self::AclMetaData),
            _ => Err(format!("Unknown ACL match field: {}", s)),
        }
    }
}

/// ACL action types.
///
/// These correspond to SAI ACL entry action attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AclActionType {
    /// Redirect to next-hop, port or LAG.
    Redirect,
    /// Packet action (forward, drop, copy).
    PacketAction,
    /// Counter.
    Counter,
    /// Mirror ingress.
    MirrorIngress,
    /// Mirror egress.
    MirrorEgress,
    /// Set traffic class.
    SetTc,
    /// Set DSCP value.
    SetDscp,
    /// Set ACL metadata.
    SetAclMetaData,
}

impl fmt::Display for AclActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redirect => write!(f, "REDIRECT_ACTION"),
            Self::PacketAction => write!(f, "PACKET_ACTION"),
            Self::Counter => write!(f, "COUNTER"),
            Self::MirrorIngress => write!(f, "MIRROR_INGRESS_ACTION"),
            Self::MirrorEgress => write!(f, "MIRROR_EGRESS_ACTION"),
            Self::SetTc => write!(f, "SET_TC"),
            Self::SetDscp => write!(f, "SET_DSCP"),
            Self::SetAclMetaData => write!(f, "SET_ACL_META_DATA"),
        }
    }
}

impl FromStr for AclActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "REDIRECT_ACTION" => Ok(Self::Redirect),
            "PACKET_ACTION" => Ok(Self::PacketAction),
            "COUNTER" => Ok(Self::Counter),
            "MIRROR_ACTION" | "MIRROR_INGRESS_ACTION" => Ok(Self::MirrorIngress),
            "MIRROR_EGRESS_ACTION" => Ok(Self::MirrorEgress),
            "SET_TC" => Ok(Self::SetTc),
            "SET_DSCP" => Ok(Self::SetDscp),
            "SET_ACL_META_DATA" => Ok(Self::SetAclMetaData),
            _ => Err(format!("Unknown ACL action type: {}", s)),
        }
    }
}

/// ACL packet action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AclPacketAction {
    /// Forward the packet.
    #[default]
    Forward,
    /// Drop the packet.
    Drop,
    /// Copy the packet to CPU.
    Copy,
    /// Trap (copy to CPU and drop).
    Trap,
}

impl fmt::Display for AclPacketAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "FORWARD"),
            Self::Drop => write!(f, "DROP"),
            Self::Copy => write!(f, "COPY"),
            Self::Trap => write!(f, "TRAP"),
        }
    }
}

impl FromStr for AclPacketAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FORWARD" | "ACCEPT" => Ok(Self::Forward),
            "DROP" => Ok(Self::Drop),
            "COPY" => Ok(Self::Copy),
            "TRAP" => Ok(Self::Trap),
            _ => Err(format!("Unknown packet action: {}", s)),
        }
    }
}

/// ACL table identifier (CONFIG_DB table name).
pub type AclTableId = String;

/// ACL rule identifier (CONFIG_DB rule name).
pub type AclRuleId = String;

/// ACL priority (u32, higher = more specific).
pub type AclPriority = u32;

/// Metadata value (12-bit, 0-4095).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MetaDataValue(u16);

impl MetaDataValue {
    /// Minimum valid metadata value.
    pub const MIN: u16 = 0;
    /// Maximum valid metadata value (12-bit).
    pub const MAX: u16 = 4095;

    /// Creates a new metadata value if within valid range.
    pub fn new(value: u16) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    /// Returns the raw value.
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for MetaDataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pre-defined ACL table type names.
pub mod table_type_names {
    pub const L3: &str = "L3";
    pub const L3V6: &str = "L3V6";
    pub const MIRROR: &str = "MIRROR";
    pub const PFCWD: &str = "PFCWD";
    pub const DROP: &str = "DROP";
}
