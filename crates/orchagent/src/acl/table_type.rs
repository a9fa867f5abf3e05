//! ACL table type definitions and builder.
//!
//! A table type fixes which match fields and actions a table accepts and
//! which bind points it occupies. CRM accounting is done per bind point, so
//! bind points are kept in SAI order.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::types::{table_type_names, AclActionType, AclBindPointType, AclMatchField, AclStage};

/// ACL table type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclTableType {
    /// Type name (e.g., "L3", "MIRROR").
    pub name: String,
    /// Supported bind point types.
    pub bind_points: BTreeSet<AclBindPointType>,
    /// Supported match fields.
    pub matches: HashSet<AclMatchField>,
    /// Supported actions.
    pub actions: HashSet<AclActionType>,
    /// Supported stages. Empty means both.
    pub stages: HashSet<AclStage>,
    /// Whether this is a built-in type.
    pub is_builtin: bool,
}

impl AclTableType {
    /// Creates a new empty table type with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bind_points: BTreeSet::new(),
            matches: HashSet::new(),
            actions: HashSet::new(),
            stages: HashSet::new(),
            is_builtin: false,
        }
    }

    pub fn supports_match(&self, field: AclMatchField) -> bool {
        self.matches.contains(&field)
    }

    pub fn supports_action(&self, action: AclActionType) -> bool {
        self.actions.contains(&action)
    }

    pub fn supports_bind_point(&self, bp: AclBindPointType) -> bool {
        self.bind_points.contains(&bp)
    }

    pub fn supports_stage(&self, stage: AclStage) -> bool {
        self.stages.is_empty() || self.stages.contains(&stage)
    }

    /// Validates that a rule's match fields are supported by this table type.
    pub fn validate_matches(&self, matches: &HashSet<AclMatchField>) -> Result<(), String> {
        match matches.iter().find(|field| !self.supports_match(**field)) {
            Some(field) => Err(format!(
                "Table type {} does not support match field {}",
                self.name, field
            )),
            None => Ok(()),
        }
    }

    /// Validates that a rule's actions are supported by this table type.
    pub fn validate_actions(&self, actions: &HashSet<AclActionType>) -> Result<(), String> {
        match actions.iter().find(|action| !self.supports_action(**action)) {
            Some(action) => Err(format!(
                "Table type {} does not support action {}",
                self.name, action
            )),
            None => Ok(()),
        }
    }
}

impl fmt::Display for AclTableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AclTableType({}, matches={}, actions={}, bind_points={})",
            self.name,
            self.matches.len(),
            self.actions.len(),
            self.bind_points.len()
        )
    }
}

/// Builder for user-defined ACL table types.
#[derive(Debug, Clone, Default)]
pub struct AclTableTypeBuilder {
    name: Option<String>,
    bind_points: BTreeSet<AclBindPointType>,
    matches: HashSet<AclMatchField>,
    actions: HashSet<AclActionType>,
    stages: HashSet<AclStage>,
}

impl AclTableTypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_bind_point(mut self, bp: AclBindPointType) -> Self {
        self.bind_points.insert(bp);
        self
    }

    pub fn with_bind_points(mut self, bps: impl IntoIterator<Item = AclBindPointType>) -> Self {
        self.bind_points.extend(bps);
        self
    }

    pub fn with_match(mut self, field: AclMatchField) -> Self {
        self.matches.insert(field);
        self
    }

    pub fn with_matches(mut self, fields: impl IntoIterator<Item = AclMatchField>) -> Self {
        self.matches.extend(fields);
        self
    }

    pub fn with_action(mut self, action: AclActionType) -> Self {
        self.actions.insert(action);
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = AclActionType>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn with_stage(mut self, stage: AclStage) -> Self {
        self.stages.insert(stage);
        self
    }

    /// Builds the table type.
    pub fn build(self) -> Result<AclTableType, String> {
        let name = self.name.ok_or("Table type name is required")?;

        if self.bind_points.is_empty() {
            return Err("At least one bind point is required".to_string());
        }

        if self.matches.is_empty() && self.actions.is_empty() {
            return Err("At least one match or action is required".to_string());
        }

        Ok(AclTableType {
            name,
            bind_points: self.bind_points,
            matches: self.matches,
            actions: self.actions,
            stages: self.stages,
            is_builtin: false,
        })
    }
}

fn builtin(
    name: &str,
    bind_points: &[AclBindPointType],
    matches: &[AclMatchField],
    actions: &[AclActionType],
    stages: &[AclStage],
) -> AclTableType {
    AclTableType {
        name: name.to_string(),
        bind_points: bind_points.iter().copied().collect(),
        matches: matches.iter().copied().collect(),
        actions: actions.iter().copied().collect(),
        stages: stages.iter().copied().collect(),
        is_builtin: true,
    }
}

/// Creates the built-in L3 table type.
pub fn create_l3_table_type() -> AclTableType {
    builtin(
        table_type_names::L3,
        &[AclBindPointType::Port, AclBindPointType::Lag],
        &[
            AclMatchField::SrcIp,
            AclMatchField::DstIp,
            AclMatchField::EtherType,
            AclMatchField::IpProtocol,
            AclMatchField::Dscp,
            AclMatchField::TcpFlags,
            AclMatchField::IcmpType,
            AclMatchField::IcmpCode,
            AclMatchField::L4SrcPort,
            AclMatchField::L4DstPort,
            AclMatchField::L4SrcPortRange,
            AclMatchField::L4DstPortRange,
            AclMatchField::InPorts,
        ],
        &[
            AclActionType::PacketAction,
            AclActionType::Redirect,
            AclActionType::Counter,
        ],
        &[],
    )
}

/// Creates the built-in L3V6 table type.
pub fn create_l3v6_table_type() -> AclTableType {
    builtin(
        table_type_names::L3V6,
        &[AclBindPointType::Port, AclBindPointType::Lag],
        &[
            AclMatchField::SrcIpv6,
            AclMatchField::DstIpv6,
            AclMatchField::EtherType,
            AclMatchField::Ipv6NextHeader,
            AclMatchField::Dscp,
            AclMatchField::TcpFlags,
            AclMatchField::Icmpv6Type,
            AclMatchField::Icmpv6Code,
            AclMatchField::L4SrcPort,
            AclMatchField::L4DstPort,
            AclMatchField::L4SrcPortRange,
            AclMatchField::L4DstPortRange,
            AclMatchField::InPorts,
        ],
        &[
            AclActionType::PacketAction,
            AclActionType::Redirect,
            AclActionType::Counter,
        ],
        &[],
    )
}

/// Creates the built-in MIRROR table type.
pub fn create_mirror_table_type() -> AclTableType {
    builtin(
        table_type_names::MIRROR,
        &[AclBindPointType::Port, AclBindPointType::Lag],
        &[
            AclMatchField::SrcIp,
            AclMatchField::DstIp,
            AclMatchField::EtherType,
            AclMatchField::IpProtocol,
            AclMatchField::Dscp,
            AclMatchField::TcpFlags,
            AclMatchField::L4SrcPort,
            AclMatchField::L4DstPort,
            AclMatchField::InPorts,
        ],
        &[
            AclActionType::MirrorIngress,
            AclActionType::MirrorEgress,
            AclActionType::Counter,
        ],
        &[],
    )
}

/// Creates the built-in PFCWD table type (ingress only).
pub fn create_pfcwd_table_type() -> AclTableType {
    builtin(
        table_type_names::PFCWD,
        &[AclBindPointType::Port, AclBindPointType::Switch],
        &[AclMatchField::Tc, AclMatchField::InPorts],
        &[AclActionType::PacketAction, AclActionType::Counter],
        &[AclStage::Ingress],
    )
}

/// Creates the built-in DROP table type (ingress only).
pub fn create_drop_table_type() -> AclTableType {
    builtin(
        table_type_names::DROP,
        &[AclBindPointType::Port, AclBindPointType::Lag],
        &[
            AclMatchField::SrcIp,
            AclMatchField::DstIp,
            AclMatchField::SrcIpv6,
            AclMatchField::DstIpv6,
            AclMatchField::EtherType,
            AclMatchField::IpProtocol,
            AclMatchField::Ipv6NextHeader,
            AclMatchField::L4SrcPort,
            AclMatchField::L4DstPort,
            AclMatchField::InPorts,
        ],
        &[AclActionType::PacketAction, AclActionType::Counter],
        &[AclStage::Ingress],
    )
}

/// All built-in table types.
pub fn builtin_table_types() -> Vec<AclTableType> {
    vec![
        create_l3_table_type(),
        create_l3v6_table_type(),
        create_mirror_table_type(),
        create_pfcwd_table_type(),
        create_drop_table_type(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_type_builder() {
        let tt = AclTableTypeBuilder::new()
            .with_name("CUSTOM")
            .with_bind_point(AclBindPointType::Port)
            .with_match(AclMatchField::SrcIp)
            .with_action(AclActionType::PacketAction)
            .build()
            .unwrap();

        assert_eq!(tt.name, "CUSTOM");
        assert!(!tt.is_builtin);
        assert!(tt.supports_match(AclMatchField::SrcIp));
        assert!(!tt.supports_match(AclMatchField::DstIp));
        assert!(tt.supports_bind_point(AclBindPointType::Port));
    }

    #[test]
    fn test_table_type_builder_validation() {
        let result = AclTableTypeBuilder::new()
            .with_bind_point(AclBindPointType::Port)
            .with_match(AclMatchField::SrcIp)
            .build();
        assert!(result.is_err());

        let result = AclTableTypeBuilder::new()
            .with_name("CUSTOM")
            .with_match(AclMatchField::SrcIp)
            .build();
        assert!(result.is_err());

        let result = AclTableTypeBuilder::new()
            .with_name("CUSTOM")
            .with_bind_point(AclBindPointType::Port)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builtin_bind_points_ordered() {
        let tt = create_pfcwd_table_type();
        let bps: Vec<_> = tt.bind_points.iter().copied().collect();
        assert_eq!(bps, vec![AclBindPointType::Port, AclBindPointType::Switch]);
    }

    #[test]
    fn test_builtin_names_unique() {
        let names: HashSet<_> = builtin_table_types().into_iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 5);
        assert!(names.contains(table_type_names::L3V6));
    }

    #[test]
    fn test_validate_matches_and_actions() {
        let tt = create_l3_table_type();

        let matches: HashSet<_> = [AclMatchField::SrcIp, AclMatchField::DstIp].into();
        assert!(tt.validate_matches(&matches).is_ok());
        let matches: HashSet<_> = [AclMatchField::SrcIpv6].into();
        assert!(tt.validate_matches(&matches).is_err());

        let actions: HashSet<_> = [AclActionType::PacketAction].into();
        assert!(tt.validate_actions(&actions).is_ok());
        let actions: HashSet<_> = [AclActionType::MirrorIngress].into();
        assert!(tt.validate_actions(&actions).is_err());
    }

    #[test]
    fn test_stage_support() {
        let tt = create_l3_table_type();
        assert!(tt.supports_stage(AclStage::Ingress));
        assert!(tt.supports_stage(AclStage::Egress));

        let tt = create_drop_table_type();
        assert!(tt.supports_stage(AclStage::Ingress));
        assert!(!tt.supports_stage(AclStage::Egress));
    }
}
