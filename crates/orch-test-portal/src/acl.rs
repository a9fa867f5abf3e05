//! ACL accessor groups.

use std::collections::BTreeMap;

use sonic_orchagent::acl::{AclActionMap, AclMatchMap, AclOrch, AclRule, AclTable};
use sonic_orchagent::oid::RawSaiObjectId;

/// Accessors over a single [`AclRule`].
pub struct AclRuleInternal;

impl AclRuleInternal {
    /// SAI entry OID. Null until the rule has been added to an orch.
    pub fn get_identifier(rule: &AclRule) -> RawSaiObjectId {
        rule.inspect_rule_oid()
    }

    pub fn get_matches(rule: &AclRule) -> AclMatchMap {
        rule.inspect_matches().clone()
    }

    pub fn get_matches_ref(rule: &AclRule) -> &AclMatchMap {
        rule.inspect_matches()
    }

    pub fn get_actions(rule: &AclRule) -> AclActionMap {
        rule.inspect_actions().clone()
    }

    pub fn get_actions_ref(rule: &AclRule) -> &AclActionMap {
        rule.inspect_actions()
    }
}

/// Accessors over the table registry of an [`AclOrch`].
pub struct AclOrchInternal;

impl AclOrchInternal {
    /// Snapshot of the tables keyed by SAI table OID.
    pub fn get_tables(orch: &AclOrch) -> BTreeMap<RawSaiObjectId, AclTable> {
        orch.inspect_tables().clone()
    }

    /// The live registry.
    pub fn get_tables_ref(orch: &AclOrch) -> &BTreeMap<RawSaiObjectId, AclTable> {
        orch.inspect_tables()
    }
}
