//! Routing of subnets and security groups to machine pools by role

use std::collections::BTreeSet;
use topology_api::v1alpha3::{Network, Role, SecurityGroup, SubnetSpec, Subnets};
use tracing::debug;

use crate::{CoreError, Result};

/// Subnets grouped by role, each group in declaration order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RolePartition<'a> {
    pub control_plane: Vec<&'a SubnetSpec>,
    pub node: Vec<&'a SubnetSpec>,
    /// Subnets whose role this version does not recognize
    pub unrecognized: Vec<&'a SubnetSpec>,
    /// Subnets without a role
    pub unassigned: Vec<&'a SubnetSpec>,
}

impl RolePartition<'_> {
    /// Returns true if any role, recognized or not, is claimed by more than one subnet
    pub fn has_conflicts(&self) -> bool {
        if self.control_plane.len() > 1 || self.node.len() > 1 {
            return true;
        }
        let mut seen = BTreeSet::new();
        self.unrecognized
            .iter()
            .filter_map(|subnet| subnet.role.as_ref())
            .any(|role| !seen.insert(role))
    }
}

pub fn partition_subnets(subnets: &Subnets) -> RolePartition<'_> {
    let mut partition = RolePartition::default();
    for subnet in subnets {
        match &subnet.role {
            Some(Role::ControlPlane) => partition.control_plane.push(subnet),
            Some(Role::Node) => partition.node.push(subnet),
            Some(Role::Other(_)) => partition.unrecognized.push(subnet),
            None => partition.unassigned.push(subnet),
        }
    }
    debug!(
        control_plane = partition.control_plane.len(),
        node = partition.node.len(),
        unrecognized = partition.unrecognized.len(),
        unassigned = partition.unassigned.len(),
        "partitioned subnets"
    );
    partition
}

/// The one subnet serving `role`
///
/// Several subnets with the same role is a configuration error; no subnet
/// is chosen over another.
pub fn subnet_for_role<'a>(subnets: &'a Subnets, role: &Role) -> Result<Option<&'a SubnetSpec>> {
    match subnets.with_role(role).as_slice() {
        [] => Ok(None),
        [subnet] => Ok(Some(*subnet)),
        claimants => Err(CoreError::AmbiguousRole {
            role: role.clone(),
            subnets: claimants.iter().map(|s| s.name.clone()).collect(),
        }),
    }
}

/// Observed security group serving `role`
pub fn security_group_for_role<'a>(network: &'a Network, role: &Role) -> Option<&'a SecurityGroup> {
    network.security_groups.get(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(name: &str, role: Option<&str>) -> SubnetSpec {
        SubnetSpec {
            name: name.to_string(),
            role: role.map(Role::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_partition_preserves_order() {
        let subnets: Subnets = vec![
            subnet("nodes-a", Some("node")),
            subnet("cp", Some("control-plane")),
            subnet("nodes-b", Some("node")),
            subnet("bastion", Some("bastion")),
            subnet("spare", None),
        ]
        .into();

        fn names(group: &[&SubnetSpec]) -> Vec<String> {
            group.iter().map(|s| s.name.clone()).collect()
        }

        let partition = partition_subnets(&subnets);
        assert_eq!(names(&partition.control_plane), vec!["cp"]);
        assert_eq!(names(&partition.node), vec!["nodes-a", "nodes-b"]);
        assert_eq!(names(&partition.unrecognized), vec!["bastion"]);
        assert_eq!(names(&partition.unassigned), vec!["spare"]);
        assert!(partition.has_conflicts());
    }

    #[test]
    fn test_conflicts_among_unrecognized_roles() {
        let distinct: Subnets = vec![
            subnet("cp", Some("control-plane")),
            subnet("bastion", Some("bastion")),
            subnet("edge", Some("edge")),
        ]
        .into();
        assert!(!partition_subnets(&distinct).has_conflicts());

        let repeated: Subnets = vec![
            subnet("bastion-a", Some("bastion")),
            subnet("bastion-b", Some("bastion")),
        ]
        .into();
        assert!(partition_subnets(&repeated).has_conflicts());
    }

    #[test]
    fn test_subnet_for_role() {
        let subnets: Subnets =
            vec![subnet("cp", Some("control-plane")), subnet("nodes", Some("node"))].into();

        let cp = subnet_for_role(&subnets, &Role::ControlPlane).unwrap();
        assert_eq!(cp.map(|s| s.name.as_str()), Some("cp"));

        let missing = subnet_for_role(&subnets, &Role::from("bastion")).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_subnet_for_role_refuses_to_choose() {
        let subnets: Subnets = vec![
            subnet("cp-a", Some("control-plane")),
            subnet("cp-b", Some("control-plane")),
        ]
        .into();

        match subnet_for_role(&subnets, &Role::ControlPlane) {
            Err(CoreError::AmbiguousRole { role, subnets }) => {
                assert_eq!(role, Role::ControlPlane);
                assert_eq!(subnets, vec!["cp-a", "cp-b"]);
            }
            other => panic!("expected ambiguous role, got {:?}", other),
        }
    }

    #[test]
    fn test_security_group_for_role() {
        let mut network = Network::default();
        network.security_groups.insert(
            Role::Node,
            SecurityGroup {
                name: "node-nsg".to_string(),
                ..Default::default()
            },
        );

        assert_eq!(
            security_group_for_role(&network, &Role::Node).map(|sg| sg.name.as_str()),
            Some("node-nsg")
        );
        assert!(security_group_for_role(&network, &Role::ControlPlane).is_none());
    }
}
