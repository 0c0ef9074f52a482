use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use super::load_balancer::{LoadBalancer, PublicIP};
use super::tags::{Ownable, Tags};

/// Role label of control plane machines
pub const CONTROL_PLANE: &str = "control-plane";
/// Role label of workload machines
pub const NODE: &str = "node";

string_enum! {
    /// Machine pool a subnet or security group serves
    pub enum Role {
        /// Kubernetes control plane machines
        ControlPlane => "control-plane",
        /// Kubernetes workload machines
        Node => "node",
    }
}

/// Role of a subnet
pub type SubnetRole = Role;
/// Role of a security group
pub type SecurityGroupRole = Role;

/// VnetSpec configures an Azure virtual network
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VnetSpec {
    /// Resource group of an existing virtual network, or where a managed one is created
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_group: String,

    /// Provider identifier of the virtual network, empty until allocated
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Name of the virtual network resource
    pub name: String,

    /// CIDR block used when creating a managed virtual network
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cidr_block: String,

    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl Ownable for VnetSpec {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// SubnetSpec configures an Azure subnet
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    /// Machine pool this subnet serves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<SubnetRole>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cidr_block: String,

    /// Private IP of the internal API server load balancer (control plane subnet only)
    #[serde(
        rename = "internalLBIPAddress",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub internal_lb_ip_address: String,

    /// Network security group attached to this subnet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group: Option<SecurityGroup>,
}

impl SubnetSpec {
    pub fn has_role(&self, role: &Role) -> bool {
        self.role.as_ref() == Some(role)
    }
}

/// Ordered collection of subnets
///
/// More than one subnet may claim the same role. Nothing here picks a winner;
/// callers must detect duplicates before acting on the topology.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Subnets(Vec<SubnetSpec>);

impl Subnets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every subnet with the given role, in declaration order
    pub fn with_role(&self, role: &Role) -> Vec<&SubnetSpec> {
        self.0.iter().filter(|subnet| subnet.has_role(role)).collect()
    }

    /// Number of subnets claiming each role
    pub fn role_counts(&self) -> BTreeMap<&Role, usize> {
        let mut counts = BTreeMap::new();
        for role in self.0.iter().filter_map(|subnet| subnet.role.as_ref()) {
            *counts.entry(role).or_insert(0) += 1;
        }
        counts
    }

    /// Roles claimed by more than one subnet
    pub fn duplicate_roles(&self) -> Vec<&Role> {
        self.role_counts()
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(role, _)| role)
            .collect()
    }

    pub fn into_inner(self) -> Vec<SubnetSpec> {
        self.0
    }
}

impl Deref for Subnets {
    type Target = Vec<SubnetSpec>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Subnets {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<SubnetSpec>> for Subnets {
    fn from(subnets: Vec<SubnetSpec>) -> Self {
        Self(subnets)
    }
}

impl FromIterator<SubnetSpec> for Subnets {
    fn from_iter<I: IntoIterator<Item = SubnetSpec>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Subnets {
    type Item = &'a SubnetSpec;
    type IntoIter = std::slice::Iter<'a, SubnetSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// SecurityGroup defines an Azure network security group
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroup {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Rules in evaluation order
    #[serde(rename = "ingressRule", default, skip_serializing_if = "IngressRules::is_empty")]
    pub ingress_rules: IngressRules,

    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl Ownable for SecurityGroup {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }
}

string_enum! {
    /// IP protocol matched by a security group rule
    pub enum SecurityGroupProtocol {
        /// Wildcard for all IP protocols
        All => "*",
        Tcp => "Tcp",
        Udp => "Udp",
    }
}

/// IngressRule defines an Azure ingress rule for security groups
///
/// Ports and address prefixes use the provider's own syntax and are passed
/// through untouched; `None` means the field was never set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    pub description: String,

    pub protocol: SecurityGroupProtocol,

    /// Source port or range, 0-65535, or "*"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ports: Option<String>,

    /// Destination port or range, 0-65535, or "*"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_ports: Option<String>,

    /// Source CIDR, IP range, "*" or a service tag such as "VirtualNetwork"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Destination CIDR, IP range, "*" or a service tag such as "Internet"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl IngressRule {
    pub fn new(description: impl Into<String>, protocol: SecurityGroupProtocol) -> Self {
        Self {
            description: description.into(),
            protocol,
            source_ports: None,
            destination_ports: None,
            source: None,
            destination: None,
        }
    }
}

/// Ordered list of ingress rules; the provider evaluates them in sequence
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct IngressRules(Vec<IngressRule>);

impl IngressRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<IngressRule> {
        self.0
    }
}

impl Deref for IngressRules {
    type Target = Vec<IngressRule>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for IngressRules {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<IngressRule>> for IngressRules {
    fn from(rules: Vec<IngressRule>) -> Self {
        Self(rules)
    }
}

impl FromIterator<IngressRule> for IngressRules {
    fn from_iter<I: IntoIterator<Item = IngressRule>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IngressRules {
    type Item = &'a IngressRule;
    type IntoIter = std::slice::Iter<'a, IngressRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// NetworkSpec describes the desired Azure networking resources
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkSpec {
    #[serde(default)]
    pub vnet: VnetSpec,

    /// Control plane and node subnets
    #[serde(default, skip_serializing_if = "Subnets::is_empty")]
    pub subnets: Subnets,
}

/// Network records the observed state of Azure networking resources
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Security group per role
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_groups: BTreeMap<SecurityGroupRole, SecurityGroup>,

    /// Kubernetes API server load balancer
    #[serde(rename = "apiServerLb", default)]
    pub api_server_lb: LoadBalancer,

    /// Kubernetes API server public IP address
    #[serde(rename = "apiServerIp", default)]
    pub api_server_ip: PublicIP,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v1alpha3::tags::cluster_tag_key;

    fn subnet(name: &str, role: Option<Role>) -> SubnetSpec {
        SubnetSpec {
            name: name.to_string(),
            role,
            ..Default::default()
        }
    }

    #[test]
    fn test_vnet_without_id_is_managed() {
        let vnet = VnetSpec {
            name: "vnet-1".to_string(),
            ..Default::default()
        };
        assert!(vnet.is_managed("demo"));

        let foreign = VnetSpec {
            tags: [(cluster_tag_key("other"), "owned")].into_iter().collect(),
            ..vnet
        };
        assert!(foreign.is_managed("demo"));
    }

    #[test]
    fn test_vnet_ownership_scenario() {
        let mut vnet = VnetSpec {
            id: "/subscriptions/x/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet-1"
                .to_string(),
            name: "vnet-1".to_string(),
            ..Default::default()
        };
        assert!(!vnet.is_managed("demo"));

        vnet.tags
            .insert("sigs.k8s.io_cluster-api-provider-azure_cluster_demo", "owned");
        assert!(vnet.is_managed("demo"));
        assert!(!vnet.is_managed("other"));
    }

    #[test]
    fn test_role_wire_values() {
        assert_eq!(Role::ControlPlane.as_str(), CONTROL_PLANE);
        assert_eq!(Role::Node.as_str(), NODE);
        assert_eq!(Role::from("control-plane"), Role::ControlPlane);
        assert_eq!(Role::from("bastion"), Role::Other("bastion".to_string()));
        assert!(!Role::from("bastion").is_known());
    }

    #[test]
    fn test_known_strings_never_become_other() {
        assert_eq!(Role::from("node".to_string()), Role::Node);
        assert_eq!("control-plane".parse::<Role>(), Ok(Role::ControlPlane));

        let hand_built = Role::Other(NODE.to_string());
        assert_ne!(hand_built, Role::Node);
        let read_back: Role = serde_json::from_value(serde_json::to_value(&hand_built).unwrap()).unwrap();
        assert_eq!(read_back, Role::Node);
    }

    #[test]
    fn test_duplicate_roles_are_representable() {
        let subnets: Subnets = vec![
            subnet("cp-a", Some(Role::ControlPlane)),
            subnet("cp-b", Some(Role::ControlPlane)),
            subnet("nodes", Some(Role::Node)),
            subnet("spare", None),
        ]
        .into();

        assert_eq!(subnets.len(), 4);
        assert_eq!(subnets.duplicate_roles(), vec![&Role::ControlPlane]);
        let names: Vec<_> = subnets
            .with_role(&Role::ControlPlane)
            .into_iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["cp-a", "cp-b"]);
        assert_eq!(subnets.role_counts().get(&Role::Node), Some(&1));
    }

    #[test]
    fn test_security_group_ownership() {
        let sg = SecurityGroup {
            id: "/subscriptions/x/nsg".to_string(),
            name: "cp-nsg".to_string(),
            ..Default::default()
        };
        assert!(!sg.is_managed("demo"));
        assert!(SecurityGroup::default().is_managed("demo"));
    }
}
