/// API version v1alpha3 of the Azure infrastructure types

pub mod azure_cluster;
pub mod azure_machine;
pub mod load_balancer;
pub mod network;
pub mod tags;
pub mod vm;

pub use azure_cluster::{APIEndpoint, AzureCluster, AzureClusterSpec, AzureClusterStatus};
pub use azure_machine::{AzureMachine, AzureMachineSpec, AzureMachineStatus};
pub use load_balancer::{BackendPool, FrontendIPConfig, LoadBalancer, PublicIP, SKU};
pub use network::{
    IngressRule, IngressRules, Network, NetworkSpec, Role, SecurityGroup, SecurityGroupProtocol,
    SecurityGroupRole, SubnetRole, SubnetSpec, Subnets, VnetSpec,
};
pub use tags::{BuildParams, Ownable, Ownership, ResourceLifecycle, Tags};
pub use vm::{
    AvailabilityZone, AzureMarketplaceImage, AzureSharedGalleryImage, Image, ImageSelector,
    ManagedDisk, OSDisk, UserAssignedIdentity, VMIdentity, VMState, VM,
};

/// API group for Cluster API Azure infrastructure resources
pub const API_GROUP: &str = "infrastructure.cluster.x-k8s.io";
/// API version for Cluster API Azure infrastructure resources
pub const API_VERSION: &str = "v1alpha3";
