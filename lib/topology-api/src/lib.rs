//! Azure infrastructure topology types for Cluster API
//!
//! This library models the desired and observed state of the cloud resources
//! backing a managed Kubernetes cluster:
//! - VnetSpec, SubnetSpec, SecurityGroup: the virtual network and its subnets
//! - LoadBalancer, PublicIP: the API server load balancing surface
//! - VM, Image, OSDisk: compute instances and their provisioning state
//! - Tags: ownership markers deciding which resources a cluster may mutate
//! - AzureCluster, AzureMachine: custom resources embedding the model

#[macro_use]
mod string_enum;

pub mod error;
pub mod v1alpha3;

pub use error::ImageSelectionError;
pub use v1alpha3::{
    AzureCluster, AzureMachine, Image, ImageSelector, LoadBalancer, Network, NetworkSpec,
    Ownable, Ownership, PublicIP, Role, SecurityGroup, SubnetSpec, Subnets, Tags, VMState,
    VnetSpec, VM,
};
