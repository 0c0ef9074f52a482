//! Validation and classification over the Azure topology model
//!
//! This library provides:
//! - Validation of topology documents before they reach reconciliation
//! - Role partitioning of subnets and security groups
//! - Per-cluster scope configuration and ownership classification

pub mod error;
pub mod partition;
pub mod scope;
pub mod validation;

pub use error::{CoreError, Result, ValidationError};
pub use partition::{partition_subnets, security_group_for_role, subnet_for_role, RolePartition};
pub use scope::{ClassifiedResource, ClusterScope, ResourceKind};
