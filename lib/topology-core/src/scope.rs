//! Per-cluster configuration and ownership classification
//!
//! A `ClusterScope` is built once per reconciliation pass and owned by it;
//! scopes for different clusters share nothing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use topology_api::v1alpha3::tags::{build_tags, BuildParams};
use topology_api::v1alpha3::{Network, NetworkSpec, Ownable, Ownership, Role, Tags};
use tracing::debug;

use crate::{CoreError, Result};

/// Cluster identity and tagging defaults, loaded from YAML or JSON
///
/// ```yaml
/// clusterName: demo
/// additionalTags:
///   team: infra
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterScope {
    pub cluster_name: String,

    /// Tags applied to every resource the cluster creates
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub additional_tags: Tags,
}

/// Kind of cloud resource in a classification report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    VirtualNetwork,
    SecurityGroup,
    LoadBalancer,
}

/// Ownership decision for one resource
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedResource {
    pub kind: ResourceKind,
    pub name: String,
    pub role: Option<Role>,
    pub ownership: Ownership,
}

impl ClusterScope {
    pub fn new(cluster_name: impl Into<String>) -> Result<Self> {
        Self {
            cluster_name: cluster_name.into(),
            additional_tags: Tags::default(),
        }
        .checked()
    }

    pub fn with_additional_tags(mut self, tags: Tags) -> Self {
        self.additional_tags = tags;
        self
    }

    pub fn from_yaml(source: &str) -> Result<Self> {
        serde_yaml::from_str::<Self>(source)?.checked()
    }

    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str::<Self>(source)?.checked()
    }

    /// Load from a file, parsed as JSON when the extension is `.json` and YAML otherwise
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading cluster scope");
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    fn checked(self) -> Result<Self> {
        if self.cluster_name.trim().is_empty() {
            return Err(CoreError::EmptyClusterName);
        }
        Ok(self)
    }

    /// Classify a resource against this cluster; reads the tags on every call
    pub fn ownership<R: Ownable + ?Sized>(&self, resource: &R) -> Ownership {
        resource.ownership(&self.cluster_name)
    }

    pub fn is_managed<R: Ownable + ?Sized>(&self, resource: &R) -> bool {
        self.ownership(resource).is_managed()
    }

    /// Tags for a resource this cluster is about to create
    pub fn owned_tags(&self, name: Option<&str>, role: Option<&Role>) -> Tags {
        build_tags(BuildParams {
            name: name.map(str::to_string),
            role: role.map(Role::to_string),
            additional: self.additional_tags.clone(),
            ..BuildParams::owned(self.cluster_name.clone())
        })
    }

    /// Ownership of every tagged resource in a desired and observed network
    ///
    /// A security group present in both is classified from its observed copy,
    /// which carries the provider identifier and current tags. The API server
    /// load balancer is reported only once observed.
    pub fn classify_network(&self, spec: &NetworkSpec, observed: &Network) -> Vec<ClassifiedResource> {
        let mut report = vec![ClassifiedResource {
            kind: ResourceKind::VirtualNetwork,
            name: spec.vnet.name.clone(),
            role: None,
            ownership: self.ownership(&spec.vnet),
        }];

        for subnet in &spec.subnets {
            if let Some(sg) = &subnet.security_group {
                report.push(ClassifiedResource {
                    kind: ResourceKind::SecurityGroup,
                    name: sg.name.clone(),
                    role: subnet.role.clone(),
                    ownership: self.ownership(sg),
                });
            }
        }

        for (role, sg) in &observed.security_groups {
            let entry = ClassifiedResource {
                kind: ResourceKind::SecurityGroup,
                name: sg.name.clone(),
                role: Some(role.clone()),
                ownership: self.ownership(sg),
            };
            match report
                .iter_mut()
                .find(|r| r.kind == ResourceKind::SecurityGroup && r.name == sg.name)
            {
                Some(listed) => *listed = entry,
                None => report.push(entry),
            }
        }

        let lb = &observed.api_server_lb;
        if !(lb.id.is_empty() && lb.name.is_empty()) {
            report.push(ClassifiedResource {
                kind: ResourceKind::LoadBalancer,
                name: lb.name.clone(),
                role: Some(Role::ControlPlane),
                ownership: self.ownership(lb),
            });
        }

        for resource in &report {
            debug!(
                cluster = %self.cluster_name,
                kind = ?resource.kind,
                name = %resource.name,
                ownership = ?resource.ownership,
                "classified resource"
            );
        }
        report
    }
}
