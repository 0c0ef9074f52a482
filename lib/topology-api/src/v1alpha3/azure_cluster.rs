use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::network::{Network, NetworkSpec};
use super::tags::Tags;

/// AzureCluster describes the Azure infrastructure backing a Cluster API cluster
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1alpha3",
    kind = "AzureCluster",
    plural = "azureclusters",
    namespaced,
    derive = "Default",
    derive = "PartialEq",
    status = "AzureClusterStatus",
    printcolumn = r#"{"name":"Ready","type":"boolean","jsonPath":".status.ready"}"#,
    printcolumn = r#"{"name":"Location","type":"string","jsonPath":".spec.location"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct AzureClusterSpec {
    /// Desired virtual network and subnets
    #[serde(default)]
    pub network_spec: NetworkSpec,

    /// Resource group holding the cluster's resources
    pub resource_group: String,

    #[serde(rename = "subscriptionID", default, skip_serializing_if = "String::is_empty")]
    pub subscription_id: String,

    /// Azure region, e.g. "westus2"
    pub location: String,

    /// Endpoint used to reach the control plane, set once the load balancer exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_endpoint: Option<APIEndpoint>,

    /// Tags added to every resource created for this cluster
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub additional_tags: Tags,
}

/// Host and port of the Kubernetes API server
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct APIEndpoint {
    pub host: String,
    pub port: i32,
}

/// Observed state of an AzureCluster
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AzureClusterStatus {
    /// Networking resources as last observed
    #[serde(default)]
    pub network: Network,

    /// Whether the infrastructure is ready for machines
    #[serde(default)]
    pub ready: bool,
}
