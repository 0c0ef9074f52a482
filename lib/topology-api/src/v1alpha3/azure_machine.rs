use k8s_openapi::api::core::v1::NodeAddress;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::tags::Tags;
use super::vm::{
    deserialize_optional_image, Image, ImageSelector, OSDisk, UserAssignedIdentity, VMIdentity,
    VMState,
};

/// AzureMachine describes the Azure virtual machine backing a Cluster API machine
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1alpha3",
    kind = "AzureMachine",
    plural = "azuremachines",
    namespaced,
    derive = "Default",
    derive = "PartialEq",
    status = "AzureMachineStatus",
    printcolumn = r#"{"name":"Ready","type":"boolean","jsonPath":".status.ready"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.vmState"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct AzureMachineSpec {
    /// Provider identifier of the VM, set once it exists
    #[serde(rename = "providerID", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    pub vm_size: String,

    /// Availability zone the VM is placed in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_domain: Option<String>,

    /// Image to boot; the provider default applies when unset
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_image"
    )]
    #[schemars(with = "Option<ImageSelector>")]
    pub image: Option<Image>,

    #[serde(default)]
    pub identity: VMIdentity,

    /// Identities attached when `identity` is UserAssigned
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_assigned_identities: Vec<UserAssignedIdentity>,

    pub os_disk: OSDisk,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ssh_public_key: String,

    /// Tags added to the resources created for this machine
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub additional_tags: Tags,

    #[serde(rename = "allocatePublicIP", default)]
    pub allocate_public_ip: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerated_networking: Option<bool>,
}

/// Observed state of an AzureMachine
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AzureMachineStatus {
    #[serde(default)]
    pub ready: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<NodeAddress>,

    /// Provisioning state of the backing VM
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_state: Option<VMState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

impl AzureMachine {
    /// Returns true when the reported VM state is one the controller should not act on
    pub fn has_unknown_state(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|status| status.vm_state.as_ref())
            .is_some_and(|state| !state.is_actionable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::CustomResourceExt;

    #[test]
    fn test_crd_identity() {
        let crd = AzureMachine::crd();
        assert_eq!(crd.spec.group, "infrastructure.cluster.x-k8s.io");
        assert_eq!(crd.spec.names.kind, "AzureMachine");
        assert_eq!(crd.spec.versions[0].name, "v1alpha3");
    }

    #[test]
    fn test_unknown_vm_state() {
        let mut machine = AzureMachine::new("demo-cp-0", AzureMachineSpec::default());
        assert!(!machine.has_unknown_state());

        machine.status = Some(AzureMachineStatus {
            vm_state: Some(VMState::Succeeded),
            ..Default::default()
        });
        assert!(!machine.has_unknown_state());

        machine.status = Some(AzureMachineStatus {
            vm_state: Some(VMState::from("Hibernating")),
            ..Default::default()
        });
        assert!(machine.has_unknown_state());
    }
}
