//! Configuration checks the model leaves to its callers
//!
//! Every check collects all problems it finds so an operator sees the whole
//! picture in one pass. Nothing here repairs a document.

use topology_api::v1alpha3::{
    AzureClusterSpec, AzureMachineSpec, Image, ImageSelector, NetworkSpec, SecurityGroup,
    Subnets, UserAssignedIdentity, VMIdentity,
};
use tracing::{debug, warn};

use crate::{CoreError, Result, ValidationError};

/// Accepts "*", a single port, or "lo-hi" with lo <= hi, all within 0-65535
pub fn is_valid_port_range(value: &str) -> bool {
    if value == "*" {
        return true;
    }
    match value.split_once('-') {
        Some((lo, hi)) => match (parse_port(lo), parse_port(hi)) {
            (Some(lo), Some(hi)) => lo <= hi,
            _ => false,
        },
        None => parse_port(value).is_some(),
    }
}

fn parse_port(value: &str) -> Option<u16> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn finish(scope: &str, errors: Vec<ValidationError>) -> Result<()> {
    if errors.is_empty() {
        debug!(scope, "validation passed");
        Ok(())
    } else {
        warn!(scope, count = errors.len(), "validation failed");
        Err(CoreError::Invalid(errors))
    }
}

pub(crate) fn check_security_group(sg: &SecurityGroup, path: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (index, rule) in sg.ingress_rules.iter().enumerate() {
        let ports = [
            ("sourcePorts", &rule.source_ports),
            ("destinationPorts", &rule.destination_ports),
        ];
        for (name, value) in ports {
            if let Some(value) = value {
                if !is_valid_port_range(value) {
                    errors.push(ValidationError::InvalidPortRange {
                        field: format!("{}.ingressRule[{}].{}", path, index, name),
                        value: value.clone(),
                    });
                }
            }
        }
    }
    errors
}

pub(crate) fn check_subnets(subnets: &Subnets, path: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for role in subnets.duplicate_roles() {
        errors.push(ValidationError::DuplicateSubnetRole {
            role: role.clone(),
            subnets: subnets
                .with_role(role)
                .into_iter()
                .map(|s| s.name.clone())
                .collect(),
        });
    }

    for (index, subnet) in subnets.iter().enumerate() {
        if let Some(role) = subnet.role.as_ref().filter(|role| !role.is_known()) {
            errors.push(ValidationError::UnrecognizedRole {
                subnet: subnet.name.clone(),
                role: role.clone(),
            });
        }
        if let Some(sg) = &subnet.security_group {
            errors.extend(check_security_group(
                sg,
                &format!("{}[{}].securityGroup", path, index),
            ));
        }
    }

    errors
}

fn check_identity(identity: &VMIdentity, assigned: &[UserAssignedIdentity]) -> Vec<ValidationError> {
    match (identity, assigned.is_empty()) {
        (VMIdentity::UserAssigned, true) => vec![ValidationError::MissingUserAssignedIdentity],
        (VMIdentity::UserAssigned, false) | (_, true) => Vec::new(),
        (other, false) => vec![ValidationError::UnexpectedUserAssignedIdentity {
            identity: other.to_string(),
        }],
    }
}

/// Reject duplicate roles, unrecognized roles and malformed ingress port ranges
pub fn validate_subnets(subnets: &Subnets) -> Result<()> {
    finish("subnets", check_subnets(subnets, "subnets"))
}

/// Reject ingress rules whose port ranges the provider would not accept
pub fn validate_security_group(sg: &SecurityGroup) -> Result<()> {
    finish("securityGroup", check_security_group(sg, "securityGroup"))
}

pub fn validate_network_spec(spec: &NetworkSpec) -> Result<()> {
    finish("networkSpec", check_subnets(&spec.subnets, "networkSpec.subnets"))
}

/// Resolve a selector to one image source, failing when zero or several are set
pub fn validate_image_selector(selector: &ImageSelector) -> Result<Image> {
    selector.select().map_err(|source| {
        warn!(sources = ?selector.populated(), "image selection failed");
        CoreError::Invalid(vec![ValidationError::Image {
            field: "image".to_string(),
            source,
        }])
    })
}

/// UserAssigned needs at least one identity; other modes must not carry any
pub fn validate_identity(identity: &VMIdentity, assigned: &[UserAssignedIdentity]) -> Result<()> {
    finish("identity", check_identity(identity, assigned))
}

pub fn validate_cluster_spec(spec: &AzureClusterSpec) -> Result<()> {
    finish(
        "azureCluster",
        check_subnets(&spec.network_spec.subnets, "spec.networkSpec.subnets"),
    )
}

/// The image is already a single source by construction; identity is checked here
pub fn validate_machine_spec(spec: &AzureMachineSpec) -> Result<()> {
    finish(
        "azureMachine",
        check_identity(&spec.identity, &spec.user_assigned_identities),
    )
}
