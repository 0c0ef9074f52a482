use thiserror::Error;
use topology_api::v1alpha3::Role;
use topology_api::ImageSelectionError;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid topology: {}", join(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Role {role} is claimed by several subnets: {}", .subnets.join(", "))]
    AmbiguousRole { role: Role, subnets: Vec<String> },

    #[error("Cluster name must not be empty")]
    EmptyClusterName,

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A single configuration problem found in a topology document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("subnets {} all claim role {role}", .subnets.join(", "))]
    DuplicateSubnetRole { role: Role, subnets: Vec<String> },

    #[error("subnet {subnet} has unrecognized role {role}")]
    UnrecognizedRole { subnet: String, role: Role },

    #[error("{field}: {source}")]
    Image {
        field: String,
        #[source]
        source: ImageSelectionError,
    },

    #[error("{field}: invalid port range {value:?}")]
    InvalidPortRange { field: String, value: String },

    #[error("identity UserAssigned requires at least one user-assigned identity")]
    MissingUserAssignedIdentity,

    #[error("user-assigned identities are only allowed with identity UserAssigned, got {identity}")]
    UnexpectedUserAssignedIdentity { identity: String },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for CoreError {
    fn from(errors: Vec<ValidationError>) -> Self {
        CoreError::Invalid(errors)
    }
}
