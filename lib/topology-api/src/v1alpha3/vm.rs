use k8s_openapi::api::core::v1::NodeAddress;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::tags::{Ownable, Tags};
use crate::error::ImageSelectionError;

string_enum! {
    /// Provisioning state of an Azure virtual machine as reported by the provider
    pub enum VMState {
        Creating => "Creating",
        Deleting => "Deleting",
        Failed => "Failed",
        Migrating => "Migrating",
        Succeeded => "Succeeded",
        Updating => "Updating",
    }
}

impl VMState {
    /// Whether the provider may report `next` directly after `self`
    pub fn can_transition_to(&self, next: &VMState) -> bool {
        use VMState::*;
        matches!(
            (self, next),
            (Creating, Succeeded | Failed)
                | (Succeeded, Updating | Migrating | Deleting)
                | (Updating, Succeeded | Failed)
                | (Migrating, Succeeded | Failed)
                | (Failed, Creating | Deleting)
        )
    }

    /// States reachable from this one
    pub fn successors(&self) -> Vec<VMState> {
        use VMState::*;
        match self {
            Creating | Updating | Migrating => vec![Succeeded, Failed],
            Succeeded => vec![Updating, Migrating, Deleting],
            Failed => vec![Creating, Deleting],
            Deleting | Other(_) => Vec::new(),
        }
    }

    /// Deleting ends with the resource removed
    pub fn is_terminal(&self) -> bool {
        matches!(self, VMState::Deleting)
    }

    /// Unrecognized states mean "unknown, do not act"
    pub fn is_actionable(&self) -> bool {
        self.is_known()
    }
}

string_enum! {
    /// Managed identity mode of a virtual machine
    pub enum VMIdentity {
        None => "None",
        SystemAssigned => "SystemAssigned",
        UserAssigned => "UserAssigned",
    }
}

impl Default for VMIdentity {
    fn default() -> Self {
        VMIdentity::None
    }
}

/// A user-assigned identity attached to Azure resources
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserAssignedIdentity {
    /// azure:///subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.ManagedIdentity/userAssignedIdentities/{name}
    #[serde(rename = "providerID")]
    pub provider_id: String,
}

/// Image published in the Azure Marketplace
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AzureMarketplaceImage {
    /// Organization that created the image
    pub publisher: String,
    /// Group of related images, e.g. UbuntuServer
    pub offer: String,
    /// Instance of an offer, e.g. 18.04-LTS
    pub sku: String,
    /// Major.Minor.Build or "latest"; passed to the provider unchecked
    pub version: String,
}

/// Image stored in a Shared Image Gallery
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AzureSharedGalleryImage {
    #[serde(rename = "subscriptionID")]
    pub subscription_id: String,
    pub resource_group: String,
    pub gallery: String,
    pub name: String,
    /// Major.Minor.Build or "latest"; passed to the provider unchecked
    pub version: String,
}

/// Source of a VM image; exactly one variant by construction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ImageSelector", into = "ImageSelector")]
pub enum Image {
    /// Image referenced by provider identifier
    Id(String),
    SharedGallery(AzureSharedGalleryImage),
    Marketplace(AzureMarketplaceImage),
}

impl Image {
    pub fn by_id(id: impl Into<String>) -> Self {
        Image::Id(id.into())
    }

    pub fn shared_gallery(image: AzureSharedGalleryImage) -> Self {
        Image::SharedGallery(image)
    }

    pub fn marketplace(image: AzureMarketplaceImage) -> Self {
        Image::Marketplace(image)
    }
}

impl JsonSchema for Image {
    fn schema_name() -> String {
        "Image".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        ImageSelector::json_schema(gen)
    }
}

/// Wire form of [`Image`]: three optional sources of which one should be set
///
/// Documents may carry zero or several sources; [`ImageSelector::select`]
/// rejects both rather than guessing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_gallery: Option<AzureSharedGalleryImage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketplace: Option<AzureMarketplaceImage>,
}

impl ImageSelector {
    /// Names of the sources that are set
    pub fn populated(&self) -> Vec<&'static str> {
        let mut set = Vec::new();
        if self.id.is_some() {
            set.push("id");
        }
        if self.shared_gallery.is_some() {
            set.push("sharedGallery");
        }
        if self.marketplace.is_some() {
            set.push("marketplace");
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.populated().is_empty()
    }

    /// Resolve to a single image source
    pub fn select(&self) -> Result<Image, ImageSelectionError> {
        self.clone().try_into()
    }
}

impl TryFrom<ImageSelector> for Image {
    type Error = ImageSelectionError;

    fn try_from(selector: ImageSelector) -> Result<Self, Self::Error> {
        let populated = selector.populated();
        match selector {
            ImageSelector {
                id: Some(id),
                shared_gallery: None,
                marketplace: None,
            } => Ok(Image::Id(id)),
            ImageSelector {
                id: None,
                shared_gallery: Some(image),
                marketplace: None,
            } => Ok(Image::SharedGallery(image)),
            ImageSelector {
                id: None,
                shared_gallery: None,
                marketplace: Some(image),
            } => Ok(Image::Marketplace(image)),
            _ if populated.is_empty() => Err(ImageSelectionError::NoneSet),
            _ => Err(ImageSelectionError::MultipleSet(populated)),
        }
    }
}

impl From<Image> for ImageSelector {
    fn from(image: Image) -> Self {
        match image {
            Image::Id(id) => ImageSelector {
                id: Some(id),
                ..Default::default()
            },
            Image::SharedGallery(image) => ImageSelector {
                shared_gallery: Some(image),
                ..Default::default()
            },
            Image::Marketplace(image) => ImageSelector {
                marketplace: Some(image),
                ..Default::default()
            },
        }
    }
}

/// Reads `"image": {}` as no image; a selector with several sources is an error
pub(crate) fn deserialize_optional_image<'de, D>(deserializer: D) -> Result<Option<Image>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<ImageSelector>::deserialize(deserializer)? {
        Some(selector) if !selector.is_empty() => Image::try_from(selector)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// OSDisk defines the operating system disk of a VM
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OSDisk {
    pub os_type: String,

    #[serde(rename = "diskSizeGB")]
    pub disk_size_gb: i32,

    pub managed_disk: ManagedDisk,
}

/// ManagedDisk defines the managed disk options of a VM
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDisk {
    pub storage_account_type: String,
}

/// Deprecated: superseded by failure domains
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AvailabilityZone {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// VM describes an Azure virtual machine
///
/// `state` is the only field that changes after creation; everything else is
/// fixed at creation or observed from the provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VM {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub availability_zone: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vm_size: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_image"
    )]
    #[schemars(with = "Option<ImageSelector>")]
    pub image: Option<Image>,

    #[serde(default)]
    pub os_disk: OSDisk,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub startup_script: String,

    /// Provisioning state; only present in provider responses
    #[serde(rename = "vmState", skip_serializing_if = "Option::is_none")]
    pub state: Option<VMState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<VMIdentity>,

    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,

    /// Addresses reported for the VM
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<NodeAddress>,
}

impl Ownable for VM {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }
}
