use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::tags::{Ownable, Tags};

string_enum! {
    /// Azure load balancer SKU
    pub enum SKU {
        Basic => "Basic",
        Standard => "Standard",
    }
}

/// LoadBalancer defines an Azure load balancer
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<SKU>,

    /// Retained so stored objects carrying `frontendIpConfig` still parse; never written
    #[serde(rename = "frontendIpConfig", default, skip_serializing)]
    pub frontend_ip_config: FrontendIPConfig,

    #[serde(default)]
    pub backend_pool: BackendPool,

    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl Ownable for LoadBalancer {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// Deprecated placeholder with no fields
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FrontendIPConfig {}

/// BackendPool defines a load balancer backend pool
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BackendPool {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
}

/// PublicIP defines an Azure public IP address
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicIP {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_address: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dns_name: String,
}

impl PublicIP {
    /// Returns true once the provider has assigned an address
    pub fn is_allocated(&self) -> bool {
        !self.ip_address.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku_preserves_unknown_values() {
        assert_eq!(SKU::from("Standard"), SKU::Standard);
        assert_eq!(SKU::from("Gateway").as_str(), "Gateway");
        assert!(!SKU::from("Gateway").is_known());
    }

    #[test]
    fn test_load_balancer_ownership() {
        let lb = LoadBalancer {
            id: "/subscriptions/x/loadBalancers/api".to_string(),
            name: "api".to_string(),
            sku: Some(SKU::Standard),
            ..Default::default()
        };
        assert!(!lb.is_managed("demo"));
        assert!(LoadBalancer::default().is_managed("demo"));
    }

    #[test]
    fn test_public_ip_allocation() {
        let mut ip = PublicIP {
            name: "demo-api".to_string(),
            ..Default::default()
        };
        assert!(!ip.is_allocated());
        ip.ip_address = "20.1.2.3".to_string();
        assert!(ip.is_allocated());
    }
}
