//! Resource tags and the cluster ownership convention
//!
//! A resource belongs to a cluster when its tags carry
//! `sigs.k8s.io_cluster-api-provider-azure_cluster_<cluster>: owned`.
//! All construction and parsing of that key goes through this module.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix shared by every tag key this provider writes
pub const PROVIDER_TAG_PREFIX: &str = "sigs.k8s.io_cluster-api-provider-azure_";
/// Prefix of the per-cluster ownership tag key
pub const CLUSTER_TAG_PREFIX: &str = "sigs.k8s.io_cluster-api-provider-azure_cluster_";
/// Tag key recording the role of a resource
pub const ROLE_TAG_KEY: &str = "sigs.k8s.io_cluster-api-provider-azure_role";
/// Tag key carrying the human readable resource name
pub const NAME_TAG_KEY: &str = "Name";
/// Prefix used by the in-tree cloud provider for its own cluster tags
pub const CLOUD_PROVIDER_TAG_PREFIX: &str = "kubernetes.io_cluster_";

string_enum! {
    /// Lifecycle recorded in a cluster tag
    pub enum ResourceLifecycle {
        /// The cluster created the resource and is responsible for deleting it
        Owned => "owned",
        /// The resource is used by the cluster but outlives it
        Shared => "shared",
    }
}

/// Ownership tag key for the given cluster
pub fn cluster_tag_key(cluster_name: &str) -> String {
    format!("{}{}", CLUSTER_TAG_PREFIX, cluster_name)
}

/// Returns true for keys only this provider or the cloud provider may write
pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(PROVIDER_TAG_PREFIX) || key.starts_with(CLOUD_PROVIDER_TAG_PREFIX)
}

/// Extract the cluster name from an ownership tag key
pub fn parse_cluster_tag_key(key: &str) -> Option<&str> {
    key.strip_prefix(CLUSTER_TAG_PREFIX)
        .filter(|name| !name.is_empty())
}

/// Tags is a collection of key/value annotations on a cloud resource
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Lifecycle recorded for the cluster, if the cluster tag is present
    pub fn lifecycle_for(&self, cluster_name: &str) -> Option<ResourceLifecycle> {
        self.0
            .get(&cluster_tag_key(cluster_name))
            .map(|value| ResourceLifecycle::from(value.as_str()))
    }

    /// Returns true if the tags carry the ownership marker for this cluster
    pub fn has_owned(&self, cluster_name: &str) -> bool {
        self.lifecycle_for(cluster_name) == Some(ResourceLifecycle::Owned)
    }

    /// Names of every cluster claiming ownership through these tags
    pub fn owning_clusters(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, value)| ResourceLifecycle::from(value.as_str()) == ResourceLifecycle::Owned)
            .filter_map(|(key, _)| parse_cluster_tag_key(key))
            .collect()
    }

    /// Copy every entry of `other` into these tags, overwriting on conflict
    pub fn merge(&mut self, other: &Tags) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Entries of `self` that are missing from `other` or carry a different value
    pub fn difference(&self, other: &Tags) -> Tags {
        self.0
            .iter()
            .filter(|(key, value)| other.0.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl From<BTreeMap<String, String>> for Tags {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parameters for building the tag set of a newly created resource
#[derive(Clone, Debug)]
pub struct BuildParams {
    pub cluster_name: String,
    pub lifecycle: ResourceLifecycle,
    pub name: Option<String>,
    pub role: Option<String>,
    /// User supplied tags; reserved keys among them are dropped
    pub additional: Tags,
}

impl BuildParams {
    pub fn owned(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            lifecycle: ResourceLifecycle::Owned,
            name: None,
            role: None,
            additional: Tags::default(),
        }
    }
}

/// Build the complete tag set for a resource in one step
pub fn build_tags(params: BuildParams) -> Tags {
    let mut tags: Tags = params
        .additional
        .0
        .into_iter()
        .filter(|(key, _)| !is_reserved_key(key))
        .collect();
    tags.insert(cluster_tag_key(&params.cluster_name), params.lifecycle.as_str());
    if let Some(role) = params.role {
        tags.insert(ROLE_TAG_KEY, role);
    }
    if let Some(name) = params.name {
        tags.insert(NAME_TAG_KEY, name);
    }
    tags
}

/// How a cluster relates to a cloud resource
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// No provider identifier yet; the cluster is expected to create it
    Unallocated,
    /// Allocated and tagged as owned by the cluster
    Owned,
    /// Allocated by someone else; consume it, never mutate or delete it
    External,
}

impl Ownership {
    pub fn is_managed(self) -> bool {
        !matches!(self, Ownership::External)
    }

    /// Only resources carrying the cluster's ownership marker may be deleted
    pub fn may_delete(self) -> bool {
        matches!(self, Ownership::Owned)
    }
}

/// Classify a resource from its provider identifier and tags
pub fn classify(identifier: &str, tags: &Tags, cluster_name: &str) -> Ownership {
    if identifier.is_empty() {
        Ownership::Unallocated
    } else if tags.has_owned(cluster_name) {
        Ownership::Owned
    } else {
        Ownership::External
    }
}

/// Returns true if the cluster is responsible for the resource's lifecycle
pub fn is_managed(identifier: &str, tags: &Tags, cluster_name: &str) -> bool {
    classify(identifier, tags, cluster_name).is_managed()
}

/// A tagged cloud resource whose lifecycle may belong to a cluster
///
/// Classification reads the current tags every time; callers must not cache
/// the result across mutations since tags can change out of band.
pub trait Ownable {
    /// Provider assigned identifier, empty until the resource exists
    fn provider_id(&self) -> &str;

    fn tags(&self) -> &Tags;

    fn ownership(&self, cluster_name: &str) -> Ownership {
        classify(self.provider_id(), self.tags(), cluster_name)
    }

    fn is_managed(&self, cluster_name: &str) -> bool {
        self.ownership(cluster_name).is_managed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned_by(cluster: &str) -> Tags {
        [(cluster_tag_key(cluster), "owned")].into_iter().collect()
    }

    #[test]
    fn test_cluster_tag_key_round_trip() {
        let key = cluster_tag_key("demo");
        assert_eq!(key, "sigs.k8s.io_cluster-api-provider-azure_cluster_demo");
        assert_eq!(parse_cluster_tag_key(&key), Some("demo"));
        assert_eq!(parse_cluster_tag_key(CLUSTER_TAG_PREFIX), None);
        assert_eq!(parse_cluster_tag_key("Name"), None);
    }

    #[test]
    fn test_has_owned_is_cluster_scoped() {
        let tags = owned_by("demo");
        assert!(tags.has_owned("demo"));
        assert!(!tags.has_owned("other"));
    }

    #[test]
    fn test_shared_lifecycle_is_not_ownership() {
        let tags: Tags = [(cluster_tag_key("demo"), "shared")].into_iter().collect();
        assert_eq!(tags.lifecycle_for("demo"), Some(ResourceLifecycle::Shared));
        assert!(!tags.has_owned("demo"));
    }

    #[test]
    fn test_unknown_lifecycle_preserved() {
        let tags: Tags = [(cluster_tag_key("demo"), "borrowed")].into_iter().collect();
        assert_eq!(
            tags.lifecycle_for("demo"),
            Some(ResourceLifecycle::Other("borrowed".to_string()))
        );
        assert!(!tags.has_owned("demo"));
    }

    #[test]
    fn test_owning_clusters() {
        let mut tags = owned_by("a");
        tags.insert(cluster_tag_key("b"), "shared");
        tags.insert(cluster_tag_key("c"), "owned");
        tags.insert("Name", "vnet");
        assert_eq!(tags.owning_clusters(), vec!["a", "c"]);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("", &Tags::new(), "demo"), Ownership::Unallocated);
        assert_eq!(classify("", &owned_by("other"), "demo"), Ownership::Unallocated);
        assert_eq!(classify("/subscriptions/x", &owned_by("demo"), "demo"), Ownership::Owned);
        assert_eq!(classify("/subscriptions/x", &Tags::new(), "demo"), Ownership::External);
        assert_eq!(classify("/subscriptions/x", &owned_by("demo"), "other"), Ownership::External);
    }

    #[test]
    fn test_ownership_permissions() {
        assert!(Ownership::Unallocated.is_managed());
        assert!(!Ownership::Unallocated.may_delete());
        assert!(Ownership::Owned.is_managed());
        assert!(Ownership::Owned.may_delete());
        assert!(!Ownership::External.is_managed());
        assert!(!Ownership::External.may_delete());
    }

    #[test]
    fn test_build_tags_reserved_keys_win() {
        let mut additional = Tags::new();
        additional.insert("team", "infra");
        additional.insert(NAME_TAG_KEY, "spoofed");
        additional.insert(cluster_tag_key("demo"), "shared");

        let tags = build_tags(BuildParams {
            name: Some("demo-vnet".to_string()),
            role: Some("common".to_string()),
            additional,
            ..BuildParams::owned("demo")
        });

        assert_eq!(tags.get("team"), Some("infra"));
        assert_eq!(tags.get(NAME_TAG_KEY), Some("demo-vnet"));
        assert_eq!(tags.get(ROLE_TAG_KEY), Some("common"));
        assert!(tags.has_owned("demo"));
        assert_eq!(tags.len(), 4);
    }

    #[test]
    fn test_build_tags_drops_foreign_markers() {
        let mut additional = owned_by("other");
        additional.insert(ROLE_TAG_KEY, "control-plane");
        additional.insert(format!("{}other", CLOUD_PROVIDER_TAG_PREFIX), "owned");
        additional.insert("team", "infra");

        let tags = build_tags(BuildParams {
            additional,
            ..BuildParams::owned("demo")
        });

        assert!(!tags.has_owned("other"));
        assert_eq!(tags.owning_clusters(), vec!["demo"]);
        assert!(!tags.contains_key(ROLE_TAG_KEY));
        assert!(!tags.iter().any(|(key, _)| key.starts_with(CLOUD_PROVIDER_TAG_PREFIX)));
        assert_eq!(tags.get("team"), Some("infra"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_reserved_keys() {
        assert!(is_reserved_key(&cluster_tag_key("demo")));
        assert!(is_reserved_key(ROLE_TAG_KEY));
        assert!(is_reserved_key("kubernetes.io_cluster_demo"));
        assert!(!is_reserved_key(NAME_TAG_KEY));
        assert!(!is_reserved_key("team"));
    }

    #[test]
    fn test_merge_and_difference() {
        let mut desired: Tags = [("a", "1"), ("b", "2")].into_iter().collect();
        let observed: Tags = [("a", "1"), ("b", "3"), ("c", "4")].into_iter().collect();

        let expected: Tags = [("b", "2")].into_iter().collect();
        assert_eq!(desired.difference(&observed), expected);

        desired.merge(&observed);
        assert_eq!(desired.get("b"), Some("3"));
        assert_eq!(desired.get("c"), Some("4"));
        assert!(desired.difference(&observed).is_empty());
    }
}
