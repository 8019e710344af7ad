use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::resource::Resource;

/// FHIR Bundle types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Searchset,
    History,
    Collection,
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    SubscriptionNotification,
}

/// FHIR Bundle resource
///
/// Fields the linkage step has no use for are kept in `extra` so that an
/// ingested bundle is written back out without losing data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,

    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<BundleLink>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Bundle {
    /// Create an empty collection bundle
    pub fn collection(entry: Vec<BundleEntry>) -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            bundle_type: BundleType::Collection,
            total: None,
            link: Vec::new(),
            entry,
            extra: Map::new(),
        }
    }

    /// Iterate over the Patient resources in entry order
    pub fn patients(&self) -> impl Iterator<Item = &crate::Patient> {
        self.entry.iter().filter_map(|e| e.resource.as_patient())
    }
}

/// A link within a Bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

/// A single entry within a Bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    pub resource: Resource,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl BundleEntry {
    pub fn new(full_url: Option<String>, resource: Resource) -> Self {
        Self {
            full_url,
            resource,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trip_keeps_unmodelled_fields() {
        let raw = json!({
            "resourceType": "Bundle",
            "id": "intake-42",
            "type": "batch",
            "entry": [
                {
                    "fullUrl": "urn:uuid:1",
                    "request": {"method": "POST", "url": "Observation"},
                    "resource": {"resourceType": "Observation", "status": "final"}
                }
            ]
        });

        let bundle: Bundle = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(bundle.bundle_type, BundleType::Batch);
        assert_eq!(bundle.extra["id"], "intake-42");
        assert_eq!(bundle.entry[0].extra["request"]["method"], "POST");

        assert_eq!(serde_json::to_value(&bundle).unwrap(), raw);
    }

    #[test]
    fn accepts_subscription_notification_bundles() {
        let bundle: Bundle = serde_json::from_value(json!({
            "resourceType": "Bundle",
            "type": "subscription-notification",
            "entry": [{"resource": {"resourceType": "Patient", "birthDate": "1980-01-01"}}]
        }))
        .unwrap();
        assert_eq!(bundle.bundle_type, BundleType::SubscriptionNotification);
        assert_eq!(bundle.patients().count(), 1);
        assert_eq!(
            serde_json::to_value(&bundle).unwrap()["type"],
            "subscription-notification"
        );
    }

    #[test]
    fn patients_skips_other_resources() {
        let bundle: Bundle = serde_json::from_value(json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {"resourceType": "Observation"}},
                {"resource": {"resourceType": "Patient", "birthDate": "1980-01-01"}},
                {"resource": {"resourceType": "Encounter"}}
            ]
        }))
        .unwrap();

        let patients: Vec<_> = bundle.patients().collect();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].birth_date.as_deref(), Some("1980-01-01"));
    }
}
