//! Strongly typed view of the Patient fields used for identity linkage
//!
//! Only the fields linkage reads or writes are modelled. Everything else a
//! Patient carries lands in `extra` and is written back unchanged. Presence is
//! kept as `Option<Vec<_>>` so that `"name": []` and a missing `name` stay
//! distinguishable on output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// FHIR Patient resource (linkage fields only)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<HumanName>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<Address>>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Default for Patient {
    fn default() -> Self {
        Self {
            resource_type: "Patient".to_string(),
            identifier: None,
            name: None,
            birth_date: None,
            address: None,
            extra: Map::new(),
        }
    }
}

/// FHIR HumanName
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HumanName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// FHIR Address
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// FHIR Identifier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Identifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_linkage_fields() {
        let patient: Patient = serde_json::from_value(json!({
            "resourceType": "Patient",
            "id": "p1",
            "gender": "female",
            "name": [{"use": "official", "family": "Doe", "given": ["Jane", "Q"]}],
            "birthDate": "1980-01-01",
            "address": [{"line": ["123 Main St"], "city": "Springfield", "state": "IL", "postalCode": "62704"}],
            "identifier": [{"system": "http://hospital.example/mrn", "value": "MRN-1", "type": {"text": "MRN"}}]
        }))
        .unwrap();

        let name = &patient.name.as_ref().unwrap()[0];
        assert_eq!(name.family.as_deref(), Some("Doe"));
        assert_eq!(name.given.as_deref(), Some(&["Jane".to_string(), "Q".to_string()][..]));
        assert_eq!(name.extra["use"], "official");

        let address = &patient.address.as_ref().unwrap()[0];
        assert_eq!(address.postal_code.as_deref(), Some("62704"));

        let identifier = &patient.identifier.as_ref().unwrap()[0];
        assert_eq!(identifier.value.as_deref(), Some("MRN-1"));
        assert_eq!(identifier.use_, None);
        assert_eq!(identifier.extra["type"]["text"], "MRN");

        assert_eq!(patient.extra["gender"], "female");
    }

    #[test]
    fn empty_and_absent_arrays_survive_round_trip() {
        let raw = json!({"resourceType": "Patient", "name": [], "identifier": []});
        let patient: Patient = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(patient.name, Some(vec![]));
        assert_eq!(patient.address, None);
        assert_eq!(serde_json::to_value(&patient).unwrap(), raw);
    }

    #[test]
    fn identifier_serializes_use_keyword() {
        let identifier = Identifier {
            value: Some("abc".into()),
            system: Some("urn:ietf:rfc:3986".into()),
            use_: Some("temp".into()),
            extra: Map::new(),
        };
        assert_eq!(
            serde_json::to_value(&identifier).unwrap(),
            json!({"value": "abc", "system": "urn:ietf:rfc:3986", "use": "temp"})
        );
    }
}
