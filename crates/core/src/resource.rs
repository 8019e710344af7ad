use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::patient::Patient;

/// Resource type discriminator for patients
pub const PATIENT_RESOURCE_TYPE: &str = "Patient";

/// A resource inside a Bundle entry
///
/// Patients are parsed into a typed struct; every other resource type is
/// carried as opaque JSON and written back untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Patient(Box<Patient>),
    Other(JsonValue),
}

impl Resource {
    /// The `resourceType` tag, if present
    pub fn resource_type(&self) -> Option<&str> {
        match self {
            Resource::Patient(p) => Some(p.resource_type.as_str()),
            Resource::Other(v) => v.get("resourceType").and_then(|t| t.as_str()),
        }
    }

    pub fn as_patient(&self) -> Option<&Patient> {
        match self {
            Resource::Patient(p) => Some(&**p),
            Resource::Other(_) => None,
        }
    }

    pub fn as_patient_mut(&mut self) -> Option<&mut Patient> {
        match self {
            Resource::Patient(p) => Some(&mut **p),
            Resource::Other(_) => None,
        }
    }
}

impl From<Patient> for Resource {
    fn from(patient: Patient) -> Self {
        Resource::Patient(Box::new(patient))
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        match value.get("resourceType").and_then(|t| t.as_str()) {
            // serde's message quotes the offending value, which is PII here
            Some(PATIENT_RESOURCE_TYPE) => serde_json::from_value(value)
                .map(|p| Resource::Patient(Box::new(p)))
                .map_err(|_| D::Error::custom("Patient resource does not match the expected shape")),
            _ => Ok(Resource::Other(value)),
        }
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Resource::Patient(p) => p.serialize(serializer),
            Resource::Other(v) => v.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patient_tag_selects_typed_variant() {
        let resource: Resource =
            serde_json::from_value(json!({"resourceType": "Patient", "birthDate": "2001-02-03"}))
                .unwrap();
        assert_eq!(resource.resource_type(), Some("Patient"));
        assert_eq!(
            resource.as_patient().unwrap().birth_date.as_deref(),
            Some("2001-02-03")
        );
    }

    #[test]
    fn other_resources_pass_through_opaquely() {
        let raw = json!({
            "resourceType": "Observation",
            "status": "final",
            "code": {"text": "Glucose"},
            "valueQuantity": {"value": 5.4, "unit": "mmol/L"}
        });
        let resource: Resource = serde_json::from_value(raw.clone()).unwrap();
        assert!(resource.as_patient().is_none());
        assert_eq!(resource.resource_type(), Some("Observation"));
        assert_eq!(
            serde_json::to_string(&resource).unwrap(),
            serde_json::to_string(&raw).unwrap()
        );
    }

    #[test]
    fn untagged_resource_is_opaque() {
        let resource: Resource = serde_json::from_value(json!({"status": "final"})).unwrap();
        assert_eq!(resource.resource_type(), None);
    }

    #[test]
    fn ill_typed_patient_is_rejected() {
        let result: Result<Resource, _> =
            serde_json::from_value(json!({"resourceType": "Patient", "birthDate": 19800101}));
        assert!(result.is_err());
    }

    #[test]
    fn rejected_patient_error_omits_field_values() {
        let err = serde_json::from_str::<Resource>(
            r#"{"resourceType": "Patient", "name": [{"given": "Jane"}]}"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Patient resource does not match the expected shape"));
        assert!(!message.contains("Jane"));
    }
}
