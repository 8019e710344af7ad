//! Strict schema check against the R4B Patient model

use crate::error::LinkageError;
use crate::patient::Patient;

/// Validate a patient against the fhir-sdk R4B `Patient` definition.
///
/// Linkage itself only needs the handful of fields in [`Patient`]; this
/// check is for callers that want upstream schema problems reported as
/// malformed records instead of being hashed.
pub fn validate_patient(patient: &Patient) -> Result<(), LinkageError> {
    let value = serde_json::to_value(patient).map_err(LinkageError::schema)?;

    serde_json::from_value::<fhir_sdk::r4b::resources::Patient>(value)
        .map(|_| ())
        .map_err(LinkageError::schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_well_formed_patient() {
        let patient: Patient = serde_json::from_value(json!({
            "resourceType": "Patient",
            "name": [{"family": "Doe", "given": ["Jane"]}],
            "gender": "female",
            "birthDate": "1980-01-01",
            "address": [{"line": ["123 Main St"], "city": "Springfield", "state": "IL"}],
            "identifier": [{"system": "http://hospital.example/mrn", "value": "MRN-1"}]
        }))
        .unwrap();
        assert_eq!(validate_patient(&patient), Ok(()));
    }

    #[test]
    fn rejects_unparseable_birth_date() {
        let patient: Patient = serde_json::from_value(json!({
            "resourceType": "Patient",
            "birthDate": "yesterday"
        }))
        .unwrap();
        let err = validate_patient(&patient).unwrap_err();
        assert!(matches!(&err, LinkageError::MalformedRecord(msg) if msg.starts_with("schema violation")));
        assert!(!err.to_string().contains("yesterday"));
    }
}
