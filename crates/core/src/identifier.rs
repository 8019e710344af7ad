use serde_json::Map;

use crate::digest::HexDigest;
use crate::error::LinkageError;
use crate::patient::{Identifier, Patient};

/// System URI for generated identifiers (RFC 3986 URI/UUID namespace)
pub const LINKAGE_IDENTIFIER_SYSTEM: &str = "urn:ietf:rfc:3986";

/// Identifier use code; the linkage identifier is marked temporary
pub const LINKAGE_IDENTIFIER_USE: &str = "temp";

/// Append the linkage identifier to the end of `patient.identifier`.
///
/// An absent identifier list is a `MalformedRecord` and leaves the patient
/// unchanged. Existing entries are never touched.
pub fn attach(patient: &mut Patient, digest: HexDigest) -> Result<(), LinkageError> {
    let identifiers = patient
        .identifier
        .as_mut()
        .ok_or_else(|| LinkageError::missing("identifier"))?;

    identifiers.push(Identifier {
        value: Some(digest.into_string()),
        system: Some(LINKAGE_IDENTIFIER_SYSTEM.to_string()),
        use_: Some(LINKAGE_IDENTIFIER_USE.to_string()),
        extra: Map::new(),
    });
    Ok(())
}
