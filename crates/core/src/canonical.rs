//! Canonical linkage string construction
//!
//! The layout is `<given...>-<family>-<birthDate>-<lines> <city>, <state>[ <postalCode>]`.
//! Every identifier ever issued depends on this exact byte layout, so any
//! change here re-keys every patient.

use std::fmt;

use crate::error::LinkageError;
use crate::patient::{Address, HumanName, Patient};

/// Canonical identity string for one patient
///
/// Holds raw PII: `Debug` is redacted and there is no `Display` impl.
#[derive(Clone, PartialEq, Eq)]
pub struct LinkageString(String);

impl LinkageString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for LinkageString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LinkageString(<redacted>)")
    }
}

/// Build the linkage string for a patient.
///
/// Only the first name and first address are used. A missing or empty
/// `name`, `address` or `birthDate` is a `MalformedRecord`; missing
/// sub-fields inside the first name or address render as empty strings.
pub fn canonicalize(patient: &Patient) -> Result<LinkageString, LinkageError> {
    let name = patient
        .name
        .as_ref()
        .and_then(|names| names.first())
        .ok_or_else(|| LinkageError::missing("name[0]"))?;

    let address = patient
        .address
        .as_ref()
        .and_then(|addresses| addresses.first())
        .ok_or_else(|| LinkageError::missing("address[0]"))?;

    let birth_date = patient
        .birth_date
        .as_deref()
        .filter(|d| !d.is_empty())
        .ok_or_else(|| LinkageError::missing("birthDate"))?;

    let mut out = name_segment(name);
    out.push('-');
    out.push_str(birth_date);
    out.push('-');
    out.push_str(&address_segment(address));

    Ok(LinkageString(out))
}

fn name_segment(name: &HumanName) -> String {
    let mut out = name.given.as_deref().unwrap_or_default().join("-");
    out.push('-');
    out.push_str(name.family.as_deref().unwrap_or_default());
    out
}

fn address_segment(address: &Address) -> String {
    let mut out = address.line.as_deref().unwrap_or_default().join(" ");
    out.push(' ');
    out.push_str(address.city.as_deref().unwrap_or_default());
    out.push_str(", ");
    out.push_str(address.state.as_deref().unwrap_or_default());
    if let Some(postal_code) = address.postal_code.as_deref().filter(|p| !p.is_empty()) {
        out.push(' ');
        out.push_str(postal_code);
    }
    out
}
