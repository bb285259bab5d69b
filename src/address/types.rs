//! Core address records shared across the widget.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::region::RegionCode;

/// A postal address as the user is entering it.
///
/// The host application owns this record: the widget runtime keeps a working
/// copy and emits a replacement value on every edit, so no second "current"
/// address ever exists outside the host's sight.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street_one: String,
    #[serde(default)]
    pub street_two: String,
    pub locality: String,
    pub administrative_area: String,
    pub postal_code: String,
    /// `None` until the user has picked a country.
    #[serde(default)]
    pub region_code: Option<RegionCode>,
}

impl Address {
    /// Rename `region_code` to `country` without consulting any service.
    ///
    /// Used at every terminal transition that finishes with the user's own
    /// draft rather than a service-suggested address.
    pub fn to_formatted(&self) -> FormattedAddress {
        FormattedAddress {
            street_one: self.street_one.clone(),
            street_two: self.street_two.clone(),
            locality: self.locality.clone(),
            administrative_area: self.administrative_area.clone(),
            postal_code: self.postal_code.clone(),
            country: self
                .region_code
                .as_ref()
                .map(|code| code.as_str().to_string())
                .unwrap_or_default(),
        }
    }

    /// Apply a single field-level edit.
    ///
    /// For [`AddressField::RegionCode`] the value is parsed against the region
    /// table; an empty or unknown code leaves the country unselected, which the
    /// required-field validation then reports on submit.
    pub fn apply(&mut self, field: AddressField, value: &str) {
        match field {
            AddressField::StreetOne => self.street_one = value.to_string(),
            AddressField::StreetTwo => self.street_two = value.to_string(),
            AddressField::Locality => self.locality = value.to_string(),
            AddressField::AdministrativeArea => self.administrative_area = value.to_string(),
            AddressField::PostalCode => self.postal_code = value.to_string(),
            AddressField::RegionCode => self.region_code = RegionCode::new(value),
        }
    }

    /// Value of a field as the view renders it.
    pub fn field_value(&self, field: AddressField) -> &str {
        match field {
            AddressField::StreetOne => &self.street_one,
            AddressField::StreetTwo => &self.street_two,
            AddressField::Locality => &self.locality,
            AddressField::AdministrativeArea => &self.administrative_area,
            AddressField::PostalCode => &self.postal_code,
            AddressField::RegionCode => {
                self.region_code.as_ref().map(RegionCode::as_str).unwrap_or("")
            }
        }
    }
}

/// The finalized output shape: an [`Address`] with `region_code` renamed to
/// `country`. Produced only at the terminal transition of the flow.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedAddress {
    pub street_one: String,
    #[serde(default)]
    pub street_two: String,
    pub locality: String,
    pub administrative_area: String,
    pub postal_code: String,
    pub country: String,
}

/// Identifies one field of [`Address`] in edits, errors, and view rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum AddressField {
    StreetOne,
    StreetTwo,
    Locality,
    AdministrativeArea,
    PostalCode,
    RegionCode,
}

impl AddressField {
    /// Every field, in form order.
    pub const ALL: [AddressField; 6] = [
        AddressField::StreetOne,
        AddressField::StreetTwo,
        AddressField::Locality,
        AddressField::AdministrativeArea,
        AddressField::PostalCode,
        AddressField::RegionCode,
    ];
}

/// Per-field human-readable error strings.
///
/// Populated from two independent sources: local required-field validation and
/// service-reported missing components. The precedence between them lives in
/// [`super::resolve_field_error`], not here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<AddressField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: AddressField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: AddressField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (AddressField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}
