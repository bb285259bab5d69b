//! Address records, region codes, and the pure validation/mapping layer.

mod components;
mod region;
mod types;
mod validate;

pub use components::{
    formatted_from_places_components, formatted_from_validation_components,
    missing_component_errors, ComponentName, ComponentType, ConfirmationLevel, PlacesComponent,
    ValidationComponent, MISSING_INFO_MESSAGE,
};
pub use region::RegionCode;
pub use types::{Address, AddressField, FieldErrors, FormattedAddress};
pub use validate::{resolve_field_error, validate};
