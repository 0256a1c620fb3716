//! Postal address model.
//!
//! An address is always embedded in exactly one owner record (a user or
//! a parking lot) and is never shared between owners.

use serde::{Deserialize, Serialize};

use crate::error::{ParkadeError, ParkadeResult};

fn default_country() -> String {
    "India".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub house_number: Option<String>,
    pub street: String,
    pub city: String,
    pub district: Option<String>,
    pub state: String,
    #[serde(default = "default_country")]
    pub country: String,
    pub pincode: String,
}

impl Address {
    /// Address with the required fields set and the country defaulted.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        pincode: impl Into<String>,
    ) -> Self {
        Self {
            house_number: None,
            street: street.into(),
            city: city.into(),
            district: None,
            state: state.into(),
            country: default_country(),
            pincode: pincode.into(),
        }
    }

    /// Rejects addresses with a blank required field.
    pub fn validate(&self) -> ParkadeResult<()> {
        let required = [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("pincode", &self.pincode),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ParkadeError::validation(format!(
                    "address {field} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_defaults_when_missing() {
        let json = serde_json::json!({
            "house_number": null,
            "street": "1 Ring Road",
            "city": "Pune",
            "district": null,
            "state": "MH",
            "pincode": "411001"
        });
        let address: Address = serde_json::from_value(json).unwrap();
        assert_eq!(address.country, "India");
        assert!(address.validate().is_ok());
    }

    #[test]
    fn blank_city_is_rejected() {
        let address = Address::new("1 Ring Road", "  ", "MH", "411001");
        assert!(matches!(
            address.validate(),
            Err(ParkadeError::Validation { .. })
        ));
    }
}
