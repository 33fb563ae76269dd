use serde::{Deserialize, Serialize};

/// Catalog entry for a rentable yacht. Read-only reference data as far as
/// the booking side is concerned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Yacht {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub image: String,
    /// Price per night, whole currency units
    pub price: u64,
    pub guests: u32,
    pub cabins: u32,
    pub length: String,
    pub crew: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub description: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Yacht {
    pub fn nightly_total(&self, nights: u32) -> u64 {
        self.price.saturating_mul(u64::from(nights))
    }

    pub fn fits(&self, guests: u32) -> bool {
        guests > 0 && guests <= self.guests
    }
}

#[cfg(test)]
pub(crate) fn sample_yacht() -> Yacht {
    Yacht {
        id: 7,
        name: "Azure Horizon".to_string(),
        location: "Monaco".to_string(),
        image: "/yachts/azure-horizon.jpg".to_string(),
        price: 10_000,
        guests: 12,
        cabins: 6,
        length: "52m".to_string(),
        crew: 9,
        category: Some("Motor".to_string()),
        description: "Tri-deck motor yacht with a beach club".to_string(),
        amenities: vec!["Jacuzzi".to_string(), "Jet skis".to_string()],
        images: vec!["/yachts/azure-horizon-2.jpg".to_string()],
    }
}
