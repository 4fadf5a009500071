use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Text fields of the donation form, addressed by their input `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Description,
    Quantity,
    Location,
}

impl DraftField {
    pub const ALL: [DraftField; 3] = [
        DraftField::Description,
        DraftField::Quantity,
        DraftField::Location,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DraftField::Description => "description",
            DraftField::Quantity => "quantity",
            DraftField::Location => "location",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DraftField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "description" => Ok(DraftField::Description),
            "quantity" => Ok(DraftField::Quantity),
            "location" => Ok(DraftField::Location),
            _ => Err(()),
        }
    }
}

/// A file picked in the image input. The media type is whatever the client declared.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Bytes,
}

impl ImageFile {
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// Wire body sent to the save endpoint. The image never travels with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationPayload {
    pub description: String,
    pub quantity: String,
    pub location: String,
}

/// In-memory, not-yet-submitted donation record.
#[derive(Debug, Clone, Default)]
pub struct DonationDraft {
    pub description: String,
    pub quantity: String,
    pub location: String,
    pub image: Option<ImageFile>,
}

impl DonationDraft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Description => &self.description,
            DraftField::Quantity => &self.quantity,
            DraftField::Location => &self.location,
        }
    }

    pub fn set(&mut self, field: DraftField, value: String) {
        match field {
            DraftField::Description => self.description = value,
            DraftField::Quantity => self.quantity = value,
            DraftField::Location => self.location = value,
        }
    }

    /// Fields a `required` input would refuse. Only the empty string counts.
    pub fn missing_fields(&self) -> Vec<DraftField> {
        DraftField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }

    pub fn payload(&self) -> DonationPayload {
        DonationPayload {
            description: self.description.clone(),
            quantity: self.quantity.clone(),
            location: self.location.clone(),
        }
    }
}
