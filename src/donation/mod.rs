pub mod client;
pub mod draft;
pub mod form;
pub mod preview;
pub mod store;

pub use client::{HttpSaveFoodClient, SaveFoodClient, SubmitError};
pub use draft::{DonationDraft, DonationPayload, DraftField, ImageFile};
pub use form::{DonationForm, Mount, SubmitOutcome};
pub use preview::{PreviewHandle, PreviewRegistry};
pub use store::FormStore;
