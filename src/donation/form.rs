//! The donation form view.
//!
//! `DonationForm` owns everything the page shows between requests: the draft,
//! the image preview, the inline error and the in-flight flag. Sessions come
//! in through a [`SessionProvider`] and saves go out through a
//! [`SaveFoodClient`], so the whole flow can be driven without HTTP.

use crate::auth::{SessionProvider, SessionStatus, LOGIN_PATH};
use crate::donation::client::{SaveFoodClient, SubmitError};
use crate::donation::draft::{DonationDraft, DonationPayload, DraftField, ImageFile};
use crate::donation::preview::{PreviewHandle, PreviewRegistry};
use crate::error::AppResult;

pub const SUCCESS_ACKNOWLEDGEMENT: &str = "Thank you for donating leftover food!";

/// What the page should do after checking the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mount {
    /// Session still resolving: show the placeholder and nothing else.
    Loading,
    /// No session: navigate away and render nothing.
    Redirect(&'static str),
    Ready { display_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    Failed(String),
    /// Required fields were empty; nothing was sent.
    Invalid(Vec<DraftField>),
    /// A save is already running; this submit was ignored.
    InFlight,
}

pub struct DonationForm {
    owner: String,
    previews: PreviewRegistry,
    draft: DonationDraft,
    preview: Option<PreviewHandle>,
    error: Option<String>,
    acknowledgement: Option<String>,
    loading: bool,
}

impl DonationForm {
    /// An empty form whose previews are registered under `owner`.
    pub fn new(owner: impl Into<String>, previews: PreviewRegistry) -> Self {
        Self {
            owner: owner.into(),
            previews,
            draft: DonationDraft::default(),
            preview: None,
            error: None,
            acknowledgement: None,
            loading: false,
        }
    }

    pub fn mount(session: &impl SessionProvider) -> Mount {
        match session.status() {
            SessionStatus::Loading => Mount::Loading,
            SessionStatus::Anonymous => {
                tracing::debug!("No session, redirecting to {}", LOGIN_PATH);
                Mount::Redirect(LOGIN_PATH)
            }
            SessionStatus::Authenticated(session) => Mount::Ready {
                display_name: session.display_name,
            },
        }
    }

    /// Set the field called `name` and clear any error. Unknown names are ignored.
    pub fn update_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        let Ok(field) = name.parse::<DraftField>() else {
            return false;
        };
        self.draft.set(field, value.into());
        self.error = None;
        true
    }

    /// Keep `file` only if it declares an image media type; anything else clears the image.
    pub fn select_image(&mut self, file: Option<ImageFile>) {
        // Release the previous preview before acquiring a new one.
        self.preview = None;
        match file.filter(ImageFile::is_image) {
            Some(image) => {
                self.preview = Some(self.previews.acquire(&self.owner, &image));
                self.draft.image = Some(image);
            }
            None => self.draft.image = None,
        }
    }

    /// First half of a submit: check required fields and mark the form busy.
    ///
    /// Returns the payload to send, or the outcome when nothing should be sent.
    pub fn begin_submit(&mut self) -> Result<DonationPayload, SubmitOutcome> {
        if self.loading {
            return Err(SubmitOutcome::InFlight);
        }
        let missing = self.draft.missing_fields();
        if !missing.is_empty() {
            return Err(SubmitOutcome::Invalid(missing));
        }

        self.loading = true;
        self.error = None;
        self.acknowledgement = None;
        Ok(self.draft.payload())
    }

    /// Second half of a submit: apply the save result.
    pub fn finish_submit(&mut self, result: Result<(), SubmitError>) -> SubmitOutcome {
        self.loading = false;
        match result {
            Ok(()) => {
                self.draft = DonationDraft::default();
                self.preview = None;
                self.acknowledgement = Some(SUCCESS_ACKNOWLEDGEMENT.to_string());
                tracing::info!("Donation saved for {}", self.owner);
                SubmitOutcome::Saved
            }
            Err(err) => {
                let message = err.user_message().to_string();
                self.error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Submit with a single attempt against `client`.
    pub async fn submit(&mut self, client: &impl SaveFoodClient) -> SubmitOutcome {
        let payload = match self.begin_submit() {
            Ok(payload) => payload,
            Err(outcome) => return outcome,
        };
        let result = client.save(&payload).await;
        self.finish_submit(result)
    }

    /// End the session and tear the view down.
    pub fn sign_out(self, session: &impl SessionProvider) -> AppResult<Mount> {
        session.sign_out()?;
        Ok(Mount::Redirect(LOGIN_PATH))
    }

    pub fn draft(&self) -> &DonationDraft {
        &self.draft
    }

    pub fn preview_url(&self) -> Option<String> {
        self.preview.as_ref().map(PreviewHandle::url)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn acknowledgement(&self) -> Option<&str> {
        self.acknowledgement.as_deref()
    }

    /// The acknowledgement is shown once.
    pub fn take_acknowledgement(&mut self) -> Option<String> {
        self.acknowledgement.take()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
