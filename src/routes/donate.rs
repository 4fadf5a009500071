use askama::Template;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::session::clear_session_cookie;
use crate::auth::{CookieSession, SessionProvider, LOGIN_PATH};
use crate::donation::{
    DonationForm, DonationPayload, DraftField, ImageFile, Mount, SaveFoodClient, SubmitError,
    SubmitOutcome,
};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::routes::home::Html;
use crate::state::AppState;

// --- View structs ---

/// Snapshot of a [`DonationForm`] for rendering.
pub struct FormView {
    pub description: String,
    pub quantity: String,
    pub location: String,
    pub preview_url: Option<String>,
    pub error: Option<String>,
    pub acknowledgement: Option<String>,
    pub loading: bool,
    pub missing: Vec<&'static str>,
}

impl FormView {
    fn capture(form: &mut DonationForm, missing: &[DraftField]) -> Self {
        let draft = form.draft();
        Self {
            description: draft.description.clone(),
            quantity: draft.quantity.clone(),
            location: draft.location.clone(),
            preview_url: form.preview_url(),
            error: form.error().map(str::to_string),
            loading: form.is_loading(),
            missing: missing.iter().map(|f| f.name()).collect(),
            acknowledgement: form.take_acknowledgement(),
        }
    }

    pub fn is_missing(&self, name: &str) -> bool {
        self.missing.iter().any(|m| *m == name)
    }
}

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/donate_food.html")]
pub struct DonateFoodTemplate {
    pub display_name: String,
    pub form: FormView,
}

#[derive(Template)]
#[template(path = "pages/loading.html")]
pub struct LoadingTemplate;

#[derive(Template)]
#[template(path = "components/error_banner.html")]
pub struct ErrorBannerTemplate {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "components/image_preview.html")]
pub struct ImagePreviewTemplate {
    pub preview_url: Option<String>,
}

// --- Forms ---

#[derive(Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub location: String,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/donate-food", get(donate_page).post(submit))
        .route("/donate-food/field", post(update_field))
        .route("/donate-food/image", post(select_image))
        .route("/donate-food/preview/{id}", get(serve_preview))
        .route("/logout", post(logout))
}

// --- Handlers ---

/// Outcome of the mount check for full-page routes.
enum PageGate {
    Render(Response),
    Ready { display_name: String, token: String, user_id: String },
}

fn gate(provider: &CookieSession) -> PageGate {
    match DonationForm::mount(provider) {
        Mount::Loading => PageGate::Render(Html(LoadingTemplate).into_response()),
        Mount::Redirect(to) => PageGate::Render(Redirect::to(to).into_response()),
        Mount::Ready { display_name } => match (provider.session(), provider.token()) {
            (Some(session), Some(token)) => PageGate::Ready {
                display_name,
                token: token.to_string(),
                user_id: session.user_id.clone(),
            },
            _ => PageGate::Render(Redirect::to(LOGIN_PATH).into_response()),
        },
    }
}

async fn donate_page(State(state): State<AppState>, provider: CookieSession) -> Response {
    let (display_name, token, user_id) = match gate(&provider) {
        PageGate::Render(response) => return response,
        PageGate::Ready {
            display_name,
            token,
            user_id,
        } => (display_name, token, user_id),
    };

    let form = {
        let mut forms = state.forms.lock().await;
        FormView::capture(forms.form_mut(&token, &user_id), &[])
    };

    Html(DonateFoodTemplate { display_name, form }).into_response()
}

/// htmx input events: each posted `name=value` pair updates that field.
async fn update_field(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Html<ErrorBannerTemplate>> {
    let mut forms = state.forms.lock().await;
    let form = forms.form_mut(&user.token, &user.session.user_id);
    for (name, value) in fields {
        form.update_field(&name, value);
    }
    Ok(Html(ErrorBannerTemplate {
        error: form.error().map(str::to_string),
    }))
}

async fn select_image(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Html<ImagePreviewTemplate>> {
    let mut picked = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }
        // An empty file input still sends a part, with no file name.
        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            continue;
        }
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;
        picked = Some(ImageFile {
            file_name,
            media_type,
            bytes,
        });
    }

    let mut forms = state.forms.lock().await;
    let form = forms.form_mut(&user.token, &user.session.user_id);
    form.select_image(picked);
    Ok(Html(ImagePreviewTemplate {
        preview_url: form.preview_url(),
    }))
}

async fn serve_preview(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let (media_type, bytes) = state
        .previews
        .get(&id, &user.session.user_id)
        .ok_or(AppError::NotFound)?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, media_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        bytes,
    )
        .into_response())
}

async fn submit(
    State(state): State<AppState>,
    provider: CookieSession,
    Form(posted): Form<SubmitForm>,
) -> AppResult<Response> {
    let (display_name, token, user_id) = match gate(&provider) {
        PageGate::Render(response) => return Ok(response),
        PageGate::Ready {
            display_name,
            token,
            user_id,
        } => (display_name, token, user_id),
    };

    // The lock is released while the save is in flight so field edits keep landing.
    let begun = {
        let mut forms = state.forms.lock().await;
        let form = forms.form_mut(&token, &user_id);
        form.update_field(DraftField::Description.name(), posted.description);
        form.update_field(DraftField::Quantity.name(), posted.quantity);
        form.update_field(DraftField::Location.name(), posted.location);
        form.begin_submit()
    };

    let outcome = match begun {
        Ok(payload) => match save_detached(&state, &token, payload).await {
            Some(outcome) => outcome,
            // Signed out while the save was running.
            None => return Ok(Redirect::to(LOGIN_PATH).into_response()),
        },
        Err(outcome) => outcome,
    };

    let missing = match &outcome {
        SubmitOutcome::Invalid(missing) => missing.clone(),
        _ => Vec::new(),
    };
    let status = match outcome {
        SubmitOutcome::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::OK,
    };

    let form = {
        let mut forms = state.forms.lock().await;
        match forms.get_mut(&token) {
            Some(form) => FormView::capture(form, &missing),
            None => return Ok(Redirect::to(LOGIN_PATH).into_response()),
        }
    };

    Ok((status, Html(DonateFoodTemplate { display_name, form })).into_response())
}

/// Run the save and apply its result on a separate task.
///
/// The task outlives the request, so a client that disconnects mid-save
/// still gets its form out of the loading state. Returns `None` when the
/// session's form is gone by the time the save finishes.
async fn save_detached(
    state: &AppState,
    token: &str,
    payload: DonationPayload,
) -> Option<SubmitOutcome> {
    let client = state
        .save_client
        .with_cookie(format!("{}={}", state.config.auth.cookie_name, token));
    let forms = state.forms.clone();
    let task_token = token.to_string();

    let task = tokio::spawn(async move {
        let result = client.save(&payload).await;
        let mut forms = forms.lock().await;
        forms
            .get_mut(&task_token)
            .map(|form| form.finish_submit(result))
    });

    match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Save task failed: {}", e);
            let mut forms = state.forms.lock().await;
            forms.get_mut(token).map(|form| {
                form.finish_submit(Err(SubmitError::NetworkOrUnknown(e.to_string())))
            })
        }
    }
}

async fn logout(State(state): State<AppState>, provider: CookieSession) -> AppResult<Response> {
    let form = match provider.token() {
        Some(token) => state.forms.lock().await.remove(token),
        None => None,
    };
    let to = match form {
        Some(form) => form.sign_out(&provider)?,
        None => {
            provider.sign_out()?;
            Mount::Redirect(LOGIN_PATH)
        }
    };
    let location = match to {
        Mount::Redirect(path) => path,
        _ => LOGIN_PATH,
    };

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, location.to_string()),
            (
                header::SET_COOKIE,
                clear_session_cookie(&state.config.auth.cookie_name),
            ),
        ],
        "",
    )
        .into_response())
}
