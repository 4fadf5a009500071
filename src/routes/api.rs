use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::auth::{CookieSession, SessionProvider, SessionStatus};
use crate::db;
use crate::db::models::Donation;
use crate::donation::DonationPayload;
use crate::error::{ApiResult, AppError};
use crate::extractors::CurrentUser;
use crate::state::AppState;

const MAX_FIELD_LEN: usize = 2000;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/save-food", post(save_food))
        .route("/api/donations", get(list_donations))
}

/// Check a donation body, trimming each field.
fn validate(payload: DonationPayload) -> Result<DonationPayload, AppError> {
    let payload = DonationPayload {
        description: payload.description.trim().to_string(),
        quantity: payload.quantity.trim().to_string(),
        location: payload.location.trim().to_string(),
    };

    let fields = [
        ("Description", &payload.description),
        ("Quantity", &payload.quantity),
        ("Location", &payload.location),
    ];
    for (label, value) in fields {
        if value.is_empty() {
            return Err(AppError::BadRequest(format!("{} is required", label)));
        }
        if value.len() > MAX_FIELD_LEN {
            return Err(AppError::BadRequest(format!(
                "{} must be {} characters or less",
                label, MAX_FIELD_LEN
            )));
        }
    }

    Ok(payload)
}

/// POST /api/save-food. Donations from callers without a session are kept unattributed.
async fn save_food(
    State(state): State<AppState>,
    provider: CookieSession,
    body: Result<Json<DonationPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(payload) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let payload = validate(payload)?;

    let donor_id = match provider.status() {
        SessionStatus::Authenticated(session) => Some(session.user_id),
        _ => None,
    };

    let id = {
        let conn = state.db.get()?;
        db::insert_donation(
            &conn,
            donor_id.as_deref(),
            &payload.description,
            &payload.quantity,
            &payload.location,
        )?
    };
    tracing::info!("Donation {} recorded (donor: {:?})", id, donor_id);

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// GET /api/donations. The caller's own donations, newest first.
async fn list_donations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Donation>>> {
    let conn = state.db.get()?;
    let donations = db::donations_for_donor(&conn, &user.session.user_id)?;
    Ok(Json(donations))
}
