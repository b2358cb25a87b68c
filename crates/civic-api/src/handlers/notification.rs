//! Notification submission handler.

use axum::Json;
use axum::extract::State;
use tracing::debug;

use civic_core::error::AppError;
use civic_entity::Notification;

use crate::dto::request::{REQUIRED_FIELDS_MESSAGE, SubmitNotificationRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Acknowledgement returned for every accepted submission.
pub const SUBMITTED_MESSAGE: &str = "Notification successfully submitted";

/// POST /api/v2/live-notifications/submit-notification
///
/// The response does not reveal whether the notification was pushed or
/// queued.
pub async fn submit_notification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SubmitNotificationRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let input = req
        .into_new_notification()
        .ok_or_else(|| AppError::validation(REQUIRED_FIELDS_MESSAGE))?;

    let notification = Notification::create(input);
    let notification_id = notification.id.clone();
    let user_id = notification.recipient();

    let delivery = state.realtime.dispatcher.submit(notification).await?;
    debug!(
        user_id = %user_id,
        notification_id = %notification_id,
        delivery = ?delivery,
        "Notification submitted"
    );

    Ok(Json(ApiResponse::ok(MessageResponse::new(SUBMITTED_MESSAGE))))
}
