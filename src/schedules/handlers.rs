use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateScheduleRequest, CreatedScheduleResponse, DeleteAllResponse, ScheduleRow};
use super::repo_types::Schedule;
use super::services::{confirmation_message, delete_all, export_csv, validate_new_schedule};
use crate::{error::store_rejection, state::AppState};

pub fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/schedules",
            get(list_schedules)
                .post(create_schedule)
                .delete(delete_all_schedules),
        )
        .route("/schedules/:id", get(get_schedule).delete(delete_schedule))
        .route("/export/schedules.csv", get(export_schedules_csv))
}

#[instrument(skip(state, payload))]
pub async fn create_schedule(
    State(state): State<AppState>,
    payload: Result<Json<CreateScheduleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedScheduleResponse>), (StatusCode, String)> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "unreadable schedule body");
        (StatusCode::BAD_REQUEST, e.body_text())
    })?;

    let new = match validate_new_schedule(payload) {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "rejected schedule");
            return Err(e.into());
        }
    };

    let schedule = match state.store.insert(new).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "insert schedule failed");
            return Err(store_rejection(e));
        }
    };

    info!(
        id = %schedule.id,
        reminder_date = %schedule.reminder_date,
        reminder_time = %schedule.reminder_time,
        "schedule created"
    );
    Ok((
        StatusCode::CREATED,
        Json(CreatedScheduleResponse {
            message: confirmation_message(&schedule),
            schedule,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_schedules(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleRow>>, (StatusCode, String)> {
    let schedules = state.store.list().await.map_err(|e| {
        error!(error = %e, "list schedules failed");
        store_rejection(e)
    })?;
    let rows = schedules
        .into_iter()
        .enumerate()
        .map(|(idx, s)| ScheduleRow::new(idx + 1, s))
        .collect();
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Schedule>, (StatusCode, String)> {
    match state.store.find(id).await {
        Ok(Some(s)) => Ok(Json(s)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Reminder not found".into())),
        Err(e) => {
            error!(error = %e, %id, "find schedule failed");
            Err(store_rejection(e))
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.store.delete(id).await.map_err(|e| {
        warn!(error = %e, %id, "delete schedule failed");
        store_rejection(e)
    })?;
    info!(%id, "schedule deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_all_schedules(
    State(state): State<AppState>,
) -> Result<Json<DeleteAllResponse>, (StatusCode, String)> {
    let deleted = delete_all(state.store.as_ref()).await.map_err(|e| {
        error!(error = %e, "bulk delete failed");
        store_rejection(e)
    })?;
    Ok(Json(DeleteAllResponse { deleted }))
}

#[instrument(skip(state))]
pub async fn export_schedules_csv(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let schedules = state.store.list().await.map_err(|e| {
        error!(error = %e, "export schedules failed");
        store_rejection(e)
    })?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"pet_reminders.csv\"",
        ),
    ];
    Ok((headers, export_csv(&schedules)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::FromRequest, http::Request};

    fn rex_request() -> CreateScheduleRequest {
        CreateScheduleRequest {
            pet_name: "Rex".into(),
            vaccine_name: "Rabies".into(),
            vaccination_date: "2024-06-01".into(),
            reminder_date: "2024-05-25".into(),
            reminder_hour: Some(9),
            reminder_minute: Some(0),
            email: "a@b.com".into(),
        }
    }

    /// Runs the body through the real `Json` extractor, as the router would.
    async fn extract(raw: &str) -> Result<Json<CreateScheduleRequest>, JsonRejection> {
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/schedules")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap();
        Json::from_request(req, &()).await
    }

    async fn create(
        state: &AppState,
        req: CreateScheduleRequest,
    ) -> Result<(StatusCode, Json<CreatedScheduleResponse>), (StatusCode, String)> {
        create_schedule(State(state.clone()), Ok(Json(req))).await
    }

    #[tokio::test]
    async fn create_then_list_and_get() {
        let state = AppState::fake();

        let (status, Json(created)) = create(&state, rex_request()).await.expect("create");
        assert_eq!(status, StatusCode::CREATED);
        assert!(!created.schedule.sent);
        assert_eq!(created.schedule.reminder_time, "09:00");
        assert!(created.message.contains("Email will be sent at 09:00 on 2024-05-25"));

        let Json(rows) = list_schedules(State(state.clone())).await.expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].sent_display, "❌");

        let Json(found) = get_schedule(State(state), Path(created.schedule.id))
            .await
            .expect("get");
        assert_eq!(found, created.schedule);
    }

    #[tokio::test]
    async fn missing_fields_write_nothing() {
        let state = AppState::fake();
        let mut req = rex_request();
        req.email = String::new();

        let err = create(&state, req).await.unwrap_err();
        assert_eq!(err, (StatusCode::BAD_REQUEST, "Please fill all fields!".to_string()));

        let Json(rows) = list_schedules(State(state)).await.expect("list");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn body_without_dates_or_time_is_a_bad_request() {
        let state = AppState::fake();
        let raw = r#"{"pet_name":"Rex","vaccine_name":"Rabies","email":"a@b.com","reminder_hour":9}"#;

        let payload = extract(raw).await;
        assert!(payload.is_ok());
        let err = create_schedule(State(state.clone()), payload).await.unwrap_err();
        assert_eq!(err, (StatusCode::BAD_REQUEST, "Please fill all fields!".to_string()));

        let Json(rows) = list_schedules(State(state)).await.expect("list");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let state = AppState::fake();
        let raw = r#"{"pet_name":"Rex","reminder_hour":"nine"}"#;

        let err = create_schedule(State(state), extract(raw).await)
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1.contains("reminder_hour"), "message was {}", err.1);
    }

    #[tokio::test]
    async fn delete_one_and_unknown_id() {
        let state = AppState::fake();
        let (_, Json(created)) = create(&state, rex_request()).await.expect("create");
        let id = created.schedule.id;

        let status = delete_schedule(State(state.clone()), Path(id)).await.expect("delete");
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = delete_schedule(State(state.clone()), Path(id)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);

        let err = get_schedule(State(state), Path(id)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_all_reports_count() {
        let state = AppState::fake();
        for _ in 0..3 {
            let (status, _) = create(&state, rex_request()).await.expect("create");
            assert_eq!(status, StatusCode::CREATED);
        }

        let Json(res) = delete_all_schedules(State(state.clone())).await.expect("delete all");
        assert_eq!(res.deleted, 3);

        let Json(rows) = list_schedules(State(state)).await.expect("list");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn export_returns_csv_attachment() {
        let state = AppState::fake();
        let (status, _) = create(&state, rex_request()).await.expect("create");
        assert_eq!(status, StatusCode::CREATED);

        let res = export_schedules_csv(State(state))
            .await
            .expect("export")
            .into_response();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert!(res.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("pet_reminders.csv"));
    }
}
