#[cfg(test)]
mod tests {
    use crate::handlers::{
        confirm_booking_handler, manual_booking_handler, BookingState, ConfirmRequest,
        ManualBookingRequest,
    };
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::Json;
    use chrono::{Duration, Utc};
    use panelbook_common::models::{NewSlot, SlotSource, SlotStatus};
    use panelbook_common::services::SlotStore;
    use panelbook_config::{AppConfig, BookingConfig, ServerConfig};
    use panelbook_db::{DbClient, SqlBookingRepository, SqlSlotRepository, SqlTemplateRepository};
    use sqlx::Row;
    use std::sync::Arc;
    use uuid::Uuid;

    struct TestApp {
        db: DbClient,
        state: Arc<BookingState>,
    }

    async fn test_app() -> TestApp {
        let path = std::env::temp_dir().join(format!("panelbook-handlers-{}.db", Uuid::new_v4()));
        let db = DbClient::from_url(&format!("sqlite://{}", path.display()))
            .await
            .unwrap();

        let slots = Arc::new(SqlSlotRepository::new(db.clone()));
        let bookings = Arc::new(SqlBookingRepository::new(db.clone()));
        let templates = Arc::new(SqlTemplateRepository::new(db.clone()));
        slots.init_schema().await.unwrap();
        bookings.init_schema().await.unwrap();
        templates.init_schema().await.unwrap();

        db.execute(
            "INSERT INTO interview_templates \
             (id, name, interview_length_minutes, location_type, required_interviewers_count, active) \
             VALUES ('tpl1', 'Loop', 60, 'online', 1, 1)",
        )
        .await
        .unwrap();

        let config = Arc::new(AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            use_availability: false,
            use_booking: true,
            database: None,
            booking: Some(BookingConfig::default()),
        });

        TestApp {
            db,
            state: Arc::new(BookingState {
                config,
                slots,
                bookings,
                templates,
            }),
        }
    }

    async fn booking_count(db: &DbClient, status: Option<&str>) -> i64 {
        let query = match status {
            Some(s) => format!("SELECT COUNT(*) AS n FROM bookings WHERE status = '{s}'"),
            None => "SELECT COUNT(*) AS n FROM bookings".to_string(),
        };
        let row = sqlx::query(&query).fetch_one(db.pool()).await.unwrap();
        row.try_get::<i64, _>("n").unwrap()
    }

    fn confirm_request(slot_id: &str, email: &str) -> ConfirmRequest {
        ConfirmRequest {
            slot_id: slot_id.to_string(),
            additional_slot_ids: Vec::new(),
            name: "Ada Candidate".to_string(),
            email: email.to_string(),
            phone: None,
            timezone: None,
        }
    }

    #[tokio::test]
    async fn rejected_submission_writes_no_booking_row() {
        let app = test_app().await;

        let result = confirm_booking_handler(
            State(app.state.clone()),
            Path("tpl1".to_string()),
            Json(confirm_request("s1", "not-an-email")),
        )
        .await;

        let (status, _) = result.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(booking_count(&app.db, None).await, 0);
    }

    #[tokio::test]
    async fn lost_window_leaves_no_live_pending_row() {
        let app = test_app().await;
        let start = Utc::now() + Duration::hours(24);
        let inserted = app
            .state
            .slots
            .insert_slots(vec![NewSlot {
                template_id: Some("tpl1".to_string()),
                hiring_manager_id: "m1".to_string(),
                start_time: start,
                end_time: start + Duration::minutes(60),
                status: SlotStatus::Open,
                source: SlotSource::Calendar,
            }])
            .await
            .unwrap();
        // Someone else takes the slot between page load and submit.
        assert!(app
            .state
            .slots
            .transition_status(&inserted[0].id, SlotStatus::Open, SlotStatus::Booked)
            .await
            .unwrap());

        let result = confirm_booking_handler(
            State(app.state.clone()),
            Path("tpl1".to_string()),
            Json(confirm_request(&inserted[0].id, "ada@example.com")),
        )
        .await;

        let (status, _) = result.err().unwrap();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(booking_count(&app.db, Some("pending")).await, 0);
        assert_eq!(booking_count(&app.db, Some("cancelled")).await, 1);
    }

    #[tokio::test]
    async fn failed_manual_booking_releases_its_override_slots() {
        let app = test_app().await;
        // Force the booking insert to fail after the slots are created.
        app.db.execute("DROP TABLE bookings").await.unwrap();

        let start = Utc::now() + Duration::hours(24);
        let result = manual_booking_handler(
            State(app.state.clone()),
            Json(ManualBookingRequest {
                template_id: "tpl1".to_string(),
                hiring_manager_ids: vec!["m1".to_string(), "m2".to_string()],
                start_time: start,
                end_time: start + Duration::minutes(60),
                candidate_name: "Ada Candidate".to_string(),
                candidate_email: "ada@example.com".to_string(),
                candidate_phone: None,
                timezone: None,
                meeting_link: None,
                meeting_platform: None,
            }),
        )
        .await;

        let (status, _) = result.err().unwrap();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        for manager in ["m1", "m2"] {
            let slots = app
                .state
                .slots
                .list_manager_slots(manager, start)
                .await
                .unwrap();
            assert_eq!(slots.len(), 1);
            assert_eq!(slots[0].status, SlotStatus::Open);
        }
    }
}
