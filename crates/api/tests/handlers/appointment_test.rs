use appointments_core::models::appointment::Appointment;
use appointments_db::mock::repositories::MockAppointmentRepo;
use axum::http::{header, Method, StatusCode};
use chrono::{NaiveDate, NaiveTime};
use mockall::predicate::{always, eq};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::test_utils::{memory_server, test_server};

fn appointment(id: i64, date: &str, time: &str) -> Appointment {
    Appointment {
        id,
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        start_time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
        email: None,
    }
}

#[tokio::test]
async fn test_create_appointments_around_conflict_window() {
    let server = memory_server();

    let response = server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "09:30", "email": "a@example.com"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"message": "Appointment created successfully", "id": 1})
    );

    let response = server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "10:00", "email": "b@example.com"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["message"],
        "This appointment conflicts with an existing appointment."
    );

    let response = server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "12:00", "email": "c@example.com"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["id"], 2);
}

#[tokio::test]
async fn test_create_exactly_one_hour_apart_is_allowed() {
    let server = memory_server();

    for time in ["09:00", "10:00", "11:00"] {
        let response = server
            .post("/appointment")
            .json(&json!({"date": "2024-05-01", "start_time": time}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK, "start_time {time}");
    }

    let response = server
        .post("/appointment")
        .json(&json!({"date": "2024-05-02", "start_time": "09:30"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_reports_empty_fields() {
    let server = memory_server();

    let response = server
        .post("/appointment")
        .json(&json!({"date": "", "email": "a@example.com"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>(),
        json!({
            "message": "Empty fields.",
            "empty_fields": ["Date field is empty.", "Start_time field is empty."]
        })
    );
}

#[tokio::test]
async fn test_create_rejects_bad_formats_and_hours() {
    let server = memory_server();

    let response = server
        .post("/appointment")
        .json(&json!({"date": "01/05/2024", "start_time": "09:30"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "Incorrect date format. The correct format is 'YYYY-MM-DD'"
    );

    let response = server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "25:00"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "Incorrect time format. The correct format is 'HH:MM'"
    );

    let response = server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "18:00"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "The time must be within the accepted hours. From 09:00 to 17:00"
    );
}

#[tokio::test]
async fn test_create_accepts_business_hours_bounds() {
    let server = memory_server();

    for (date, time) in [("2024-05-01", "09:00"), ("2024-05-01", "17:00")] {
        let response = server
            .post("/appointment")
            .json(&json!({"date": date, "start_time": time}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK, "start_time {time}");
    }
}

#[tokio::test]
async fn test_create_rejects_malformed_body() {
    let server = memory_server();

    let response = server.post("/appointment").text("{not json").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_orders_by_date_descending() {
    let server = memory_server();
    for (date, time) in [
        ("2024-05-01", "09:30"),
        ("2024-07-15", "11:00"),
        ("2024-03-20", "16:00"),
    ] {
        server
            .post("/appointment")
            .json(&json!({"date": date, "start_time": time}))
            .await;
    }

    let response = server.get("/appointment").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let dates: Vec<String> = response
        .json::<Vec<Appointment>>()
        .into_iter()
        .map(|a| a.date.to_string())
        .collect();
    assert_eq!(dates, vec!["2024-07-15", "2024-05-01", "2024-03-20"]);
}

#[tokio::test]
async fn test_get_appointment_found_and_missing() {
    let server = memory_server();
    server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "09:30", "email": "a@example.com"}))
        .await;

    let response = server.get("/appointment/1").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({
            "message": "Appointment found successfully",
            "data": {
                "id": 1,
                "date": "2024-05-01",
                "start_time": "09:30",
                "email": "a@example.com"
            }
        })
    );

    let response = server.get("/appointment/42").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({"message": "Appointment with ID 42 not found"})
    );

    let response = server.get("/appointment/abc").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_appointment_fields() {
    let server = memory_server();
    server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "09:30"}))
        .await;

    let response = server
        .patch("/appointment/1")
        .json(&json!({"start_time": "14:00", "email": "new@example.com"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"message": "Appointment updated successfully", "rows": 1})
    );

    let updated = server.get("/appointment/1").await.json::<Value>();
    assert_eq!(updated["data"]["start_time"], "14:00");
    assert_eq!(updated["data"]["email"], "new@example.com");
}

#[tokio::test]
async fn test_update_blank_or_null_email_clears_it() {
    let server = memory_server();
    server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "09:30", "email": "a@example.com"}))
        .await;

    let response = server
        .patch("/appointment/1")
        .json(&json!({"email": "  "}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let stored = server.get("/appointment/1").await.json::<Value>();
    assert_eq!(stored["data"]["email"], Value::Null);

    server
        .patch("/appointment/1")
        .json(&json!({"email": "b@example.com"}))
        .await;
    let response = server
        .patch("/appointment/1")
        .json(&json!({"email": null}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"message": "Appointment updated successfully", "rows": 1})
    );
    let stored = server.get("/appointment/1").await.json::<Value>();
    assert_eq!(stored["data"]["email"], Value::Null);
    assert_eq!(stored["data"]["start_time"], "09:30");
}

#[tokio::test]
async fn test_update_rejects_bad_formats_and_keeps_record() {
    let server = memory_server();
    server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "09:30"}))
        .await;
    let before = server.get("/appointment/1").await.json::<Value>();

    let response = server
        .patch("/appointment/1")
        .json(&json!({"date": "2024/06/01"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "Incorrect date format. The correct format is 'YYYY-MM-DD'"
    );

    let response = server
        .patch("/appointment/1")
        .json(&json!({"start_time": "25:00"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "Incorrect time format. The correct format is 'HH:MM'"
    );

    let response = server
        .patch("/appointment/1")
        .json(&json!({"start_time": "18:00"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let after = server.get("/appointment/1").await.json::<Value>();
    assert_eq!(after, before);
    assert_eq!(after["data"]["date"], "2024-05-01");
    assert_eq!(after["data"]["start_time"], "09:30");
}

#[tokio::test]
async fn test_update_rejects_conflicts_but_not_itself() {
    let server = memory_server();
    for time in ["09:30", "12:00"] {
        server
            .post("/appointment")
            .json(&json!({"date": "2024-05-01", "start_time": time}))
            .await;
    }

    // Moving within its own window only overlaps itself
    let response = server
        .patch("/appointment/1")
        .json(&json!({"start_time": "10:00"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .patch("/appointment/1")
        .json(&json!({"start_time": "11:30"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_rejects_unknown_and_missing_fields() {
    let server = memory_server();
    server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "09:30"}))
        .await;

    let response = server
        .patch("/appointment/1")
        .json(&json!({"id": 5}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server.patch("/appointment/1").json(&json!({})).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_missing_appointment_never_updates() {
    let mut repo = MockAppointmentRepo::new();
    repo.expect_get()
        .with(eq(99))
        .times(1)
        .returning(|_| Ok(None));
    repo.expect_update().never();
    repo.expect_find_conflicts().never();
    let server = test_server(repo);

    let response = server
        .patch("/appointment/99")
        .json(&json!({"email": "new@example.com"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_conflict_never_inserts() {
    let mut repo = MockAppointmentRepo::new();
    repo.expect_find_conflicts()
        .with(always(), always(), eq(None))
        .times(1)
        .returning(|_, _, _| Ok(vec![appointment(1, "2024-05-01", "09:30")]));
    repo.expect_create().never();
    let server = test_server(repo);

    let response = server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "10:15"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_create_never_touches_storage() {
    let mut repo = MockAppointmentRepo::new();
    repo.expect_find_conflicts().never();
    repo.expect_create().never();
    let server = test_server(repo);

    let response = server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "8:00"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let mut repo = MockAppointmentRepo::new();
    repo.expect_list()
        .returning(|| Err(eyre::eyre!("connection refused")));
    let server = test_server(repo);

    let response = server.get("/appointment").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({"message": "Internal server error"})
    );
}

#[tokio::test]
async fn test_delete_appointment() {
    let server = memory_server();
    server
        .post("/appointment")
        .json(&json!({"date": "2024-05-01", "start_time": "09:30"}))
        .await;

    let response = server.delete("/appointment/1").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"message": "Appointment deleted successfully", "rows": 1})
    );

    let response = server.delete("/appointment/1").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server.get("/appointment/1").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unsupported_methods_report_allow_header() {
    let server = memory_server();

    let response = server.method(Method::PUT, "/appointment").await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.header(header::ALLOW), "GET, POST");

    let response = server.method(Method::DELETE, "/appointment").await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.header(header::ALLOW), "GET, POST");

    let response = server.method(Method::POST, "/appointment/1").await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.header(header::ALLOW), "GET, PATCH, DELETE");

    let response = server.method(Method::PUT, "/appointment/1").await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.header(header::ALLOW), "GET, PATCH, DELETE");
}

#[tokio::test]
async fn test_unknown_endpoint_is_not_found() {
    let server = memory_server();

    let response = server.get("/patients").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["message"],
        "Unknown endpoint. 'appointment' is the only resource accepted"
    );
}

#[tokio::test]
async fn test_health_endpoints() {
    let server = memory_server();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({"status": "ok"}));

    let response = server.get("/version").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.json::<Value>()["version"].is_string());
}
