mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use common::{parse_body, TestApp};
use serde_json::json;

fn ts(value: &serde_json::Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

fn target_date() -> NaiveDate {
    (Utc::now() + Duration::days(30)).date_naive()
}

fn slot_uri(tenant_id: &str, from: NaiveDate, to: NaiveDate) -> String {
    format!("/api/v1/{}/available-slots?from={}&to={}", tenant_id, from, to)
}

#[tokio::test]
async fn one_hour_window_yields_two_half_hour_slots() {
    let app = TestApp::new().await;
    let tid = app.create_tenant("avail1").await;
    app.put_uniform_schedule(&tid, "UTC", 30, "09:00", "10:00").await;

    let date = target_date();
    let res = app.get(&slot_uri(&tid, date, date)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 2);

    let expected_first = Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap());
    assert_eq!(ts(&slots[0]["start"]), expected_first);
}

#[tokio::test]
async fn booked_slot_disappears_and_neighbors_survive() {
    let app = TestApp::new().await;
    let tid = app.create_tenant("avail2").await;
    app.put_uniform_schedule(&tid, "UTC", 30, "09:00", "10:00").await;

    let date = target_date();
    let start = Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap());
    let end = start + Duration::minutes(30);

    let res = app
        .post(
            &format!("/api/v1/{}/appointments", tid),
            &json!({
                "start_time": start.to_rfc3339(),
                "end_time": end.to_rfc3339(),
                "customer_name": "Alice",
                "customer_phone": "+4915112345678",
                "service_type": "consultation"
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app.get(&slot_uri(&tid, date, date)).await;
    let body = parse_body(res).await;
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(ts(&slots[0]["start"]), end);
}

#[tokio::test]
async fn remainder_shorter_than_slot_is_dropped() {
    let app = TestApp::new().await;
    let tid = app.create_tenant("avail3").await;
    app.put_uniform_schedule(&tid, "UTC", 60, "09:00", "10:30").await;

    let date = target_date();
    let res = app.get(&slot_uri(&tid, date, date)).await;
    let body = parse_body(res).await;
    assert_eq!(body["slots"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unconfigured_tenant_falls_back_to_default_hours() {
    let app = TestApp::new().await;
    let tid = app.create_tenant("avail4").await;

    let res = app.get(&format!("/api/v1/{}/schedule", tid)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["timezone"], "UTC");
    assert_eq!(body["slot_duration_min"], 60);

    // default weekday window is 09:00-17:00, weekends 10:00-14:00
    let date = target_date();
    let res = app.get(&slot_uri(&tid, date, date)).await;
    let body = parse_body(res).await;
    let count = body["slots"].as_array().unwrap().len();
    assert!(count == 8 || count == 4, "unexpected slot count {}", count);
}

#[tokio::test]
async fn local_windows_convert_to_utc() {
    let app = TestApp::new().await;
    let tid = app.create_tenant("avail5").await;
    app.put_uniform_schedule(&tid, "Europe/Berlin", 60, "09:00", "10:00").await;

    let date = target_date();
    let expected_start = chrono_tz::Europe::Berlin
        .from_local_datetime(&date.and_hms_opt(9, 0, 0).unwrap())
        .single()
        .unwrap()
        .with_timezone(&Utc);

    let res = app.get(&slot_uri(&tid, date, date)).await;
    let body = parse_body(res).await;
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(ts(&slots[0]["start"]), expected_start);
}

#[tokio::test]
async fn reversed_and_oversized_ranges_are_rejected() {
    let app = TestApp::new().await;
    let tid = app.create_tenant("avail6").await;

    let date = target_date();
    let res = app.get(&slot_uri(&tid, date, date - Duration::days(1))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.get(&slot_uri(&tid, date, date + Duration::days(120))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn same_request_twice_returns_identical_slots() {
    let app = TestApp::new().await;
    let tid = app.create_tenant("avail7").await;
    app.put_uniform_schedule(&tid, "UTC", 30, "09:00", "12:00").await;

    let date = target_date();
    let first = parse_body(app.get(&slot_uri(&tid, date, date)).await).await;
    let second = parse_body(app.get(&slot_uri(&tid, date, date)).await).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn invalid_schedule_config_is_rejected() {
    let app = TestApp::new().await;
    let tid = app.create_tenant("avail8").await;

    let res = app
        .put(
            &format!("/api/v1/{}/schedule", tid),
            &json!({
                "timezone": "Mars/Olympus",
                "slot_duration_min": 30,
                "hours": { "monday": [{ "start": "09:00", "end": "10:00" }] }
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .put(
            &format!("/api/v1/{}/schedule", tid),
            &json!({
                "timezone": "UTC",
                "slot_duration_min": 30,
                "hours": { "monday": [{ "start": "14:00", "end": "09:00" }] }
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .put(
            &format!("/api/v1/{}/schedule", tid),
            &json!({
                "timezone": "UTC",
                "slot_duration_min": 0,
                "hours": { "monday": [{ "start": "09:00", "end": "10:00" }] }
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
