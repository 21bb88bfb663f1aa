mod common;

use anyhow::Result;
use campus_timetable::auth::Role;
use common::{Api, Fixture};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn weekly_scenario_over_http() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let fx = Fixture::create(&admin).await?;

    // A: section 1, professor 1, room 1, Monday 09:00-10:00
    let a = admin.create("/api/timetable", fx.entry(1, 1, 1, "monday", "09:00", "10:00")).await?;

    // B overlaps A's section
    let resp = admin.post("/api/timetable", &fx.entry(1, 2, 2, "monday", "09:30", "10:30")).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["details"]["conflicts"][0]["axis"], "section");
    assert_eq!(body["details"]["conflicts"][0]["entry_id"], a);

    // C starts exactly when A ends
    let c = admin.create("/api/timetable", fx.entry(2, 1, 2, "monday", "10:00", "11:00")).await?;

    // D reuses A's slot on Tuesday
    admin.create("/api/timetable", fx.entry(2, 3, 3, "tuesday", "09:00", "10:00")).await?;

    // moving A onto C's hour while keeping professor 1 collides on the professor
    let resp = admin
        .put(&format!("/api/timetable/{}", a), &fx.entry(1, 1, 1, "monday", "10:00", "11:00"))
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await?;
    assert_eq!(body["details"]["conflicts"][0]["axis"], "professor");
    assert_eq!(body["details"]["conflicts"][0]["entry_id"], c);

    let resp = admin
        .put(&format!("/api/timetable/{}", a), &fx.entry(1, 2, 1, "monday", "10:00", "11:00"))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["start_time"], "10:00");

    // delete A, B then fits A's original hour
    let resp = admin.delete(&format!("/api/timetable/{}", a)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["deleted"], a);

    admin.create("/api/timetable", fx.entry(1, 2, 2, "monday", "09:00", "10:00")).await?;
    Ok(())
}

#[tokio::test]
async fn update_with_unchanged_values_succeeds() -> Result<()> {
    let admin = Api::as_role(Role::DepartmentHead).await?;
    let fx = Fixture::create(&Api::as_role(Role::Admin).await?).await?;

    let body = fx.entry(1, 1, 1, "friday", "13:00", "15:00");
    let id = admin.create("/api/timetable", body.clone()).await?;
    let resp = admin.put(&format!("/api/timetable/{}", id), &body).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn professors_cannot_write_entries() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let fx = Fixture::create(&admin).await?;
    let professor = Api::as_role(Role::Professor).await?;

    let resp = professor.post("/api/timetable", &fx.entry(1, 1, 1, "monday", "08:00", "09:00")).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let id = admin.create("/api/timetable", fx.entry(1, 1, 1, "monday", "08:00", "09:00")).await?;
    let resp = professor.delete(&format!("/api/timetable/{}", id)).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // but they can read it
    let resp = professor.get(&format!("/api/timetable/{}", id)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn malformed_entries_are_rejected() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let fx = Fixture::create(&admin).await?;

    let resp = admin.post("/api/timetable", &fx.entry(1, 1, 1, "monday", "10:00", "09:00")).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["end_time"].is_string());

    let resp = admin.post("/api/timetable", &fx.entry(1, 1, 1, "someday", "09:00", "10:00")).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let mut body = fx.entry(1, 1, 1, "monday", "09:00", "10:00");
    body["room_id"] = json!(999_999);
    let resp = admin.post("/api/timetable", &body).await?;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await?;
    assert!(body["field_errors"]["room_id"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_entries_are_not_found() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let fx = Fixture::create(&admin).await?;

    assert_eq!(admin.get("/api/timetable/987654").await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(admin.delete("/api/timetable/987654").await?.status(), StatusCode::NOT_FOUND);
    let resp = admin
        .put("/api/timetable/987654", &fx.entry(1, 1, 1, "monday", "09:00", "10:00"))
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn listings_filter_by_day_and_stay_ordered() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let fx = Fixture::create(&admin).await?;

    let late = admin.create("/api/timetable", fx.entry(1, 1, 1, "monday", "14:00", "15:00")).await?;
    let wed = admin.create("/api/timetable", fx.entry(1, 1, 1, "wednesday", "08:00", "09:00")).await?;
    let early = admin.create("/api/timetable", fx.entry(1, 1, 1, "monday", "08:00", "09:00")).await?;

    let body: Value = admin
        .get(&format!("/api/timetable/section/{}", fx.sections[0]))
        .await?
        .json()
        .await?;
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![early, late, wed]);

    let body: Value = admin
        .get(&format!("/api/timetable/room/{}?day=mon", fx.rooms[0]))
        .await?
        .json()
        .await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let body: Value = admin
        .get(&format!("/api/timetable/professor/{}?day=3", fx.professors[0]))
        .await?
        .json()
        .await?;
    assert_eq!(body["data"][0]["id"], wed);

    let resp = admin
        .get(&format!("/api/timetable/section/{}?day=funday", fx.sections[0]))
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn listings_include_display_names() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let fx = Fixture::create(&admin).await?;

    let id = admin.create("/api/timetable", fx.entry(2, 3, 1, "tuesday", "13:00", "14:00")).await?;

    let body: Value = admin
        .get(&format!("/api/timetable/section/{}", fx.sections[1]))
        .await?
        .json()
        .await?;
    let entry = &body["data"][0];
    assert_eq!(entry["id"], id);
    assert_eq!(entry["day_of_week"], "tuesday");
    assert_eq!(entry["subject_name"], "Databases");
    assert_eq!(entry["section_name"], "S2");
    assert_eq!(entry["professor_first_name"], "Test");
    assert_eq!(entry["professor_last_name"], "P3");
    assert!(entry["room_name"].as_str().unwrap().starts_with("Room 1-"));
    Ok(())
}

#[tokio::test]
async fn seconds_survive_a_read_and_write_back() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let fx = Fixture::create(&admin).await?;

    let id = admin
        .create("/api/timetable", fx.entry(3, 3, 3, "sunday", "09:00:10", "09:00:50"))
        .await?;
    let body: Value = admin.get(&format!("/api/timetable/{}", id)).await?.json().await?;
    assert_eq!(body["data"]["start_time"], "09:00:10");
    assert_eq!(body["data"]["end_time"], "09:00:50");

    let resp = admin.put(&format!("/api/timetable/{}", id), &body["data"]).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn extractor_failures_use_the_error_envelope() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;

    let resp = admin.get("/api/timetable/not-a-number").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "BAD_REQUEST");

    let resp = admin.post_raw("/api/timetable", "{ \"subject_id\": ").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn availability_lists_busy_slots() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let fx = Fixture::create(&admin).await?;

    let id = admin.create("/api/timetable", fx.entry(2, 2, 2, "thursday", "11:00", "12:30")).await?;

    let body: Value = admin
        .get(&format!("/api/professors/{}/availability", fx.professors[1]))
        .await?
        .json()
        .await?;
    assert_eq!(body["data"][0]["entry_id"], id);
    assert_eq!(body["data"][0]["day_of_week"], "thursday");
    assert_eq!(body["data"][0]["end_time"], "12:30");

    let body: Value = admin
        .get(&format!("/api/rooms/{}/availability?day=friday", fx.rooms[1]))
        .await?
        .json()
        .await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let body: Value = admin
        .get(&format!("/api/rooms/{}/availability?dayOfWeek=4", fx.rooms[1]))
        .await?
        .json()
        .await?;
    assert_eq!(body["data"][0]["entry_id"], id);
    Ok(())
}

#[tokio::test]
async fn check_endpoint_reports_without_writing() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let fx = Fixture::create(&admin).await?;
    let professor = Api::as_role(Role::Professor).await?;

    let id = admin.create("/api/timetable", fx.entry(3, 3, 3, "saturday", "09:00", "11:00")).await?;

    let resp = professor.post("/api/timetable/check", &fx.entry(1, 3, 3, "saturday", "10:00", "10:30")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["conflict"], true);
    assert_eq!(body["data"]["conflicts"].as_array().unwrap().len(), 2);

    let mut candidate = fx.entry(3, 3, 3, "saturday", "09:00", "11:00");
    candidate["exclude_id"] = json!(id);
    let body: Value = professor.post("/api/timetable/check", &candidate).await?.json().await?;
    assert_eq!(body["data"]["conflict"], false);

    let body: Value = admin
        .get(&format!("/api/timetable/section/{}", fx.sections[0]))
        .await?
        .json()
        .await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    Ok(())
}
