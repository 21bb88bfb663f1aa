mod common;

use anyhow::Result;
use campus_timetable::auth::Role;
use common::{Api, Fixture};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn room_crud_round() -> Result<()> {
    let head = Api::as_role(Role::DepartmentHead).await?;
    let name = format!("Lab {}", Uuid::new_v4());

    let id = head.create("/api/rooms", json!({ "name": name, "type": "lab", "capacity": 20 })).await?;

    let body: Value = head.get(&format!("/api/rooms/{}", id)).await?.json().await?;
    assert_eq!(body["data"]["type"], "lab");

    let resp = head
        .put(&format!("/api/rooms/{}", id), &json!({ "name": name, "capacity": 35 }))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["capacity"], 35);

    let resp = head.delete(&format!("/api/rooms/{}", id)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(head.get(&format!("/api/rooms/{}", id)).await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn duplicate_names_conflict() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let name = format!("Hall {}", Uuid::new_v4());

    admin.create("/api/rooms", json!({ "name": name })).await?;
    let resp = admin.post("/api/rooms", &json!({ "name": name.to_uppercase() })).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn missing_parent_is_unprocessable() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let resp = admin
        .post("/api/grades", &json!({ "name": "L9", "level": 9, "department_id": 987654 }))
        .await?;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn departments_need_admin() -> Result<()> {
    let head = Api::as_role(Role::DepartmentHead).await?;
    let resp = head
        .post("/api/departments", &json!({ "name": format!("X {}", Uuid::new_v4()), "code": "X" }))
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn records_in_use_cannot_be_deleted() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let fx = Fixture::create(&admin).await?;
    let entry = admin.create("/api/timetable", fx.entry(1, 1, 1, "monday", "08:00", "09:00")).await?;

    let resp = admin.delete(&format!("/api/rooms/{}", fx.rooms[0])).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await?;
    assert_eq!(body["details"]["dependents"], 1);

    admin.delete(&format!("/api/timetable/{}", entry)).await?;
    let resp = admin.delete(&format!("/api/rooms/{}", fx.rooms[0])).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn invalid_payload_is_a_validation_error() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let resp = admin.post("/api/professors", &json!({ "first_name": "No" })).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn children_listed_under_their_parent() -> Result<()> {
    let admin = Api::as_role(Role::Admin).await?;
    let fx = Fixture::create(&admin).await?;

    let body: Value = admin
        .get(&format!("/api/grades/department/{}", fx.department))
        .await?
        .json()
        .await?;
    let grades = body["data"].as_array().unwrap();
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0]["id"], fx.grade);

    let body: Value = admin.get(&format!("/api/sections/grade/{}", fx.grade)).await?.json().await?;
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, fx.sections.to_vec());

    let body: Value = admin.get(&format!("/api/subjects/grade/{}", fx.grade)).await?.json().await?;
    assert_eq!(body["data"][0]["id"], fx.subject);

    let body: Value = admin.get("/api/sections/grade/999999").await?.json().await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let resp = admin.get("/api/grades/department/abc").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
