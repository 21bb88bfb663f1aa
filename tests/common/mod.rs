#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use campus_timetable::auth::{generate_jwt, Claims, Role};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_campus-timetable"));
        cmd.args(["serve", "--memory", "--port", &port.to_string()])
            .env("JWT_SECRET", JWT_SECRET)
            .env("APP_ENV", "development")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

pub fn token(role: Role) -> String {
    let claims = Claims::new(Uuid::new_v4(), role, None, 1);
    generate_jwt(&claims, JWT_SECRET).expect("sign test token")
}

/// Authenticated JSON client bound to the test server
pub struct Api {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl Api {
    pub async fn as_role(role: Role) -> Result<Self> {
        let server = ensure_server().await?;
        Ok(Self {
            base_url: server.base_url.clone(),
            token: token(role),
            client: reqwest::Client::new(),
        })
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?)
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?)
    }

    /// POST an arbitrary body as `application/json`
    pub async fn post_raw(&self, path: &str, body: &'static str) -> Result<Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?)
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self
            .client
            .put(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete(&self, path: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?)
    }

    /// POST expecting 201, returning the created record's id
    pub async fn create(&self, path: &str, body: Value) -> Result<i64> {
        let resp = self.post(path, &body).await?;
        let status = resp.status();
        let body: Value = resp.json().await?;
        anyhow::ensure!(status == StatusCode::CREATED, "POST {} returned {}: {}", path, status, body);
        body["data"]["id"].as_i64().context("created record has no id")
    }
}

/// Ids of a fresh, uniquely named set of catalog records
pub struct Fixture {
    pub department: i64,
    pub grade: i64,
    pub subject: i64,
    pub sections: [i64; 3],
    pub professors: [i64; 3],
    pub rooms: [i64; 3],
}

impl Fixture {
    pub async fn create(admin: &Api) -> Result<Self> {
        let tag = Uuid::new_v4().simple().to_string();
        let department = admin
            .create("/api/departments", json!({ "name": format!("Dept {}", tag), "code": format!("D{}", &tag[..12]) }))
            .await?;
        let grade = admin
            .create("/api/grades", json!({ "name": "L1", "level": 1, "department_id": department }))
            .await?;
        let subject = admin
            .create("/api/subjects", json!({ "name": "Databases", "code": "DB1", "grade_id": grade }))
            .await?;

        let mut sections = [0; 3];
        let mut professors = [0; 3];
        let mut rooms = [0; 3];
        for n in 0..3 {
            sections[n] = admin
                .create("/api/sections", json!({ "name": format!("S{}", n + 1), "grade_id": grade }))
                .await?;
            professors[n] = admin
                .create(
                    "/api/professors",
                    json!({
                        "first_name": "Test",
                        "last_name": format!("P{}", n + 1),
                        "email": format!("p{}-{}@campus.test", n + 1, tag),
                        "department_id": department
                    }),
                )
                .await?;
            rooms[n] = admin
                .create("/api/rooms", json!({ "name": format!("Room {}-{}", n + 1, tag), "capacity": 30 }))
                .await?;
        }

        Ok(Self { department, grade, subject, sections, professors, rooms })
    }

    /// Entry body using section/professor/room by position (1-based)
    pub fn entry(&self, section: usize, professor: usize, room: usize, day: &str, start: &str, end: &str) -> Value {
        json!({
            "subject_id": self.subject,
            "section_id": self.sections[section - 1],
            "professor_id": self.professors[professor - 1],
            "room_id": self.rooms[room - 1],
            "day_of_week": day,
            "start_time": start,
            "end_time": end
        })
    }
}
