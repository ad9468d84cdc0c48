//! In-process stand-in for the LMS REST backend: axum routes over an
//! in-memory SQLite database.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tokio::task::JoinHandle;

use lms_admin::config::ClientConfig;
use lms_admin::models::{Course, Student};
use lms_admin::navigation::MemoryHistory;
use lms_admin::state::AppState;

const APP: &str = "lmsApp";

#[derive(Clone)]
struct BackendState {
    db: SqlitePool,
    log: Arc<Mutex<Vec<String>>>,
}

impl BackendState {
    fn record(&self, line: String) {
        self.log.lock().unwrap().push(line);
    }
}

#[derive(Deserialize)]
struct ListParams {
    sort: Option<String>,
}

pub struct FakeBackend {
    pub base_url: String,
    pub db: SqlitePool,
    log: Arc<Mutex<Vec<String>>>,
    server: JoinHandle<()>,
}

pub struct Connected {
    pub state: AppState,
    pub history: Arc<MemoryHistory>,
}

impl FakeBackend {
    pub async fn spawn() -> Self {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create database");

        sqlx::query(
            r#"
            CREATE TABLE student (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                reg_no TEXT,
                student_name TEXT
            )
            "#,
        )
        .execute(&db)
        .await
        .expect("Failed to create student table");

        sqlx::query(
            r#"
            CREATE TABLE courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_name TEXT,
                start_date TEXT,
                end_date TEXT,
                student_id INTEGER REFERENCES student(id)
            )
            "#,
        )
        .execute(&db)
        .await
        .expect("Failed to create courses table");

        let log = Arc::new(Mutex::new(Vec::new()));
        let state = BackendState {
            db: db.clone(),
            log: log.clone(),
        };

        let app = Router::new()
            .route("/api/courses", get(list_courses).post(create_course))
            .route(
                "/api/courses/{id}",
                get(get_course)
                    .put(update_course)
                    .patch(patch_course)
                    .delete(delete_course),
            )
            .route("/api/students", get(list_students).post(create_student))
            .route("/api/students/{id}", get(get_student))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to read address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server error");
        });

        Self {
            base_url: format!("http://{}", addr),
            db,
            log,
            server,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_api_url(self.base_url.as_str())
            .expect("valid url")
    }

    /// HTTP-backed app state whose history starts at `start`.
    pub fn connect(&self, start: &str) -> Connected {
        let mut state = AppState::connect(self.config(), start).expect("Failed to connect");
        let history = Arc::new(MemoryHistory::new(start));
        state.navigator = history.clone();
        Connected { state, history }
    }

    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub async fn seed_student(&self, reg_no: &str, name: &str) -> i64 {
        sqlx::query("INSERT INTO student (reg_no, student_name) VALUES (?, ?)")
            .bind(reg_no)
            .bind(name)
            .execute(&self.db)
            .await
            .expect("Failed to insert student")
            .last_insert_rowid()
    }

    pub async fn seed_course(
        &self,
        id: Option<i64>,
        name: &str,
        start: Option<NaiveDate>,
        student_id: Option<i64>,
    ) -> i64 {
        sqlx::query(
            "INSERT INTO courses (id, course_name, start_date, end_date, student_id) VALUES (?, ?, ?, NULL, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(start)
        .bind(student_id)
        .execute(&self.db)
        .await
        .expect("Failed to insert course")
        .last_insert_rowid()
    }

    pub async fn stored_course(&self, id: i64) -> Option<Course> {
        fetch_course(&self.db, id).await
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn alert_headers(key: &str, param: i64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-lmsapp-alert",
        HeaderValue::from_str(&format!("{}.{}", APP, key)).unwrap(),
    );
    headers.insert("x-lmsapp-params", HeaderValue::from_str(&param.to_string()).unwrap());
    headers
}

fn problem(status: StatusCode, detail: &str, key: &str) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("x-lmsapp-error", HeaderValue::from_str(key).unwrap());
    let body = serde_json::json!({
        "title": status.canonical_reason(),
        "status": status.as_u16(),
        "detail": detail,
        "message": key,
    });
    (status, headers, Json(body)).into_response()
}

fn order_clause(sort: Option<&str>, columns: &[&str], prefix: &str) -> Result<String, Response> {
    let Some(sort) = sort else {
        return Ok(String::new());
    };
    let (field, direction) = sort.split_once(',').unwrap_or((sort, "asc"));
    if !columns.contains(&field) {
        return Err(problem(StatusCode::BAD_REQUEST, "Invalid sort field", "error.sort"));
    }
    let direction = if direction.eq_ignore_ascii_case("desc") {
        "DESC"
    } else {
        "ASC"
    };
    Ok(format!(" ORDER BY {}{} {}", prefix, field, direction))
}

const COURSE_SELECT: &str = r#"
    SELECT c.id AS id, c.course_name AS course_name, c.start_date AS start_date,
           c.end_date AS end_date, s.id AS sid, s.reg_no AS reg_no, s.student_name AS student_name
    FROM courses c LEFT JOIN student s ON s.id = c.student_id
"#;

fn course_from_row(row: &SqliteRow) -> Course {
    let student_id: Option<i64> = row.get("sid");
    Course {
        id: Some(row.get("id")),
        course_name: row.get("course_name"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        student: student_id.map(|id| Student {
            id: Some(id),
            reg_no: row.get("reg_no"),
            student_name: row.get("student_name"),
        }),
    }
}

fn student_from_row(row: &SqliteRow) -> Student {
    Student {
        id: Some(row.get("id")),
        reg_no: row.get("reg_no"),
        student_name: row.get("student_name"),
    }
}

async fn fetch_course(db: &SqlitePool, id: i64) -> Option<Course> {
    sqlx::query(&format!("{} WHERE c.id = ?", COURSE_SELECT))
        .bind(id)
        .fetch_optional(db)
        .await
        .expect("query failed")
        .map(|row| course_from_row(&row))
}

async fn course_exists(db: &SqlitePool, id: i64) -> bool {
    sqlx::query("SELECT 1 FROM courses WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
        .expect("query failed")
        .is_some()
}

async fn list_courses(
    State(state): State<BackendState>,
    Query(params): Query<ListParams>,
) -> Response {
    state.record(format!(
        "GET /api/courses sort={}",
        params.sort.as_deref().unwrap_or("")
    ));
    let order = match order_clause(
        params.sort.as_deref(),
        &["id", "course_name", "start_date", "end_date"],
        "c.",
    ) {
        Ok(order) => order,
        Err(response) => return response,
    };
    let rows = sqlx::query(&format!("{}{}", COURSE_SELECT, order))
        .fetch_all(&state.db)
        .await
        .expect("query failed");
    let courses: Vec<Course> = rows.iter().map(course_from_row).collect();
    Json(courses).into_response()
}

async fn get_course(State(state): State<BackendState>, Path(id): Path<i64>) -> Response {
    state.record(format!("GET /api/courses/{}", id));
    match fetch_course(&state.db, id).await {
        Some(course) => Json(course).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn create_course(State(state): State<BackendState>, Json(course): Json<Course>) -> Response {
    state.record("POST /api/courses".to_string());
    if course.id.is_some() {
        return problem(
            StatusCode::BAD_REQUEST,
            "A new courses cannot already have an ID",
            "error.idexists",
        );
    }
    let id = sqlx::query(
        "INSERT INTO courses (course_name, start_date, end_date, student_id) VALUES (?, ?, ?, ?)",
    )
    .bind(&course.course_name)
    .bind(course.start_date)
    .bind(course.end_date)
    .bind(course.student.as_ref().and_then(|s| s.id))
    .execute(&state.db)
    .await
    .expect("insert failed")
    .last_insert_rowid();

    let saved = fetch_course(&state.db, id).await.expect("inserted course");
    (StatusCode::CREATED, alert_headers("courses.created", id), Json(saved)).into_response()
}

fn check_id(path_id: i64, course: &Course) -> Option<Response> {
    match course.id {
        None => Some(problem(StatusCode::BAD_REQUEST, "Invalid id", "error.idnull")),
        Some(id) if id != path_id => {
            Some(problem(StatusCode::BAD_REQUEST, "Invalid ID", "error.idinvalid"))
        }
        Some(_) => None,
    }
}

async fn update_course(
    State(state): State<BackendState>,
    Path(id): Path<i64>,
    Json(course): Json<Course>,
) -> Response {
    state.record(format!("PUT /api/courses/{}", id));
    if let Some(response) = check_id(id, &course) {
        return response;
    }
    if !course_exists(&state.db, id).await {
        return problem(StatusCode::BAD_REQUEST, "Entity not found", "error.idnotfound");
    }
    sqlx::query(
        "UPDATE courses SET course_name = ?, start_date = ?, end_date = ?, student_id = ? WHERE id = ?",
    )
    .bind(&course.course_name)
    .bind(course.start_date)
    .bind(course.end_date)
    .bind(course.student.as_ref().and_then(|s| s.id))
    .bind(id)
    .execute(&state.db)
    .await
    .expect("update failed");

    let saved = fetch_course(&state.db, id).await.expect("updated course");
    (StatusCode::OK, alert_headers("courses.updated", id), Json(saved)).into_response()
}

async fn patch_course(
    State(state): State<BackendState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    state.record(format!("PATCH /api/courses/{} {}", id, content_type));

    let course: Course = match serde_json::from_str(&body) {
        Ok(course) => course,
        Err(_) => return problem(StatusCode::BAD_REQUEST, "Malformed body", "error.http.400"),
    };
    if let Some(response) = check_id(id, &course) {
        return response;
    }
    if !course_exists(&state.db, id).await {
        return problem(StatusCode::BAD_REQUEST, "Entity not found", "error.idnotfound");
    }
    sqlx::query(
        r#"
        UPDATE courses
        SET course_name = COALESCE(?, course_name),
            start_date = COALESCE(?, start_date),
            end_date = COALESCE(?, end_date),
            student_id = COALESCE(?, student_id)
        WHERE id = ?
        "#,
    )
    .bind(&course.course_name)
    .bind(course.start_date)
    .bind(course.end_date)
    .bind(course.student.as_ref().and_then(|s| s.id))
    .bind(id)
    .execute(&state.db)
    .await
    .expect("patch failed");

    let saved = fetch_course(&state.db, id).await.expect("patched course");
    (StatusCode::OK, alert_headers("courses.updated", id), Json(saved)).into_response()
}

async fn delete_course(State(state): State<BackendState>, Path(id): Path<i64>) -> Response {
    state.record(format!("DELETE /api/courses/{}", id));
    sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await
        .expect("delete failed");
    (StatusCode::NO_CONTENT, alert_headers("courses.deleted", id)).into_response()
}

async fn list_students(
    State(state): State<BackendState>,
    Query(params): Query<ListParams>,
) -> Response {
    state.record(format!(
        "GET /api/students sort={}",
        params.sort.as_deref().unwrap_or("")
    ));
    let order = match order_clause(
        params.sort.as_deref(),
        &["id", "reg_no", "student_name"],
        "",
    ) {
        Ok(order) => order,
        Err(response) => return response,
    };
    let rows = sqlx::query(&format!("SELECT id, reg_no, student_name FROM student{}", order))
        .fetch_all(&state.db)
        .await
        .expect("query failed");
    let students: Vec<Student> = rows.iter().map(student_from_row).collect();
    Json(students).into_response()
}

async fn get_student(State(state): State<BackendState>, Path(id): Path<i64>) -> Response {
    state.record(format!("GET /api/students/{}", id));
    let row = sqlx::query("SELECT id, reg_no, student_name FROM student WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .expect("query failed");
    match row {
        Some(row) => Json(student_from_row(&row)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn create_student(
    State(state): State<BackendState>,
    Json(student): Json<Student>,
) -> Response {
    state.record("POST /api/students".to_string());
    if student.id.is_some() {
        return problem(
            StatusCode::BAD_REQUEST,
            "A new student cannot already have an ID",
            "error.idexists",
        );
    }
    let id = sqlx::query("INSERT INTO student (reg_no, student_name) VALUES (?, ?)")
        .bind(&student.reg_no)
        .bind(&student.student_name)
        .execute(&state.db)
        .await
        .expect("insert failed")
        .last_insert_rowid();
    let saved = Student {
        id: Some(id),
        ..student
    };
    (StatusCode::CREATED, alert_headers("student.created", id), Json(saved)).into_response()
}
