use crate::app::AppState;
use crate::application::use_cases::audit_pipeline::DEFAULT_UPLOAD_NAME;
use crate::domain::error::AppError;
use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{dev::Server, get, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub app_state: Arc<AppState>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub tx_digest: String,
    pub proof_hash: String,
}

fn status_of(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn error_response(err: &AppError) -> HttpResponse {
    HttpResponse::build(status_of(err.status_code())).json(json!({ "detail": err.detail() }))
}

#[get("/")]
async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "Backend running" }))
}

#[post("/upload-dataset")]
async fn upload_dataset(
    data: web::Data<HttpState>,
    query: web::Query<UploadQuery>,
    req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    let filename = query
        .filename
        .clone()
        .or_else(|| {
            req.headers()
                .get("x-filename")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());

    add_log(
        &data.logs,
        "INFO",
        "Upload",
        &format!("File received: {} ({} bytes)", filename, body.len()),
    );

    match data.app_state.pipeline.run(&filename, body.to_vec()).await {
        Ok(response) => {
            let (level, message) = match response.status_code() {
                200 => ("INFO", format!("Audit complete: {}", filename)),
                _ => ("ERROR", format!("Blob upload failed for {}", filename)),
            };
            add_log(&data.logs, level, "Upload", &message);
            HttpResponse::build(status_of(response.status_code())).json(response)
        }
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Upload",
                &format!("Upload rejected: {}", e),
            );
            error_response(&e)
        }
    }
}

#[post("/verify")]
async fn verify(data: web::Data<HttpState>, req: web::Json<VerifyRequest>) -> impl Responder {
    let verification = data
        .app_state
        .anchor
        .verify(&req.tx_digest, &req.proof_hash)
        .await;
    add_log(
        &data.logs,
        "INFO",
        "Ledger",
        &format!(
            "Verified {} via {}: {}",
            req.tx_digest, verification.method, verification.verified
        ),
    );
    HttpResponse::Ok().json(verification)
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap_or_else(|e| e.into_inner());
    HttpResponse::Ok().json(&*logs)
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(|e| e.into_inner());
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

/// Record in the `/api/logs` ring and mirror to tracing
pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    match level {
        "ERROR" => tracing::error!(source, "{}", message),
        "WARN" => tracing::warn!(source, "{}", message),
        _ => tracing::info!(source, "{}", message),
    }
    add_log_entry(logs, level, source, message);
}

/// Routes plus the upload size limit, shared by the server and tests
pub fn configure_app(cfg: &mut web::ServiceConfig, state: web::Data<HttpState>) {
    // one byte over the limit so oversize uploads reach the pipeline's 413
    let payload_limit = state
        .app_state
        .pipeline
        .max_upload_mb()
        .saturating_mul(1024 * 1024)
        .saturating_add(1);

    cfg.app_data(state)
        .app_data(web::PayloadConfig::new(
            usize::try_from(payload_limit).unwrap_or(usize::MAX),
        ))
        .service(root)
        .service(upload_dataset)
        .service(verify)
        .service(web::scope("/api").service(get_logs));
}

pub fn start_server(
    app_state: Arc<AppState>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
) -> std::io::Result<Server> {
    let host = app_state.config.server.host.clone();
    let port = app_state.config.server.port;
    let state = web::Data::new(HttpState { app_state, logs });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();
        let state = state.clone();

        App::new()
            .wrap(cors)
            .configure(move |cfg| configure_app(cfg, state))
    })
    .bind((host.as_str(), port))?
    .run();

    Ok(server)
}
