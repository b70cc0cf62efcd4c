use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use florist_finder::config::{GeocoderProvider, Settings};
use florist_finder::routes::{self, AppState};
use florist_finder::services::{Dataset, GazetteerGeocoder, Geocoder, NominatimGeocoder, SessionStore};
use std::sync::Arc;
use tracing::{info, error};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn build_geocoder(settings: &Settings) -> std::io::Result<Arc<dyn Geocoder>> {
    let geocoder: Arc<dyn Geocoder> = match settings.geocoder.provider {
        GeocoderProvider::Nominatim => {
            let client = NominatimGeocoder::new(
                settings.geocoder.endpoint.clone(),
                settings.geocoder.user_agent.clone(),
                settings.geocoder.timeout_secs,
            )
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            info!("Using Nominatim geocoder at {}", settings.geocoder.endpoint);
            Arc::new(client)
        }
        GeocoderProvider::Gazetteer => {
            let gazetteer = GazetteerGeocoder::new(settings.geocoder.gazetteer_entries());
            info!("Using gazetteer geocoder with {} places", gazetteer.len());
            Arc::new(gazetteer)
        }
    };

    Ok(geocoder)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so [logging] can drive the subscriber
    let settings = Settings::load();

    let (log_level, log_format) = match &settings {
        Ok(s) => (s.logging.level.clone(), s.logging.format.clone()),
        Err(_) => ("info".to_string(), "json".to_string()),
    };
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(log_level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(log_format);
    init_logging(&log_level, &log_format);

    info!("Starting Florist Finder service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    info!("Configuration loaded successfully");

    // Static florist data, read once
    let dataset = Dataset::load(&settings.dataset.path).map_err(|e| {
        error!("Failed to load florist dataset from {}: {}", settings.dataset.path, e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })?;
    let dataset = Arc::new(dataset);

    let geocoder = build_geocoder(&settings)?;

    let sessions = SessionStore::new(
        dataset,
        settings.search.session_defaults(),
        settings.sessions.max_sessions,
        settings.sessions.idle_timeout(),
    );

    info!(
        "Session store initialized (max: {} sessions, idle timeout: {}s)",
        settings.sessions.max_sessions, settings.sessions.idle_timeout_secs
    );

    let app_state = AppState {
        sessions,
        geocoder,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
