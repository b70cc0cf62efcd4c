// Route exports
pub mod discovery;

use actix_web::web;

pub use discovery::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(discovery::configure),
    );
}
