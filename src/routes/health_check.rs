use actix_web::HttpResponse;

/// Liveness check; answers 200 with an empty body without touching storage.
#[tracing::instrument(name = "Health check")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
