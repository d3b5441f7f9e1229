use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::Deserialize;
use std::sync::Arc;
use storerank_engine::{Error, Recommender};
use tracing::{error, info};

#[derive(Deserialize)]
struct RecommendRequest {
    query: String,
    #[serde(default)]
    explain: bool,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(recommender: Arc<Recommender>, bind: &str) -> std::io::Result<()> {
        info!(bind, "Starting REST API");
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(recommender.clone()))
                .configure(routes)
        })
        .bind(bind)?
        .run()
        .await
    }
}

/// Route table, shared by the server and tests
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/recommend", web::post().to(recommend))
        .route("/healthz", web::get().to(healthz));
}

async fn healthz(recommender: web::Data<Arc<Recommender>>) -> ActixResult<HttpResponse> {
    let stats = recommender.embedding_stats();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "catalog": recommender.catalog_source().describe(),
        "embedding": {
            "model_calls": stats.model_calls,
            "tokens_embedded": stats.tokens_embedded,
        }
    })))
}

async fn recommend(
    recommender: web::Data<Arc<Recommender>>,
    req: web::Json<RecommendRequest>,
) -> ActixResult<HttpResponse> {
    let RecommendRequest { query, explain } = req.into_inner();
    let recommender = recommender.get_ref().clone();

    // scoring and model calls block; keep them off the async workers
    let outcome = web::block(move || {
        if explain {
            recommender.recommend_explained(&query)
        } else {
            recommender.recommend(&query)
        }
    })
    .await?;

    match outcome {
        Ok(recommendation) => Ok(HttpResponse::Ok().json(recommendation)),
        Err(e) => Ok(error_response(&e)),
    }
}

fn error_response(e: &Error) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_client_error() {
        HttpResponse::BadRequest().json(body)
    } else if e.is_unavailable() {
        HttpResponse::ServiceUnavailable().json(body)
    } else {
        error!(error = %e, "Recommendation failed");
        HttpResponse::InternalServerError().json(body)
    }
}
