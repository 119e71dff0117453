use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use breed_assist::config::Settings;
use breed_assist::core::Filter;
use breed_assist::routes::{self, filter::AppState, handle_json_payload_error, handle_query_payload_error};
use breed_assist::services::{CharacterRegistry, MatrixCache, MatrixLoader, SearchUrlBuilder};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Breed Assist service...");

    let loader = MatrixLoader::new(
        settings.data.global_anchor.clone(),
        settings.data.child_anchor.clone(),
        settings.data.total_marker.clone(),
    );

    // Load global affinity table
    let (universe, global) = loader.load_global(&settings.data.global_matrix_path).map_err(|e| {
        error!(
            "Failed to load global matrix from {}: {}",
            settings.data.global_matrix_path.display(),
            e
        );
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;

    info!("Global matrix loaded ({} characters)", universe.len());

    // The registry only feeds search links, so the service can run without it
    let registry = match CharacterRegistry::load(&settings.data.registry_path) {
        Ok(registry) => {
            info!("Character index loaded ({} characters)", registry.len());
            registry
        }
        Err(e) => {
            error!(
                "Failed to load character index from {} ({}), search links will carry no ids",
                settings.data.registry_path.display(),
                e
            );
            CharacterRegistry::default()
        }
    };

    let cache_ttl = settings.cache.child_ttl_secs.unwrap_or(300);
    let cache_capacity = settings.cache.child_capacity.unwrap_or(64);
    let cache = MatrixCache::new(cache_capacity, cache_ttl);

    info!("Child matrix cache initialized ({} entries, TTL: {}s)", cache_capacity, cache_ttl);

    let filter = Filter::new(settings.filter.thresholds());

    info!("Filter initialized with thresholds: {:?}", filter.thresholds());

    // Build application state
    let app_state = AppState {
        universe: Arc::new(universe),
        global: Arc::new(global),
        registry: Arc::new(registry),
        loader: Arc::new(loader),
        child_matrix_dir: Arc::new(settings.data.child_matrix_dir.clone()),
        cache: Arc::new(cache),
        search: Arc::new(SearchUrlBuilder::new(
            settings.search.base_url.clone(),
            settings.search.defaults(),
        )),
        filter,
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
