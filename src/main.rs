//! Droply - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, http::header, web};
use sea_orm_migration::MigratorTrait;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use droply::api;
use droply::auth::AdminRegistry;
use droply::config::Config;
use droply::db::DbPool;
use droply::middleware::RequestLogger;
use droply::migration::Migrator;
use droply::services::{AdminService, FileService, GeoClient, Notifier, Storage};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and the S3 credentials must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Droply");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    // Initialize database and run migrations
    let pool = DbPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    info!("Database connection established");

    Migrator::up(pool.connection(), None)
        .await
        .expect("Failed to run migrations");
    info!("Database migrations complete");

    // Initialize S3 storage
    let storage = Storage::new(&config.s3)
        .await
        .expect("Failed to initialize S3 storage");

    // Outbound collaborators
    let geo = GeoClient::new(&config.geo);
    let notifier = Notifier::new(&config.notifier);
    if notifier.is_enabled() {
        info!("Owner notifications enabled");
    } else {
        warn!("DRP_BOT_TOKEN not set - owner notifications disabled");
    }

    // Services and admin allow-list
    let file_service = FileService::new(
        pool.clone(),
        storage.clone(),
        geo.clone(),
        notifier.clone(),
        config.public_base_url.clone(),
    );
    let admin_service = AdminService::new(
        pool.clone(),
        storage.clone(),
        notifier.clone(),
        config.public_base_url.clone(),
    );
    let admins = AdminRegistry::new(config.admin_ids.iter().copied());
    if config.admin_ids.is_empty() {
        warn!("DRP_ADMIN_IDS is empty - the admin surface will reject every caller");
    }

    let bind_address = config.bind_address();
    let max_upload_size = config.max_upload_size;
    let static_dir = config.static_dir.clone();
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if is_development {
            // Permissive CORS for development
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        } else {
            // Restrictive CORS for production (same-origin only)
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        let mut app = App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            // Add request logging middleware
            .wrap(RequestLogger)
            // Add shared state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(file_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .app_data(web::Data::new(admins.clone()))
            .app_data(web::Data::new(max_upload_size))
            // Form/JSON bodies stay small; file parts are size-checked while streaming
            .app_data(web::PayloadConfig::new(max_upload_size.saturating_mul(2)))
            // Configure API routes
            .service(
                web::scope("/api")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_file_routes)
                    .configure(api::configure_admin_routes)
                    .default_service(web::route().to(api::api_not_found)),
            );

        // Swagger UI in development
        if is_development {
            app = app.service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
            );
        }

        // Serve upload form assets when a static dir is configured
        if let Some(ref dir) = static_dir {
            app = app.service(Files::new("/static", dir).index_file("index.html"));
        }

        // Public web routes last: the short-link route matches any segment
        app.configure(api::configure_public_routes)
            .default_service(web::route().to(api::not_found_page))
    });

    // Set worker count
    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
