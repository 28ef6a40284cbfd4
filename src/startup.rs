use std::net::TcpListener;

use actix_web::{dev::Server, web, App, HttpServer};
use diesel::{r2d2::ConnectionManager, PgConnection};
use r2d2::Pool;
use secrecy::SecretString;
use tracing_actix_web::TracingLogger;

use crate::{
    ai_client::AiClient,
    analytics_client::AnalyticsClient,
    auth::jwt::Tokenizer,
    configuration::Settings,
    routes::{
        analytics::{get_revenue, get_top_products},
        authentication::{login, register},
        cashier::{delete_cashier, get_cashiers, post_cashier, update_cashier},
        category::{delete_category, get_categories, post_category, update_category},
        chat::post_chat,
        health_check,
        product::{delete_product, get_products, post_product, update_product},
        transaction::{delete_transaction, get_transaction, get_transactions, post_transaction},
    },
    utils::DbPool,
};

// The chat endpoint re-enters the api over plain http on the bound port
const LOOPBACK_TIMEOUT_SECONDS: u64 = 10;

pub struct Application{
    pub host: String,
    pub port: u16,
    pub server: Server
}

impl Application {
    pub async fn new(settings: Settings) -> Result<Application, anyhow::Error>{
        let pool: DbPool = Pool::builder()
            .build(ConnectionManager::<PgConnection>::new(
                settings.database.get_database_table_url()
            ))?;

        let listener = TcpListener::bind((
            settings.application.host.as_str(),
            settings.application.port
        ))?;
        let host = settings.application.host;
        let port = listener.local_addr()?.port();

        let tokenizer = Tokenizer::new(&settings.jwt);
        let ai_client = AiClient::new(
            settings.ai.base_url,
            SecretString::new(settings.ai.api_key.into()),
            settings.ai.timeout_seconds
        );
        let analytics_client = AnalyticsClient::new(
            format!("http://{}:{}", host, port),
            LOOPBACK_TIMEOUT_SECONDS
        );

        let pool = web::Data::new(pool);
        let tokenizer = web::Data::new(tokenizer);
        let ai_client = web::Data::new(ai_client);
        let analytics_client = web::Data::new(analytics_client);

        let server = HttpServer::new(move || {
            App::new()
                .wrap(TracingLogger::default())
                .route("/health", web::get().to(health_check))
                .service(
                    web::scope("/api")
                        .route("/auth/register", web::post().to(register))
                        .route("/auth/login", web::post().to(login))
                        .route("/category", web::get().to(get_categories))
                        .route("/category", web::post().to(post_category))
                        .route("/category/{category_id}", web::patch().to(update_category))
                        .route("/category/{category_id}", web::delete().to(delete_category))
                        .route("/products", web::get().to(get_products))
                        .route("/products", web::post().to(post_product))
                        .route("/products/{product_id}", web::patch().to(update_product))
                        .route("/products/{product_id}", web::delete().to(delete_product))
                        .route("/cashiers", web::get().to(get_cashiers))
                        .route("/cashiers", web::post().to(post_cashier))
                        .route("/cashiers/{cashier_id}", web::patch().to(update_cashier))
                        .route("/cashiers/{cashier_id}", web::delete().to(delete_cashier))
                        .route("/transactions", web::get().to(get_transactions))
                        .route("/transactions", web::post().to(post_transaction))
                        .route("/transactions/{transaction_id}", web::get().to(get_transaction))
                        .route("/transactions/{transaction_id}", web::delete().to(delete_transaction))
                        .route("/analytics/revenue", web::get().to(get_revenue))
                        .route("/analytics/top-products", web::get().to(get_top_products))
                        .route("/chat", web::post().to(post_chat))
                )
                .app_data(pool.clone())
                .app_data(tokenizer.clone())
                .app_data(ai_client.clone())
                .app_data(analytics_client.clone())
        })
        .listen(listener)?
        .run();

        Ok(Application{ host, port, server })
    }
}
