use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::{ApplicationSettings, AuthSettings};
use crate::metrics::{HitCounter, MetricsMiddleware};
use crate::middleware::JwtMiddleware;
use crate::routes::{
    create_user, health_check, login, metrics, polka_webhook, refresh, reset, revoke, update_user,
};
use crate::store::Store;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn Store>,
    application: ApplicationSettings,
    auth: AuthSettings,
) -> Result<Server, std::io::Error> {
    let store: web::Data<dyn Store> = web::Data::from(store);
    let counter = web::Data::new(HitCounter::new());
    let filepath_root = application.filepath_root.clone();
    let application = web::Data::new(application);
    let auth = web::Data::new(auth);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            // Shared state
            .app_data(store.clone())
            .app_data(counter.clone())
            .app_data(application.clone())
            .app_data(auth.clone())
            // Static files, counted
            .service(
                web::scope("/app")
                    .wrap(MetricsMiddleware::new(counter.clone()))
                    .service(fs::Files::new("/", &filepath_root).index_file("index.html")),
            )
            .route("/api/healthz", web::get().to(health_check))
            .service(
                web::resource("/api/users")
                    .route(web::post().to(create_user))
                    .route(
                        web::put()
                            .to(update_user)
                            .wrap(JwtMiddleware::new(auth.signing_secret())),
                    ),
            )
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .route("/api/polka/webhooks", web::post().to(polka_webhook))
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
