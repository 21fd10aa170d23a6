use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::path::Path;
use tracing_actix_web::TracingLogger;

use crate::admin_gate::AdminGate;
use crate::config::{Settings, StorageSettings};
use crate::routes::{
    handle_admin_add, handle_admin_clear, handle_admin_export, handle_admin_import,
    handle_admin_login, handle_admin_remove, handle_debug_add, handle_debug_delete,
    handle_debug_save, handle_debug_upload, handle_home, handle_unsubscribe, health_check,
};
use crate::views::assets::LandingAssets;

// Pasted CSV uploads travel as urlencoded form fields
const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

pub struct Application {
    pub port: u16,
    pub server: Server,
}

/// Whether `?debug` and the `/debug/*` forms are served.
pub struct DebugViewEnabled(pub bool);

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let assets = LandingAssets::load(Path::new(&config.get_assets_dir()));
        let server = run(
            listener,
            config.storage.clone(),
            AdminGate::new(config.get_admin_password()),
            DebugViewEnabled(config.is_debug_view_enabled()),
            assets,
        )?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    storage: StorageSettings,
    admin_gate: AdminGate,
    debug_view: DebugViewEnabled,
    assets: LandingAssets,
) -> Result<Server, std::io::Error> {
    let storage = web::Data::new(storage);
    let admin_gate = web::Data::new(admin_gate);
    let debug_view = web::Data::new(debug_view);
    let assets = web::Data::new(assets);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .app_data(web::FormConfig::default().limit(MAX_FORM_BYTES))
            .route("/", web::get().to(handle_home))
            .route("/health_check", web::get().to(health_check))
            .route("/unsubscribe", web::post().to(handle_unsubscribe))
            .route("/admin", web::post().to(handle_admin_login))
            .route("/admin/add", web::post().to(handle_admin_add))
            .route("/admin/remove", web::post().to(handle_admin_remove))
            .route("/admin/clear", web::post().to(handle_admin_clear))
            .route("/admin/import", web::post().to(handle_admin_import))
            .route("/admin/export", web::post().to(handle_admin_export))
            .route("/debug/save", web::post().to(handle_debug_save))
            .route("/debug/delete", web::post().to(handle_debug_delete))
            .route("/debug/add", web::post().to(handle_debug_add))
            .route("/debug/upload", web::post().to(handle_debug_upload))
            .app_data(storage.clone())
            .app_data(admin_gate.clone())
            .app_data(debug_view.clone())
            .app_data(assets.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
