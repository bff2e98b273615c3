use tracing::{error, info};

use schoolgate::{Application, Config, ConsoleServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = schoolgate::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        schoolgate::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("{}", config.portal.name);
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );
    info!(
        max_attempts = config.auth.max_login_attempts,
        lockout_minutes = config.auth.lockout_minutes,
        session_hours = config.auth.session_hours,
        scope = %config.auth.throttle_scope,
        "Login gate configured"
    );

    let server = match ConsoleServer::bind(&config.server).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to bind console server: {}", e);
            std::process::exit(1);
        }
    };

    let app = match Application::from_config(config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        accounts = app.gate().directory().len(),
        active = app.gate().directory().count_active(),
        "User directory ready"
    );

    if let Err(e) = server.serve(app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
