use chanbot::bot::{run_console, Settings};

#[tokio::main]
pub async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting chanbot...");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    log::info!(
        "chanbot started as {} on {} for #{}",
        settings.nick,
        settings.network,
        settings.channels.join(", #")
    );

    if let Err(err) = run_console(settings).await {
        log::error!("chanbot stopped: {}", err);
        std::process::exit(1);
    }
}
