use clap::Parser;
use scholartrack::app::render;
use scholartrack::config::Command;
use scholartrack::utils::{logger, validation::Validate};
use scholartrack::{CliConfig, LocalStorage, Settings, TrackerApp};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 載入設定檔
    let file = match cli.load_file() {
        Ok(file) => file,
        Err(e) => {
            eprintln!("❌ Failed to load config file: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    let settings = Settings::resolve(&cli.overrides(), file.as_ref());

    // 初始化日誌
    if settings.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);
    tracing::debug!("Effective settings: {:?}", settings);

    if let Some(file) = &file {
        if let Err(e) = file.validate() {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let command = cli.command();
    let storage = LocalStorage::new(settings.data_dir.clone());
    let mut app = TrackerApp::load(storage, settings).await;

    match app.run(&command).await {
        Ok(output) => {
            print!("{}", output);
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            if matches!(command, Command::Insights) && !e.is_auth_rejection() {
                eprint!("❌ {}", render::insight_failure(&e));
            } else {
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
            }

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
