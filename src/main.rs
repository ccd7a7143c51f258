use log::debug;
use recipe_extract::{extract_recipe_with_config, ExtractConfig};
use std::env;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    // Get the URL from command-line arguments
    let Some(url) = env::args().nth(1) else {
        eprintln!("Usage: recipe-extract <url>");
        return ExitCode::from(2);
    };

    let config = match ExtractConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(2);
        }
    };
    debug!("Using {} model {}", config.llm.provider, config.llm.model);

    match extract_recipe_with_config(&url, &config).await {
        Ok(recipe) => match serde_json::to_string_pretty(&recipe) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{:#}", e.to_json());
            ExitCode::FAILURE
        }
    }
}
