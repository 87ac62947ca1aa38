// ridelog-api/src/main.rs

use clap::Parser;
use rocket::error;
use rocket::info;
use std::env;

use ridelog_api::config::AppConfig;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[command(name = "ridelog-api")]
#[command(about = "Ride log server: rider trip submissions and an admin dashboard")]
#[command(version)]
struct Cli {
    /// Show extended version information
    #[arg(long, action = clap::ArgAction::SetTrue)]
    version_info: bool,
}

#[rocket::main]
async fn main() {
    let cli = Cli::parse();

    if cli.version_info {
        println!("ridelog-api {}", built_info::PKG_VERSION);
        println!("Built: {}", built_info::BUILT_TIME_UTC);
        if let Some(commit) = built_info::GIT_COMMIT_HASH {
            println!("Git commit: {}", commit);
        }
        return;
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    match env::current_dir() {
        Ok(path) => info!("Current directory: {}", path.display()),
        Err(e) => error!("Error getting current directory: {}", e),
    };

    info!("ridelog-api v{} starting", built_info::PKG_VERSION);
    info!("Built: {}", built_info::BUILT_TIME_UTC);
    if let Some(commit) = built_info::GIT_COMMIT_HASH {
        info!("Git commit: {}", commit);
    }

    ridelog_api::rocket(config)
        .launch()
        .await
        .expect("Rocket server failed to launch");
}
