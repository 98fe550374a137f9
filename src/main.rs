use clap::Parser;

use reviewhub::cli::{Cli, Commands};
use reviewhub::config::{get_config, init_config_from};
use reviewhub::runtime::modes::{run_config_command, run_hash_password, run_server};
use reviewhub::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { action }) => return run_config_command(action),
        Some(Commands::HashPassword { password }) => return run_hash_password(&password),
        Some(Commands::Serve) | None => {}
    }

    init_config_from(&cli.config);
    let config = get_config();

    // guard 必须存活到进程退出，否则文件日志会丢失
    let _log_guard = init_logging(&config.logging)?;

    run_server().await
}
