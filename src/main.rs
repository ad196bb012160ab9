use clap::Parser;
use tracelens::{cli, commands, config, error, logging, render};
use cli::{Cli, Commands};
use config::Config;
use error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze { file, tab, export, timeout } => {
            println!("🔍 TraceLens - 画像解析\n");
            let config = Config::load()?;

            let base_url = config.resolve_api_url(cli.api_url.as_deref());
            println!("[1/2] 送信中... ({})", base_url);
            let report =
                commands::analyze_file(&file, &base_url, config.timeout(timeout)).await?;
            println!("✔ 解析完了: {}\n", report.filename);

            println!("{}", render::render_report(&report, &tab.tabs()));

            if let Some(dir) = export {
                println!("[2/2] レポートを保存中...");
                let path = commands::export_to_dir(&report, &dir)?;
                println!("✔ レポートを保存: {}", path.display());
            }
        }

        Commands::Show { input, tab } => {
            let text = commands::show_report(&input, &tab.tabs())?;
            println!("{}", text);
        }

        Commands::Config { set_api_url, set_timeout, show } => {
            let mut config = Config::load_or_default();
            let changed = set_api_url.is_some() || set_timeout.is_some();

            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ APIのURLを設定しました");
            }

            if let Some(seconds) = set_timeout {
                config.set_timeout(seconds)?;
                println!("✔ タイムアウトを設定しました");
            }

            if changed {
                config.save()?;
            }

            if show {
                println!("設定:");
                println!("  設定ファイル: {}", Config::config_path()?.display());
                println!("  APIのURL: {}", config.resolve_api_url(cli.api_url.as_deref()));
                println!("  タイムアウト: {}秒", config.timeout_seconds);
            }
        }
    }

    Ok(())
}
