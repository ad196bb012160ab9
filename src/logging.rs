use tracing_subscriber::EnvFilter;

/// ログ初期化（stderrへ出力、`RUST_LOG` があればそちらを優先）
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "tracelens=debug,tracelens_common=debug"
    } else {
        "tracelens=warn,tracelens_common=warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
