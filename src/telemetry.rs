/*
 * Responsibility
 * - resolver を組み込む binary 向けの tracing subscriber 初期化
 * - library 自体は subscriber を入れない（呼び出し側が選ぶ）
 */
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a fmt subscriber writing to stderr.
///
/// Prefer RUST_LOG if set; otherwise `info`.
/// Ex: RUST_LOG=info,authz_claims=debug token-gen digest wildcard-token
///
/// Returns `false` when a global subscriber was already installed.
pub fn init() -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
