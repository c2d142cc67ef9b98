use log::LevelFilter;

/// 指定したレベルでロガーを初期化する。
/// RUST_LOG環境変数でモジュールごとに上書きできる。
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
