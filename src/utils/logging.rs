/// 日志初始化
///
/// 使用 RUST_LOG 环境变量控制级别，默认 info；
/// 重复调用安全（测试里每个用例都会尝试初始化一次）
pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
