use delivery_submit::utils::logging;
use delivery_submit::{Config, DeliveryConsole};

#[tokio::test]
#[ignore] // 默认忽略，需要真实后端：cargo test -- --ignored
async fn test_authenticate_against_real_backend() {
    // 初始化日志
    logging::init();

    // 加载配置（DELIVERY_ENV=test 走测试环境）
    let config = Config::from_env();
    let console = DeliveryConsole::new(config);

    // 注意：请替换为测试环境的真实手机号
    let report = console
        .authenticate("13800000000")
        .await
        .expect("批量登录失败");

    assert!(!report.sessions.is_empty(), "应至少登录成功一个工人");
    for session in &report.sessions {
        println!(
            "{} ({}): {} 个待交付任务",
            session.display_name,
            session.phone,
            session.tasks.len()
        );
    }
}

#[tokio::test]
#[ignore]
async fn test_refresh_reuses_token() {
    logging::init();

    let config = Config::from_env();
    let console = DeliveryConsole::new(config);

    console
        .authenticate("13800000000")
        .await
        .expect("批量登录失败");

    // 刷新只拉任务列表，不重新登录
    console.refresh().await.expect("刷新任务列表失败");
    assert!(!console.sessions().is_empty());
}
