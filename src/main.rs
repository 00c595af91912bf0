use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use receipt_itemizer_rust::{api, AppConfig, ProviderRegistry, ReceiptService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

/// multipart 边界与其它字段的余量
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 启动时选定视觉模型实现
    let registry = ProviderRegistry::from_config(&config.provider);
    let provider = registry.select(&config.provider.name)?;
    info!(
        "Using extraction provider {} (model {}), available: {:?}",
        provider.name(),
        provider.model(),
        registry.names()
    );

    let state = api::AppState {
        service: Arc::new(ReceiptService::new(provider)),
        max_upload_bytes: config.upload.max_bytes,
    };

    // 构建路由
    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/parse", post(api::parse_receipt))
        .route("/api/export", post(api::export_receipt))
        .layer(DefaultBodyLimit::max(config.upload.max_bytes + BODY_LIMIT_SLACK))
        .with_state(state)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/parse?format=json|csv|xlsx  - 上传小票图片并解析");
    info!("  POST /api/export                      - 导出已解析的小票 (csv|xlsx)");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
