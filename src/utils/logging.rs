/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// 读取 `RUST_LOG`，默认 `info`；输出到 stderr，stdout 留给表格
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, restored: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 扫码查询模式");
    info!("🔗 查询服务: {}", config.lookup_base_url);
    if config.print_enabled {
        info!("🖨️ 打印服务: {}", config.print_base_url);
    } else {
        info!("🖨️ 打印已关闭");
    }
    info!("📂 存储目录: {} (已恢复 {} 条)", config.storage_dir, restored);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
