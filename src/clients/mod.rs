//! 外部 HTTP 服务客户端
//!
//! - `LookupClient` - 商品查询服务
//! - `PrintClient` - 标签打印服务

pub mod lookup_client;
pub mod print_client;

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{LookupData, PrintStatus, ProductRecord};

pub use lookup_client::LookupClient;
pub use print_client::PrintClient;

/// 商品查询能力
pub trait ProductLookup {
    /// 按商品码查询，返回 `data` 部分
    fn lookup(&self, code: &str) -> impl Future<Output = Result<LookupData, ApiError>> + Send;
}

/// 标签打印能力
///
/// 打印永远不会返回错误，失败原因写进状态
pub trait LabelPrinter {
    fn print(&self, record: &ProductRecord) -> impl Future<Output = PrintStatus> + Send;
}

/// 构建共享的 HTTP 客户端，超时为 0 时不设置超时
pub fn build_http_client(config: &Config) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if config.request_timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
    }
    builder.build()
}
