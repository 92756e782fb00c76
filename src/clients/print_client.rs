/// 标签打印 API 客户端
///
/// 封装 `POST /print/` 调用
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::clients::LabelPrinter;
use crate::config::Config;
use crate::models::{PrintRequest, PrintResponse, PrintStatus, ProductRecord};

const PRINT_PATH: &str = "/print/";

/// 打印成功时服务返回的状态值
pub const PRINTED_SENTINEL: &str = "printed";

/// 打印客户端
#[derive(Clone)]
pub struct PrintClient {
    http: Client,
    base_url: String,
}

impl PrintClient {
    /// 创建新的打印客户端
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.print_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 发送打印请求
    ///
    /// # 返回
    /// 总是返回一个状态，网络错误也折算为 `Failed`
    pub async fn print_label(&self, record: &ProductRecord) -> PrintStatus {
        let endpoint = format!("{}{}", self.base_url, PRINT_PATH);
        debug!("发送打印请求: {} (uniq={})", endpoint, record.uniq);

        let response = match self
            .http
            .post(&endpoint)
            .json(&PrintRequest::from(record))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("打印服务请求失败: {}", e);
                return status_from_transport_error(&e.to_string());
            }
        };

        let http_status = response.status();
        // 非 200 也尝试读取 body 中的 status
        let body = response.json::<PrintResponse>().await.ok();

        status_from_response(http_status, body.as_ref())
    }
}

impl LabelPrinter for PrintClient {
    async fn print(&self, record: &ProductRecord) -> PrintStatus {
        self.print_label(record).await
    }
}

/// HTTP 200 且 status 为 `printed` 才算成功
pub fn status_from_response(http_status: StatusCode, body: Option<&PrintResponse>) -> PrintStatus {
    let reported = body.and_then(|b| b.status.as_deref());

    match reported {
        Some(PRINTED_SENTINEL) if http_status == StatusCode::OK => PrintStatus::Done,
        Some(s) if !s.is_empty() => PrintStatus::Failed(s.to_string()),
        _ => PrintStatus::Failed("Unknown".to_string()),
    }
}

pub fn status_from_transport_error(message: &str) -> PrintStatus {
    if message.trim().is_empty() {
        PrintStatus::Failed("Unknown error".to_string())
    } else {
        PrintStatus::Failed(message.to_string())
    }
}
