/// 商品查询 API 客户端
///
/// 封装 `GET /api/fetch-product?code=<code>` 调用
use reqwest::Client;
use tracing::debug;

use crate::clients::ProductLookup;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{LookupData, LookupEnvelope};

const FETCH_PRODUCT_PATH: &str = "/api/fetch-product";

/// 商品查询客户端
#[derive(Clone)]
pub struct LookupClient {
    http: Client,
    base_url: String,
}

impl LookupClient {
    /// 创建新的查询客户端
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.lookup_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, FETCH_PRODUCT_PATH)
    }

    /// 查询商品信息
    ///
    /// # 返回
    /// 非 2xx、网络错误、响应无法解析或缺少 `data` 都视为失败
    pub async fn fetch_product(&self, code: &str) -> Result<LookupData, ApiError> {
        let endpoint = self.endpoint();
        debug!("查询商品: {} (code={})", endpoint, code);

        let response = self
            .http
            .get(&endpoint)
            .query(&[("code", code)])
            .send()
            .await
            .map_err(|e| ApiError::request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::BadStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        let envelope: LookupEnvelope = response
            .json()
            .await
            .map_err(|e| ApiError::json_parse_failed(&endpoint, e))?;

        envelope.data.ok_or(ApiError::MissingData { endpoint })
    }
}

impl ProductLookup for LookupClient {
    async fn lookup(&self, code: &str) -> Result<LookupData, ApiError> {
        self.fetch_product(code).await
    }
}
