use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 本地存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回非 2xx 状态
    #[error("API返回错误状态 ({endpoint}): {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 响应中缺少 data 字段
    #[error("API返回空结果: {endpoint}")]
    MissingData { endpoint: String },
}

/// 本地存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 读取槽位失败
    #[error("读取存储失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入槽位失败
    #[error("写入存储失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 删除槽位失败
    #[error("删除存储失败 ({path}): {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("序列化失败: {0}")]
    EncodeFailed(#[from] serde_json::Error),
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("xlsx错误: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("io错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl ApiError {
    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 创建 JSON 解析错误
    pub fn json_parse_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        ApiError::JsonParseFailed {
            endpoint: endpoint.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
