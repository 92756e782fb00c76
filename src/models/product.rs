use std::fmt;

use serde::{Deserialize, Serialize};

/// 上游缺失字段时的占位值
pub const PLACEHOLDER: &str = "N/A";

/// 表格中的一行记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// 扫描/输入的原始内容
    pub qrcode: String,
    pub product_name: String,
    pub lot: String,
    pub expired_date: String,
    pub unit_name: String,
    /// 从输入中提取的商品码
    pub uniq: String,
    /// 打印状态（仅在启用打印时存在）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PrintStatus>,
}

impl ProductRecord {
    /// 由查询结果构建记录，缺失字段填充占位值
    pub fn from_lookup(qrcode: &str, code: &str, data: LookupData) -> Self {
        let unit_name = data
            .unit_name
            .or_else(|| data.retail_unit_detail.and_then(|d| d.unit))
            .unwrap_or_else(|| PLACEHOLDER.to_string());

        Self {
            qrcode: qrcode.to_string(),
            product_name: data.product_name.unwrap_or_else(|| PLACEHOLDER.to_string()),
            lot: data.lot.unwrap_or_else(|| PLACEHOLDER.to_string()),
            expired_date: data.expired_date.unwrap_or_else(|| PLACEHOLDER.to_string()),
            unit_name,
            uniq: code.to_string(),
            status: None,
        }
    }
}

/// 打印状态
///
/// 持久化为字符串：`Printing...`、`Done`、`Failed: <原因>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PrintStatus {
    Printing,
    Done,
    Failed(String),
}

impl PrintStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, PrintStatus::Failed(_))
    }
}

impl fmt::Display for PrintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintStatus::Printing => write!(f, "Printing..."),
            PrintStatus::Done => write!(f, "Done"),
            PrintStatus::Failed(reason) => write!(f, "Failed: {}", reason),
        }
    }
}

impl From<PrintStatus> for String {
    fn from(status: PrintStatus) -> Self {
        status.to_string()
    }
}

impl From<String> for PrintStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Printing..." => PrintStatus::Printing,
            "Done" => PrintStatus::Done,
            _ => match s.strip_prefix("Failed: ") {
                Some(reason) => PrintStatus::Failed(reason.to_string()),
                None => PrintStatus::Failed(s),
            },
        }
    }
}

// ========== 查询服务响应 ==========

/// 查询服务返回的外层结构 `{ data: {...} }`
#[derive(Debug, Clone, Deserialize)]
pub struct LookupEnvelope {
    #[serde(default)]
    pub data: Option<LookupData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupData {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub lot: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub expired_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub retail_unit_detail: Option<RetailUnitDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetailUnitDetail {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub unit: Option<String>,
}

// ========== 打印服务请求/响应 ==========

/// 打印服务请求体
#[derive(Debug, Clone, Serialize)]
pub struct PrintRequest<'a> {
    #[serde(rename = "QRCode")]
    pub qrcode: &'a str,
    #[serde(rename = "Product_Name")]
    pub product_name: &'a str,
    #[serde(rename = "Lot")]
    pub lot: &'a str,
    #[serde(rename = "Expired_Date")]
    pub expired_date: &'a str,
    #[serde(rename = "Unit")]
    pub unit: &'a str,
    #[serde(rename = "Uniq")]
    pub uniq: &'a str,
}

impl<'a> From<&'a ProductRecord> for PrintRequest<'a> {
    fn from(record: &'a ProductRecord) -> Self {
        Self {
            qrcode: &record.qrcode,
            product_name: &record.product_name,
            lot: &record.lot,
            expired_date: &record.expired_date,
            unit: &record.unit_name,
            uniq: &record.uniq,
        }
    }
}

/// 打印服务响应体 `{ status }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrintResponse {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub status: Option<String>,
}

/// 字符串或数字都接受，null 视为缺失
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;

    struct LenientVisitor;

    impl<'de> Visitor<'de> for LenientVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or null")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}
