//! 扫描输入
//!
//! 封装"扫到了什么、商品码是什么"这一信息

use std::fmt::Display;

/// 一次扫描输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanInput {
    /// 去除首尾空白后的原始输入
    pub qrcode: String,
    /// 提取出的商品码
    pub code: String,
}

impl ScanInput {
    /// 解析输入，空白输入返回 `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let qrcode = raw.trim();
        if qrcode.is_empty() {
            return None;
        }

        Some(Self {
            qrcode: qrcode.to_string(),
            code: extract_code(qrcode).to_string(),
        })
    }
}

impl Display for ScanInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[商品码 #{}]", self.code)
    }
}

/// 取最后一个 `/` 之后的部分，不校验是否为合法 URL
pub fn extract_code(input: &str) -> &str {
    input.rsplit('/').next().unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code_after_last_slash() {
        assert_eq!(extract_code("https://shop.example/p/ABC123"), "ABC123");
        assert_eq!(extract_code("a/b/c"), "c");
        assert_eq!(extract_code("/lead"), "lead");
        assert_eq!(extract_code("trailing/"), "");
    }

    #[test]
    fn test_extract_code_without_slash() {
        assert_eq!(extract_code("ABC123"), "ABC123");
        assert_eq!(extract_code("8 93 4567"), "8 93 4567");
    }

    #[test]
    fn test_parse_trims_and_ignores_blank() {
        assert_eq!(ScanInput::parse(""), None);
        assert_eq!(ScanInput::parse("   \t\n"), None);

        let input = ScanInput::parse("  https://x.test/q/77 \r\n").unwrap();
        assert_eq!(input.qrcode, "https://x.test/q/77");
        assert_eq!(input.code, "77");
    }
}
