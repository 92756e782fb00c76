//! 操作员命令
//!
//! 以 `:` 开头的行是命令，其余都当作扫描输入

/// 一行输入对应的操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 扫描内容（原样保留，空白由流程层处理）
    Scan(String),
    Clear,
    Export,
    List,
    /// 重新打印，行号从 1 开始
    Retry(usize),
    Help,
    Quit,
    /// 无法识别的命令
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix(':') else {
            return Command::Scan(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        // 参数个数必须正好匹配
        match (name.as_str(), args.as_slice()) {
            ("clear", []) => Command::Clear,
            ("export", []) => Command::Export,
            ("list" | "ls", []) => Command::List,
            ("help" | "h" | "?", []) => Command::Help,
            ("quit" | "q" | "exit", []) => Command::Quit,
            ("retry" | "r", [n]) => match n.parse::<usize>() {
                Ok(row) if row > 0 => Command::Retry(row),
                _ => Command::Unknown(trimmed.to_string()),
            },
            _ => Command::Unknown(trimmed.to_string()),
        }
    }

    /// 扫描和重新打印需要访问网络，其余命令只操作本地表格
    pub fn needs_network(&self) -> bool {
        matches!(self, Command::Scan(_) | Command::Retry(_))
    }
}

pub const HELP_TEXT: &str = "\
扫描或输入商品 URL 后回车即可查询
  :list        显示表格
  :retry <行>  重新打印指定行
  :export      导出 Excel
  :clear       清空表格
  :quit        退出";
