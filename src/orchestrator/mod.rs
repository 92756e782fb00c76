//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `kiosk` - 扫码终端
//! - 管理应用生命周期（初始化、运行）
//! - 持有 HTTP 客户端和结果表
//! - 逐行读取输入并分发
//!
//! ### `command` - 操作员命令解析
//!
//! ### `render` - 终端表格输出
//!
//! ## 层次关系
//!
//! ```text
//! kiosk (处理输入行)
//!     ↓
//! workflow::ScanFlow (处理单次扫描)
//!     ↓
//! clients / services (查询、打印、表格、导出)
//!     ↓
//! storage (本地槽位)
//! ```

pub mod command;
pub mod kiosk;
pub mod render;

pub use command::Command;
pub use kiosk::App;
