//! # Scan Label Kiosk
//!
//! 扫码查询商品信息、打印标签并导出 Excel 的终端程序
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Storage / Clients）
//! - `storage/` - 本地槽位持久化
//! - `clients/` - 商品查询服务、打印服务的 HTTP 客户端
//!
//! ### ② 业务能力层（Services）
//! - `TableStore` - 只追加的结果表，修改后整表写回
//! - `exporter` - 导出 xlsx
//!
//! ### ③ 流程层（Workflow）
//! - `ScanInput` - 输入解析（提取商品码）
//! - `ScanFlow` - 流程编排（查询 → 追加 → 打印 → 更新状态）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/kiosk` - 逐行读取输入、分发命令、输出表格
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod storage;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{PrintStatus, ProductRecord};
pub use orchestrator::App;
pub use services::TableStore;
pub use workflow::{ScanFlow, SubmitOutcome};
