//! 扫描处理流程 - 流程层
//!
//! 核心职责：定义"一次扫描"的完整处理流程
//!
//! 流程顺序：
//! 1. 解析输入 → 提取商品码
//! 2. 查询商品 → 追加到表格（启用打印时状态为 `Printing...`）
//! 3. 打印标签 → 原地更新该行状态
//!
//! 每个网络步骤（[`ScanFlow::lookup`]、[`ScanFlow::print`]）都不借用表格，
//! 表格只在步骤之间同步修改。编排层可以在请求进行中继续响应其它命令；
//! [`ScanFlow::submit`] / [`ScanFlow::retry_print`] 把这些步骤串成一次完整调用。

use tracing::{error, info, warn};

use crate::clients::{LabelPrinter, ProductLookup};
use crate::error::{ApiError, StorageError};
use crate::models::{LookupData, PrintStatus, ProductRecord};
use crate::services::TableStore;
use crate::utils::logging::truncate_text;
use crate::workflow::scan_input::ScanInput;

/// 一次提交的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 空白输入，什么都没做
    Ignored,
    /// 查询失败，没有追加记录
    LookupFailed { code: String, reason: String },
    /// 已追加记录；未启用打印时 `status` 为 `None`
    Added {
        index: usize,
        status: Option<PrintStatus>,
    },
}

impl SubmitOutcome {
    /// 刚追加、还在等待打印结果的行
    pub fn pending_print(&self) -> Option<usize> {
        match self {
            SubmitOutcome::Added {
                index,
                status: Some(PrintStatus::Printing),
            } => Some(*index),
            _ => None,
        }
    }
}

/// 重新打印的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    /// 未启用打印
    PrintingDisabled,
    /// 行号不存在
    NoSuchRow { index: usize },
    /// 已完成重新打印
    Printed { index: usize, status: PrintStatus },
}

/// 扫描处理流程
///
/// - 编排 查询 → 追加 → 打印 → 更新状态
/// - 不持有表格，由调用方传入
/// - 任何失败都不会中断会话
pub struct ScanFlow<L, P> {
    lookup: L,
    printer: Option<P>,
}

impl<L, P> ScanFlow<L, P>
where
    L: ProductLookup,
    P: LabelPrinter,
{
    /// `printer` 为 `None` 时只查询不打印
    pub fn new(lookup: L, printer: Option<P>) -> Self {
        Self { lookup, printer }
    }

    pub fn print_enabled(&self) -> bool {
        self.printer.is_some()
    }

    /// 完整处理一次扫描：查询、追加、打印、更新状态
    pub async fn submit(&self, table: &mut TableStore, raw: &str) -> SubmitOutcome {
        let Some(input) = ScanInput::parse(raw) else {
            return SubmitOutcome::Ignored;
        };

        let result = self.lookup(&input).await;
        let outcome = self.accept_lookup(table, &input, result);

        let Some(index) = outcome.pending_print() else {
            return outcome;
        };
        let Some(record) = table.get(index).cloned() else {
            return outcome;
        };
        let Some(status) = self.print(index, &record).await else {
            return outcome;
        };

        self.apply_print(table, index, &record, status.clone());
        SubmitOutcome::Added {
            index,
            status: Some(status),
        }
    }

    /// 对已有的行重新打印
    pub async fn retry_print(&self, table: &mut TableStore, index: usize) -> RetryOutcome {
        let record = match self.begin_retry(table, index) {
            Ok(record) => record,
            Err(outcome) => return outcome,
        };

        let status = self
            .print(index, &record)
            .await
            .unwrap_or_else(|| PrintStatus::Failed("Unknown".to_string()));

        self.apply_print(table, index, &record, status.clone());
        RetryOutcome::Printed { index, status }
    }

    /// 步骤 1：查询商品
    pub async fn lookup(&self, input: &ScanInput) -> Result<LookupData, ApiError> {
        info!("{} 🔍 查询商品: {}", input, truncate_text(&input.qrcode, 80));
        self.lookup.lookup(&input.code).await
    }

    /// 步骤 2：根据查询结果追加记录
    ///
    /// 启用打印时新行先以 `Printing...` 写入表格和存储，
    /// 调用方可以立即展示，再用 [`Self::print`] 发起打印。
    pub fn accept_lookup(
        &self,
        table: &mut TableStore,
        input: &ScanInput,
        result: Result<LookupData, ApiError>,
    ) -> SubmitOutcome {
        let data = match result {
            Ok(data) => data,
            Err(e) => {
                error!("{} ❌ 查询失败: {}", input, e);
                return SubmitOutcome::LookupFailed {
                    code: input.code.clone(),
                    reason: e.to_string(),
                };
            }
        };

        let mut record = ProductRecord::from_lookup(&input.qrcode, &input.code, data);
        if self.printer.is_some() {
            record.status = Some(PrintStatus::Printing);
        }
        let status = record.status.clone();

        info!("{} ✓ {}", input, record.product_name);

        let index = match table.append(record) {
            Ok(index) => index,
            Err(e) => {
                log_storage_error(&e);
                table.len() - 1
            }
        };

        SubmitOutcome::Added { index, status }
    }

    /// 把已有的行重新置为 `Printing...`，返回要打印的记录
    pub fn begin_retry(
        &self,
        table: &mut TableStore,
        index: usize,
    ) -> Result<ProductRecord, RetryOutcome> {
        if self.printer.is_none() {
            return Err(RetryOutcome::PrintingDisabled);
        }
        if table.get(index).is_none() {
            return Err(RetryOutcome::NoSuchRow { index });
        }

        info!("[第 {} 行] 🔁 重新打印", index + 1);
        if let Err(e) = table.set_status(index, PrintStatus::Printing) {
            log_storage_error(&e);
        }

        table
            .get(index)
            .cloned()
            .ok_or(RetryOutcome::NoSuchRow { index })
    }

    /// 步骤 3：打印标签，未启用打印时返回 `None`
    pub async fn print(&self, index: usize, record: &ProductRecord) -> Option<PrintStatus> {
        let printer = self.printer.as_ref()?;
        let status = printer.print(record).await;

        if status.is_failed() {
            warn!("[第 {} 行] ⚠️ 打印失败: {}", index + 1, status);
        } else {
            info!("[第 {} 行] 🖨️ {}", index + 1, status);
        }
        Some(status)
    }

    /// 步骤 4：把打印结果写回原来的行
    ///
    /// 打印期间表格被清空或该行已不是原来的记录时丢弃结果，返回 `false`
    pub fn apply_print(
        &self,
        table: &mut TableStore,
        index: usize,
        record: &ProductRecord,
        status: PrintStatus,
    ) -> bool {
        let same_row = table
            .get(index)
            .is_some_and(|row| row.qrcode == record.qrcode && row.uniq == record.uniq);
        if !same_row {
            warn!("[第 {} 行] ⚠️ 该行已不存在，丢弃打印结果: {}", index + 1, status);
            return false;
        }

        if let Err(e) = table.set_status(index, status) {
            log_storage_error(&e);
        }
        true
    }
}

fn log_storage_error(e: &StorageError) {
    warn!("⚠️ 本地存储同步失败，本次修改仅保留在内存中: {}", e);
}
