//! 结果表服务 - 业务能力层
//!
//! 只追加的记录列表，每次修改后整表写回本地存储

use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::models::{PrintStatus, ProductRecord};
use crate::storage::LocalStore;

/// 持久化槽位名
pub const PRODUCTS_SLOT: &str = "products";

/// 结果表
///
/// 职责：
/// - 追加记录、原地更新打印状态、整表清空
/// - 不重排、不单独删除
/// - 每次修改都覆盖写入 `products` 槽位
pub struct TableStore {
    records: Vec<ProductRecord>,
    store: LocalStore,
}

impl TableStore {
    /// 从本地存储恢复
    ///
    /// 槽位不存在或内容损坏时从空表开始
    pub fn load(store: LocalStore) -> Self {
        let records = match store.get(PRODUCTS_SLOT) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ProductRecord>>(&raw) {
                Ok(records) => {
                    info!("📂 已恢复 {} 条记录", records.len());
                    records
                }
                Err(e) => {
                    warn!("⚠️ 存储内容已损坏，从空表开始: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("⚠️ 读取存储失败，从空表开始: {}", e);
                Vec::new()
            }
        };

        Self { records, store }
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ProductRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 追加一条记录，返回其索引
    pub fn append(&mut self, record: ProductRecord) -> Result<usize, StorageError> {
        self.records.push(record);
        let index = self.records.len() - 1;
        self.persist()?;
        Ok(index)
    }

    /// 更新最后一条记录的状态，空表时不做任何事
    pub fn patch_last_status(&mut self, status: PrintStatus) -> Result<(), StorageError> {
        match self.records.len() {
            0 => Ok(()),
            n => self.set_status(n - 1, status).map(|_| ()),
        }
    }

    /// 更新指定行的状态
    ///
    /// # 返回
    /// 索引越界时返回 `false`，不写存储
    pub fn set_status(&mut self, index: usize, status: PrintStatus) -> Result<bool, StorageError> {
        let Some(record) = self.records.get_mut(index) else {
            return Ok(false);
        };
        record.status = Some(status);
        self.persist()?;
        Ok(true)
    }

    /// 清空表格并删除槽位
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.records.clear();
        self.store.remove(PRODUCTS_SLOT)?;
        info!("🗑️ 已清空表格");
        Ok(())
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.records)?;
        self.store.set(PRODUCTS_SLOT, &json)?;
        debug!("已同步 {} 条记录到本地存储", self.records.len());
        Ok(())
    }
}
