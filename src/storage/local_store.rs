//! 本地持久化 - 基础设施层
//!
//! 以字符串为键的槽位，每个槽位对应目录下的 `<key>.json` 文件

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;

/// 本地键值存储
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// 打开存储目录，不存在则创建
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::WriteFailed {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// 读取槽位，不存在返回 `None`
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::ReadFailed {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// 覆盖写入槽位
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));

        if let Err(source) = fs::write(&tmp, value).and_then(|_| fs::rename(&tmp, &path)) {
            // 不留下半截的临时文件
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::WriteFailed {
                path: path.display().to_string(),
                source,
            });
        }

        debug!("已写入槽位 {} ({} 字节)", key, value.len());
        Ok(())
    }

    /// 删除槽位，不存在不算错误
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::DeleteFailed {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}
