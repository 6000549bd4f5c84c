//! 配置模块
//!
//! # 设计思路
//!
//! 引擎只消费少量标量配置：轮询间隔、截断长度、三个功能开关。
//! 配置以 JSON 文件持久化，加载时将文件内容合并到默认值上并回写，
//! 保证文件里始终是完整的键集合（新增配置项自动补全）。
//!
//! # 实现思路
//!
//! - `serde(default)` 实现"文件缺键用默认值"的合并语义。
//! - 加载失败只记日志并退回默认配置，不让配置问题拖垮引擎。
//! - 运行期通过 `Arc<RwLock<Settings>>` 共享，读多写少。

use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 监视循环默认轮询间隔（秒）
pub const DEFAULT_CHECK_INTERVAL: f64 = 0.5;
/// 显示内容默认截断长度（字符数）
pub const DEFAULT_TRUNCATE_LENGTH: usize = 100;

/// 引擎运行配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 剪贴板轮询间隔（秒）
    pub check_interval: f64,
    /// 通知/预览显示内容的截断长度
    pub truncate_length: usize,
    /// 是否发送变化通知（由通知层消费）
    pub show_notifications: bool,
    /// 是否启用网盘链接检测
    pub enable_netdisk_detection: bool,
    /// 打开网盘链接时是否把提取码复制到剪贴板（由动作层消费）
    pub copy_pwd_to_clipboard: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            truncate_length: DEFAULT_TRUNCATE_LENGTH,
            show_notifications: true,
            enable_netdisk_detection: true,
            copy_pwd_to_clipboard: true,
        }
    }
}

/// 运行期共享的配置句柄
pub type SharedSettings = Arc<RwLock<Settings>>;

/// 读取共享配置的快照，锁中毒时沿用恢复数据
pub fn snapshot(settings: &SharedSettings) -> Settings {
    match settings.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => {
            log::warn!("配置锁中毒，继续使用恢复数据");
            poisoned.into_inner().clone()
        }
    }
}

impl Settings {
    /// 从 JSON 文件加载配置并合并到默认值上
    ///
    /// 文件不存在或解析失败时退回默认配置（只记日志），
    /// 随后把合并结果回写，保证文件键集合完整。
    pub fn load(path: &Path) -> Self {
        log::debug!("加载配置文件: {}", path.display());
        let settings = match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Settings>(&content) {
                Ok(parsed) => parsed,
                Err(e) => {
                    log::error!("解析配置文件失败，使用默认配置: {}", e);
                    Settings::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => {
                log::error!("读取配置文件失败，使用默认配置: {}", e);
                Settings::default()
            }
        };

        if let Err(e) = settings.save(path) {
            log::error!("回写配置文件失败: {}", e);
        }
        settings
    }

    /// 将配置序列化为带缩进的 JSON 并写入文件
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| AppError::Config(format!("创建配置目录失败: {}", e)))?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("序列化配置失败: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 包装成运行期共享句柄
    pub fn into_shared(self) -> SharedSettings {
        Arc::new(RwLock::new(self))
    }
}
