//! 程序自身的剪贴板写入
//!
//! # 实现思路
//!
//! 写入走 `arboard` 而非 Win32 原始接口，写入方不需要格式级
//! 控制，也不走 `ResourceGuard`（arboard 自带打开重试）。每次
//! 操作期间置位 [`WriteSuppression`] 标志，监控循环据此跳过
//! 自己触发的变化。写入失败记日志返回 false，不向上传播。

use std::sync::Arc;

use super::WriteSuppression;

/// 带自写抑制的剪贴板写入器
pub struct ClipboardWriter {
    suppression: Arc<WriteSuppression>,
}

impl ClipboardWriter {
    pub fn new(suppression: Arc<WriteSuppression>) -> Self {
        Self { suppression }
    }

    /// 清空剪贴板，返回是否成功
    pub fn clear(&self) -> bool {
        let _guard = self.suppression.begin_clear();
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => match clipboard.clear() {
                Ok(()) => {
                    log::debug!("已清空剪贴板");
                    true
                }
                Err(e) => {
                    log::error!("清空剪贴板失败: {}", e);
                    false
                }
            },
            Err(e) => {
                log::error!("初始化剪贴板失败: {}", e);
                false
            }
        }
    }

    /// 写入文本（复制提取码等场景），返回是否成功
    pub fn set_text(&self, text: &str) -> bool {
        let _guard = self.suppression.begin_set();
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(text) {
                Ok(()) => {
                    log::debug!("已写入剪贴板文本，长度 {}", text.chars().count());
                    true
                }
                Err(e) => {
                    log::error!("写入剪贴板失败: {}", e);
                    false
                }
            },
            Err(e) => {
                log::error!("初始化剪贴板失败: {}", e);
                false
            }
        }
    }
}
