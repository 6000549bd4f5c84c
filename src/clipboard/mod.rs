//! 剪贴板子系统
//!
//! # 模块分工
//!
//! - [`backend`]：系统剪贴板的窄接口与 Win32 实现
//! - [`guard`]：打开/关闭的按线程记账与有限重试
//! - [`classifier`]：按优先级把内容归为带判别标签的描述符
//! - [`writer`]：程序自身的写入/清空，带自写抑制标记
//! - [`monitor`]：轮询变化检测与回调分发
//!
//! # 自写抑制
//!
//! 程序自己写剪贴板（复制提取码、清空）会触发一次"变化"，
//! 监控循环必须跳过它，否则自己的写入会被当成用户复制再处理
//! 一遍。[`WriteSuppression`] 用两个原子标志覆盖写入窗口，
//! RAII 守卫保证异常路径也能复位。

pub mod backend;
pub mod classifier;
pub mod guard;
pub mod monitor;
pub mod writer;

use std::sync::atomic::{AtomicBool, Ordering};

pub use backend::{ClipFormat, ClipboardBackend};
pub use classifier::{ContentClassifier, ContentDescriptor, ContentKind, RawPayload};
pub use guard::ResourceGuard;
pub use monitor::{ChangeMonitor, MonitorHandle};
pub use writer::ClipboardWriter;

#[cfg(windows)]
pub use backend::Win32Clipboard;

/// 自写抑制标志
///
/// 写入方在操作期间置位对应标志，监控循环看到任一标志置位就
/// 跳过本轮检测。标志由 RAII 守卫复位。
#[derive(Default)]
pub struct WriteSuppression {
    clearing: AtomicBool,
    setting: AtomicBool,
}

impl WriteSuppression {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否有自写操作正在进行
    pub fn active(&self) -> bool {
        self.clearing.load(Ordering::SeqCst) || self.setting.load(Ordering::SeqCst)
    }

    /// 标记"正在清空剪贴板"，守卫离开作用域时自动复位
    pub fn begin_clear(&self) -> SuppressionGuard<'_> {
        self.clearing.store(true, Ordering::SeqCst);
        SuppressionGuard {
            flag: &self.clearing,
        }
    }

    /// 标记"正在写入剪贴板"，守卫离开作用域时自动复位
    pub fn begin_set(&self) -> SuppressionGuard<'_> {
        self.setting.store(true, Ordering::SeqCst);
        SuppressionGuard { flag: &self.setting }
    }
}

/// 自写抑制的 RAII 守卫，Drop 时复位对应标志
pub struct SuppressionGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for SuppressionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppression_flags_reset_on_drop() {
        let suppression = WriteSuppression::new();
        assert!(!suppression.active());

        {
            let _guard = suppression.begin_set();
            assert!(suppression.active());
        }
        assert!(!suppression.active());

        {
            let _clear = suppression.begin_clear();
            let _set = suppression.begin_set();
            assert!(suppression.active());
        }
        assert!(!suppression.active());
    }
}
