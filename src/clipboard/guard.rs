//! 剪贴板访问仲裁
//!
//! # 设计思路
//!
//! 系统剪贴板是进程外单例，随时可能被其他应用短暂持有——这才是
//! 竞争的主要来源，而非进程内线程。本模块把"打开/关闭"收敛为
//! 按线程记账的 `acquire`/`release`：
//! - 同一线程重复 `acquire` 直接返回 true（可重入，不会双重打开）
//! - `acquire` 失败是**正常结果**，有限次重试后返回 false，绝不 panic
//! - `release` 失败时仍强制清掉本线程的持有标记，避免反复重试一个
//!   注定失败的关闭而陷入僵局
//!
//! # 实现思路
//!
//! - 持有状态是 `Mutex<HashMap<ThreadId, bool>>`（剪贴板所有权是
//!   OS 线程级的，标记不得跨线程共享）。
//! - 重试间隔固定 100ms，不做指数退避——占用方通常亚秒内交还。
//! - 锁中毒按监听器的惯例用恢复数据继续。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use std::time::Duration;

use super::backend::ClipboardBackend;

/// 整个分类过程的最大重试次数
pub const MAX_RETRY: u32 = 3;
/// 重试间隔
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

/// 剪贴板打开/关闭的按线程记账守卫
pub struct ResourceGuard {
    backend: Arc<dyn ClipboardBackend>,
    held_by_thread: Mutex<HashMap<ThreadId, bool>>,
}

impl ResourceGuard {
    pub fn new(backend: Arc<dyn ClipboardBackend>) -> Self {
        Self {
            backend,
            held_by_thread: Mutex::new(HashMap::new()),
        }
    }

    fn held_map(&self) -> MutexGuard<'_, HashMap<ThreadId, bool>> {
        match self.held_by_thread.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("剪贴板持有状态锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }

    /// 当前线程是否已持有剪贴板
    pub fn is_held(&self) -> bool {
        let thread_id = thread::current().id();
        self.held_map().get(&thread_id).copied().unwrap_or(false)
    }

    /// 清除当前线程的记账（分类过程开头调用，抹掉陈旧状态）
    pub fn reset_current_thread(&self) {
        self.held_map().insert(thread::current().id(), false);
    }

    /// 尝试打开剪贴板，最多 `max_retries` 次，间隔 [`RETRY_DELAY`]
    ///
    /// 当前线程已持有时直接返回 true。全部失败返回 false——
    /// 这是预期结果（其他程序暂时占用），不是异常。
    pub fn acquire(&self, max_retries: u32) -> bool {
        if self.is_held() {
            return true;
        }
        let thread_id = thread::current().id();

        for attempt in 0..max_retries {
            match self.backend.open() {
                Ok(()) => {
                    self.held_map().insert(thread_id, true);
                    return true;
                }
                Err(e) => {
                    if attempt + 1 == max_retries {
                        log::debug!("打开剪贴板失败: {}", e);
                        return false;
                    }
                    thread::sleep(RETRY_DELAY);
                }
            }
        }
        false
    }

    /// 关闭剪贴板
    ///
    /// 当前线程未持有时是返回 true 的空操作（防止双重释放）。
    /// 关闭失败只记 debug 日志——资源可能已被 OS 层合法释放——
    /// 并强制清掉持有标记。
    pub fn release(&self) -> bool {
        if !self.is_held() {
            return true;
        }
        let thread_id = thread::current().id();

        match self.backend.close() {
            Ok(()) => {
                self.held_map().insert(thread_id, false);
                true
            }
            Err(e) => {
                log::debug!("关闭剪贴板失败: {}", e);
                self.held_map().insert(thread_id, false);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    use super::*;
    use crate::clipboard::backend::ClipFormat;
    use crate::error::AppError;

    /// 可编排的假后端：前 `fail_opens` 次打开失败，之后成功
    struct ScriptedBackend {
        fail_opens: u32,
        open_calls: AtomicU32,
        close_calls: AtomicU32,
        close_fails: bool,
    }

    impl ScriptedBackend {
        fn new(fail_opens: u32) -> Self {
            Self {
                fail_opens,
                open_calls: AtomicU32::new(0),
                close_calls: AtomicU32::new(0),
                close_fails: false,
            }
        }
    }

    impl ClipboardBackend for ScriptedBackend {
        fn open(&self) -> Result<(), AppError> {
            let n = self.open_calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_opens {
                Err(AppError::Clipboard("被其他程序占用".to_string()))
            } else {
                Ok(())
            }
        }

        fn close(&self) -> Result<(), AppError> {
            self.close_calls.fetch_add(1, Ordering::SeqCst);
            if self.close_fails {
                Err(AppError::Clipboard("关闭失败".to_string()))
            } else {
                Ok(())
            }
        }

        fn has_format(&self, _format: ClipFormat) -> bool {
            false
        }
        fn read_text(&self) -> Result<String, AppError> {
            Err(AppError::Format("无文本".to_string()))
        }
        fn read_html(&self) -> Result<String, AppError> {
            Err(AppError::Format("无HTML".to_string()))
        }
        fn read_rich_text(&self) -> Result<Vec<u8>, AppError> {
            Err(AppError::Format("无RTF".to_string()))
        }
        fn read_url(&self) -> Result<String, AppError> {
            Err(AppError::Format("无URL".to_string()))
        }
        fn read_file_list(&self) -> Result<Vec<PathBuf>, AppError> {
            Err(AppError::Format("无文件".to_string()))
        }
        fn format_names(&self, _limit: usize) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn acquire_is_reentrant_within_one_thread() {
        let backend = Arc::new(ScriptedBackend::new(0));
        let guard = ResourceGuard::new(backend.clone());

        assert!(guard.acquire(MAX_RETRY));
        assert!(guard.acquire(MAX_RETRY));
        // 重入不触发第二次 OS 打开
        assert_eq!(backend.open_calls.load(Ordering::SeqCst), 1);

        assert!(guard.release());
        assert!(!guard.is_held());
        assert_eq!(backend.close_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn acquire_retries_then_succeeds() {
        let backend = Arc::new(ScriptedBackend::new(2));
        let guard = ResourceGuard::new(backend.clone());

        assert!(guard.acquire(MAX_RETRY));
        assert_eq!(backend.open_calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn acquire_exhaustion_returns_false_without_panicking() {
        let backend = Arc::new(ScriptedBackend::new(u32::MAX));
        let guard = ResourceGuard::new(backend.clone());

        let started = Instant::now();
        assert!(!guard.acquire(MAX_RETRY));
        // 两次间隔睡眠（最后一次失败不再等待）
        assert!(started.elapsed() >= RETRY_DELAY * (MAX_RETRY - 1));
        assert!(!guard.is_held());
    }

    #[test]
    fn release_without_hold_is_noop_true() {
        let backend = Arc::new(ScriptedBackend::new(0));
        let guard = ResourceGuard::new(backend.clone());

        assert!(guard.release());
        assert_eq!(backend.close_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_close_still_clears_held_state() {
        let mut scripted = ScriptedBackend::new(0);
        scripted.close_fails = true;
        let backend = Arc::new(scripted);
        let guard = ResourceGuard::new(backend.clone());

        assert!(guard.acquire(MAX_RETRY));
        assert!(!guard.release());
        // 状态已被强制清除，后续 release 是空操作
        assert!(!guard.is_held());
        assert!(guard.release());
        assert_eq!(backend.close_calls.load(Ordering::SeqCst), 1);
    }
}
