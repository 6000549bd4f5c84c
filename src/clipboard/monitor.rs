//! 剪贴板变化轮询
//!
//! # 设计思路
//!
//! 历史版本用事件钩子监听系统剪贴板，钩子在部分远程桌面/虚拟机
//! 环境下会静默失效，这里改成固定间隔轮询：每轮分类一次，与上
//! 一轮结果按值比较，变了才回调。比较走 [`ContentDescriptor`]
//! 的相等性契约（类型 + 展示内容 + 网盘信息），原始负载不参与。
//!
//! 自写抑制标志置位的轮次整体跳过；抑制结束后的首个轮次只静默
//! 接管基线不回调，程序自己的写入永远不会被当成用户复制上报。
//!
//! 轮询间隔每轮从共享配置快照读取，改配置即时生效，无需重启
//! 监控线程。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::{self, SharedSettings};

use super::classifier::{ContentClassifier, ContentDescriptor};
use super::WriteSuppression;

/// 变化回调，入参为新的分类结果
pub type ChangeCallback = Box<dyn Fn(&ContentDescriptor) + Send>;

/// 剪贴板轮询监控器
pub struct ChangeMonitor {
    classifier: Arc<ContentClassifier>,
    settings: SharedSettings,
    suppression: Arc<WriteSuppression>,
}

/// 运行中监控线程的控制句柄
pub struct MonitorHandle {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// 请求停止并等待监控线程退出（最多一个轮询间隔的延迟）
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                log::error!("剪贴板监控线程异常退出");
            }
        }
    }
}

impl ChangeMonitor {
    pub fn new(
        classifier: Arc<ContentClassifier>,
        settings: SharedSettings,
        suppression: Arc<WriteSuppression>,
    ) -> Self {
        Self {
            classifier,
            settings,
            suppression,
        }
    }

    /// 启动监控线程，内容变化时调用 `on_change`
    ///
    /// 启动时先分类一次作为基线，启动瞬间已有的剪贴板内容不触发
    /// 回调。
    pub fn start(self, on_change: ChangeCallback) -> MonitorHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let join = thread::spawn(move || {
            log::info!("剪贴板监控已启动");
            let mut previous = self.classifier.classify(true);
            let mut resync_after_skip = false;

            while !stop_flag.load(Ordering::SeqCst) {
                let interval = config::snapshot(&self.settings).check_interval;
                thread::sleep(Duration::from_secs_f64(interval));
                if stop_flag.load(Ordering::SeqCst) {
                    break;
                }

                if self.suppression.active() {
                    log::debug!("自写操作进行中，跳过本轮检测");
                    resync_after_skip = true;
                    continue;
                }

                let current = self.classifier.classify(true);
                if resync_after_skip {
                    // 跳过期间的变化来自程序自身写入，只接管基线
                    previous = current;
                    resync_after_skip = false;
                    continue;
                }
                if emit_if_changed(&mut previous, current, &on_change) {
                    log::debug!("剪贴板内容变化: {:?}", previous.kind);
                }
            }
            log::info!("剪贴板监控已停止");
        });

        MonitorHandle {
            stop,
            join: Some(join),
        }
    }
}

/// 单轮变化判定：`current` 与基线不同则回调并更新基线
///
/// 拆出来是为了不起线程就能测变化语义。
fn emit_if_changed(
    previous: &mut ContentDescriptor,
    current: ContentDescriptor,
    on_change: &ChangeCallback,
) -> bool {
    if current == *previous {
        return false;
    }
    on_change(&current);
    *previous = current;
    true
}
