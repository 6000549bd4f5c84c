// 分类器与监控器的端到端测试，用脚本化后端替换系统剪贴板
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use clipboard_enhance::clipboard::guard::{MAX_RETRY, RETRY_DELAY};
use clipboard_enhance::clipboard::{
    ChangeMonitor, ClipFormat, ClipboardBackend, ContentClassifier, ContentKind, WriteSuppression,
};
use clipboard_enhance::config::Settings;
use clipboard_enhance::error::AppError;

/// 假剪贴板：内容可在测试中途切换，打开可被设为永远失败
struct FakeClipboard {
    text: Mutex<Option<String>>,
    open_always_fails: bool,
    open_calls: AtomicU32,
}

impl FakeClipboard {
    fn with_text(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: Mutex::new(Some(text.to_string())),
            open_always_fails: false,
            open_calls: AtomicU32::new(0),
        })
    }

    fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            text: Mutex::new(None),
            open_always_fails: true,
            open_calls: AtomicU32::new(0),
        })
    }

    fn set_text(&self, text: &str) {
        *self.text.lock().expect("text lock") = Some(text.to_string());
    }
}

impl ClipboardBackend for FakeClipboard {
    fn open(&self) -> Result<(), AppError> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        if self.open_always_fails {
            Err(AppError::Clipboard("被其他程序占用".to_string()))
        } else {
            Ok(())
        }
    }

    fn close(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn has_format(&self, format: ClipFormat) -> bool {
        format == ClipFormat::Text && self.text.lock().expect("text lock").is_some()
    }

    fn read_text(&self) -> Result<String, AppError> {
        self.text
            .lock()
            .expect("text lock")
            .clone()
            .ok_or_else(|| AppError::Format("无文本内容".to_string()))
    }

    fn read_html(&self) -> Result<String, AppError> {
        Err(AppError::Format("无HTML内容".to_string()))
    }

    fn read_rich_text(&self) -> Result<Vec<u8>, AppError> {
        Err(AppError::Format("无RTF内容".to_string()))
    }

    fn read_url(&self) -> Result<String, AppError> {
        Err(AppError::Format("无URL内容".to_string()))
    }

    fn read_file_list(&self) -> Result<Vec<PathBuf>, AppError> {
        Err(AppError::Format("无文件列表".to_string()))
    }

    fn format_names(&self, _limit: usize) -> Vec<String> {
        Vec::new()
    }
}

fn classifier_over(backend: Arc<FakeClipboard>, settings: Settings) -> ContentClassifier {
    ContentClassifier::new(backend, settings.into_shared())
}

#[test]
fn test_email_text_classified_as_email() {
    let _ = env_logger::builder().is_test(true).try_init();
    let backend = FakeClipboard::with_text("someone@example.com");
    let classifier = classifier_over(backend, Settings::default());

    let descriptor = classifier.classify(true);
    assert_eq!(descriptor.kind, ContentKind::Email);
    assert_eq!(descriptor.display_content, "someone@example.com");
}

#[test]
fn test_netdisk_share_text_classified_with_info() {
    let backend = FakeClipboard::with_text("https://pan.baidu.com/s/1AbCdEfG 提取码：8x2k");
    let classifier = classifier_over(backend, Settings::default());

    let descriptor = classifier.classify(true);
    assert_eq!(descriptor.kind, ContentKind::NetdiskLink);
    let info = descriptor.netdisk_info.expect("网盘信息应存在");
    assert_eq!(info.provider_id, "baidu");
    assert_eq!(info.pwd.as_deref(), Some("8x2k"));
    assert!(descriptor.display_content.contains("提取码: 8x2k"));
}

#[test]
fn test_netdisk_detection_can_be_disabled() {
    let backend = FakeClipboard::with_text("https://pan.baidu.com/s/1AbCdEfG");
    let settings = Settings {
        enable_netdisk_detection: false,
        ..Settings::default()
    };
    let classifier = classifier_over(backend, settings);

    let descriptor = classifier.classify(true);
    // 关掉网盘检测后退回网址识别
    assert_eq!(descriptor.kind, ContentKind::Url);
    assert!(descriptor.netdisk_info.is_none());
}

#[test]
fn test_long_text_truncated_only_in_display() {
    let long_text: String = "甲".repeat(300);
    let backend = FakeClipboard::with_text(&long_text);
    let classifier = classifier_over(backend, Settings::default());

    let truncated = classifier.classify(true);
    assert_eq!(truncated.kind, ContentKind::Text);
    assert_eq!(truncated.display_content.chars().count(), 103);
    assert!(truncated.display_content.ends_with("..."));
    match &truncated.raw_content {
        clipboard_enhance::clipboard::RawPayload::Text(raw) => assert_eq!(raw, &long_text),
        other => panic!("原始负载应为文本: {:?}", other),
    }

    let full = classifier.classify(false);
    assert_eq!(full.display_content, long_text);
}

#[test]
fn test_unavailable_clipboard_degrades_to_error_descriptor() {
    let backend = FakeClipboard::unavailable();
    let classifier = classifier_over(backend.clone(), Settings::default());

    let started = Instant::now();
    let descriptor = classifier.classify(true);
    let elapsed = started.elapsed();

    assert_eq!(descriptor.kind, ContentKind::Error);
    assert_eq!(descriptor.display_content, "无法访问剪贴板，可能被其他程序占用");
    assert_eq!(backend.open_calls.load(Ordering::SeqCst), MAX_RETRY);
    // 重试间隔只出现在两次尝试之间，总耗时有界
    assert!(elapsed >= RETRY_DELAY * (MAX_RETRY - 1));
    assert!(elapsed < RETRY_DELAY * (MAX_RETRY * 3));
}

#[test]
fn test_monitor_emits_once_per_content_change() {
    let backend = FakeClipboard::with_text("第一段内容");
    let settings = Settings {
        check_interval: 0.05,
        ..Settings::default()
    }
    .into_shared();
    let classifier = Arc::new(ContentClassifier::new(
        backend.clone() as Arc<dyn ClipboardBackend>,
        settings.clone(),
    ));
    let suppression = Arc::new(WriteSuppression::new());

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let monitor = ChangeMonitor::new(classifier, settings, suppression);
    let handle = monitor.start(Box::new(move |descriptor| {
        sink.lock().expect("events lock").push(descriptor.display_content.clone());
    }));

    // 基线轮次：内容未变，不应产生事件
    thread::sleep(Duration::from_millis(200));
    assert!(events.lock().expect("events lock").is_empty());

    backend.set_text("第二段内容");
    thread::sleep(Duration::from_millis(300));

    handle.stop();
    let seen = events.lock().expect("events lock").clone();
    assert_eq!(seen, vec!["第二段内容".to_string()]);
}

#[test]
fn test_monitor_skips_rounds_while_suppression_active() {
    let backend = FakeClipboard::with_text("初始内容");
    let settings = Settings {
        check_interval: 0.05,
        ..Settings::default()
    }
    .into_shared();
    let classifier = Arc::new(ContentClassifier::new(
        backend.clone() as Arc<dyn ClipboardBackend>,
        settings.clone(),
    ));
    let suppression = Arc::new(WriteSuppression::new());

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let monitor = ChangeMonitor::new(classifier, settings, suppression.clone());
    let handle = monitor.start(Box::new(move |descriptor| {
        sink.lock().expect("events lock").push(descriptor.display_content.clone());
    }));
    thread::sleep(Duration::from_millis(150));

    {
        // 模拟程序自己写剪贴板：抑制期内的变化不触发事件
        let _guard = suppression.begin_set();
        backend.set_text("程序写入的内容");
        thread::sleep(Duration::from_millis(300));
        assert!(events.lock().expect("events lock").is_empty());
    }

    // 抑制解除后首个轮次只静默接管基线，自写内容不会补发
    thread::sleep(Duration::from_millis(300));
    assert!(events.lock().expect("events lock").is_empty());

    // 之后用户再复制新内容仍正常上报
    backend.set_text("用户复制的内容");
    thread::sleep(Duration::from_millis(300));
    handle.stop();
    let seen = events.lock().expect("events lock").clone();
    assert_eq!(seen, vec!["用户复制的内容".to_string()]);
}
