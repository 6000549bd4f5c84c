//! 剪贴板内容分类
//!
//! # 设计思路
//!
//! 一次分类是在一个 `acquire`/`release` 作用域内按固定优先级探测
//! 格式：文本（含网盘链接/网址/邮箱细分）→ HTML → 富文本 → 注册
//! URL → 图片 → 文件列表 → Office 对象 → 其他已注册格式 → 未知。
//! 第一个命中的格式决定结果。
//!
//! 结果是带判别标签的 [`ContentDescriptor`]，取代历史版本里靠可选
//! 键试探的内容字典。`display_content` 只是 `raw_content` 的截断
//! 视图，不携带原始内容之外的信息。
//!
//! # 错误语义
//!
//! `classify` **从不 panic、从不返回错误类型**：
//! - 获取剪贴板失败 → 有限次整体重试后退化为 `Error` 描述符
//! - 某格式声称可用但读取失败 → 文本格式重试，其余格式退化为该
//!   类型的占位描述（实测 DIB/HDROP 偶发读取异常）
//!
//! # 并发
//!
//! 轮询线程与前台按需取数可能并发进入。`ResourceGuard` 的重试只
//! 解决跨进程占用；进程内再加一把粗粒度锁把"打开→读取→关闭"整段
//! 串行化，防止两个内部调用方交错打开/关闭弄乱按线程记账。

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::{self, Settings, SharedSettings};
use crate::error::AppError;
use crate::netdisk::{self, NetdiskInfo};

use super::backend::{ClipFormat, ClipboardBackend};
use super::guard::{ResourceGuard, MAX_RETRY, RETRY_DELAY};

/// 特殊格式最多列出的格式名数量
const MAX_LISTED_FORMATS: usize = 3;

/// 内容类型判别标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentKind {
    Text,
    Url,
    Email,
    NetdiskLink,
    Html,
    RichText,
    Image,
    File,
    OfficeObject,
    SpecialFormat,
    UnknownFormat,
    Error,
}

/// 未截断的原始负载
#[derive(Debug, Clone, Serialize)]
pub enum RawPayload {
    /// 文本类内容（纯文本/网址/邮箱/网盘链接的原文，或原始 HTML）
    Text(String),
    /// 二进制内容（RTF 原始字节）
    Bytes(Vec<u8>),
    /// 文件拖放列表
    Files(Vec<PathBuf>),
    /// 其他已注册格式的名称列表
    Formats(Vec<String>),
    /// 无可保留负载（图片句柄等由预览层自行获取）
    Empty,
}

/// 一次分类的结果
///
/// 相等性只比较 `kind` + `display_content` + `netdisk_info`，
/// 这是变化检测的比较契约。
#[derive(Debug, Clone, Serialize)]
pub struct ContentDescriptor {
    pub kind: ContentKind,
    /// 展示用内容，可能被截断
    pub display_content: String,
    /// 完整原始负载，永不截断，供打开/复制/全文预览使用
    pub raw_content: RawPayload,
    /// 仅 `kind == NetdiskLink` 时存在
    pub netdisk_info: Option<NetdiskInfo>,
}

impl PartialEq for ContentDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.display_content == other.display_content
            && self.netdisk_info == other.netdisk_info
    }
}

impl ContentDescriptor {
    fn new(kind: ContentKind, display_content: String, raw_content: RawPayload) -> Self {
        Self {
            kind,
            display_content,
            raw_content,
            netdisk_info: None,
        }
    }

    /// 错误描述符：获取剪贴板失败时的统一出口
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ContentKind::Error, message.into(), RawPayload::Empty)
    }
}

/// 网址形状：带协议、www. 前缀、或裸域名 + 常见顶级域
///
/// 裸域名分支排除 `@`，邮箱地址不算网址。
static URL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(https?|ftp)://[^\s/$.?#].[^\s]*$|^www\.[^\s/$.?#].[^\s]*$|^[^\s/$.?#@]+\.(com|net|org|edu|gov|mil|io|co|ai|app|dev|top|xyz)[^\s]*$",
    )
    .expect("网址正则无效")
});

/// 邮箱形状
static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("邮箱正则无效")
});

/// HTML 标签（用于摘要提取，非完整解析）
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<]+?>").expect("HTML标签正则无效"));

fn is_url(text: &str) -> bool {
    URL_SHAPE.is_match(text)
}

fn is_email(text: &str) -> bool {
    EMAIL_SHAPE.is_match(text)
}

/// 按配置截断展示文本，超长时补省略号；按字符计数而非字节
fn truncate_display(text: &str, truncate: bool, limit: usize) -> String {
    if truncate && text.chars().count() > limit {
        let mut cut: String = text.chars().take(limit).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

/// 去标签 + 折叠空白的 HTML 文本摘要
fn html_summary(html: &str) -> String {
    let stripped = HTML_TAG.replace_all(html, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 文件大小的人类可读格式，阈值 1024
fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} 字节", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// 剪贴板内容分类器
pub struct ContentClassifier {
    backend: Arc<dyn ClipboardBackend>,
    guard: ResourceGuard,
    settings: SharedSettings,
    /// 进程内"打开→读取→关闭"临界区锁
    serial: Mutex<()>,
}

impl ContentClassifier {
    pub fn new(backend: Arc<dyn ClipboardBackend>, settings: SharedSettings) -> Self {
        let guard = ResourceGuard::new(backend.clone());
        Self {
            backend,
            guard,
            settings,
            serial: Mutex::new(()),
        }
    }

    /// 获取并分类当前剪贴板内容
    ///
    /// `truncate` 为 true 时对文本类展示内容做截断（通知场景）；
    /// 预览场景传 false 拿全文。任何失败路径都以 `Error` 描述符
    /// 返回，绝不向调用方抛出。
    pub fn classify(&self, truncate: bool) -> ContentDescriptor {
        let _serial = match self.serial.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("分类临界区锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        };
        let cfg = config::snapshot(&self.settings);

        for attempt in 0..MAX_RETRY {
            // 抹掉本线程可能残留的陈旧记账
            self.guard.reset_current_thread();

            if !self.guard.acquire(1) {
                if attempt + 1 < MAX_RETRY {
                    thread::sleep(RETRY_DELAY);
                    continue;
                }
                return ContentDescriptor::error("无法访问剪贴板，可能被其他程序占用");
            }

            match self.classify_once(truncate, &cfg) {
                Ok(descriptor) => return descriptor,
                Err(e) => {
                    // classify_once 在其所有出口都已释放；这里兜底无害（幂等）
                    self.guard.release();
                    if attempt + 1 < MAX_RETRY {
                        thread::sleep(RETRY_DELAY);
                        continue;
                    }
                    log::error!("获取剪贴板内容异常: {}", e);
                    return ContentDescriptor::error(format!("获取剪贴板内容异常: {}", e));
                }
            }
        }

        ContentDescriptor::error("多次尝试获取剪贴板内容失败")
    }

    /// 单次分类尝试；调用时剪贴板已打开
    ///
    /// `Err` 表示值得整体重试的读取失败（文本格式）；可退化的
    /// 格式失败在本函数内就地降级，不触发重试。
    fn classify_once(&self, truncate: bool, cfg: &Settings) -> Result<ContentDescriptor, AppError> {
        if self.backend.has_format(ClipFormat::Text) {
            let text = match self.backend.read_text() {
                Ok(text) => text,
                Err(e) => {
                    self.guard.release();
                    return Err(e);
                }
            };
            // 后续匹配不再触碰剪贴板，尽早交还
            self.guard.release();
            return Ok(self.classify_text(text, truncate, cfg));
        }

        if self.backend.has_format(ClipFormat::Html) {
            let read = self.backend.read_html();
            self.guard.release();
            return Ok(match read {
                Ok(html) => {
                    let summary =
                        truncate_display(&html_summary(&html), truncate, cfg.truncate_length);
                    ContentDescriptor::new(ContentKind::Html, summary, RawPayload::Text(html))
                }
                Err(e) => ContentDescriptor::new(
                    ContentKind::Html,
                    format!("HTML内容 (无法显示: {})", e),
                    RawPayload::Empty,
                ),
            });
        }

        if self.backend.has_format(ClipFormat::RichText) {
            let read = self.backend.read_rich_text();
            self.guard.release();
            return Ok(match read {
                Ok(data) => {
                    let mut preview = "富文本内容".to_string();
                    if data.len() > 50 {
                        preview.push_str(&format!(" (大小: {} 字节)", data.len()));
                    }
                    ContentDescriptor::new(ContentKind::RichText, preview, RawPayload::Bytes(data))
                }
                Err(e) => ContentDescriptor::new(
                    ContentKind::RichText,
                    format!("富文本内容 (无法显示: {})", e),
                    RawPayload::Empty,
                ),
            });
        }

        if self.backend.has_format(ClipFormat::Url) {
            let read = self.backend.read_url();
            self.guard.release();
            return Ok(match read {
                Ok(url) => {
                    ContentDescriptor::new(ContentKind::Url, url.clone(), RawPayload::Text(url))
                }
                Err(e) => ContentDescriptor::new(
                    ContentKind::Url,
                    format!("网址内容 (无法显示: {})", e),
                    RawPayload::Empty,
                ),
            });
        }

        if self.backend.has_format(ClipFormat::Image) {
            // 不直接取 DIB 数据（偶发读取异常），位图句柄留给预览层
            self.guard.release();
            return Ok(ContentDescriptor::new(
                ContentKind::Image,
                "已复制一张图片".to_string(),
                RawPayload::Empty,
            ));
        }

        if self.backend.has_format(ClipFormat::FileList) {
            let read = self.backend.read_file_list();
            self.guard.release();
            return Ok(match read {
                Ok(files) => Self::describe_files(files),
                Err(e) => ContentDescriptor::new(
                    ContentKind::File,
                    format!("文件内容 (无法显示: {})", e),
                    RawPayload::Empty,
                ),
            });
        }

        if self.backend.has_format(ClipFormat::OfficeObject) {
            self.guard.release();
            return Ok(ContentDescriptor::new(
                ContentKind::OfficeObject,
                "已复制Office绘图或对象".to_string(),
                RawPayload::Empty,
            ));
        }

        let names = self.backend.format_names(MAX_LISTED_FORMATS);
        self.guard.release();
        if names.is_empty() {
            Ok(ContentDescriptor::new(
                ContentKind::UnknownFormat,
                "已复制内容 (未知格式)".to_string(),
                RawPayload::Empty,
            ))
        } else {
            Ok(ContentDescriptor::new(
                ContentKind::SpecialFormat,
                format!("已复制内容 (格式: {}...)", names.join(", ")),
                RawPayload::Formats(names),
            ))
        }
    }

    /// 文本内容细分：网盘链接 > 网址 > 邮箱 > 纯文本
    fn classify_text(&self, text: String, truncate: bool, cfg: &Settings) -> ContentDescriptor {
        if cfg.enable_netdisk_detection {
            if let Some(info) = netdisk::detect(&text) {
                return ContentDescriptor {
                    kind: ContentKind::NetdiskLink,
                    display_content: info.summary(),
                    raw_content: RawPayload::Text(text),
                    netdisk_info: Some(info),
                };
            }
        }

        // 邮箱形状比网址窄，先判邮箱
        if is_email(&text) {
            return ContentDescriptor::new(
                ContentKind::Email,
                text.clone(),
                RawPayload::Text(text),
            );
        }

        if is_url(&text) {
            let display = truncate_display(&text, truncate, cfg.truncate_length);
            return ContentDescriptor::new(ContentKind::Url, display, RawPayload::Text(text));
        }

        let display = truncate_display(&text, truncate, cfg.truncate_length);
        ContentDescriptor::new(ContentKind::Text, display, RawPayload::Text(text))
    }

    /// 文件列表描述：单文件报名称 + 大小，多文件报数量
    fn describe_files(files: Vec<PathBuf>) -> ContentDescriptor {
        if files.len() == 1 {
            let path = &files[0];
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            ContentDescriptor::new(
                ContentKind::File,
                format!("已复制文件: {} ({})", name, format_file_size(size)),
                RawPayload::Files(files),
            )
        } else {
            ContentDescriptor::new(
                ContentKind::File,
                format!("已复制 {} 个文件", files.len()),
                RawPayload::Files(files),
            )
        }
    }
}
