//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)` 等不一致模式。
//!
//! 本引擎的对外约定是"错误不越过边界"：`classify` 永远返回内容描述符
//! （失败时为 `Error` 类型的描述符），`detect` 用 `None` 表示未命中。
//! `AppError` 只在模块内部流转，用于后端读取与配置读写的 `Result` 链。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 实现 `Serialize` 将错误序列化为字符串，便于通知/预览层透传。

use serde::Serialize;

/// 引擎内部统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 剪贴板打开/关闭失败（通常是其他进程暂时占用）
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 某个格式声称可用但读取失败（DIB/HDROP 偶发）
    #[error("剪贴板格式读取失败: {0}")]
    Format(String),

    /// 配置文件读写失败
    #[error("配置读写失败: {0}")]
    Config(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 将错误序列化为人类可读的字符串，便于跨 IPC 边界透传。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
