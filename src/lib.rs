//! # 剪贴板增强引擎 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      调用方 (UI / 通知层)                 │
//! │                                                          │
//! │   on_change 回调 ←── 变化事件 (ContentDescriptor)        │
//! └───────┬──────────────────────────────────────────────────┘
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕                引擎 (Rust)                       │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ config ───── Settings JSON 读写 + 共享快照            │
//! │  │                                                       │
//! │  ├─ clipboard ── 读取·分类·监控                          │
//! │  │   ├─ backend     系统剪贴板窄接口 (Win32)              │
//! │  │   ├─ guard       打开/关闭按线程记账 + 重试            │
//! │  │   ├─ classifier  格式优先级分类 → ContentDescriptor   │
//! │  │   ├─ writer      自身写入 (arboard) + 自写抑制         │
//! │  │   └─ monitor     轮询变化检测 + 回调分发               │
//! │  │                                                       │
//! │  └─ netdisk ──── 网盘分享链接识别                         │
//! │      ├─ rules       提供商正则注册表                      │
//! │      ├─ sanitize    emoji/汉字/装饰标点净化               │
//! │      └─ resolver    两遍检测 + 提取码优先级               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`config`] | 运行配置的加载、保存与线程间共享 |
//! | [`clipboard`] | 剪贴板读取、内容分类、轮询监控、自身写入 |
//! | [`netdisk`] | 网盘分享链接与提取码的识别、归一化 |

pub mod clipboard;
pub mod config;
pub mod error;
pub mod netdisk;
