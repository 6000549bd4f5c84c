//! 网盘分享链接识别模块
//!
//! # 设计思路
//!
//! 把"一段剪贴板文本里有没有网盘分享链接、提取码是什么"收敛为
//! 三个正交部件：
//! - **规则表** (`rules`)：~18 家提供商的不可变正则注册表
//! - **文本净化** (`sanitize`)：去除 emoji/汉字/装饰标点的幂等清理
//! - **解析器** (`resolver`)：两遍检测 + 提取码优先级仲裁
//!
//! 对外只暴露 `detect()`、结果类型 `NetdiskInfo` 和带码打开 URL 的
//! 构建函数。检测结果不触网——URL 只用于展示与交给浏览器。

pub mod resolver;
pub mod rules;
pub mod sanitize;

use serde::Serialize;

pub use resolver::detect;

/// 一次链接解析的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetdiskInfo {
    /// 规则表稳定标识符，如 `"baidu"`
    pub provider_id: &'static str,
    /// 提供商名称，如 `"百度网盘"`
    pub provider_name: &'static str,
    /// 归一化后的分享链接；确认过的提取码参数不会被重复附加
    pub url: String,
    /// 提取码（可能不存在）
    pub pwd: Option<String>,
    /// 提取码是否来自 URL 查询串（而非文本标注）
    pub pwd_in_url: bool,
}

impl NetdiskInfo {
    /// 通知/预览用的一行摘要
    pub fn summary(&self) -> String {
        match &self.pwd {
            Some(pwd) => format!("{}: {} [提取码: {}]", self.provider_name, self.url, pwd),
            None => format!("{}: {}", self.provider_name, self.url),
        }
    }
}

/// 构建"带提取码打开"的 URL
///
/// 仅当存在提取码、提取码不在 URL 里、且 URL 尚无 `pwd=` 参数时
/// 才套用提供商模板；否则原样返回，保证提取码参数不会重复出现。
pub fn build_open_url(info: &NetdiskInfo) -> String {
    match &info.pwd {
        Some(pwd) if !info.pwd_in_url && !info.url.contains("pwd=") => {
            match rules::find_rule(info.provider_id) {
                Some(rule) => rules::apply_template(rule.url_with_pwd_template, &info.url, pwd),
                None => info.url.clone(),
            }
        }
        _ => info.url.clone(),
    }
}
