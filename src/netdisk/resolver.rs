//! 网盘链接两遍检测
//!
//! # 设计思路
//!
//! 第一遍直接在原文上按规则表顺序匹配链接；第一遍落空且净化
//! 后的文本有变化时，在净化文本上做第二遍匹配。提取码永远从
//! **原文**提取——提取码标注本身是中文（"提取码："），净化会把
//! 它连同上下文一起削掉。
//!
//! 提取码优先级：URL 查询串里的 `pwd=` 参数（无歧义）优先于
//! 文本标注；两者都没有时退回通用标注正则。命中 URL 内提取码
//! 时保留链接后原有的查询串，不剥其他参数；否则只取裸链接。
//!
//! 未命中返回 `None`，这是正常结果而非错误——绝大多数剪贴板
//! 文本都不含分享链接。

use once_cell::sync::Lazy;
use regex::{Captures, Match, Regex};

use super::rules::{rules, ProviderRule};
use super::sanitize;
use super::NetdiskInfo;

/// URL 查询串内的提取码参数
static URL_PWD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]pwd=([a-zA-Z0-9]{4,8})").expect("URL 提取码正则无效"));

/// 通用文本提取码标注（各家规则都未命中时的兜底）
static GENERIC_PWD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{3,6})").expect("通用提取码正则无效")
});

/// 取第一个非空捕获组（个别规则用多分支捕获，如 360 的 `#xxxx` 写法）
fn first_capture(caps: &Captures) -> Option<String> {
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().to_string())
}

/// 按表内顺序找第一条命中的规则
fn find_rule_match<'t>(text: &'t str) -> Option<(&'static ProviderRule, Match<'t>)> {
    rules()
        .iter()
        .find_map(|rule| rule.url_pattern.find(text).map(|m| (rule, m)))
}

/// 提取访问码：返回 (提取码, 是否来自 URL)
///
/// 不变式：返回 `(Some(_), true)` 时提取码一定来自 URL 查询串。
fn extract_pwd(rule: &ProviderRule, text: &str) -> (Option<String>, bool) {
    let pwd_from_url = URL_PWD_PATTERN
        .captures(text)
        .map(|caps| caps[1].to_string());

    let mut pwd_from_text = rule
        .pwd_pattern
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| first_capture(&caps));

    if pwd_from_url.is_none() && pwd_from_text.is_none() {
        pwd_from_text = GENERIC_PWD_PATTERN
            .captures(text)
            .map(|caps| caps[1].to_string());
    }

    match pwd_from_url {
        Some(pwd) => (Some(pwd), true),
        None => (pwd_from_text, false),
    }
}

/// 归一化命中的链接
///
/// 无协议前缀时补 `https://`。确认提取码在 URL 里时，把紧跟在
/// 命中段后的查询串整体并入链接（保留全部参数）；否则取裸链接。
/// 延续段以 `?` 开头，或当命中段本身已含查询串时以 `&` 开头
/// （天翼的 `share?code=`、移动的 `m/i?` 等规则）。
fn resolve_url(text: &str, matched: &Match, pwd_in_url: bool) -> String {
    let mut url = matched.as_str().to_string();

    if pwd_in_url {
        let tail = &text[matched.end()..];
        if tail.starts_with('?') || (tail.starts_with('&') && url.contains('?')) {
            let query_end = tail.find(char::is_whitespace).unwrap_or(tail.len());
            url.push_str(&tail[..query_end]);
        }
    }

    if !url.starts_with("http") {
        url = format!("https://{}", url);
    }
    url
}

/// 检测文本中的网盘分享链接及提取码
///
/// 两遍算法：先在原文匹配；落空时净化装饰字符后再匹配一遍，
/// 提取码检索始终针对原文。两遍都未命中返回 `None`。
pub fn detect(text: &str) -> Option<NetdiskInfo> {
    // 零宽空格常混在移动端分享文案里，先行剔除
    let text = text.replace('\u{200b}', "");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some((rule, matched)) = find_rule_match(text) {
        let (pwd, pwd_in_url) = extract_pwd(rule, text);
        let url = resolve_url(text, &matched, pwd_in_url);
        log::debug!("检测到{}链接: {}", rule.display_name, url);
        return Some(NetdiskInfo {
            provider_id: rule.id,
            provider_name: rule.display_name,
            url,
            pwd,
            pwd_in_url,
        });
    }

    // 第二遍：净化后重试。净化文本里查询串可能已被破坏（`=` 在
    // 删除集内），链接只取裸命中段，提取码从原文重新检索，且一律
    // 按文本来源对待——裸链接里没有 pwd 参数，标成 URL 来源会让
    // 打开 URL 的模板套用被跳过，提取码就丢了。
    let cleaned = sanitize::strip(text);
    if cleaned != text {
        if let Some((rule, matched)) = find_rule_match(&cleaned) {
            let (pwd, _) = extract_pwd(rule, text);
            let url = resolve_url(&cleaned, &matched, false);
            log::debug!("净化后检测到{}链接: {}", rule.display_name, url);
            return Some(NetdiskInfo {
                provider_id: rule.id,
                provider_name: rule.display_name,
                url,
                pwd,
                pwd_in_url: false,
            });
        }
    }

    None
}
