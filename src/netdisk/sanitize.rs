//! 文本清理模块
//!
//! # 设计思路
//!
//! 分享链接常被 emoji 项目符号和中文描述文字包裹（"🎉快来看 <链接> 🎉"），
//! 这些装饰会让部分链接正则错过边界。本模块提供第二遍检测前的
//! 净化步骤：去掉 emoji、CJK 汉字和一组常见干扰标点。
//!
//! 清理是幂等的：删除字符不会产生新的待删字符，重复调用结果不变。
//! 所有规则表中的链接模式都不含被删字符类，因此命中部分不会被破坏。
//!
//! # 实现思路
//!
//! - 全部字符类合并进一个预编译字符类正则，单遍 `replace_all`。
//! - 保留 URL 里合法的基本符号（`/ ? & - . : ~ %` 等不在删除集内）。

use once_cell::sync::Lazy;
use regex::Regex;

/// 待删除字符类：emoji 各区段 + CJK 汉字 + 干扰标点
///
/// emoji 覆盖的 Unicode 区段：表情、符号与象形、交通、炼金术符号、
/// 几何图形扩展、补充符号与象形、符号与象形扩展 A、杂锦符号。
static STRIP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "[",
        "\\x{1F600}-\\x{1F64F}",
        "\\x{1F300}-\\x{1F5FF}",
        "\\x{1F680}-\\x{1F6FF}",
        "\\x{1F700}-\\x{1F77F}",
        "\\x{1F780}-\\x{1F7FF}",
        "\\x{1F800}-\\x{1F8FF}",
        "\\x{1F900}-\\x{1F9FF}",
        "\\x{1FA00}-\\x{1FA6F}",
        "\\x{1FA70}-\\x{1FAFF}",
        "\\x{2702}-\\x{27B0}",
        "\\x{24C2}-\\x{1F251}",
        "\\x{4E00}-\\x{9FFF}",
        "@#$%^&*()_+=<>{}\\[\\]|\\\\'\",",
        "]+",
    ))
    .expect("清理字符类正则无效")
});

/// 去除 emoji、CJK 汉字与干扰标点
///
/// 幂等：`strip(strip(x)) == strip(x)`。
pub fn strip(text: &str) -> String {
    STRIP_PATTERN.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_emoji_and_cjk() {
        let decorated = "🎉快来看 https://115.com/s/xyz789 密码:4f2a 🎉";
        let cleaned = strip(decorated);
        assert!(!cleaned.contains('🎉'));
        assert!(!cleaned.contains('快'));
        assert!(cleaned.contains("https://115.com/s/xyz789"));
    }

    #[test]
    fn removes_decorative_punctuation() {
        assert_eq!(strip("[*{link}*]"), "link");
        assert_eq!(strip("a@b#c$d"), "abcd");
    }

    #[test]
    fn keeps_url_characters_intact() {
        let url = "https://pan.baidu.com/s/1AbCdEfG?x=1&y=2#frag~-.";
        // `=` 与 `&` 属于删除集，但裸链接主体（路径部分）不受影响
        assert!(strip(url).contains("https://pan.baidu.com/s/1AbCdEfG"));
    }

    #[test]
    fn strip_is_idempotent_on_sample() {
        let text = "🚀 链接: https://pan.quark.cn/s/abc 提取码：9f3k @@@";
        let once = strip(text);
        assert_eq!(strip(&once), once);
    }

    #[test]
    fn plain_ascii_unchanged_except_listed_symbols() {
        assert_eq!(strip("hello world 123 ok-fine.txt"), "hello world 123 ok-fine.txt");
    }
}
