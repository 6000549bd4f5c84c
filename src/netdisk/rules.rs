//! 网盘提供商规则表
//!
//! # 设计思路
//!
//! 每个提供商一条规则：链接匹配正则、提取码匹配正则、带码打开模板。
//! 规则表是进程级不可变数据，启动时编译一次，运行期只读。
//! 表内顺序即匹配顺序——各家域名互不相交，顺序实际不影响结果，
//! 但保持确定性迭代以便结果可复现。
//!
//! # 实现思路
//!
//! - 原始模式以 `&'static str` 表驱动，`once_cell::sync::Lazy` 首次
//!   访问时统一编译（同代码检测的 `RegexSet` 用法）。
//! - 模板中 `{url}`/`{pwd}` 占位符与分隔符（`#pwd=`、`?pwd=`、`&pwd=`、
//!   `#`、`?p=`）按各家真实 URL 方案逐字保留，不做归一化。
//! - `pwd_pattern` 为 `None` 表示该提供商不使用常规提取码。

use once_cell::sync::Lazy;
use regex::Regex;

/// 单个网盘提供商的识别与打开规则
#[derive(Debug)]
pub struct ProviderRule {
    /// 稳定标识符，如 `"baidu"`、`"quark"`
    pub id: &'static str,
    /// 人类可读名称，如 `"百度网盘"`
    pub display_name: &'static str,
    /// 分享链接匹配模式
    pub url_pattern: Regex,
    /// 提取码文本标注模式（捕获组为提取码本身）
    pub pwd_pattern: Option<Regex>,
    /// 带提取码打开的 URL 模板，占位符 `{url}`/`{pwd}`
    pub url_with_pwd_template: &'static str,
}

/// 编译前的规则原始定义：(id, 名称, 链接正则, 提取码正则, 模板)
///
/// 提取码正则为空串表示该提供商不使用提取码。
const RULE_SPECS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "baidu",
        "百度网盘",
        r"(?:https?://)?(?:[^/\s]*?)?(?:pan|yun|eyun)\.baidu\.com/(?:s/[\w~-]+|share/\S{4,}|doc/share/\S+)",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{4})",
        "{url}#pwd={pwd}",
    ),
    (
        "aliyun",
        "阿里云盘",
        r"(?:https?://)?(?:www\.)?(?:aliyundrive\.com/s|alipan\.com/s|alywp\.net)/[a-zA-Z\d-]+",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{4,6})",
        "{url}?pwd={pwd}",
    ),
    (
        "lanzou",
        "蓝奏云",
        r"(?:https?://)?(?:[a-zA-Z\d\-.]+)?(?:lanzou[a-z]|lanzn|lanzoux?)\.com/(?:[a-zA-Z\d_\-]+|\w+/\w+)",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{3,6})",
        "{url}?pwd={pwd}",
    ),
    (
        "123pan",
        "123云盘",
        r"(?:https?://)?(?:www\.)?123pan\.com/s/[\w-]+",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{4,6})",
        "{url}?pwd={pwd}",
    ),
    (
        "tianyi",
        "天翼云盘",
        r"(?:https?://)?cloud\.189\.cn/(?:t/|web/share\?code=)?[a-zA-Z\d]+",
        r"(?:提取|访问|密)[码碼][:：]?(?:\s*|\()?([a-zA-Z0-9]{4,6})(?:\))?",
        "{url}?pwd={pwd}",
    ),
    (
        "quark",
        "夸克网盘",
        r"(?:https?://)?pan\.quark\.cn/s/[a-zA-Z\d-]+",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{4,6})",
        "{url}?pwd={pwd}",
    ),
    (
        "weiyun",
        "腾讯微云",
        r"(?:https?://)?share\.weiyun\.com/[a-zA-Z\d]+",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{6})",
        "{url}?pwd={pwd}",
    ),
    (
        "caiyun",
        "移动云盘",
        r"(?:https?://)?(?:caiyun\.139\.com/[mw]/i(?:\?|/)|caiyun\.139\.com/front/#/detail\?linkID=)[a-zA-Z\d]+",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{4})",
        "{url}&pwd={pwd}",
    ),
    (
        "xunlei",
        "迅雷云盘",
        r"(?:https?://)?pan\.xunlei\.com/s/[a-zA-Z\d_-]+",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{4})",
        "{url}?pwd={pwd}",
    ),
    (
        "360",
        "360云盘",
        r"(?:https?://)?(?:yunpan\.360\.cn/surl_[\w]+|[\w.]+\.link\.yunpan\.360\.cn/lk/surl_[\w]+)",
        r"(?:提取|访问|密)[码碼][:：]?(?:\s*|\()?([a-zA-Z0-9]{4})(?:\))?|#([a-zA-Z0-9]{4})",
        "{url}#{pwd}",
    ),
    (
        "115",
        "115网盘",
        r"(?:https?://)?115\.com/s/[a-zA-Z\d]+",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{4})",
        "{url}#{pwd}",
    ),
    (
        "cowtransfer",
        "奶牛快传",
        r"(?:https?://)?cowtransfer\.com/s/[a-zA-Z\d-]+",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{4,6})",
        "{url}?pwd={pwd}",
    ),
    (
        "ctfile",
        "城通网盘",
        r"(?:https?://)?(?:[\w-]+\.)?ctfile\.com/(?:f|d)/\d+-\d+",
        r"(?:提取|访问|密)[码碼][:：]?(?:\s*|\()?(\d{4})(?:\))?",
        "{url}?p={pwd}",
    ),
    (
        "flowus",
        "FlowUs息流",
        r"(?:https?://)?flowus\.cn/[\w-]+/share/[\w-]+",
        // 通常不需要提取码
        "",
        "{url}",
    ),
    (
        "mega",
        "Mega网盘",
        r"(?:https?://)?mega\.nz/(?:#!|file/)[a-zA-Z\d!#_-]+",
        // 加密密钥内嵌在链接里，不使用常规提取码
        "",
        "{url}",
    ),
    (
        "weibo",
        "新浪微盘",
        r"(?:https?://)?vdisk\.weibo\.com/(?:s/|lc/)[a-zA-Z\d]+",
        r"(?:提取|访问|密)[码碼][:：]?\s*([A-Z0-9]{4})",
        "{url}?pwd={pwd}",
    ),
    (
        "wenshushu",
        "文叔叔",
        r"(?:https?://)?(?:www\.)?wenshushu\.cn/(?:box|f)/[\w-]+",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{4,6})",
        "{url}?pwd={pwd}",
    ),
    (
        "uc",
        "UC网盘",
        r"(?:https?://)?(?:fast\.)?drive\.uc\.cn/s/[a-zA-Z\d]+",
        r"(?:提取|访问|密)[码碼][:：]?\s*([a-zA-Z0-9]{4})",
        "{url}?public=1&pwd={pwd}",
    ),
];

/// 编译后的规则表，首次访问时构建，之后只读复用
static RULES: Lazy<Vec<ProviderRule>> = Lazy::new(|| {
    RULE_SPECS
        .iter()
        .map(|(id, name, url_re, pwd_re, template)| ProviderRule {
            id,
            display_name: name,
            url_pattern: Regex::new(url_re)
                .unwrap_or_else(|e| panic!("规则 {} 的链接正则无效: {}", id, e)),
            pwd_pattern: if pwd_re.is_empty() {
                None
            } else {
                Some(
                    Regex::new(pwd_re)
                        .unwrap_or_else(|e| panic!("规则 {} 的提取码正则无效: {}", id, e)),
                )
            },
            url_with_pwd_template: template,
        })
        .collect()
});

/// 按表内顺序返回全部规则
pub fn rules() -> &'static [ProviderRule] {
    &RULES
}

/// 按稳定标识符查找规则
pub fn find_rule(id: &str) -> Option<&'static ProviderRule> {
    rules().iter().find(|rule| rule.id == id)
}

/// 应用带码打开模板
pub fn apply_template(template: &str, url: &str, pwd: &str) -> String {
    template.replace("{url}", url).replace("{pwd}", pwd)
}
