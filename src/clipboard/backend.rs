//! 剪贴板后端抽象与 Win32 实现
//!
//! # 设计思路
//!
//! 把"系统剪贴板"收敛为一个窄接口：打开/关闭、格式可用性探测、
//! 按格式读取。分类器只面对这个接口，互斥与重试由 `guard` 负责，
//! 测试用脚本化的假后端替换真实剪贴板。
//!
//! # 实现思路
//!
//! - `Win32Clipboard` 仅在 Windows 编译，直接走 `windows` crate 的
//!   DataExchange API；四个注册格式（HTML、RTF、URL、Object
//!   Descriptor）在构造时注册一次。
//! - 读取函数都假定调用方已通过 `ResourceGuard` 打开剪贴板。
//! - 句柄数据经 `GlobalLock`/`GlobalUnlock` 拷贝出来，锁必在返回
//!   前释放，包括错误路径。

use std::path::PathBuf;

use crate::error::AppError;

/// 分类器关心的剪贴板格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipFormat {
    /// CF_UNICODETEXT / CF_TEXT
    Text,
    /// 注册格式 "HTML Format"
    Html,
    /// 注册格式 "Rich Text Format"
    RichText,
    /// 注册格式 "UniformResourceLocator"
    Url,
    /// CF_DIB / CF_BITMAP
    Image,
    /// CF_HDROP 文件拖放列表
    FileList,
    /// 注册格式 "Object Descriptor"（Office 绘图/对象）
    OfficeObject,
}

/// 系统剪贴板的窄接口
///
/// 打开/关闭是原始 OS 操作，不做任何重入或重试处理——那是
/// [`ResourceGuard`](super::guard::ResourceGuard) 的职责。
pub trait ClipboardBackend: Send + Sync {
    /// 尝试打开剪贴板（可能被其他进程占用而失败）
    fn open(&self) -> Result<(), AppError>;
    /// 关闭剪贴板
    fn close(&self) -> Result<(), AppError>;
    /// 指定格式当前是否可用
    fn has_format(&self, format: ClipFormat) -> bool;
    /// 读取 Unicode 文本
    fn read_text(&self) -> Result<String, AppError>;
    /// 读取原始 HTML（"HTML Format" 的字节流，按 UTF-8 解释）
    fn read_html(&self) -> Result<String, AppError>;
    /// 读取 RTF 原始字节
    fn read_rich_text(&self) -> Result<Vec<u8>, AppError>;
    /// 读取注册的 URL 格式
    fn read_url(&self) -> Result<String, AppError>;
    /// 读取文件拖放列表
    fn read_file_list(&self) -> Result<Vec<PathBuf>, AppError>;
    /// 枚举当前格式名称，最多返回 `limit` 个
    fn format_names(&self, limit: usize) -> Vec<String>;
}

#[cfg(windows)]
pub use win32::Win32Clipboard;

#[cfg(windows)]
mod win32 {
    use std::ffi::OsString;
    use std::os::windows::ffi::{OsStrExt, OsStringExt};
    use std::path::PathBuf;

    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{HANDLE, HGLOBAL};
    use windows::Win32::System::DataExchange::{
        CloseClipboard, EnumClipboardFormats, GetClipboardData, GetClipboardFormatNameW,
        IsClipboardFormatAvailable, OpenClipboard, RegisterClipboardFormatW,
    };
    use windows::Win32::System::Memory::{GlobalLock, GlobalSize, GlobalUnlock};
    use windows::Win32::System::Ole::{CF_BITMAP, CF_DIB, CF_HDROP, CF_TEXT, CF_UNICODETEXT};
    use windows::Win32::UI::Shell::{DragQueryFileW, HDROP};

    use super::{ClipFormat, ClipboardBackend};
    use crate::error::AppError;

    fn to_wide(s: &str) -> Vec<u16> {
        std::ffi::OsStr::new(s)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect()
    }

    fn register_format(name: &str) -> u32 {
        let wide = to_wide(name);
        unsafe { RegisterClipboardFormatW(PCWSTR(wide.as_ptr())) }
    }

    /// 真实系统剪贴板后端
    pub struct Win32Clipboard {
        cf_html: u32,
        cf_rtf: u32,
        cf_url: u32,
        cf_object_descriptor: u32,
    }

    impl Win32Clipboard {
        pub fn new() -> Self {
            Self {
                cf_html: register_format("HTML Format"),
                cf_rtf: register_format("Rich Text Format"),
                cf_url: register_format("UniformResourceLocator"),
                cf_object_descriptor: register_format("Object Descriptor"),
            }
        }

        fn format_id(&self, format: ClipFormat) -> u32 {
            match format {
                ClipFormat::Text => CF_UNICODETEXT.0 as u32,
                ClipFormat::Html => self.cf_html,
                ClipFormat::RichText => self.cf_rtf,
                ClipFormat::Url => self.cf_url,
                ClipFormat::Image => CF_DIB.0 as u32,
                ClipFormat::FileList => CF_HDROP.0 as u32,
                ClipFormat::OfficeObject => self.cf_object_descriptor,
            }
        }

        /// 把全局内存句柄里的字节拷贝出来，锁保证释放
        fn global_bytes(handle: HANDLE) -> Result<Vec<u8>, AppError> {
            unsafe {
                let hglobal = HGLOBAL(handle.0);
                let ptr = GlobalLock(hglobal) as *const u8;
                if ptr.is_null() {
                    return Err(AppError::Format("锁定剪贴板内存失败".to_string()));
                }
                let size = GlobalSize(hglobal);
                let bytes = std::slice::from_raw_parts(ptr, size).to_vec();
                let _ = GlobalUnlock(hglobal);
                Ok(bytes)
            }
        }

        /// 读取以 NUL 结尾的宽字符串句柄
        fn global_wide_string(handle: HANDLE) -> Result<String, AppError> {
            unsafe {
                let hglobal = HGLOBAL(handle.0);
                let ptr = GlobalLock(hglobal) as *const u16;
                if ptr.is_null() {
                    return Err(AppError::Format("锁定剪贴板内存失败".to_string()));
                }
                let max_len = GlobalSize(hglobal) / std::mem::size_of::<u16>();
                let mut len = 0usize;
                while len < max_len && *ptr.add(len) != 0 {
                    len += 1;
                }
                let slice = std::slice::from_raw_parts(ptr, len);
                let text = String::from_utf16_lossy(slice);
                let _ = GlobalUnlock(hglobal);
                Ok(text)
            }
        }

        fn get_data(&self, format_id: u32) -> Result<HANDLE, AppError> {
            unsafe {
                GetClipboardData(format_id)
                    .map_err(|e| AppError::Format(format!("读取格式 {} 失败: {:?}", format_id, e)))
            }
        }
    }

    impl Default for Win32Clipboard {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ClipboardBackend for Win32Clipboard {
        fn open(&self) -> Result<(), AppError> {
            unsafe {
                OpenClipboard(None)
                    .map_err(|e| AppError::Clipboard(format!("打开剪贴板失败: {:?}", e)))
            }
        }

        fn close(&self) -> Result<(), AppError> {
            unsafe {
                CloseClipboard()
                    .map_err(|e| AppError::Clipboard(format!("关闭剪贴板失败: {:?}", e)))
            }
        }

        fn has_format(&self, format: ClipFormat) -> bool {
            unsafe {
                match format {
                    // 文本与图片各有两个等价格式，任一可用即算可用
                    ClipFormat::Text => {
                        IsClipboardFormatAvailable(CF_UNICODETEXT.0 as u32).is_ok()
                            || IsClipboardFormatAvailable(CF_TEXT.0 as u32).is_ok()
                    }
                    ClipFormat::Image => {
                        IsClipboardFormatAvailable(CF_DIB.0 as u32).is_ok()
                            || IsClipboardFormatAvailable(CF_BITMAP.0 as u32).is_ok()
                    }
                    other => IsClipboardFormatAvailable(self.format_id(other)).is_ok(),
                }
            }
        }

        fn read_text(&self) -> Result<String, AppError> {
            let handle = self.get_data(CF_UNICODETEXT.0 as u32)?;
            Self::global_wide_string(handle)
        }

        fn read_html(&self) -> Result<String, AppError> {
            let handle = self.get_data(self.cf_html)?;
            let bytes = Self::global_bytes(handle)?;
            // "HTML Format" 约定为 UTF-8 字节流，结尾可能带 NUL
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
        }

        fn read_rich_text(&self) -> Result<Vec<u8>, AppError> {
            let handle = self.get_data(self.cf_rtf)?;
            Self::global_bytes(handle)
        }

        fn read_url(&self) -> Result<String, AppError> {
            let handle = self.get_data(self.cf_url)?;
            let bytes = Self::global_bytes(handle)?;
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
        }

        fn read_file_list(&self) -> Result<Vec<PathBuf>, AppError> {
            let handle = self.get_data(CF_HDROP.0 as u32)?;
            unsafe {
                let hdrop = HDROP(handle.0);
                let count = DragQueryFileW(hdrop, 0xFFFFFFFF, None);
                let mut files = Vec::with_capacity(count as usize);
                for i in 0..count {
                    let len = DragQueryFileW(hdrop, i, None);
                    if len == 0 {
                        continue;
                    }
                    let mut buf = vec![0u16; (len + 1) as usize];
                    DragQueryFileW(hdrop, i, Some(&mut buf));
                    if let Some(pos) = buf.iter().position(|&c| c == 0) {
                        buf.truncate(pos);
                    }
                    files.push(PathBuf::from(OsString::from_wide(&buf)));
                }
                Ok(files)
            }
        }

        fn format_names(&self, limit: usize) -> Vec<String> {
            let mut names = Vec::new();
            unsafe {
                let mut format_id = EnumClipboardFormats(0);
                while format_id != 0 && names.len() < limit {
                    let mut buf = [0u16; 256];
                    let len = GetClipboardFormatNameW(format_id, &mut buf);
                    if len > 0 {
                        names.push(String::from_utf16_lossy(&buf[..len as usize]));
                    } else {
                        // 预定义格式没有注册名称
                        names.push(format!("未知格式({})", format_id));
                    }
                    format_id = EnumClipboardFormats(format_id);
                }
            }
            names
        }
    }
}
