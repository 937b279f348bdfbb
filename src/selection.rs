//! 选中文本快照
//!
//! - Linux: 直接读 PRIMARY 选区
//! - macOS / Windows: 模拟一次复制，读剪贴板，然后恢复原剪贴板内容
//!
//! 任何失败都返回空串（等同于没有选中文本）。
//!
//! 模拟复制的局限：
//! - 剪贴板里是图片、文件等非文本内容（或为空）时无法恢复，此时不捕获。
//! - 不少编辑器在没有选区时按复制会复制光标所在整行，这一行会被当作选中文本。
//!   系统没有通用的选区查询接口，这种情况无法和真实选区区分。

use arboard::Clipboard;

/// 复制按键发出后等待剪贴板更新的时间
#[cfg(any(target_os = "macos", target_os = "windows"))]
const COPY_SETTLE_MS: u64 = 120;

/// 读取当前选中的文本
pub fn capture() -> String {
    let mut clip = match Clipboard::new() {
        Ok(c) => c,
        Err(e) => {
            log::debug!("[Selection] Failed to open clipboard: {}", e);
            return String::new();
        }
    };

    let text = read_selection(&mut clip);
    log::info!("[Selection] Captured {} chars: {}", text.chars().count(), preview(&text));
    text
}

#[cfg(target_os = "linux")]
fn read_selection(clip: &mut Clipboard) -> String {
    use arboard::{GetExtLinux, LinuxClipboardKind};

    match clip.get().clipboard(LinuxClipboardKind::Primary).text() {
        Ok(text) => text,
        Err(e) => {
            log::debug!("[Selection] No primary selection: {}", e);
            String::new()
        }
    }
}

#[cfg(any(target_os = "macos", target_os = "windows"))]
fn read_selection(clip: &mut Clipboard) -> String {
    if !crate::permissions::check_accessibility() {
        log::debug!("[Selection] Accessibility not granted, skipping capture");
        return String::new();
    }

    copy_and_restore(clip, || {
        send_copy()?;
        std::thread::sleep(std::time::Duration::from_millis(COPY_SETTLE_MS));
        Ok(())
    })
}

/// 模拟复制所需的剪贴板操作
#[cfg_attr(target_os = "linux", allow(dead_code))]
trait TextClipboard {
    fn get_text(&mut self) -> Result<String, String>;
    fn set_text(&mut self, text: String) -> Result<(), String>;
    fn clear(&mut self) -> Result<(), String>;
}

impl TextClipboard for Clipboard {
    fn get_text(&mut self) -> Result<String, String> {
        Clipboard::get_text(self).map_err(|e| e.to_string())
    }

    fn set_text(&mut self, text: String) -> Result<(), String> {
        Clipboard::set_text(self, text).map_err(|e| e.to_string())
    }

    fn clear(&mut self) -> Result<(), String> {
        Clipboard::clear(self).map_err(|e| e.to_string())
    }
}

/// 保存文本剪贴板，清空后模拟复制，读取结果，再恢复原文本。
/// 剪贴板里不是文本（图片、文件等）或为空时无法恢复，直接放弃捕获，不动剪贴板。
#[cfg_attr(target_os = "linux", allow(dead_code))]
fn copy_and_restore<C, F>(clip: &mut C, copy: F) -> String
where
    C: TextClipboard,
    F: FnOnce() -> Result<(), String>,
{
    let saved = match clip.get_text() {
        Ok(text) => text,
        Err(e) => {
            log::debug!("[Selection] Clipboard holds no text, skipping capture: {}", e);
            return String::new();
        }
    };

    // 清空后复制；复制后剪贴板仍为空说明没有选中内容
    if let Err(e) = clip.clear() {
        log::debug!("[Selection] Failed to clear clipboard: {}", e);
        return String::new();
    }

    let text = match copy() {
        Ok(()) => clip.get_text().unwrap_or_default(),
        Err(e) => {
            log::debug!("[Selection] Copy failed: {}", e);
            String::new()
        }
    };

    if let Err(e) = clip.set_text(saved) {
        log::warn!("[Selection] Failed to restore clipboard: {}", e);
    }

    text
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn read_selection(_clip: &mut Clipboard) -> String {
    log::debug!("[Selection] Selection capture not supported on this platform");
    String::new()
}

/// 模拟 Cmd+C
#[cfg(target_os = "macos")]
fn send_copy() -> Result<(), String> {
    use std::process::Command;

    let script = r#"
        tell application "System Events"
            keystroke "c" using command down
        end tell
    "#;

    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .output()
        .map_err(|e| format!("Failed to run osascript: {}", e))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(format!(
            "osascript failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ))
    }
}

/// 模拟 Ctrl+C
#[cfg(target_os = "windows")]
fn send_copy() -> Result<(), String> {
    use winapi::um::winuser::{SendInput, INPUT, INPUT_KEYBOARD, KEYEVENTF_KEYUP, VK_CONTROL};

    const VK_C: u16 = 0x43;

    unsafe {
        // Ctrl按下 -> C按下 -> C释放 -> Ctrl释放
        let mut inputs: [INPUT; 4] = std::mem::zeroed();
        let keys = [
            (VK_CONTROL as u16, 0),
            (VK_C, 0),
            (VK_C, KEYEVENTF_KEYUP),
            (VK_CONTROL as u16, KEYEVENTF_KEYUP),
        ];
        for (input, (vk, flags)) in inputs.iter_mut().zip(keys) {
            input.type_ = INPUT_KEYBOARD;
            input.u.ki_mut().wVk = vk;
            input.u.ki_mut().dwFlags = flags;
        }

        let sent = SendInput(
            inputs.len() as u32,
            inputs.as_mut_ptr(),
            std::mem::size_of::<INPUT>() as i32,
        );

        if sent == inputs.len() as u32 {
            Ok(())
        } else {
            Err(format!(
                "SendInput sent {} of {} inputs: {}",
                sent,
                inputs.len(),
                std::io::Error::last_os_error()
            ))
        }
    }
}

/// 日志预览，按字符截取，避免在多字节字符中间切开
fn preview(text: &str) -> String {
    let head: String = text.chars().take(50).collect();
    if text.chars().count() > 50 {
        format!("{}...", head)
    } else {
        head
    }
}
