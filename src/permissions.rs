//! 权限检测
//!
//! macOS 上模拟复制需要辅助功能（Accessibility）权限，否则 System Events 拒绝按键。

#[cfg(target_os = "macos")]
mod macos {
    #[link(name = "ApplicationServices", kind = "framework")]
    extern "C" {
        fn AXIsProcessTrusted() -> bool;
    }

    /// 检测 Accessibility 权限
    pub fn check_accessibility() -> bool {
        unsafe { AXIsProcessTrusted() }
    }
}

#[cfg(target_os = "macos")]
pub use macos::check_accessibility;

/// Windows 不需要额外授权
#[cfg(target_os = "windows")]
pub fn check_accessibility() -> bool {
    true
}
