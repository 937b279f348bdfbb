//! Overlay 模块
//!
//! 侧边面板窗口的 Tauri 实现

pub mod panel;

pub use panel::TauriPanelHost;
