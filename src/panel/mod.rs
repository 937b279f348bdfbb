//! 侧边面板核心逻辑（与窗口系统无关）

pub mod chord;
pub mod controller;
pub mod message;
pub mod slide;

pub use chord::{KeyEvent, Platform};
pub use controller::{InitOutcome, KeyOutcome, PanelController, PanelHost, Visibility};
