//! 面板配置
//!
//! 地址、尺寸、动画和快捷键都是编译期常量，没有配置文件也不读环境变量。

use std::time::Duration;

use crate::panel::chord::ToggleChord;

/// 面板文档地址（外部开发的面板内容的唯一集成点）
pub const PANEL_URL: &str = "http://localhost:8080/embed.html";

/// 面板窗口标签
pub const PANEL_WINDOW_LABEL: &str = "side-panel";

const PANEL_WIDTH: f64 = 420.0;
const SLIDE_DURATION_MS: u64 = 300;
const SLIDE_FRAME_MS: u64 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    pub url: String,
    /// 逻辑像素宽度，高度始终等于所在显示器高度
    pub width: f64,
    pub slide_duration: Duration,
    pub slide_frame: Duration,
    pub chord: ToggleChord,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            url: PANEL_URL.to_string(),
            width: PANEL_WIDTH,
            slide_duration: Duration::from_millis(SLIDE_DURATION_MS),
            slide_frame: Duration::from_millis(SLIDE_FRAME_MS),
            chord: ToggleChord::default(),
        }
    }
}

impl PanelConfig {
    /// 动画帧数（至少 1 帧）
    pub fn slide_frames(&self) -> u32 {
        let frame_ms = self.slide_frame.as_millis().max(1);
        ((self.slide_duration.as_millis() / frame_ms) as u32).max(1)
    }
}
