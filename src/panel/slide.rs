//! 滑入/滑出动画的数学部分
//!
//! 面板贴在显示器右边缘。显示时窗口左边 = 右边缘 - 宽度，
//! 隐藏时整个窗口平移到右边缘之外（相当于 translateX(100%)）。

use super::controller::Visibility;

/// 水平方向上的平移比例：0.0 = 停靠位置，1.0 = 完全移出
pub fn offset_fraction(visibility: Visibility) -> f64 {
    match visibility {
        Visibility::Visible => 0.0,
        Visibility::Hidden => 1.0,
    }
}

/// ease 曲线（三次 ease-in-out 近似 CSS `ease`）
pub fn ease(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let f = -2.0 * t + 2.0;
        1.0 - f * f * f / 2.0
    }
}

/// 显示器内的停靠几何（逻辑像素）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockGeometry {
    pub monitor_x: f64,
    pub monitor_y: f64,
    pub monitor_width: f64,
    pub monitor_height: f64,
    pub panel_width: f64,
}

impl DockGeometry {
    /// 给定平移比例时窗口左上角 x
    pub fn x_at(&self, fraction: f64) -> f64 {
        let resting = self.monitor_x + self.monitor_width - self.panel_width;
        resting + self.panel_width * fraction
    }

    /// 窗口左上角 x 换算回平移比例（限制在 0..=1）
    pub fn fraction_at(&self, x: f64) -> f64 {
        let resting = self.x_at(0.0);
        ((x - resting) / self.panel_width).clamp(0.0, 1.0)
    }

    pub fn y(&self) -> f64 {
        self.monitor_y
    }

    /// 从 `from` 到 `to` 的逐帧 x 坐标（不含起点，含终点）
    pub fn frames(&self, from: f64, to: f64, count: u32) -> Vec<f64> {
        let count = count.max(1);
        (1..=count)
            .map(|i| {
                let t = ease(i as f64 / count as f64);
                self.x_at(from + (to - from) * t)
            })
            .collect()
    }
}
