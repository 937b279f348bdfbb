//! 侧边面板窗口
//!
//! 无边框、置顶、贴在显示器右边缘的 webview 窗口，加载外部面板文档。
//! macOS 上转换为 NSPanel，层级高于全屏应用。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tauri::webview::PageLoadEvent;
use tauri::{AppHandle, LogicalPosition, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use url::Url;

use crate::config::{PanelConfig, PANEL_WINDOW_LABEL};
use crate::panel::slide::{self, DockGeometry};
use crate::panel::{PanelHost, Visibility};
use crate::{selection, SharedPanel};

// macOS 窗口层级常量（高于全屏应用）
#[cfg(target_os = "macos")]
const NS_SCREEN_SAVER_WINDOW_LEVEL: i32 = 1000;

/// 切换代数。每次切换递增，旧动画在主线程执行前发现代数变化就放弃。
#[derive(Clone, Default)]
struct SlideGate(Arc<AtomicU64>);

impl SlideGate {
    fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.0.load(Ordering::SeqCst) == generation
    }
}

/// 停靠时选定的显示器几何和缩放比例
#[derive(Debug, Clone, Copy)]
struct Dock {
    geometry: DockGeometry,
    scale: f64,
}

pub struct TauriPanelHost {
    app: AppHandle,
    width: f64,
    frames: u32,
    frame_interval: Duration,
    gate: SlideGate,
    /// mount 时记录，之后每次滑动都用它，不随窗口当前所在显示器变化
    dock: Mutex<Option<Dock>>,
}

impl TauriPanelHost {
    pub fn new(app: AppHandle, config: &PanelConfig) -> Self {
        Self {
            app,
            width: config.width,
            frames: config.slide_frames(),
            frame_interval: config.slide_frame,
            gate: SlideGate::default(),
            dock: Mutex::new(None),
        }
    }

    fn window(&self) -> Result<WebviewWindow, String> {
        self.app
            .get_webview_window(PANEL_WINDOW_LABEL)
            .ok_or_else(|| "Panel window not found".to_string())
    }

    fn docked(&self) -> Result<Dock, String> {
        let mut dock = self.dock.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(d) = *dock {
            return Ok(d);
        }
        let d = primary_dock(&self.app, self.width)?;
        *dock = Some(d);
        Ok(d)
    }
}

fn primary_dock(app: &AppHandle, panel_width: f64) -> Result<Dock, String> {
    let monitor = app
        .primary_monitor()
        .map_err(|e| format!("Failed to query primary monitor: {}", e))?
        .ok_or_else(|| "No primary monitor".to_string())?;

    Ok(Dock {
        geometry: geometry_for(&monitor, panel_width),
        scale: monitor.scale_factor(),
    })
}

fn geometry_for(monitor: &tauri::Monitor, panel_width: f64) -> DockGeometry {
    let scale = monitor.scale_factor();
    let position = monitor.position();
    let size = monitor.size();

    DockGeometry {
        monitor_x: position.x as f64 / scale,
        monitor_y: position.y as f64 / scale,
        monitor_width: size.width as f64 / scale,
        monitor_height: size.height as f64 / scale,
        panel_width,
    }
}

/// 在主线程执行窗口操作，执行前再确认这次切换仍是最新的
fn on_main_if_current<F>(app: &AppHandle, gate: &SlideGate, generation: u64, f: F)
where
    F: FnOnce() + Send + 'static,
{
    let gate = gate.clone();
    // UI 操作必须在主线程执行
    let _ = app.run_on_main_thread(move || {
        if gate.is_current(generation) {
            f();
        }
    });
}

#[cfg(target_os = "macos")]
fn promote_to_panel(window: &WebviewWindow) {
    #[allow(deprecated)]
    use cocoa::appkit::NSWindowCollectionBehavior;
    use tauri_nspanel::WebviewWindowExt;

    match window.to_panel() {
        Ok(panel) => {
            panel.set_released_when_closed(false);
            panel.set_becomes_key_only_if_needed(true);
            panel.set_floating_panel(true);
            panel.set_level(NS_SCREEN_SAVER_WINDOW_LEVEL);

            const NS_WINDOW_STYLE_MASK_NON_ACTIVATING_PANEL: i32 = 1 << 7;
            panel.set_style_mask(NS_WINDOW_STYLE_MASK_NON_ACTIVATING_PANEL);

            #[allow(deprecated)]
            panel.set_collection_behaviour(
                NSWindowCollectionBehavior::NSWindowCollectionBehaviorCanJoinAllSpaces
                    | NSWindowCollectionBehavior::NSWindowCollectionBehaviorFullScreenAuxiliary,
            );

            log::info!("[Overlay] Converted to NSPanel");
        }
        Err(e) => log::warn!("[Overlay] Failed to convert to panel: {:?}", e),
    }
}

impl PanelHost for TauriPanelHost {
    fn capture_selection(&self) -> String {
        selection::capture()
    }

    fn mount(&self, config: &PanelConfig) -> Result<(), String> {
        log::info!("[Overlay] Creating side panel for {}", config.url);

        let url = Url::parse(&config.url)
            .map_err(|e| format!("Invalid panel URL {}: {}", config.url, e))?;

        let dock = primary_dock(&self.app, config.width)?;
        *self.dock.lock().unwrap_or_else(|p| p.into_inner()) = Some(dock);
        let geometry = dock.geometry;
        let resting_x = geometry.x_at(slide::offset_fraction(Visibility::Visible));

        let window = WebviewWindowBuilder::new(&self.app, PANEL_WINDOW_LABEL, WebviewUrl::External(url))
            .title("")
            .inner_size(config.width, geometry.monitor_height)
            .position(resting_x, geometry.y())
            .decorations(false)
            .resizable(false)
            .always_on_top(true)
            .skip_taskbar(true)
            .shadow(true)
            .visible(true)
            .on_page_load(|webview, payload| {
                if payload.event() != PageLoadEvent::Finished {
                    return;
                }
                log::info!("[Overlay] Panel document loaded: {}", payload.url());
                match webview.app_handle().try_state::<SharedPanel>() {
                    Some(panel) => panel.on_surface_ready(),
                    None => log::debug!("[Overlay] Panel controller not managed yet"),
                }
            })
            .build()
            .map_err(|e| format!("Failed to create side panel: {}", e))?;

        #[cfg(target_os = "macos")]
        promote_to_panel(&window);

        log::info!(
            "[Overlay] Side panel '{}' docked at x={}, {}x{}",
            window.label(),
            resting_x,
            config.width,
            geometry.monitor_height
        );
        Ok(())
    }

    fn apply_visibility(&self, visibility: Visibility) {
        let window = match self.window() {
            Ok(w) => w,
            Err(e) => {
                log::debug!("[Overlay] Cannot apply {:?}: {}", visibility, e);
                return;
            }
        };
        let Dock { geometry, scale } = match self.docked() {
            Ok(d) => d,
            Err(e) => {
                log::debug!("[Overlay] Slide skipped: {}", e);
                return;
            }
        };

        let generation = self.gate.begin();
        let gate = self.gate.clone();
        let app = self.app.clone();
        let frames = self.frames;
        let frame_interval = self.frame_interval;

        tauri::async_runtime::spawn(async move {
            let target = slide::offset_fraction(visibility);
            let from = window
                .outer_position()
                .map(|p| geometry.fraction_at(p.x as f64 / scale))
                .unwrap_or(1.0 - target);
            let y = geometry.y();

            if visibility == Visibility::Visible {
                let w = window.clone();
                on_main_if_current(&app, &gate, generation, move || {
                    let _ = w.show();
                });
            }

            for x in geometry.frames(from, target, frames) {
                if !gate.is_current(generation) {
                    return;
                }
                let w = window.clone();
                on_main_if_current(&app, &gate, generation, move || {
                    let _ = w.set_position(LogicalPosition::new(x, y));
                });
                tokio::time::sleep(frame_interval).await;
            }

            // 完全移出后隐藏，避免出现在右侧相邻的显示器上
            if visibility == Visibility::Hidden {
                let w = window.clone();
                on_main_if_current(&app, &gate, generation, move || {
                    let _ = w.hide();
                });
            }
            log::debug!("[Overlay] Slide to {:?} finished", visibility);
        });
    }

    fn post_message(&self, script: &str) -> Result<(), String> {
        self.window()?
            .eval(script)
            .map_err(|e| format!("Failed to post message: {}", e))
    }
}
