//! SidePanel - 快捷键切换的桌面侧边面板
//!
//! 启动时注入一个贴在屏幕右侧的面板窗口，Cmd/Ctrl+Shift+K 滑入滑出，
//! 启动瞬间选中的文本在面板加载完成后预填进去。

mod config;
mod overlay;
mod panel;
#[cfg(any(target_os = "macos", target_os = "windows"))]
mod permissions;
mod selection;
mod shortcut;
mod tray;

use std::sync::Arc;

use config::PanelConfig;
use overlay::TauriPanelHost;
use panel::{InitOutcome, PanelController};
use tauri::Manager;

/// 整个应用生命周期内唯一的面板控制器
pub(crate) type SharedPanel = Arc<PanelController<TauriPanelHost>>;

// ============ 注入 ============

fn inject(panel: &SharedPanel) {
    match panel.initialize() {
        InitOutcome::Injected { handoff_armed } => {
            log::info!("[SidePanel] Panel injected (handoff_armed={})", handoff_armed);
        }
        InitOutcome::AlreadyInjected => log::debug!("[SidePanel] Panel already injected"),
    }
}

// ============ 入口 ============

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut builder = tauri::Builder::default()
        .plugin(tauri_plugin_autostart::init(
            tauri_plugin_autostart::MacosLauncher::LaunchAgent,
            Some(vec![]),
        ))
        .plugin(tauri_plugin_global_shortcut::Builder::new().build());

    // macOS: 添加 nspanel 插件用于置顶面板
    #[cfg(target_os = "macos")]
    {
        builder = builder.plugin(tauri_nspanel::init());
    }

    builder
        .setup(|app| {
            let app_handle = app.handle().clone();

            // 只有面板窗口，不显示 Dock 图标也不抢焦点
            #[cfg(target_os = "macos")]
            app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            let config = PanelConfig::default();
            let panel: SharedPanel = Arc::new(PanelController::new(
                TauriPanelHost::new(app_handle.clone(), &config),
                config,
            ));
            // 必须先托管，面板加载完成回调里要取到控制器
            app.manage(panel.clone());

            // 注入（内部最先读取选中文本）
            log::info!("[SidePanel] Injecting panel...");
            inject(&panel);

            log::info!("[SidePanel] Initializing tray...");
            if let Err(e) = tray::init(&app_handle, &panel.config().chord) {
                log::error!("[SidePanel] Failed to init tray: {}", e);
            }

            log::info!("[SidePanel] Registering toggle shortcut...");
            if let Err(e) = shortcut::register(&app_handle, panel.clone()) {
                log::error!("[SidePanel] {}", e);
            }

            log::info!("[SidePanel] Ready!");
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
