//! 系统托盘 (Menu Bar) 功能

use tauri::{
    image::Image,
    include_image,
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::TrayIconBuilder,
    AppHandle,
};
use tauri_plugin_autostart::ManagerExt;

use crate::panel::chord::ToggleChord;
use crate::panel::Platform;

const TRAY_ICON: Image<'static> = include_image!("icons/tray-icon@2x.png");

fn autostart_label(enabled: bool) -> &'static str {
    if enabled {
        "✓ 开机自动启动"
    } else {
        "开机自动启动"
    }
}

/// 菜单中展示的快捷键提示
fn shortcut_hint(chord: &ToggleChord, platform: Platform) -> String {
    let accelerator = chord.accelerator(platform);
    let pretty = accelerator
        .replace("Super", "⌘")
        .replace("Control", "Ctrl")
        .replace("Shift", "⇧")
        .replace("Key", "");
    format!("显示/隐藏面板: {}", pretty)
}

pub fn init(app: &AppHandle, chord: &ToggleChord) -> Result<(), Box<dyn std::error::Error>> {
    // 检查当前自动启动状态
    let autostart_enabled = app.autolaunch().is_enabled().unwrap_or(false);

    // 快捷键提示只做展示，不可点击
    let hint = MenuItem::with_id(
        app,
        "shortcut-hint",
        shortcut_hint(chord, Platform::current()),
        false,
        None::<&str>,
    )?;
    let autostart_item = MenuItem::with_id(
        app,
        "autostart",
        autostart_label(autostart_enabled),
        true,
        None::<&str>,
    )?;
    let quit = MenuItem::with_id(app, "quit", "退出", true, None::<&str>)?;

    let sep1 = PredefinedMenuItem::separator(app)?;
    let sep2 = PredefinedMenuItem::separator(app)?;

    let menu = Menu::with_items(app, &[&hint, &sep1, &autostart_item, &sep2, &quit])?;

    let autostart_for_closure = autostart_item.clone();

    let _tray = TrayIconBuilder::with_id("main")
        .icon(TRAY_ICON)
        .icon_as_template(true)
        .menu(&menu)
        .tooltip("SidePanel")
        .on_menu_event(move |app, event| {
            let id = event.id.as_ref();
            log::info!("[Tray] Menu event: {}", id);

            match id {
                "autostart" => {
                    let autolaunch = app.autolaunch();
                    let is_enabled = autolaunch.is_enabled().unwrap_or(false);

                    let result = if is_enabled {
                        autolaunch.disable()
                    } else {
                        autolaunch.enable()
                    };

                    match result {
                        Ok(_) => {
                            let _ = autostart_for_closure.set_text(autostart_label(!is_enabled));
                            log::info!(
                                "[Tray] Autostart {}",
                                if is_enabled { "disabled" } else { "enabled" }
                            );
                        }
                        Err(e) => {
                            log::error!("[Tray] Failed to toggle autostart: {}", e);
                        }
                    }
                }
                "quit" => {
                    log::info!("[Tray] Quit");
                    app.exit(0);
                }
                _ => {}
            }
        })
        .build(app)?;

    log::info!("[Tray] Initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_hint() {
        let chord = ToggleChord::default();
        assert_eq!(shortcut_hint(&chord, Platform::Apple), "显示/隐藏面板: ⌘+⇧+K");
        assert_eq!(shortcut_hint(&chord, Platform::Other), "显示/隐藏面板: Ctrl+⇧+K");
    }

    #[test]
    fn test_autostart_label() {
        assert!(autostart_label(true).starts_with('✓'));
        assert_eq!(autostart_label(false), "开机自动启动");
    }
}
