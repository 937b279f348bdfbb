//! 全局快捷键
//!
//! 只向系统注册当前平台主修饰键版本的切换快捷键（Cmd+Shift+K 或 Ctrl+Shift+K）。
//! 系统快捷键被本应用占用后，前台应用不会再收到这个组合键。

use tauri::AppHandle;
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Modifiers, Shortcut, ShortcutState};

use crate::panel::{KeyEvent, KeyOutcome, Platform};
use crate::SharedPanel;

/// 注册切换快捷键，触发时交给面板控制器判断
pub fn register(app: &AppHandle, panel: SharedPanel) -> Result<(), String> {
    let accelerator = panel.config().chord.accelerator(Platform::current());
    let shortcut: Shortcut = accelerator
        .parse()
        .map_err(|e| format!("Invalid shortcut {}: {}", accelerator, e))?;

    app.global_shortcut()
        .on_shortcut(shortcut, move |_app, fired, event| {
            // 只处理按下，忽略释放
            if event.state() != ShortcutState::Pressed {
                return;
            }

            let key_event = key_event_from(fired);
            // 平台在事件发生时判断
            if panel.handle_key(&key_event, Platform::current_signal()) == KeyOutcome::Ignored {
                log::debug!("[Shortcut] Ignored {:?}", key_event);
            }
        })
        .map_err(|e| format!("Failed to register {}: {}", accelerator, e))?;

    log::info!("[Shortcut] Registered {}", accelerator);
    Ok(())
}

/// 把系统快捷键转换成按键事件
fn key_event_from(shortcut: &Shortcut) -> KeyEvent {
    let code = shortcut.key.to_string();
    let key = code.strip_prefix("Key").unwrap_or(&code).to_string();
    let mods = shortcut.mods;

    KeyEvent {
        key,
        meta: mods.intersects(Modifiers::SUPER | Modifiers::META),
        ctrl: mods.contains(Modifiers::CONTROL),
        shift: mods.contains(Modifiers::SHIFT),
        alt: mods.contains(Modifiers::ALT),
    }
}
