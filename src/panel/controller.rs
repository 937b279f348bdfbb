//! 面板控制器
//!
//! 负责单个侧边面板的完整生命周期：
//! - 幂等注入（注入标志只检查并设置一次）
//! - 快捷键驱动的显示/隐藏状态机
//! - 面板就绪后一次性投递选中文本

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::chord::{KeyEvent, Platform};
use super::message::{self, PanelMessage};
use crate::config::PanelConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    pub fn toggled(self) -> Self {
        match self {
            Visibility::Visible => Visibility::Hidden,
            Visibility::Hidden => Visibility::Visible,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Injected { handoff_armed: bool },
    AlreadyInjected,
}

/// 按键是否被面板消费（消费后不再交给其他处理者）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    Ignored,
}

/// 面板所在宿主环境。控制器只通过它操作窗口和外部世界。
pub trait PanelHost: Send + Sync {
    /// 读取此刻用户选中的文本，没有选中或不支持时返回空串
    fn capture_selection(&self) -> String;

    /// 创建并挂载面板，只会被调用一次
    fn mount(&self, config: &PanelConfig) -> Result<(), String>;

    /// 把面板移动到对应状态的位置（带动画）
    fn apply_visibility(&self, visibility: Visibility);

    /// 在面板文档中执行投递脚本
    fn post_message(&self, script: &str) -> Result<(), String>;
}

pub struct PanelController<H: PanelHost> {
    host: H,
    config: PanelConfig,
    injected: AtomicBool,
    visibility: Mutex<Visibility>,
    /// 待投递的选中文本快照，投递时 take()，保证最多一次
    pending_handoff: Mutex<Option<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<H: PanelHost> PanelController<H> {
    pub fn new(host: H, config: PanelConfig) -> Self {
        Self {
            host,
            config,
            injected: AtomicBool::new(false),
            visibility: Mutex::new(Visibility::default()),
            pending_handoff: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn is_injected(&self) -> bool {
        self.injected.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn visibility(&self) -> Visibility {
        *lock(&self.visibility)
    }

    #[cfg(test)]
    pub fn handoff_pending(&self) -> bool {
        lock(&self.pending_handoff).is_some()
    }

    /// 注入面板。重复调用是空操作。
    pub fn initialize(&self) -> InitOutcome {
        if self.injected.swap(true, Ordering::SeqCst) {
            log::debug!("[Panel] Already injected, ignoring");
            return InitOutcome::AlreadyInjected;
        }

        // 选区只反映调用瞬间的状态，必须在任何异步工作之前取
        let snapshot = self.host.capture_selection();
        let handoff_armed = !snapshot.is_empty();
        if handoff_armed {
            log::info!(
                "[Panel] Selection captured ({} chars), handoff armed",
                snapshot.chars().count()
            );
            *lock(&self.pending_handoff) = Some(snapshot);
        } else {
            log::info!("[Panel] No selection, handoff skipped");
        }

        *lock(&self.visibility) = Visibility::Visible;

        if let Err(e) = self.host.mount(&self.config) {
            log::debug!("[Panel] Mount failed: {}", e);
        } else {
            log::info!("[Panel] Injected");
        }

        InitOutcome::Injected { handoff_armed }
    }

    /// 处理一次按键。只有切换快捷键会改变状态。
    pub fn handle_key(&self, event: &KeyEvent, platform_signal: &str) -> KeyOutcome {
        if !self.is_injected() {
            return KeyOutcome::Ignored;
        }

        let platform = Platform::from_signal(platform_signal);
        if !self.config.chord.matches(event, platform) {
            return KeyOutcome::Ignored;
        }

        // 持锁应用变换，保证连续切换按顺序生效
        let mut visibility = lock(&self.visibility);
        *visibility = visibility.toggled();
        log::info!("[Panel] Toggled to {:?}", *visibility);
        self.host.apply_visibility(*visibility);

        KeyOutcome::Consumed
    }

    /// 面板文档加载完成。每次加载完成都会调用，但投递最多一次。
    pub fn on_surface_ready(&self) {
        let Some(text) = lock(&self.pending_handoff).take() else {
            log::debug!("[Panel] Surface ready, nothing to hand off");
            return;
        };

        let origin = match message::target_origin(&self.config.url) {
            Ok(origin) => origin,
            Err(e) => {
                log::debug!("[Panel] Handoff dropped: {}", e);
                return;
            }
        };

        let script = match message::post_message_script(&PanelMessage::prefill(text), &origin) {
            Ok(script) => script,
            Err(e) => {
                log::debug!("[Panel] Handoff dropped: {}", e);
                return;
            }
        };

        match self.host.post_message(&script) {
            Ok(()) => log::info!("[Panel] Prefill question sent to {}", origin),
            Err(e) => log::debug!("[Panel] Failed to post prefill question: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const MAC: &str = "MacIntel";
    const WIN: &str = "Win32";

    #[derive(Default)]
    struct Recorded {
        mounts: usize,
        applied: Vec<Visibility>,
        scripts: Vec<String>,
        selection_reads: usize,
    }

    /// 记录所有调用的宿主
    #[derive(Clone, Default)]
    struct RecordingHost {
        selection: String,
        fail_mount: bool,
        recorded: Arc<Mutex<Recorded>>,
    }

    impl RecordingHost {
        fn with_selection(text: &str) -> Self {
            Self {
                selection: text.to_string(),
                ..Self::default()
            }
        }

        fn recorded(&self) -> MutexGuard<'_, Recorded> {
            self.recorded.lock().unwrap()
        }
    }

    impl PanelHost for RecordingHost {
        fn capture_selection(&self) -> String {
            self.recorded().selection_reads += 1;
            self.selection.clone()
        }

        fn mount(&self, _config: &PanelConfig) -> Result<(), String> {
            self.recorded().mounts += 1;
            if self.fail_mount {
                Err("blocked".to_string())
            } else {
                Ok(())
            }
        }

        fn apply_visibility(&self, visibility: Visibility) {
            self.recorded().applied.push(visibility);
        }

        fn post_message(&self, script: &str) -> Result<(), String> {
            self.recorded().scripts.push(script.to_string());
            Ok(())
        }
    }

    fn controller(host: RecordingHost) -> PanelController<RecordingHost> {
        PanelController::new(host, PanelConfig::default())
    }

    fn toggle_chord_win() -> KeyEvent {
        KeyEvent::new("K").ctrl().shift()
    }

    fn expected_prefill_script(text: &str) -> String {
        message::post_message_script(&PanelMessage::prefill(text), "http://localhost:8080").unwrap()
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let host = RecordingHost::default();
        let panel = controller(host.clone());

        assert_eq!(panel.initialize(), InitOutcome::Injected { handoff_armed: false });
        for _ in 0..5 {
            assert_eq!(panel.initialize(), InitOutcome::AlreadyInjected);
        }

        assert!(panel.is_injected());
        assert_eq!(host.recorded().mounts, 1);
        assert_eq!(host.recorded().selection_reads, 1);
        assert_eq!(panel.visibility(), Visibility::Visible);
    }

    #[test]
    fn test_concurrent_initialize_mounts_once() {
        let host = RecordingHost::default();
        let panel = Arc::new(controller(host.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let panel = panel.clone();
                std::thread::spawn(move || panel.initialize())
            })
            .collect();
        let injected = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| matches!(o, InitOutcome::Injected { .. }))
            .count();

        assert_eq!(injected, 1);
        assert_eq!(host.recorded().mounts, 1);
    }

    #[test]
    fn test_mount_failure_is_silent_and_not_retried() {
        let host = RecordingHost {
            fail_mount: true,
            ..RecordingHost::default()
        };
        let panel = controller(host.clone());

        assert_eq!(panel.initialize(), InitOutcome::Injected { handoff_armed: false });
        assert_eq!(panel.initialize(), InitOutcome::AlreadyInjected);
        assert_eq!(host.recorded().mounts, 1);
    }

    #[test]
    fn test_toggle_parity() {
        let host = RecordingHost::default();
        let panel = controller(host.clone());
        panel.initialize();

        for k in 1..=7 {
            assert_eq!(panel.handle_key(&toggle_chord_win(), WIN), KeyOutcome::Consumed);
            let expected = if k % 2 == 0 {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
            assert_eq!(panel.visibility(), expected);
        }

        let applied = host.recorded().applied.clone();
        assert_eq!(applied.len(), 7);
        assert_eq!(applied[0], Visibility::Hidden);
        assert_eq!(applied[1], Visibility::Visible);
    }

    #[test]
    fn test_chord_exclusivity() {
        let host = RecordingHost::default();
        let panel = controller(host.clone());
        panel.initialize();

        let others = [
            KeyEvent::new("K").ctrl(),
            KeyEvent::new("K").shift(),
            KeyEvent::new("L").ctrl().shift(),
            KeyEvent::new("k").meta().shift(),
            KeyEvent::new("Enter"),
        ];
        for event in &others {
            assert_eq!(panel.handle_key(event, WIN), KeyOutcome::Ignored);
        }
        // Mac 上 Ctrl 版本不算
        assert_eq!(panel.handle_key(&toggle_chord_win(), MAC), KeyOutcome::Ignored);

        assert_eq!(panel.visibility(), Visibility::Visible);
        assert!(host.recorded().applied.is_empty());
    }

    #[test]
    fn test_platform_decided_per_event() {
        let panel = controller(RecordingHost::default());
        panel.initialize();

        let cmd = KeyEvent::new("k").meta().shift();
        assert_eq!(panel.handle_key(&cmd, MAC), KeyOutcome::Consumed);
        assert_eq!(panel.handle_key(&cmd, WIN), KeyOutcome::Ignored);
        assert_eq!(panel.visibility(), Visibility::Hidden);
    }

    #[test]
    fn test_toggle_before_initialize_ignored() {
        let host = RecordingHost::default();
        let panel = controller(host.clone());

        assert_eq!(panel.handle_key(&toggle_chord_win(), WIN), KeyOutcome::Ignored);
        assert!(host.recorded().applied.is_empty());
    }

    #[test]
    fn test_handoff_only_after_ready_and_once() {
        let host = RecordingHost::with_selection("What is caching?");
        let panel = controller(host.clone());

        assert_eq!(panel.initialize(), InitOutcome::Injected { handoff_armed: true });
        assert!(panel.handoff_pending());
        assert!(host.recorded().scripts.is_empty());

        panel.on_surface_ready();
        panel.on_surface_ready();
        panel.on_surface_ready();

        assert!(!panel.handoff_pending());
        assert_eq!(
            host.recorded().scripts,
            vec![expected_prefill_script("What is caching?")]
        );
    }

    #[test]
    fn test_empty_selection_never_sends() {
        let host = RecordingHost::default();
        let panel = controller(host.clone());

        assert_eq!(panel.initialize(), InitOutcome::Injected { handoff_armed: false });
        panel.on_surface_ready();
        panel.on_surface_ready();

        assert!(host.recorded().scripts.is_empty());
    }

    #[test]
    fn test_no_ready_event_no_handoff() {
        let host = RecordingHost::with_selection("pending");
        let panel = controller(host.clone());
        panel.initialize();

        panel.handle_key(&toggle_chord_win(), WIN);
        assert!(panel.handoff_pending());
        assert!(host.recorded().scripts.is_empty());
    }

    #[test]
    fn test_scenario_a_selected_text_prefilled() {
        let host = RecordingHost::with_selection("What is caching?");
        let panel = controller(host.clone());
        panel.initialize();
        panel.on_surface_ready();

        let scripts = host.recorded().scripts.clone();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains(r#"{"type":"PREFILL_QUESTION","text":"What is caching?"}"#));
        assert!(scripts[0].contains(r#""http://localhost:8080""#));
    }

    #[test]
    fn test_scenario_b_double_toggle_without_selection() {
        let host = RecordingHost::default();
        let panel = controller(host.clone());
        panel.initialize();
        panel.on_surface_ready();

        panel.handle_key(&toggle_chord_win(), WIN);
        panel.handle_key(&toggle_chord_win(), WIN);

        assert_eq!(panel.visibility(), Visibility::Visible);
        assert!(host.recorded().scripts.is_empty());
    }

    #[test]
    fn test_scenario_c_double_injection() {
        let host = RecordingHost::with_selection("twice");
        let panel = controller(host.clone());
        panel.initialize();
        panel.initialize();
        panel.on_surface_ready();

        assert_eq!(host.recorded().mounts, 1);
        assert_eq!(host.recorded().scripts.len(), 1);
    }

    #[test]
    fn test_visibility_toggled() {
        assert_eq!(Visibility::default(), Visibility::Visible);
        assert_eq!(Visibility::Visible.toggled(), Visibility::Hidden);
        assert_eq!(Visibility::Visible.toggled().toggled(), Visibility::Visible);
    }
}
