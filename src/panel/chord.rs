//! 切换快捷键：平台主修饰键 + Shift + K

/// Apple 系平台的平台标识片段
const APPLE_PLATFORM_MARKERS: [&str; 4] = ["Mac", "iPod", "iPhone", "iPad"];

/// 平台（决定主修饰键是 Command 还是 Control）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Apple,
    Other,
}

impl Platform {
    /// 从平台标识字符串判断（如 "MacIntel"、"Win32"、"Linux x86_64"）
    pub fn from_signal(signal: &str) -> Self {
        if APPLE_PLATFORM_MARKERS.iter().any(|m| signal.contains(m)) {
            Platform::Apple
        } else {
            Platform::Other
        }
    }

    /// 当前进程所在平台的标识
    pub fn current_signal() -> &'static str {
        match std::env::consts::OS {
            "macos" => "MacIntel",
            "ios" => "iPhone",
            "windows" => "Win32",
            "android" => "Linux armv8l",
            _ => "Linux x86_64",
        }
    }

    pub fn current() -> Self {
        Self::from_signal(Self::current_signal())
    }
}

/// 一次按键事件（只保留匹配需要的字段）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

#[cfg(test)]
impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleChord {
    key: char,
}

impl Default for ToggleChord {
    fn default() -> Self {
        Self { key: 'k' }
    }
}

impl ToggleChord {
    /// 主修饰键 + Shift + 字母（不区分大小写）。
    /// 其他修饰键（如 Alt）不参与判断。
    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        let primary = match platform {
            Platform::Apple => event.meta,
            Platform::Other => event.ctrl,
        };

        let mut chars = event.key.chars();
        let key_matches = match (chars.next(), chars.next()) {
            (Some(c), None) => c.eq_ignore_ascii_case(&self.key),
            _ => false,
        };

        primary && event.shift && key_matches
    }

    /// 注册到系统的快捷键字符串，只注册当前平台的主修饰键版本
    pub fn accelerator(&self, platform: Platform) -> String {
        let primary = match platform {
            Platform::Apple => "Super",
            Platform::Other => "Control",
        };
        format!("{}+Shift+Key{}", primary, self.key.to_ascii_uppercase())
    }
}
