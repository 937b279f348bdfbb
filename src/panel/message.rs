//! 发往面板文档的消息
//!
//! 面板内页面通过 `window.addEventListener('message', ...)` 接收，
//! 所以投递方式是在 webview 里执行 `window.postMessage(...)`。

use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum PanelMessage {
    /// 用选中文本预填问题
    #[serde(rename = "PREFILL_QUESTION")]
    PrefillQuestion { text: String },
}

impl PanelMessage {
    pub fn prefill(text: impl Into<String>) -> Self {
        PanelMessage::PrefillQuestion { text: text.into() }
    }
}

/// 面板地址的 origin，作为 postMessage 的目标（不使用 "*"）
pub fn target_origin(panel_url: &str) -> Result<String, String> {
    let url = Url::parse(panel_url).map_err(|e| format!("Invalid panel URL {}: {}", panel_url, e))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(format!("Panel URL has no usable origin: {}", panel_url));
    }
    Ok(origin.ascii_serialization())
}

/// 生成在 webview 中执行的投递脚本
pub fn post_message_script(message: &PanelMessage, target_origin: &str) -> Result<String, String> {
    let payload = serde_json::to_string(message)
        .map_err(|e| format!("Failed to serialize panel message: {}", e))?;
    // JSON 字符串字面量同时也是合法的 JS 字符串字面量
    let origin = serde_json::to_string(target_origin)
        .map_err(|e| format!("Failed to serialize target origin: {}", e))?;
    Ok(format!("window.postMessage({}, {});", payload, origin))
}
