use serde_json::Value;
use serde_json::json;

use uiauto_common::Colors;

use crate::commands::OutputFormat;

/// Output sink for command results.
///
/// Handlers describe what to show; the presenter decides whether it becomes
/// human-readable text or JSON.
pub trait Presenter {
    /// Present a success result.
    fn present_success(&self, message: &str);

    /// Present a structured value (for JSON output, shows the raw value).
    fn present_value(&self, value: &Value);

    fn present_kv(&self, key: &str, value: &str);

    fn present_header(&self, text: &str);

    /// Present raw text without formatting.
    fn present_raw(&self, text: &str);
}

/// Text presenter for human-readable output.
pub struct TextPresenter;

impl Presenter for TextPresenter {
    fn present_success(&self, message: &str) {
        println!("{} {}", Colors::success("✓"), message);
    }

    fn present_value(&self, value: &Value) {
        if let Some(s) = value.as_str() {
            println!("{}", s);
        } else if let Some(n) = value.as_i64() {
            println!("{}", n);
        } else if let Some(b) = value.as_bool() {
            println!("{}", b);
        } else {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_default()
            );
        }
    }

    fn present_kv(&self, key: &str, value: &str) {
        println!("  {}: {}", key, value);
    }

    fn present_header(&self, text: &str) {
        println!("{}", Colors::bold(text));
    }

    fn present_raw(&self, text: &str) {
        println!("{}", text);
    }
}

/// JSON presenter for machine-readable output.
pub struct JsonPresenter;

impl JsonPresenter {
    fn print(value: &Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

impl Presenter for JsonPresenter {
    fn present_success(&self, message: &str) {
        Self::print(&json!({ "success": true, "message": message }));
    }

    fn present_value(&self, value: &Value) {
        Self::print(value);
    }

    fn present_kv(&self, key: &str, value: &str) {
        Self::print(&json!({ key: value }));
    }

    fn present_header(&self, _text: &str) {
        // No-op for JSON
    }

    fn present_raw(&self, text: &str) {
        Self::print(&json!({ "output": text }));
    }
}

pub fn create_presenter(format: OutputFormat) -> Box<dyn Presenter> {
    match format {
        OutputFormat::Json => Box::new(JsonPresenter),
        OutputFormat::Text => Box::new(TextPresenter),
    }
}
