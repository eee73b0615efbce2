use std::path::PathBuf;

use serde_json::json;

use uiauto_common::ValueExt;
use uiauto_core::Position;
use uiauto_core::Selector;

use crate::commands::OutputFormat;
use crate::device::Device;
use crate::error::Error;
use crate::input::parse_editor_action;
use crate::keys::KeyPress;
use crate::presenter::Presenter;
use crate::presenter::create_presenter;

pub type HandlerResult = Result<(), Box<dyn std::error::Error>>;

pub struct HandlerContext<'a> {
    pub device: &'a Device,
    pub format: OutputFormat,
    presenter: Box<dyn Presenter>,
}

impl<'a> HandlerContext<'a> {
    pub fn new(device: &'a Device, format: OutputFormat) -> Self {
        Self::with_presenter(device, format, create_presenter(format))
    }

    pub fn with_presenter(
        device: &'a Device,
        format: OutputFormat,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        Self {
            device,
            format,
            presenter,
        }
    }

    pub fn presenter(&self) -> &dyn Presenter {
        self.presenter.as_ref()
    }

    fn output_success(&self, message: &str) -> HandlerResult {
        self.presenter.present_success(message);
        Ok(())
    }
}

fn parse_selector(raw: &str) -> Result<Selector, Error> {
    Ok(raw.parse::<Selector>()?)
}

pub fn handle_ping(ctx: &mut HandlerContext) -> HandlerResult {
    let reply = ctx.device.ping()?;
    match ctx.format {
        OutputFormat::Json => ctx.presenter.present_value(&json!({ "reply": reply })),
        OutputFormat::Text => ctx.presenter.present_raw(&reply),
    }
    Ok(())
}

pub fn handle_info(ctx: &mut HandlerContext) -> HandlerResult {
    let info = ctx.device.device_info()?;
    let serial = ctx.device.serial_number()?;

    let mut result = serde_json::to_value(&info)?;
    result["serial"] = json!(serial);

    match ctx.format {
        OutputFormat::Json => ctx.presenter.present_value(&result),
        OutputFormat::Text => {
            ctx.presenter.present_header("Device");
            ctx.presenter
                .present_kv("Serial", result.str_or("serial", "unknown"));
            ctx.presenter
                .present_kv("Product", result.str_or("productName", "unknown"));
            ctx.presenter
                .present_kv("SDK", &result.i64_or("sdkInt", 0).to_string());
            ctx.presenter.present_kv(
                "Display",
                &format!(
                    "{}x{} (rotation {})",
                    result.i64_or("displayWidth", 0),
                    result.i64_or("displayHeight", 0),
                    result.i64_or("displayRotation", 0)
                ),
            );
            ctx.presenter.present_kv(
                "Screen",
                if result.bool_or("screenOn", false) {
                    "on"
                } else {
                    "off"
                },
            );
            ctx.presenter
                .present_kv("Package", result.str_or("currentPackageName", "-"));
        }
    }
    Ok(())
}

pub fn handle_window_size(ctx: &mut HandlerContext) -> HandlerResult {
    let size = ctx.device.window_size()?;
    match ctx.format {
        OutputFormat::Json => ctx.presenter.present_value(&serde_json::to_value(size)?),
        OutputFormat::Text => ctx.presenter.present_raw(&size.to_string()),
    }
    Ok(())
}

pub fn handle_click(ctx: &mut HandlerContext, x: f32, y: f32) -> HandlerResult {
    let position = Position::new(x, y);
    ctx.device.click(position)?;
    ctx.output_success(&format!("Clicked {}", position))
}

pub fn handle_swipe(
    ctx: &mut HandlerContext,
    from: Position,
    to: Position,
    steps: u32,
) -> HandlerResult {
    ctx.device.swipe(from, to, steps)?;
    ctx.output_success(&format!("Swiped {} -> {}", from, to))
}

pub fn handle_press(ctx: &mut HandlerContext, key: String) -> HandlerResult {
    let key: KeyPress = key.parse()?;
    ctx.device.press_key(&key)?;
    ctx.output_success(&format!("Pressed {}", key))
}

pub fn handle_unlock(ctx: &mut HandlerContext) -> HandlerResult {
    ctx.device.wake_up()?;
    ctx.device.unlock()?;
    ctx.output_success("Unlocked")
}

pub fn handle_shell(ctx: &mut HandlerContext, command: Vec<String>, timeout: u64) -> HandlerResult {
    let command = command.join(" ");
    let out = ctx.device.shell_output(&command, timeout)?;
    match ctx.format {
        OutputFormat::Json => ctx.presenter.present_value(&serde_json::to_value(&out)?),
        OutputFormat::Text => ctx.presenter.present_raw(out.output.trim_end()),
    }
    Ok(())
}

pub fn handle_dump(ctx: &mut HandlerContext, output: Option<PathBuf>) -> HandlerResult {
    let xml = ctx.device.dump_window_hierarchy()?;
    match output {
        Some(path) => {
            std::fs::write(&path, &xml).map_err(Error::from)?;
            ctx.output_success(&format!("Hierarchy written to {}", path.display()))
        }
        None => {
            ctx.presenter.present_raw(&xml);
            Ok(())
        }
    }
}

pub fn handle_screenshot(ctx: &mut HandlerContext, output: Option<PathBuf>) -> HandlerResult {
    let shot = ctx.device.screenshot()?;
    match output {
        Some(path) => {
            std::fs::write(&path, &shot.data).map_err(Error::from)?;
            match ctx.format {
                OutputFormat::Json => ctx.presenter.present_value(&json!({
                    "path": path.display().to_string(),
                    "contentType": shot.content_type,
                    "bytes": shot.data.len(),
                })),
                OutputFormat::Text => ctx.presenter.present_success(&format!(
                    "Screenshot saved to {} ({} bytes)",
                    path.display(),
                    shot.data.len()
                )),
            }
        }
        None => match ctx.format {
            OutputFormat::Json => ctx.presenter.present_value(&json!({
                "contentType": shot.content_type,
                "data": shot.to_base64(),
            })),
            OutputFormat::Text => ctx.presenter.present_raw(&shot.to_base64()),
        },
    }
    Ok(())
}

pub fn handle_count(ctx: &mut HandlerContext, selector: String) -> HandlerResult {
    let selector = parse_selector(&selector)?;
    let count = ctx.device.element(selector).count()?;
    match ctx.format {
        OutputFormat::Json => ctx.presenter.present_value(&json!({ "count": count })),
        OutputFormat::Text => ctx.presenter.present_value(&json!(count)),
    }
    Ok(())
}

pub fn handle_text(ctx: &mut HandlerContext, selector: String) -> HandlerResult {
    let selector = parse_selector(&selector)?;
    let text = ctx.device.element(selector).get_text()?;
    match ctx.format {
        OutputFormat::Json => ctx.presenter.present_value(&json!({ "text": text })),
        OutputFormat::Text => ctx.presenter.present_raw(&text),
    }
    Ok(())
}

pub fn handle_wait(
    ctx: &mut HandlerContext,
    selector: String,
    gone: bool,
    duration: Option<f32>,
    retries: Option<i64>,
) -> HandlerResult {
    let selector = parse_selector(&selector)?;
    let config = ctx.device.config();
    let element = ctx.device.element(selector);

    if gone {
        element.wait_until_gone(
            duration.unwrap_or(config.wait_for_disappear_duration()),
            retries.unwrap_or(i64::from(config.wait_for_disappear_max_retry())),
        )?;
    } else {
        element.wait_for_exists(
            duration.unwrap_or(config.wait_for_exists_duration()),
            retries.unwrap_or(i64::from(config.wait_for_exists_max_retry())),
        )?;
    }

    let state = if gone { "gone" } else { "exists" };
    match ctx.format {
        OutputFormat::Json => ctx.presenter.present_value(&json!({
            "selector": element.selector().to_json(),
            "state": state,
        })),
        OutputFormat::Text => ctx
            .presenter
            .present_success(&format!("Element {}", state)),
    }
    Ok(())
}

pub fn handle_current_app(ctx: &mut HandlerContext) -> HandlerResult {
    let app = ctx.device.current_app()?;
    match ctx.format {
        OutputFormat::Json => ctx.presenter.present_value(&serde_json::to_value(&app)?),
        OutputFormat::Text => ctx
            .presenter
            .present_raw(&format!("{}/{}", app.package, app.activity)),
    }
    Ok(())
}

pub fn handle_action(ctx: &mut HandlerContext, name: String) -> HandlerResult {
    let action = parse_editor_action(&name)?;
    ctx.device.send_action(action)?;
    ctx.output_success(&format!("Sent editor action {}", name))
}

pub fn handle_app_start(ctx: &mut HandlerContext, package: String) -> HandlerResult {
    ctx.device.app_start(&package)?;
    ctx.output_success(&format!("Started {}", package))
}

pub fn handle_app_stop(ctx: &mut HandlerContext, package: String) -> HandlerResult {
    ctx.device.app_stop(&package)?;
    ctx.output_success(&format!("Stopped {}", package))
}
