//! `UiBackend`: a narrow capability trait for reporting FPS state and
//! messages to an operator, with a plain-stdio renderer for interactive
//! use and a silent renderer for scripted/daemon use (`FPS_UI_MODE`).

use fps_core::fps::FpsMessage;
use fps_core::{Fps, ParamFlags};

/// What `fps_ctl ctrl` renders to the operator. Kept minimal and
/// capability-shaped so a future renderer (curses, web) only needs to
/// implement this trait, not touch the control loop.
pub trait UiBackend {
    fn render_header(&self, fps: &Fps);
    fn render_messages(&self, messages: &[FpsMessage]);
    fn render_param_line(&self, path: &str, value: &str, flags: ParamFlags);
    fn notify(&self, text: &str);
}

/// Plain stdout renderer, the default unless `FPS_UI_MODE=silent`.
pub struct StdioUi;

impl UiBackend for StdioUi {
    fn render_header(&self, fps: &Fps) {
        println!(
            "{} [{} params, conferrcnt={}]",
            fps.header.name(),
            fps.active_parameters().count(),
            fps.header.conferrcnt
        );
    }

    fn render_messages(&self, messages: &[FpsMessage]) {
        for msg in messages {
            match msg.param_index {
                Some(idx) => println!("  [{idx}] {}", msg.text),
                None => println!("  {}", msg.text),
            }
        }
    }

    fn render_param_line(&self, path: &str, value: &str, flags: ParamFlags) {
        let marker = if flags.contains(ParamFlags::ERROR) { "!" } else { " " };
        println!("{marker} {path:<40} {value}");
    }

    fn notify(&self, text: &str) {
        println!("{text}");
    }
}

/// Renderer that discards all output, for scripted/daemon use.
pub struct SilentUi;

impl UiBackend for SilentUi {
    fn render_header(&self, _fps: &Fps) {}
    fn render_messages(&self, _messages: &[FpsMessage]) {}
    fn render_param_line(&self, _path: &str, _value: &str, _flags: ParamFlags) {}
    fn notify(&self, _text: &str) {}
}

/// Select the renderer matching [`crate::config::UiMode`].
pub fn backend_for_mode(mode: crate::config::UiMode) -> Box<dyn UiBackend> {
    match mode {
        crate::config::UiMode::Stdio => Box::new(StdioUi),
        crate::config::UiMode::Silent => Box::new(SilentUi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_backend_does_not_panic() {
        let fps = Fps::create("myfps", "/tmp/myfps").unwrap();
        let ui = SilentUi;
        ui.render_header(&fps);
        ui.render_messages(&[]);
        ui.render_param_line("a.b", "1", ParamFlags::empty());
        ui.notify("hello");
    }

    #[test]
    fn backend_for_mode_selects_silent() {
        let ui = backend_for_mode(crate::config::UiMode::Silent);
        let fps = Fps::create("myfps", "/tmp/myfps").unwrap();
        ui.render_header(&fps);
    }
}
