use std::ffi::OsString;
use std::path::PathBuf;

use crate::state::AppState;
use crate::ui::image_display::{load_and_display_images, load_and_display_remote};

/// An image to open as soon as the window is up.
#[derive(Debug, Clone, PartialEq)]
pub enum StartupSource {
    File(PathBuf),
    Url(String),
}

/// Picks the first positional argument that is a supported image path or an http(s) URL.
///
/// Flags and the value following `--model` are skipped.
fn startup_source_from<I>(args: I) -> Option<StartupSource>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let arg_str = arg.to_string_lossy();
        if arg_str == "--model" {
            args.next();
            continue;
        }
        if arg_str.starts_with('-') {
            continue;
        }
        if crate::file_utils::is_remote_url(&arg_str) {
            return Some(StartupSource::Url(arg_str.into_owned()));
        }
        let path = PathBuf::from(&arg);
        if crate::file_utils::is_supported_image(&path) {
            return Some(StartupSource::File(path));
        }
    }
    None
}

#[cfg(any(target_os = "macos", target_os = "windows"))]
fn setup_platform_window_hooks(app: &crate::AppWindow, app_state: &AppState) {
    use i_slint_backend_winit::WinitWindowAccessor;
    use i_slint_backend_winit::{EventResult, winit::event::WindowEvent};
    use slint::ComponentHandle;

    let ui_handle = app.as_weak();
    let state = app_state.clone();

    app.window().on_winit_window_event(move |_window, event| {
        if let WindowEvent::DroppedFile(path) = event {
            if crate::file_utils::is_supported_image(path) {
                queue_dropped_file(ui_handle.clone(), state.clone(), path.clone());
            } else {
                log::warn!("Ignoring dropped file {:?}", path);
            }
        }

        EventResult::Propagate
    });
}

/// Collects the per-file drop events of one drag into a single image list.
#[cfg(any(target_os = "macos", target_os = "windows"))]
fn queue_dropped_file(ui: slint::Weak<crate::AppWindow>, state: AppState, path: PathBuf) {
    let starts_batch = match state.drops.lock() {
        Ok(mut drops) => drops.push(path),
        Err(e) => {
            log::error!("Drop batch lock poisoned, ignoring {:?}: {}", path, e);
            return;
        }
    };
    if !starts_batch {
        return;
    }

    slint::Timer::single_shot(
        std::time::Duration::from_millis(crate::config::DROP_BATCH_DELAY_MS),
        move || {
            let paths = match state.drops.lock() {
                Ok(mut drops) => drops.take(),
                Err(e) => {
                    log::error!("Drop batch lock poisoned: {}", e);
                    return;
                }
            };
            log::info!("Opening {} dropped file(s)", paths.len());
            load_and_display_images(ui, state, paths);
        },
    );
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn setup_platform_window_hooks(_app: &crate::AppWindow, _app_state: &AppState) {}

pub fn configure_startup_opening(app: &crate::AppWindow, app_state: &AppState) {
    use slint::ComponentHandle;

    setup_platform_window_hooks(app, app_state);

    match startup_source_from(std::env::args_os().skip(1)) {
        Some(StartupSource::File(path)) => {
            load_and_display_images(app.as_weak(), app_state.clone(), vec![path]);
        }
        Some(StartupSource::Url(url)) => {
            load_and_display_remote(app.as_weak(), app_state.clone(), url);
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn first_image_argument_is_used() {
        assert_eq!(
            startup_source_from(args(&["-v", "notes.txt", "person.png", "other.jpg"])),
            Some(StartupSource::File(PathBuf::from("person.png")))
        );
    }

    #[test]
    fn urls_are_preloaded_remotely() {
        assert_eq!(
            startup_source_from(args(&["https://example.com/pose"])),
            Some(StartupSource::Url("https://example.com/pose".to_string()))
        );
    }

    #[test]
    fn model_value_is_not_an_image() {
        assert_eq!(startup_source_from(args(&["--model", "net.png"])), None);
        assert_eq!(startup_source_from(args(&[])), None);
    }
}
