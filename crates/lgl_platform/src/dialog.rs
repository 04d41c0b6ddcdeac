/// Shows a blocking error dialog. Used only for fatal startup failures, after
/// the error has already been logged.
#[cfg(windows)]
pub fn show_fatal_error(title: &str, message: &str) {
    use std::ptr;
    use windows_sys::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK};

    let title = to_wide(title);
    let message = to_wide(message);
    unsafe {
        MessageBoxW(
            ptr::null_mut(),
            message.as_ptr(),
            title.as_ptr(),
            MB_OK | MB_ICONERROR,
        );
    }
}

#[cfg(not(windows))]
pub fn show_fatal_error(title: &str, message: &str) {
    log::error!("{}: {}", title, message);
}

/// UTF-16 with a trailing nul, as the wide Win32 entry points expect.
#[cfg_attr(not(windows), allow(dead_code))]
fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}
