use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::error::OsError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    /// Window class registered for both the bootstrap and the main window.
    pub class_name: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "LearnOpenGL".to_string(),
            class_name: "LearnOpenGLClass".to_string(),
            width: 800,
            height: 600,
        }
    }
}

impl PlatformConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    fn attributes(&self) -> WindowAttributes {
        // The requested size is the drawable client area; winit grows the outer
        // rectangle by the decoration insets.
        let attrs = WindowAttributes::default()
            .with_title(&self.title)
            .with_inner_size(PhysicalSize::new(self.width, self.height));

        #[cfg(windows)]
        let attrs = {
            use winit::platform::windows::WindowAttributesExtWindows;
            attrs.with_class_name(&self.class_name)
        };

        attrs
    }
}

/// Creates the visible main window.
pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, OsError> {
    let window = event_loop.create_window(config.attributes())?;
    log::info!(
        "Window created: {}x{} client area",
        config.width,
        config.height
    );
    Ok(Arc::new(window))
}

/// Creates the hidden window that only exists to host the legacy context during
/// the context handshake.
pub fn create_bootstrap_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Window, OsError> {
    let attrs = config
        .attributes()
        .with_title(format!("{} (bootstrap)", config.title))
        .with_visible(false);
    event_loop.create_window(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_startup_window() {
        let config = PlatformConfig::default();
        assert_eq!(config.title, "LearnOpenGL");
        assert_eq!(config.class_name, "LearnOpenGLClass");
        assert_eq!((config.width, config.height), (800, 600));
    }

    #[test]
    fn aspect_ratio_survives_zero_height() {
        let mut config = PlatformConfig::default();
        assert!((config.aspect_ratio() - 800.0 / 600.0).abs() < f32::EPSILON);
        config.height = 0;
        assert!(config.aspect_ratio().is_finite());
    }
}
