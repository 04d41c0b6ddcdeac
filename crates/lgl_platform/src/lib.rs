pub mod dialog;
pub mod pixel_format;
pub mod stats;
#[cfg(windows)]
pub mod wgl;
pub mod window;

pub use dialog::show_fatal_error;
pub use pixel_format::{ContextRequest, GlVersion, PixelFormatRequest};
pub use stats::{process_memory, ProcessMemory};
#[cfg(windows)]
pub use wgl::{BootstrapError, GraphicsContext};
pub use window::PlatformConfig;
