//! Two-stage WGL context creation.
//!
//! The extension entry points needed to request a modern context are only
//! reachable while some context is current, so a throwaway legacy context is
//! created on a hidden window first, the extensions are resolved through it, and
//! the real context is then created on the main window.

use std::ffi::{c_void, CStr};
use std::mem;
use std::ptr;
use std::sync::Arc;

use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows_sys::Win32::Foundation::{HMODULE, HWND};
use windows_sys::Win32::Graphics::Gdi::{GetDC, ReleaseDC, HDC};
use windows_sys::Win32::Graphics::OpenGL::{
    ChoosePixelFormat, DescribePixelFormat, SetPixelFormat, SwapBuffers, wglCreateContext,
    wglDeleteContext, wglGetProcAddress, wglMakeCurrent, HGLRC, PFD_DOUBLEBUFFER,
    PFD_DRAW_TO_WINDOW, PFD_MAIN_PLANE, PFD_SUPPORT_OPENGL, PFD_TYPE_RGBA,
    PIXELFORMATDESCRIPTOR,
};
use windows_sys::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryA};
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::pixel_format::{ContextRequest, PixelFormatRequest};
use crate::window::{create_bootstrap_window, create_window, PlatformConfig};

type ChoosePixelFormatArb = unsafe extern "system" fn(
    hdc: HDC,
    int_attribs: *const i32,
    float_attribs: *const f32,
    max_formats: u32,
    formats: *mut i32,
    num_formats: *mut u32,
) -> i32;

type CreateContextAttribsArb =
    unsafe extern "system" fn(hdc: HDC, share: HGLRC, attribs: *const i32) -> HGLRC;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("failed to create {which} window: {source}")]
    Window {
        which: &'static str,
        #[source]
        source: winit::error::OsError,
    },
    #[error("window did not expose a Win32 handle: {0}")]
    WindowHandle(String),
    #[error("failed to get device context for the {0} window")]
    DeviceContext(&'static str),
    #[error("failed to set pixel format on the {0} window")]
    PixelFormat(&'static str),
    #[error("failed to create legacy OpenGL context")]
    LegacyContext,
    #[error("failed to make the {0} context current")]
    MakeCurrent(&'static str),
    #[error("missing WGL extension entry point {0}")]
    MissingExtension(&'static str),
    #[error("no pixel format matched the requested attributes")]
    NoMatchingPixelFormat,
    #[error("failed to create OpenGL {0} context")]
    ContextCreation(String),
    #[error("failed to load opengl32.dll")]
    OpenGlLibrary,
}

/// Owns the main window, its device context and the current rendering context.
pub struct GraphicsContext {
    hglrc: HGLRC,
    hdc: HDC,
    hwnd: HWND,
    opengl32: HMODULE,
    window: Arc<Window>,
}

struct BootstrapContext {
    window: Window,
    hwnd: HWND,
    hdc: HDC,
    hglrc: HGLRC,
}

impl BootstrapContext {
    fn create(
        event_loop: &ActiveEventLoop,
        config: &PlatformConfig,
    ) -> Result<Self, BootstrapError> {
        let window =
            create_bootstrap_window(event_loop, config).map_err(|source| BootstrapError::Window {
                which: "bootstrap",
                source,
            })?;
        let hwnd = hwnd_of(&window)?;
        let hdc = unsafe { GetDC(hwnd) };
        if hdc.is_null() {
            return Err(BootstrapError::DeviceContext("bootstrap"));
        }

        let mut ctx = Self {
            window,
            hwnd,
            hdc,
            hglrc: ptr::null_mut(),
        };

        let pfd = legacy_pixel_format_descriptor();
        unsafe {
            let index = ChoosePixelFormat(hdc, &pfd);
            if index == 0 {
                return Err(BootstrapError::PixelFormat("bootstrap"));
            }
            let mut suggested: PIXELFORMATDESCRIPTOR = mem::zeroed();
            DescribePixelFormat(
                hdc,
                index,
                mem::size_of::<PIXELFORMATDESCRIPTOR>() as _,
                &mut suggested,
            );
            if SetPixelFormat(hdc, index, &suggested) == 0 {
                return Err(BootstrapError::PixelFormat("bootstrap"));
            }

            ctx.hglrc = wglCreateContext(hdc);
            if ctx.hglrc.is_null() {
                return Err(BootstrapError::LegacyContext);
            }
            if wglMakeCurrent(hdc, ctx.hglrc) == 0 {
                return Err(BootstrapError::MakeCurrent("bootstrap"));
            }
        }
        log::debug!("Bootstrap context current");
        Ok(ctx)
    }
}

impl Drop for BootstrapContext {
    fn drop(&mut self) {
        // Unbind, delete the context, release the DC; the window itself is
        // destroyed when `self.window` drops after this.
        unsafe {
            wglMakeCurrent(ptr::null_mut(), ptr::null_mut());
            if !self.hglrc.is_null() {
                wglDeleteContext(self.hglrc);
            }
            ReleaseDC(self.hwnd, self.hdc);
        }
        log::debug!("Bootstrap context destroyed (window {:?})", self.window.id());
    }
}

impl GraphicsContext {
    /// Runs the full handshake and returns with the new context current on the
    /// calling thread. Every failure is terminal; nothing is retried.
    pub fn bootstrap(
        event_loop: &ActiveEventLoop,
        config: &PlatformConfig,
        pixel_format: &PixelFormatRequest,
        context: &ContextRequest,
    ) -> Result<Self, BootstrapError> {
        let bootstrap = BootstrapContext::create(event_loop, config)?;

        let choose_pixel_format: ChoosePixelFormatArb = unsafe {
            mem::transmute(load_wgl_extension(c"wglChoosePixelFormatARB")?)
        };
        let create_context_attribs: CreateContextAttribsArb = unsafe {
            mem::transmute(load_wgl_extension(c"wglCreateContextAttribsARB")?)
        };

        let window = create_window(event_loop, config).map_err(|source| BootstrapError::Window {
            which: "main",
            source,
        })?;
        let hwnd = hwnd_of(&window)?;
        // winit's window class has no CS_OWNDC, so the DC is held for the
        // lifetime of the context instead of being re-fetched every frame.
        let hdc = unsafe { GetDC(hwnd) };
        if hdc.is_null() {
            return Err(BootstrapError::DeviceContext("main"));
        }

        let hglrc = match Self::create_modern_context(
            hdc,
            pixel_format,
            context,
            choose_pixel_format,
            create_context_attribs,
        ) {
            Ok(hglrc) => hglrc,
            Err(err) => {
                unsafe { ReleaseDC(hwnd, hdc) };
                return Err(err);
            }
        };

        drop(bootstrap);

        let opengl32 = unsafe { LoadLibraryA(c"opengl32.dll".as_ptr().cast()) };
        let ctx = Self {
            hglrc,
            hdc,
            hwnd,
            opengl32,
            window,
        };
        if opengl32.is_null() {
            return Err(BootstrapError::OpenGlLibrary);
        }
        if unsafe { wglMakeCurrent(hdc, hglrc) } == 0 {
            return Err(BootstrapError::MakeCurrent("main"));
        }

        log::info!(
            "OpenGL {} {} context created",
            context.version,
            if context.core_profile { "core" } else { "compatibility" }
        );
        Ok(ctx)
    }

    fn create_modern_context(
        hdc: HDC,
        pixel_format: &PixelFormatRequest,
        context: &ContextRequest,
        choose_pixel_format: ChoosePixelFormatArb,
        create_context_attribs: CreateContextAttribsArb,
    ) -> Result<HGLRC, BootstrapError> {
        let pixel_attribs = pixel_format.to_attribs();
        let mut format_index = 0i32;
        let mut format_count = 0u32;
        let ok = unsafe {
            choose_pixel_format(
                hdc,
                pixel_attribs.as_ptr(),
                ptr::null(),
                1,
                &mut format_index,
                &mut format_count,
            )
        };
        if ok == 0 || format_count == 0 {
            return Err(BootstrapError::NoMatchingPixelFormat);
        }
        log::debug!("Chose pixel format {}", format_index);

        unsafe {
            let mut pfd: PIXELFORMATDESCRIPTOR = mem::zeroed();
            DescribePixelFormat(
                hdc,
                format_index,
                mem::size_of::<PIXELFORMATDESCRIPTOR>() as _,
                &mut pfd,
            );
            if SetPixelFormat(hdc, format_index, &pfd) == 0 {
                return Err(BootstrapError::PixelFormat("main"));
            }
        }

        let context_attribs = context.to_attribs();
        let hglrc =
            unsafe { create_context_attribs(hdc, ptr::null_mut(), context_attribs.as_ptr()) };
        if hglrc.is_null() {
            return Err(BootstrapError::ContextCreation(context.version.to_string()));
        }
        Ok(hglrc)
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Resolves a GL entry point, or null when the driver does not export it.
    ///
    /// `wglGetProcAddress` only knows post-1.1 functions; the 1.1 core set is
    /// exported directly by `opengl32.dll`.
    pub fn proc_address(&self, name: &CStr) -> *const c_void {
        let addr = unsafe { wglGetProcAddress(name.as_ptr().cast()) }
            .map_or(0, |f| f as usize as isize);
        if !is_invalid_proc(addr) {
            return addr as *const c_void;
        }
        unsafe { GetProcAddress(self.opengl32, name.as_ptr().cast()) }
            .map_or(ptr::null(), |f| f as *const c_void)
    }

    pub fn swap_buffers(&self) {
        if unsafe { SwapBuffers(self.hdc) } == 0 {
            log::warn!("SwapBuffers failed");
        }
    }
}

impl Drop for GraphicsContext {
    fn drop(&mut self) {
        unsafe {
            wglMakeCurrent(ptr::null_mut(), ptr::null_mut());
            wglDeleteContext(self.hglrc);
            ReleaseDC(self.hwnd, self.hdc);
        }
        log::info!("OpenGL context released");
    }
}

/// Some drivers return small sentinels instead of null for unknown names.
fn is_invalid_proc(addr: isize) -> bool {
    matches!(addr, -1 | 0 | 1 | 2 | 3)
}

fn load_wgl_extension(
    name: &'static CStr,
) -> Result<unsafe extern "system" fn() -> isize, BootstrapError> {
    let proc = unsafe { wglGetProcAddress(name.as_ptr().cast()) };
    match proc {
        Some(f) if !is_invalid_proc(f as usize as isize) => Ok(f),
        _ => Err(BootstrapError::MissingExtension(
            name.to_str().unwrap_or("<non-utf8>"),
        )),
    }
}

fn hwnd_of(window: &Window) -> Result<HWND, BootstrapError> {
    let handle = window
        .window_handle()
        .map_err(|err| BootstrapError::WindowHandle(err.to_string()))?;
    match handle.as_raw() {
        RawWindowHandle::Win32(win32) => Ok(win32.hwnd.get() as HWND),
        other => Err(BootstrapError::WindowHandle(format!("{other:?}"))),
    }
}

fn legacy_pixel_format_descriptor() -> PIXELFORMATDESCRIPTOR {
    let mut pfd: PIXELFORMATDESCRIPTOR = unsafe { mem::zeroed() };
    pfd.nSize = mem::size_of::<PIXELFORMATDESCRIPTOR>() as _;
    pfd.nVersion = 1;
    pfd.dwFlags = PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL | PFD_DOUBLEBUFFER;
    pfd.iPixelType = PFD_TYPE_RGBA as _;
    pfd.cColorBits = 32;
    pfd.cAlphaBits = 8;
    pfd.cDepthBits = 24;
    pfd.cStencilBits = 8;
    pfd.iLayerType = PFD_MAIN_PLANE as _;
    pfd
}
