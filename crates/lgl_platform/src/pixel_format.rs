//! Parameters negotiated with the driver during context creation.
//!
//! Everything here is plain data so it can be inspected without a window. The
//! attribute lists use the `WGL_ARB_pixel_format`, `WGL_ARB_multisample` and
//! `WGL_ARB_create_context(_profile)` tokens and are zero terminated, as the
//! extension entry points expect.

use std::cmp::Ordering;
use std::fmt;

pub const WGL_DRAW_TO_WINDOW_ARB: i32 = 0x2001;
pub const WGL_ACCELERATION_ARB: i32 = 0x2003;
pub const WGL_SUPPORT_OPENGL_ARB: i32 = 0x2010;
pub const WGL_DOUBLE_BUFFER_ARB: i32 = 0x2011;
pub const WGL_PIXEL_TYPE_ARB: i32 = 0x2013;
pub const WGL_COLOR_BITS_ARB: i32 = 0x2014;
pub const WGL_ALPHA_BITS_ARB: i32 = 0x201B;
pub const WGL_DEPTH_BITS_ARB: i32 = 0x2022;
pub const WGL_STENCIL_BITS_ARB: i32 = 0x2023;
pub const WGL_FULL_ACCELERATION_ARB: i32 = 0x2027;
pub const WGL_TYPE_RGBA_ARB: i32 = 0x202B;
pub const WGL_SAMPLE_BUFFERS_ARB: i32 = 0x2041;
pub const WGL_SAMPLES_ARB: i32 = 0x2042;

pub const WGL_CONTEXT_MAJOR_VERSION_ARB: i32 = 0x2091;
pub const WGL_CONTEXT_MINOR_VERSION_ARB: i32 = 0x2092;
pub const WGL_CONTEXT_PROFILE_MASK_ARB: i32 = 0x9126;
pub const WGL_CONTEXT_CORE_PROFILE_BIT_ARB: i32 = 0x0000_0001;
pub const WGL_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB: i32 = 0x0000_0002;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormatRequest {
    pub draw_to_window: bool,
    pub support_opengl: bool,
    pub double_buffer: bool,
    pub full_acceleration: bool,
    pub color_bits: u8,
    pub alpha_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    /// Multisample count; zero disables multisampling.
    pub samples: u8,
}

impl Default for PixelFormatRequest {
    fn default() -> Self {
        Self {
            draw_to_window: true,
            support_opengl: true,
            double_buffer: true,
            full_acceleration: true,
            color_bits: 32,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            samples: 4,
        }
    }
}

impl PixelFormatRequest {
    pub fn to_attribs(&self) -> Vec<i32> {
        let mut attribs = vec![
            WGL_DRAW_TO_WINDOW_ARB,
            self.draw_to_window as i32,
            WGL_SUPPORT_OPENGL_ARB,
            self.support_opengl as i32,
            WGL_DOUBLE_BUFFER_ARB,
            self.double_buffer as i32,
            WGL_PIXEL_TYPE_ARB,
            WGL_TYPE_RGBA_ARB,
        ];
        if self.full_acceleration {
            attribs.extend([WGL_ACCELERATION_ARB, WGL_FULL_ACCELERATION_ARB]);
        }
        attribs.extend([
            WGL_COLOR_BITS_ARB,
            self.color_bits as i32,
            WGL_ALPHA_BITS_ARB,
            self.alpha_bits as i32,
            WGL_DEPTH_BITS_ARB,
            self.depth_bits as i32,
            WGL_STENCIL_BITS_ARB,
            self.stencil_bits as i32,
        ]);
        if self.samples > 0 {
            attribs.extend([
                WGL_SAMPLE_BUFFERS_ARB,
                1,
                WGL_SAMPLES_ARB,
                self.samples as i32,
            ]);
        }
        attribs.push(0);
        attribs
    }
}

/// A `major.minor` graphics API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlVersion {
    pub major: u32,
    pub minor: u32,
}

impl GlVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses the leading `major.minor` of a `GL_VERSION` string such as
    /// `"4.6.0 NVIDIA 535.98"` or `"3.3 (Core Profile) Mesa 23.1"`.
    pub fn parse(version: &str) -> Option<Self> {
        let numeric = version.split_whitespace().next()?;
        let mut parts = numeric.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts
            .next()?
            .chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .ok()?;
        Some(Self { major, minor })
    }

    pub fn satisfies(&self, required: GlVersion) -> bool {
        *self >= required
    }
}

impl Ord for GlVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
    }
}

impl PartialOrd for GlVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextRequest {
    pub version: GlVersion,
    pub core_profile: bool,
}

impl Default for ContextRequest {
    fn default() -> Self {
        Self {
            version: GlVersion::new(3, 3),
            core_profile: true,
        }
    }
}

impl ContextRequest {
    pub fn to_attribs(&self) -> Vec<i32> {
        let profile = if self.core_profile {
            WGL_CONTEXT_CORE_PROFILE_BIT_ARB
        } else {
            WGL_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB
        };
        vec![
            WGL_CONTEXT_MAJOR_VERSION_ARB,
            self.version.major as i32,
            WGL_CONTEXT_MINOR_VERSION_ARB,
            self.version.minor as i32,
            WGL_CONTEXT_PROFILE_MASK_ARB,
            profile,
            0,
        ]
    }
}
