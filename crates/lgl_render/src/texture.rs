//! Bitmap loading and texture upload.
//!
//! Raw file bytes live in a scratch region only for as long as decoding takes.
//! The decoded pixels are copied into the caller's storage arena so the
//! decoder's own buffer can be dropped straight away.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use image::DynamicImage;
use lgl_core::arena::{ArenaSlice, ScratchAllocator};

use crate::gl::consts;
use crate::gl::{GLenum, GLint, Gl, TextureHandle};

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("read {read} of {expected} bytes from {}", path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        read: usize,
    },
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("could not allocate {bytes} bytes")]
    Allocation { bytes: usize },
}

/// Decoded pixels, rows bottom-up, tightly packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap {
    pub pixels: ArenaSlice,
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u8,
}

impl Bitmap {
    pub fn size_bytes(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_pixel as usize
    }

    /// Client format matching the channel count.
    pub fn gl_format(&self) -> GLenum {
        match self.bytes_per_pixel {
            1 => consts::RED,
            2 => consts::RG,
            3 => consts::RGB,
            _ => consts::RGBA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    pub wrap_s: GLint,
    pub wrap_t: GLint,
    pub min_filter: GLint,
    pub mag_filter: GLint,
}

impl TextureParams {
    /// Repeating, with mipmapped minification.
    pub const BRICK: TextureParams = TextureParams {
        wrap_s: consts::REPEAT,
        wrap_t: consts::REPEAT,
        min_filter: consts::NEAREST_MIPMAP_LINEAR,
        mag_filter: consts::LINEAR,
    };

    pub const LINEAR: TextureParams = TextureParams {
        wrap_s: consts::REPEAT,
        wrap_t: consts::REPEAT,
        min_filter: consts::LINEAR,
        mag_filter: consts::LINEAR,
    };
}

fn io_error(path: &Path, source: io::Error) -> TextureError {
    TextureError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads until `buf` is full or the reader is exhausted.
fn read_into(mut reader: impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

fn into_packed(image: DynamicImage) -> (u8, Vec<u8>) {
    match image {
        DynamicImage::ImageLuma8(img) => (1, img.into_raw()),
        DynamicImage::ImageLumaA8(img) => (2, img.into_raw()),
        DynamicImage::ImageRgb8(img) => (3, img.into_raw()),
        DynamicImage::ImageRgba8(img) => (4, img.into_raw()),
        other => (4, other.into_rgba8().into_raw()),
    }
}

/// Reads and decodes the image at `path`, flipped so the first row is the
/// bottom of the image.
pub fn load_bitmap<S, T>(
    path: &Path,
    storage: &mut S,
    scratch: &mut T,
) -> Result<Bitmap, TextureError>
where
    S: ScratchAllocator,
    T: ScratchAllocator,
{
    let file_size = fs::metadata(path).map_err(|e| io_error(path, e))?.len();
    let len = file_size as usize;

    scratch.temp_region(|scratch| {
        let raw = scratch
            .push(len)
            .ok_or(TextureError::Allocation { bytes: len })?;
        let buf = scratch
            .bytes_mut(raw)
            .ok_or(TextureError::Allocation { bytes: len })?;

        let file = File::open(path).map_err(|e| io_error(path, e))?;
        let read = read_into(file, buf).map_err(|e| io_error(path, e))?;
        if read as u64 != file_size {
            return Err(TextureError::SizeMismatch {
                path: path.to_path_buf(),
                expected: file_size,
                read,
            });
        }

        let decoded = image::load_from_memory(buf).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let (width, height) = (decoded.width(), decoded.height());
        let (bytes_per_pixel, pixels) = into_packed(decoded.flipv());

        let stored = storage
            .push_copy(&pixels)
            .ok_or(TextureError::Allocation {
                bytes: pixels.len(),
            })?;
        log::debug!(
            "Loaded {}: {}x{} @ {} bpp",
            path.display(),
            width,
            height,
            bytes_per_pixel
        );
        Ok(Bitmap {
            pixels: stored,
            width,
            height,
            bytes_per_pixel,
        })
    })
}

/// Creates a texture from `pixels` (the bytes of `bitmap`) and builds its
/// mipmap chain.
pub fn upload_texture(
    gl: &dyn Gl,
    bitmap: &Bitmap,
    pixels: &[u8],
    params: TextureParams,
) -> TextureHandle {
    debug_assert_eq!(pixels.len(), bitmap.size_bytes());

    let texture = gl.gen_texture();
    gl.bind_texture(consts::TEXTURE_2D, texture);
    gl.tex_parameter_i(consts::TEXTURE_2D, consts::TEXTURE_WRAP_S, params.wrap_s);
    gl.tex_parameter_i(consts::TEXTURE_2D, consts::TEXTURE_WRAP_T, params.wrap_t);
    gl.tex_parameter_i(consts::TEXTURE_2D, consts::TEXTURE_MIN_FILTER, params.min_filter);
    gl.tex_parameter_i(consts::TEXTURE_2D, consts::TEXTURE_MAG_FILTER, params.mag_filter);

    // Rows of 1- and 3-channel images are not 4-byte aligned in general.
    gl.pixel_store_i(consts::UNPACK_ALIGNMENT, 1);
    let format = bitmap.gl_format();
    gl.tex_image_2d(
        consts::TEXTURE_2D,
        0,
        format as GLint,
        bitmap.width as i32,
        bitmap.height as i32,
        format,
        consts::UNSIGNED_BYTE,
        pixels,
    );
    gl.generate_mipmap(consts::TEXTURE_2D);
    texture
}

/// Loads `path` and uploads it. All intermediate memory is released before
/// returning; on failure no texture object is created.
pub fn load_texture<S, T>(
    gl: &dyn Gl,
    path: &Path,
    params: TextureParams,
    storage: &mut S,
    scratch: &mut T,
) -> Result<TextureHandle, TextureError>
where
    S: ScratchAllocator,
    T: ScratchAllocator,
{
    storage.temp_region(|storage| {
        let bitmap = load_bitmap(path, storage, scratch)?;
        let pixels = storage
            .bytes(bitmap.pixels)
            .ok_or(TextureError::Allocation {
                bytes: bitmap.size_bytes(),
            })?;
        Ok(upload_texture(gl, &bitmap, pixels, params))
    })
}
