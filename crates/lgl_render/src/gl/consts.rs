use super::{GLbitfield, GLenum, GLint};

pub const NO_ERROR: GLenum = 0;
pub const INVALID_ENUM: GLenum = 0x0500;
pub const INVALID_VALUE: GLenum = 0x0501;
pub const INVALID_OPERATION: GLenum = 0x0502;
pub const STACK_OVERFLOW: GLenum = 0x0503;
pub const STACK_UNDERFLOW: GLenum = 0x0504;
pub const OUT_OF_MEMORY: GLenum = 0x0505;
pub const INVALID_FRAMEBUFFER_OPERATION: GLenum = 0x0506;

pub const FALSE: u8 = 0;
pub const TRUE: u8 = 1;

pub const DEPTH_BUFFER_BIT: GLbitfield = 0x0000_0100;
pub const COLOR_BUFFER_BIT: GLbitfield = 0x0000_4000;

pub const TRIANGLES: GLenum = 0x0004;

pub const DEPTH_TEST: GLenum = 0x0B71;
pub const FRONT_AND_BACK: GLenum = 0x0408;
pub const FILL: GLenum = 0x1B02;
pub const LINE: GLenum = 0x1B01;

pub const VENDOR: GLenum = 0x1F00;
pub const RENDERER: GLenum = 0x1F01;
pub const VERSION: GLenum = 0x1F02;

pub const UNSIGNED_BYTE: GLenum = 0x1401;
pub const FLOAT: GLenum = 0x1406;

pub const RED: GLenum = 0x1903;
pub const RG: GLenum = 0x8227;
pub const RGB: GLenum = 0x1907;
pub const RGBA: GLenum = 0x1908;

pub const TEXTURE_2D: GLenum = 0x0DE1;
pub const TEXTURE0: GLenum = 0x84C0;
pub const TEXTURE_MAG_FILTER: GLenum = 0x2800;
pub const TEXTURE_MIN_FILTER: GLenum = 0x2801;
pub const TEXTURE_WRAP_S: GLenum = 0x2802;
pub const TEXTURE_WRAP_T: GLenum = 0x2803;
pub const UNPACK_ALIGNMENT: GLenum = 0x0CF5;

pub const NEAREST: GLint = 0x2600;
pub const LINEAR: GLint = 0x2601;
pub const NEAREST_MIPMAP_NEAREST: GLint = 0x2700;
pub const LINEAR_MIPMAP_NEAREST: GLint = 0x2701;
pub const NEAREST_MIPMAP_LINEAR: GLint = 0x2702;
pub const LINEAR_MIPMAP_LINEAR: GLint = 0x2703;
pub const REPEAT: GLint = 0x2901;
pub const CLAMP_TO_EDGE: GLint = 0x812F;
pub const MIRRORED_REPEAT: GLint = 0x8370;

pub const ARRAY_BUFFER: GLenum = 0x8892;
pub const STATIC_DRAW: GLenum = 0x88E4;

pub const FRAGMENT_SHADER: GLenum = 0x8B30;
pub const VERTEX_SHADER: GLenum = 0x8B31;
pub const COMPILE_STATUS: GLenum = 0x8B81;
pub const LINK_STATUS: GLenum = 0x8B82;
pub const INFO_LOG_LENGTH: GLenum = 0x8B84;
