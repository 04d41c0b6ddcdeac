use lgl_platform::GlVersion;
use thiserror::Error;

use super::{consts, Gl};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("driver did not report a GL_VERSION string")]
    Missing,
    #[error("driver reports OpenGL {reported:?}, {required} is required")]
    TooOld {
        reported: String,
        required: GlVersion,
    },
}

/// Reads `GL_VERSION` from the current context and checks it against the
/// version the context was requested with.
pub fn check_version(gl: &dyn Gl, required: GlVersion) -> Result<GlVersion, VersionError> {
    let reported = gl.get_string(consts::VERSION).ok_or(VersionError::Missing)?;
    log::info!("GL_VERSION: {}", reported);
    match GlVersion::parse(&reported) {
        Some(version) if version.satisfies(required) => Ok(version),
        _ => Err(VersionError::TooOld { reported, required }),
    }
}
