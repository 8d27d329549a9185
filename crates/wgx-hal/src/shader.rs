//! The shader-translation boundary.
//!
//! WGSL→SPIR-V/MSL/HLSL/GLSL translation is an external collaborator (see
//! spec §1, §6): this module only names the function signature a real
//! translator would fill in. Backends normally receive already-translated
//! source via `pso::ShaderSource`; `translate` exists so a front end that
//! only has WGSL can produce one of the four backend-native forms without
//! this crate depending on a WGSL compiler.

use crate::pso::ShaderSource;
use std::borrow::Cow;

/// One of the four native shader representations a backend accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShaderTarget {
    SpirV,
    Msl,
    Hlsl,
    Glsl,
}

/// A shader translated into one backend's native form.
#[derive(Clone, Debug)]
pub enum TranslatedShader<'a> {
    SpirV(Cow<'a, [u32]>),
    Text(Cow<'a, str>),
}

/// Failure translating a WGSL module into `target`.
#[derive(Debug, thiserror::Error)]
#[error("shader translation to {target:?} failed: {message}")]
pub struct ShaderError {
    pub target: ShaderTarget,
    pub message: String,
}

/// Translate WGSL source into `target`'s native form.
///
/// This crate does not implement a WGSL front end; callers that need one
/// supply it by linking a real translator (e.g. `naga`) behind this
/// signature. Any other `ShaderSource` variant is already in a backend's
/// native form and is returned unchanged.
pub fn translate<'a>(
    source: &ShaderSource<'a>,
    target: ShaderTarget,
) -> Result<TranslatedShader<'a>, ShaderError> {
    match source {
        ShaderSource::SpirV(words) if target == ShaderTarget::SpirV => {
            Ok(TranslatedShader::SpirV(words.clone()))
        }
        ShaderSource::Glsl { source, .. } if target == ShaderTarget::Glsl => {
            Ok(TranslatedShader::Text(source.clone()))
        }
        ShaderSource::Wgsl(_) => Err(ShaderError {
            target,
            message: "WGSL translation requires an external translator".into(),
        }),
        _ => Err(ShaderError {
            target,
            message: "shader source does not match the requested backend target".into(),
        }),
    }
}
