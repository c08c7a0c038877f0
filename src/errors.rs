//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`EmberError`] covers all failure modes including:
//! - GPU resource allocation failures
//! - Shader compilation and linking errors (strict mode only)
//! - Render pipeline wiring contract violations
//!
//! Resource-not-ready conditions (an absent uniform, a texture that has not
//! finished loading, a pipeline input that has not produced output yet) are
//! *not* errors: the engine degrades to no-op bindings and skipped draws so
//! that partially-initialized frames render without faulting.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, EmberError>`.

use thiserror::Error;

/// The main error type for the Ember engine.
#[derive(Error, Debug)]
pub enum EmberError {
    // ========================================================================
    // GPU Resource Errors
    // ========================================================================
    /// The backend failed to allocate a GPU object (buffer, texture, …).
    #[error("GPU resource allocation failed: {0}")]
    GpuResource(String),

    /// An offscreen framebuffer did not reach a complete state.
    #[error("Framebuffer incomplete ({width}x{height}): {detail}")]
    Framebuffer {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Backend status description.
        detail: String,
    },

    // ========================================================================
    // Shader Errors (surfaced only in strict mode)
    // ========================================================================
    /// A vertex or fragment shader failed to compile.
    #[error("Shader compile error in `{name}`: {log}")]
    ShaderCompile {
        /// Shader program name.
        name: String,
        /// Compiler info log.
        log: String,
    },

    /// A shader program failed to link.
    #[error("Shader link error in `{name}`: {log}")]
    ShaderLink {
        /// Shader program name.
        name: String,
        /// Linker info log.
        log: String,
    },

    // ========================================================================
    // Pipeline Wiring Errors
    // ========================================================================
    /// A pipeline node was wired in a way that violates its input contract,
    /// e.g. a node that never produces a texture assigned as the input of an
    /// image compositor. Detected at assignment time, not at render time.
    #[error("Pipeline contract violation: {0}")]
    PipelineContract(String),
}

/// Alias for `Result<T, EmberError>`.
pub type Result<T> = std::result::Result<T, EmberError>;
