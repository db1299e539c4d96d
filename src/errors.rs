//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`MannyError`] covers all failure modes including:
//! - Asset reading, decoding and format dispatch
//! - Skeleton cloning consistency checks
//! - Configuration parsing
//!
//! Per-frame paths never surface these errors: failed clip fetches are logged
//! and the clip simply never becomes available.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, MannyError>`.
//!
//! ```rust,ignore
//! use manny::errors::{MannyError, Result};
//!
//! fn load_asset() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum MannyError {
    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// No decoder is registered for the file extension.
    #[error("Unsupported asset format '{extension}' for {uri}")]
    UnsupportedFormat {
        /// Lower-cased extension that failed to dispatch
        extension: String,
        /// The asset that was being decoded
        uri: String,
    },

    /// The file decoded fine but contains no animation clip.
    #[error("No animation clip found in {0}")]
    MissingClip(String),

    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// A node handle did not resolve in the scene.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Source and cloned hierarchies diverged while remapping a skeleton.
    #[error("Skeleton clone mismatch: {0}")]
    SkeletonMismatch(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // HTTP & Network Errors
    // ========================================================================
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// URL parsing error.
    #[cfg(feature = "http")]
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// HTTP response error with status code.
    #[error("HTTP response error: status {status}")]
    HttpResponseError {
        /// HTTP status code
        status: u16,
    },

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// glTF parsing or loading error.
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    GltfError(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // Async & Platform Errors
    // ========================================================================
    /// Task join error (when async tasks fail to complete).
    #[error("Task join error: {0}")]
    TaskJoinError(String),

    /// Feature not enabled.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for MannyError {
    fn from(err: image::ImageError) -> Self {
        MannyError::ImageDecodeError(err.to_string())
    }
}

#[cfg(feature = "gltf")]
impl From<gltf::Error> for MannyError {
    fn from(err: gltf::Error) -> Self {
        MannyError::GltfError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for MannyError {
    fn from(err: tokio::task::JoinError) -> Self {
        MannyError::TaskJoinError(err.to_string())
    }
}

/// Alias for `Result<T, MannyError>`.
pub type Result<T> = std::result::Result<T, MannyError>;
