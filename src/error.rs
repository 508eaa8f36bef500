//! Error types for the widget engine

use serde::{Deserialize, Serialize};

/// Comprehensive error type for widget operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum WidgetError {
    /// Named mount surface not registered with the runtime
    #[error("Surface not found: {name}")]
    SurfaceNotFound { name: String },

    /// Shape renderer not registered
    #[error("Renderer not found: {name}")]
    RendererNotFound { name: String },

    /// Easing function not registered
    #[error("Easing function not found: {name}")]
    EasingNotFound { name: String },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Invalid time value
    #[error("Invalid time value: {time}")]
    InvalidTime { time: f64 },

    /// Plugin not found
    #[error("Plugin not found: {name}")]
    PluginNotFound { name: String },

    /// Plugin hook failure
    #[error("Plugin '{name}' failed in {hook}: {reason}")]
    PluginFailed {
        name: String,
        hook: String,
        reason: String,
    },

    /// Listener failure surfaced during event emission
    #[error("Listener failed for '{event}': {reason}")]
    ListenerFailed { event: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic widget error
    #[error("Widget error: {message}")]
    Generic { message: String },
}

impl WidgetError {
    /// Create a new generic error
    pub fn new(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if this error leaves the widget unusable
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SurfaceNotFound { .. }
                | Self::RendererNotFound { .. }
                | Self::EasingNotFound { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Get error category for logging/metrics
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::SurfaceNotFound { .. } | Self::RendererNotFound { .. } => "render",
            Self::EasingNotFound { .. } => "animation",
            Self::InvalidConfig { .. } | Self::InvalidTime { .. } => "validation",
            Self::PluginNotFound { .. } | Self::PluginFailed { .. } => "plugin",
            Self::ListenerFailed { .. } => "event",
            Self::SerializationError { .. } => "serialization",
            Self::Generic { .. } => "generic",
        }
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}
