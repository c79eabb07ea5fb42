//! Errors raised while executing a tool.

use std::path::PathBuf;

use thiserror::Error;

use crate::wesign::ApiError;

/// Errors produced by tool dispatch and execution.
#[derive(Error, Debug)]
pub enum ToolError {
    /// No tool with this name exists.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments did not match the tool's input schema.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool needs a session and none is held.
    #[error("Not authenticated. Please login first using wesign_login.")]
    NotAuthenticated,

    /// The upstream answered a login without issuing a token.
    #[error("Login failed: {0}")]
    LoginRejected(String),

    /// A local input file does not exist.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// Local file I/O failed.
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The upstream call failed.
    #[error("{context}: {source}")]
    Upstream {
        /// What the tool was doing.
        context: &'static str,
        /// The upstream error.
        #[source]
        source: ApiError,
    },

    /// A multi-step workflow stopped part way. Earlier steps are not rolled
    /// back.
    #[error("Step {step} of 3 ({label}) failed: {source}{}", leftover_note(template_id.as_deref()))]
    WorkflowStep {
        /// 1-based step number.
        step: u8,
        /// Step description.
        label: &'static str,
        /// Template created by an earlier step, if any.
        template_id: Option<String>,
        /// The failing call.
        #[source]
        source: Box<ToolError>,
    },
}

fn leftover_note(template_id: Option<&str>) -> String {
    template_id.map_or_else(String::new, |id| {
        format!(". Template {id} was created and remains on the server")
    })
}

impl ToolError {
    /// Returns a mapper that wraps an upstream error with context.
    pub(crate) fn upstream(context: &'static str) -> impl FnOnce(ApiError) -> Self {
        move |source| match source {
            ApiError::NotAuthenticated => Self::NotAuthenticated,
            source => Self::Upstream { context, source },
        }
    }

    /// Shorthand for an argument validation failure.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_carries_context() {
        let err = ToolError::upstream("Failed to list templates")(ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(err.to_string(), "Failed to list templates: boom");
    }

    #[test]
    fn unauthenticated_upstream_maps_to_uniform_error() {
        let err = ToolError::upstream("Failed to list templates")(ApiError::NotAuthenticated);
        assert!(matches!(err, ToolError::NotAuthenticated));
    }

    #[test]
    fn workflow_step_names_step_and_leftover() {
        let err = ToolError::WorkflowStep {
            step: 2,
            label: "attach signature fields",
            template_id: Some("t-9".to_string()),
            source: Box::new(ToolError::invalid("bad field")),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Step 2 of 3 (attach signature fields) failed"));
        assert!(msg.contains("Template t-9"));
    }
}
