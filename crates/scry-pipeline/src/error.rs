use crate::descriptor::Capability;
use scry_core::{ExitCode, Fault};
use thiserror::Error;

/// Everything that can go wrong between reading a pipeline line and
/// finishing its last pull. Construction-time variants are raised
/// before any stage executes; only `Fault` can surface mid-stream.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("name '{name}' is already registered")]
    Registration { name: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{message}")]
    Usage { command: String, message: String },

    #[error("empty pipeline stage")]
    EmptyStage,

    #[error("type mismatch: '{upstream}' emits {output} but '{downstream}' expects {input}")]
    TypeMismatch {
        upstream: String,
        output: String,
        downstream: String,
        input: String,
    },

    #[error("'{command}' cannot start a pipeline: it needs an upstream stream")]
    NeedsUpstream { command: String },

    #[error("'{command}' cannot consume an upstream stream")]
    CannotTransform { command: String },

    #[error("'{command}' renders terminal output and must be the last stage")]
    RendererNotLast { command: String },

    #[error("'{command}' declares no input type but is not the first stage")]
    MissingInputType { command: String },

    #[error("'{command}' does not implement {capability}")]
    NotImplemented {
        command: String,
        capability: Capability,
    },

    #[error(transparent)]
    Fault(#[from] Fault),
}

impl PipelineError {
    /// Process exit status for non-interactive use.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::UnknownCommand(_) | Self::Usage { .. } | Self::EmptyStage => ExitCode::Usage,
            Self::TypeMismatch { .. }
            | Self::NeedsUpstream { .. }
            | Self::CannotTransform { .. }
            | Self::RendererNotLast { .. }
            | Self::MissingInputType { .. } => ExitCode::Validation,
            Self::Fault(_) => ExitCode::DependencyFailure,
            Self::Registration { .. } | Self::NotImplemented { .. } => ExitCode::Internal,
        }
    }

    /// Map an output-sink write failure into the fault channel.
    #[must_use]
    pub fn sink(err: std::io::Error) -> Self {
        Self::Fault(Fault(format!("output sink error: {err}")))
    }

    /// Fill in the invoking command on errors raised from default
    /// capability stubs, which cannot know their own name.
    pub(crate) fn for_command(self, name: &str) -> Self {
        match self {
            Self::NotImplemented {
                command,
                capability,
            } if command.is_empty() => Self::NotImplemented {
                command: name.to_string(),
                capability,
            },
            other => other,
        }
    }
}
