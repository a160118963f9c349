use crate::descriptor::{Capability, CommandDescriptor};
use crate::error::PipelineError;
use crate::registry::Registry;
use scry_core::{Fault, Image, TypedHandle};
use std::io::Write;
use std::sync::Arc;

/// Lazy, forward-only, non-restartable stream of typed handles.
/// Faults travel in-band and abort the pipeline at the consumer.
pub type ObjectStream<'a> = Box<dyn Iterator<Item = Result<TypedHandle, Fault>> + 'a>;

/// Shared per-session state every stage sees: the read-only target
/// image and the registry (needed by introspective commands like
/// `help`). Never mutated during execution.
#[derive(Clone, Copy)]
pub struct ExecContext<'a> {
    pub image: &'a dyn Image,
    pub registry: &'a Registry,
}

/// The operation behind a bound command. Implement only the methods
/// matching the descriptor's declared capability set; the defaults
/// report a programming defect (a capability declared but not written).
pub trait Command {
    /// Seed a stream with no upstream input. First stage only.
    fn produce<'a>(&'a self, ctx: &ExecContext<'a>) -> Result<ObjectStream<'a>, PipelineError> {
        let _ = ctx;
        Err(PipelineError::NotImplemented {
            command: String::new(),
            capability: Capability::Produce,
        })
    }

    /// Consume an upstream stream lazily and emit a downstream one.
    fn apply<'a>(
        &'a self,
        ctx: &ExecContext<'a>,
        input: ObjectStream<'a>,
    ) -> Result<ObjectStream<'a>, PipelineError> {
        let _ = (ctx, input);
        Err(PipelineError::NotImplemented {
            command: String::new(),
            capability: Capability::Transform,
        })
    }

    /// Consume the stream to exhaustion and write formatted output.
    /// Last stage only.
    fn render(
        &self,
        ctx: &ExecContext<'_>,
        input: ObjectStream<'_>,
        out: &mut dyn Write,
    ) -> Result<(), PipelineError> {
        let _ = (ctx, input, out);
        Err(PipelineError::NotImplemented {
            command: String::new(),
            capability: Capability::Render,
        })
    }
}

/// One command bound to its parsed arguments for a single pipeline
/// execution. `is_terminal` and `is_pipeable` come from the declared
/// output contract at construction and never change afterwards.
pub struct CommandInstance {
    descriptor: Arc<CommandDescriptor>,
    name: String,
    command: Box<dyn Command>,
    is_terminal: bool,
    is_pipeable: bool,
}

impl CommandInstance {
    pub(crate) fn construct(
        descriptor: Arc<CommandDescriptor>,
        name: &str,
        raw_args: &str,
    ) -> Result<Self, PipelineError> {
        let matches = descriptor.parse_args(name, raw_args)?;
        let command = (descriptor.build)(&matches);
        let is_pipeable = descriptor.output_type.is_some();
        Ok(Self {
            descriptor,
            name: name.to_string(),
            command,
            is_terminal: !is_pipeable,
            is_pipeable,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    #[must_use]
    pub fn is_pipeable(&self) -> bool {
        self.is_pipeable
    }

    pub(crate) fn produce<'a>(
        &'a self,
        ctx: &ExecContext<'a>,
    ) -> Result<ObjectStream<'a>, PipelineError> {
        self.command
            .produce(ctx)
            .map_err(|e| e.for_command(&self.name))
    }

    pub(crate) fn apply<'a>(
        &'a self,
        ctx: &ExecContext<'a>,
        input: ObjectStream<'a>,
    ) -> Result<ObjectStream<'a>, PipelineError> {
        self.command
            .apply(ctx, input)
            .map_err(|e| e.for_command(&self.name))
    }

    pub(crate) fn render(
        &self,
        ctx: &ExecContext<'_>,
        input: ObjectStream<'_>,
        out: &mut dyn Write,
    ) -> Result<(), PipelineError> {
        self.command
            .render(ctx, input, out)
            .map_err(|e| e.for_command(&self.name))
    }
}
