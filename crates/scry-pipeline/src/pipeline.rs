use crate::command::{CommandInstance, ExecContext, ObjectStream};
use crate::descriptor::Capability;
use crate::error::PipelineError;
use crate::registry::Registry;
use scry_core::{Fault, TypeTag};
use std::io::Write;
use tracing::debug;

/// A fully validated chain of command instances. Nothing has touched
/// the image by the time a `Pipeline` exists; all placement, parse,
/// and type errors are raised during [`Pipeline::parse`].
pub struct Pipeline {
    stages: Vec<CommandInstance>,
    seeded: bool,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .field("seeded", &self.seeded)
            .finish()
    }
}

impl Pipeline {
    /// Parse and validate a command-line-only pipeline: the first
    /// stage must be able to produce.
    pub fn parse(registry: &Registry, line: &str) -> Result<Self, PipelineError> {
        let stages = resolve_stages(registry, line)?;
        validate(&stages, None)?;
        Ok(Self {
            stages,
            seeded: false,
        })
    }

    /// Parse and validate a pipeline whose first stage will consume a
    /// caller-supplied stream of `seed` handles.
    pub fn parse_seeded(
        registry: &Registry,
        line: &str,
        seed: &TypeTag,
    ) -> Result<Self, PipelineError> {
        let stages = resolve_stages(registry, line)?;
        validate(&stages, Some(seed))?;
        Ok(Self {
            stages,
            seeded: true,
        })
    }

    #[must_use]
    pub fn stages(&self) -> &[CommandInstance] {
        &self.stages
    }

    /// Drive the chain to completion under pull semantics.
    pub fn run(&self, ctx: &ExecContext<'_>, out: &mut dyn Write) -> Result<(), PipelineError> {
        if self.seeded {
            return Err(PipelineError::Fault(Fault(
                "pipeline was validated against an external seed; use run_seeded".to_string(),
            )));
        }
        let first = &self.stages[0];
        debug!(stages = self.stages.len(), first = first.name(), "running pipeline");
        let stream = if first.descriptor().capabilities.supports(Capability::Produce) {
            first.produce(ctx)?
        } else {
            // Source-less renderer (validated single-stage, e.g. `help`).
            Box::new(std::iter::empty())
        };
        self.drive(ctx, stream, 1, out)
    }

    /// Like [`Pipeline::run`], with the first stage fed from `seed`
    /// instead of producing its own stream.
    pub fn run_seeded<'a>(
        &'a self,
        ctx: &ExecContext<'a>,
        seed: ObjectStream<'a>,
        out: &mut dyn Write,
    ) -> Result<(), PipelineError> {
        if !self.seeded {
            return Err(PipelineError::Fault(Fault(
                "pipeline was validated without an external seed; use run".to_string(),
            )));
        }
        debug!(stages = self.stages.len(), "running seeded pipeline");
        self.drive(ctx, seed, 0, out)
    }

    /// Fold `apply` over the middle stages, then hand the stream to
    /// the tail: its own renderer when it has one, the default
    /// renderer otherwise. A tail that also transforms (dual-role
    /// filter in last position) applies its predicates first.
    fn drive<'a>(
        &'a self,
        ctx: &ExecContext<'a>,
        mut stream: ObjectStream<'a>,
        transform_from: usize,
        out: &mut dyn Write,
    ) -> Result<(), PipelineError> {
        let last = self.stages.len() - 1;
        for i in transform_from..last {
            stream = self.stages[i].apply(ctx, stream)?;
        }
        let tail = &self.stages[last];
        let caps = tail.descriptor().capabilities;
        if last >= transform_from && caps.supports(Capability::Transform) {
            stream = tail.apply(ctx, stream)?;
        }
        if caps.supports(Capability::Render) {
            tail.render(ctx, stream, out)
        } else {
            render_default(stream, out)
        }
    }
}

/// Parse, validate, and run one invocation line.
pub fn execute_line(
    ctx: &ExecContext<'_>,
    line: &str,
    out: &mut dyn Write,
) -> Result<(), PipelineError> {
    Pipeline::parse(ctx.registry, line)?.run(ctx, out)
}

/// Split the line on `|`, resolve each stage name, and construct the
/// bound instances. Quoting applies within a stage, not across pipes.
fn resolve_stages(registry: &Registry, line: &str) -> Result<Vec<CommandInstance>, PipelineError> {
    let mut stages = Vec::new();
    for token in line.split('|') {
        let token = token.trim();
        if token.is_empty() {
            return Err(PipelineError::EmptyStage);
        }
        let (name, raw_args) = match token.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim_start()),
            None => (token, ""),
        };
        let descriptor = registry.lookup(name)?;
        debug!(stage = name, args = raw_args, "resolved stage");
        stages.push(CommandInstance::construct(descriptor, name, raw_args)?);
    }
    Ok(stages)
}

/// One pass over the resolved stages, before anything runs.
fn validate(stages: &[CommandInstance], seed: Option<&TypeTag>) -> Result<(), PipelineError> {
    let last = stages.len() - 1;
    for (i, stage) in stages.iter().enumerate() {
        let d = stage.descriptor();
        if stage.is_terminal() && i != last {
            return Err(PipelineError::RendererNotLast {
                command: stage.name().to_string(),
            });
        }
        if i == 0 {
            match seed {
                None => {
                    let source_less_renderer = stages.len() == 1
                        && d.input_type.is_none()
                        && d.capabilities.supports(Capability::Render);
                    if !d.capabilities.supports(Capability::Produce) && !source_less_renderer {
                        return Err(PipelineError::NeedsUpstream {
                            command: stage.name().to_string(),
                        });
                    }
                }
                Some(seed_tag) => {
                    check_consumer(stage, i == last)?;
                    let input = d.input_tag().ok_or_else(|| {
                        PipelineError::MissingInputType {
                            command: stage.name().to_string(),
                        }
                    })?;
                    if input != *seed_tag {
                        return Err(PipelineError::TypeMismatch {
                            upstream: "<seed>".to_string(),
                            output: seed_tag.to_string(),
                            downstream: stage.name().to_string(),
                            input: input.to_string(),
                        });
                    }
                }
            }
            continue;
        }
        check_consumer(stage, i == last)?;
        let input = d
            .input_tag()
            .ok_or_else(|| PipelineError::MissingInputType {
                command: stage.name().to_string(),
            })?;
        let upstream = &stages[i - 1];
        let Some(output) = upstream.descriptor().output_tag() else {
            // Terminal upstream stages were caught above.
            return Err(PipelineError::RendererNotLast {
                command: upstream.name().to_string(),
            });
        };
        if output != input {
            return Err(PipelineError::TypeMismatch {
                upstream: upstream.name().to_string(),
                output: output.to_string(),
                downstream: stage.name().to_string(),
                input: input.to_string(),
            });
        }
    }
    Ok(())
}

/// A stage with an upstream must transform it, unless it is the final
/// renderer consuming the stream directly.
fn check_consumer(stage: &CommandInstance, is_last: bool) -> Result<(), PipelineError> {
    let caps = stage.descriptor().capabilities;
    if caps.supports(Capability::Transform) {
        return Ok(());
    }
    if is_last && caps.supports(Capability::Render) {
        return Ok(());
    }
    Err(PipelineError::CannotTransform {
        command: stage.name().to_string(),
    })
}

/// Pretty-printer of last resort: one line per handle.
fn render_default(stream: ObjectStream<'_>, out: &mut dyn Write) -> Result<(), PipelineError> {
    for item in stream {
        let handle = item?;
        writeln!(out, "{handle}").map_err(PipelineError::sink)?;
    }
    Ok(())
}
