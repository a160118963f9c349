use crate::command::Command;
use crate::error::PipelineError;
use crate::options::OptionSchema;
use scry_core::TypeTag;
use std::fmt;

/// One operation a command may implement. Declared explicitly at
/// registration; never inferred from method shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Produce,
    Transform,
    Render,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Produce => "produce",
            Self::Transform => "transform",
            Self::Render => "render",
        })
    }
}

/// Subset of {Produce, Transform, Render} a command implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    produce: bool,
    transform: bool,
    render: bool,
}

impl CapabilitySet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            produce: false,
            transform: false,
            render: false,
        }
    }

    #[must_use]
    pub const fn with(mut self, capability: Capability) -> Self {
        match capability {
            Capability::Produce => self.produce = true,
            Capability::Transform => self.transform = true,
            Capability::Render => self.render = true,
        }
        self
    }

    #[must_use]
    pub const fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Produce => self.produce,
            Capability::Transform => self.transform,
            Capability::Render => self.render,
        }
    }
}

/// Builds the bound command from its parsed arguments. Parsing has
/// already succeeded against the schema by the time this runs.
/// Boxed rather than a fn pointer so constructors can close over
/// session-scoped state; pipelines run on a single thread, so no
/// `Send`/`Sync` bound is required.
pub type BuildFn = Box<dyn Fn(&clap::ArgMatches) -> Box<dyn Command>>;

/// Identity and shape of a command type: invocation names (first is
/// canonical), stream types, structured help text, argument schema,
/// declared capabilities, and the constructor.
pub struct CommandDescriptor {
    pub names: &'static [&'static str],
    pub input_type: Option<&'static str>,
    pub output_type: Option<&'static str>,
    pub summary: &'static str,
    pub description: &'static str,
    pub options: OptionSchema,
    pub capabilities: CapabilitySet,
    pub build: BuildFn,
}

impl CommandDescriptor {
    #[must_use]
    pub fn canonical_name(&self) -> &'static str {
        self.names.first().copied().unwrap_or("<unnamed>")
    }

    #[must_use]
    pub fn input_tag(&self) -> Option<TypeTag> {
        self.input_type.map(TypeTag::new)
    }

    #[must_use]
    pub fn output_tag(&self) -> Option<TypeTag> {
        self.output_type.map(TypeTag::new)
    }

    #[must_use]
    pub fn to_clap(&self, name: &str) -> clap::Command {
        self.options.to_clap(name, self.summary)
    }

    /// Tokenize and parse one stage's raw argument string. Failures
    /// carry the rendered per-command usage text.
    pub fn parse_args(&self, name: &str, raw: &str) -> Result<clap::ArgMatches, PipelineError> {
        let words = shell_words::split(raw).map_err(|e| PipelineError::Usage {
            command: name.to_string(),
            message: format!("{name}: {e}"),
        })?;
        self.to_clap(name)
            .try_get_matches_from(words)
            .map_err(|e| PipelineError::Usage {
                command: name.to_string(),
                message: e.render().to_string(),
            })
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("names", &self.names)
            .field("input_type", &self.input_type)
            .field("output_type", &self.output_type)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
