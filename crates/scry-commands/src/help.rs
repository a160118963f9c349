use scry_pipeline::{
    describe, listing, Capability, CapabilitySet, Command, CommandDescriptor, ExecContext,
    ObjectStream, OptionSchema, PipelineError, PositionalSpec,
};
use std::io::Write;

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor {
        names: &["help"],
        input_type: None,
        output_type: None,
        summary: "Print command usage",
        description: "\nWithout an argument, lists every registered command with its\n\
            one-line summary. With a command name, prints that command's\n\
            full usage, aliases, and description.",
        options: OptionSchema {
            flags: &[],
            positional: Some(PositionalSpec {
                name: "command",
                help: "command to describe",
                required: false,
            }),
        },
        capabilities: CapabilitySet::new().with(Capability::Render),
        build: Box::new(|matches| {
            Box::new(Help {
                topic: matches.get_one::<String>("command").cloned(),
            })
        }),
    }
}

struct Help {
    topic: Option<String>,
}

impl Command for Help {
    fn render(
        &self,
        ctx: &ExecContext<'_>,
        _input: ObjectStream<'_>,
        out: &mut dyn Write,
    ) -> Result<(), PipelineError> {
        let text = match &self.topic {
            None => listing(ctx.registry),
            Some(name) => describe(ctx.registry, name),
        };
        out.write_all(text.as_bytes()).map_err(PipelineError::sink)
    }
}
