use clap::{Arg, ArgAction};

/// Value shape of one declared flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptKind {
    Int,
    Text,
    Switch,
}

/// One declarative flag: long form, optional short form, typed value,
/// and its help text. The flag's long form doubles as its lookup id.
#[derive(Debug, Clone, Copy)]
pub struct OptSpec {
    pub long: &'static str,
    pub short: Option<char>,
    pub kind: OptKind,
    pub help: &'static str,
}

/// At most one optional positional argument per command.
#[derive(Debug, Clone, Copy)]
pub struct PositionalSpec {
    pub name: &'static str,
    pub help: &'static str,
    pub required: bool,
}

/// Declarative per-command argument schema, compiled to a `clap`
/// command at each invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionSchema {
    pub flags: &'static [OptSpec],
    pub positional: Option<PositionalSpec>,
}

impl OptionSchema {
    pub const EMPTY: Self = Self {
        flags: &[],
        positional: None,
    };

    #[must_use]
    pub fn to_clap(&self, name: &str, summary: &'static str) -> clap::Command {
        let mut cmd = clap::Command::new(name.to_string())
            .about(summary)
            .no_binary_name(true)
            .disable_version_flag(true);
        for flag in self.flags {
            let mut arg = Arg::new(flag.long).long(flag.long).help(flag.help);
            if let Some(short) = flag.short {
                arg = arg.short(short);
            }
            arg = match flag.kind {
                OptKind::Int => arg
                    .action(ArgAction::Set)
                    .value_parser(clap::value_parser!(i64)),
                OptKind::Text => arg.action(ArgAction::Set),
                OptKind::Switch => arg.action(ArgAction::SetTrue),
            };
            cmd = cmd.arg(arg);
        }
        if let Some(pos) = self.positional {
            let mut arg = Arg::new(pos.name).help(pos.help);
            if pos.required {
                arg = arg.required(true);
            }
            cmd = cmd.arg(arg);
        }
        cmd
    }
}
