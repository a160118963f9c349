use crate::descriptor::CommandDescriptor;
use crate::error::PipelineError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Process-wide name → descriptor mapping, populated once during a
/// defined startup phase. Every name (canonical or alias) binds to
/// exactly one descriptor; a second registration of a bound name is
/// rejected and leaves the registry untouched.
#[derive(Default)]
pub struct Registry {
    order: Vec<Arc<CommandDescriptor>>,
    names: BTreeMap<String, usize>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every name in `descriptor.names`. All-or-nothing: a
    /// conflict on any name registers none of them.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), PipelineError> {
        if descriptor.names.is_empty() {
            return Err(PipelineError::Registration {
                name: "<empty name set>".to_string(),
            });
        }
        for name in descriptor.names {
            if self.names.contains_key(*name) {
                return Err(PipelineError::Registration {
                    name: (*name).to_string(),
                });
            }
        }
        let slot = self.order.len();
        let descriptor = Arc::new(descriptor);
        for name in descriptor.names {
            self.names.insert((*name).to_string(), slot);
        }
        self.order.push(descriptor);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<CommandDescriptor>, PipelineError> {
        self.find(name)
            .cloned()
            .ok_or_else(|| PipelineError::UnknownCommand(name.to_string()))
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Arc<CommandDescriptor>> {
        self.names.get(name).map(|slot| &self.order[*slot])
    }

    /// One `(canonical_name, descriptor)` entry per descriptor,
    /// aliases deduplicated, in first-registered order.
    pub fn list_canonical(
        &self,
    ) -> impl Iterator<Item = (&'static str, &Arc<CommandDescriptor>)> + '_ {
        self.order.iter().map(|d| (d.canonical_name(), d))
    }

    /// Every name bound to `descriptor`, canonical first, in
    /// declaration order.
    #[must_use]
    pub fn aliases_of(&self, descriptor: &CommandDescriptor) -> &'static [&'static str] {
        descriptor.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::descriptor::{Capability, CapabilitySet};
    use crate::options::OptionSchema;

    struct Noop;
    impl Command for Noop {}

    fn descriptor(names: &'static [&'static str]) -> CommandDescriptor {
        CommandDescriptor {
            names,
            input_type: Some("thing_t"),
            output_type: Some("thing_t"),
            summary: "test command",
            description: "",
            options: OptionSchema::EMPTY,
            capabilities: CapabilitySet::new().with(Capability::Transform),
            build: Box::new(|_| Box::new(Noop)),
        }
    }

    #[test]
    fn lookup_resolves_canonical_and_alias() {
        let mut reg = Registry::new();
        reg.register(descriptor(&["dbuf", "db"])).expect("register");
        assert_eq!(reg.lookup("dbuf").expect("canonical").canonical_name(), "dbuf");
        assert_eq!(reg.lookup("db").expect("alias").canonical_name(), "dbuf");
    }

    #[test]
    fn unknown_name_fails_lookup() {
        let reg = Registry::new();
        let err = reg.lookup("nope").expect_err("unknown");
        assert_eq!(err.to_string(), "Unknown command: nope");
    }

    #[test]
    fn duplicate_name_is_rejected_and_registry_unchanged() {
        let mut reg = Registry::new();
        reg.register(descriptor(&["dbuf", "db"])).expect("first");
        let err = reg
            .register(descriptor(&["other", "db"]))
            .expect_err("conflict");
        assert!(matches!(err, PipelineError::Registration { ref name } if name == "db"));
        // The losing registration must not leak any of its names.
        assert!(reg.find("other").is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn canonical_listing_deduplicates_aliases_in_order() {
        let mut reg = Registry::new();
        reg.register(descriptor(&["zeta", "z"])).expect("zeta");
        reg.register(descriptor(&["alpha"])).expect("alpha");
        let listed: Vec<&str> = reg.list_canonical().map(|(name, _)| name).collect();
        assert_eq!(listed, ["zeta", "alpha"]);
    }

    #[test]
    fn aliases_report_declaration_order() {
        let mut reg = Registry::new();
        reg.register(descriptor(&["dbuf", "db"])).expect("register");
        let d = reg.lookup("db").expect("lookup");
        assert_eq!(reg.aliases_of(&d), &["dbuf", "db"]);
    }

    #[test]
    fn empty_name_set_is_rejected() {
        let mut reg = Registry::new();
        let err = reg.register(descriptor(&[])).expect_err("no names");
        assert!(matches!(err, PipelineError::Registration { .. }));
    }
}
