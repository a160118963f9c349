use crate::descriptor::CommandDescriptor;
use crate::registry::Registry;

/// The one-line listing form: `"<name> - <summary first line>"`.
#[must_use]
pub fn summary_line(name: &str, descriptor: &CommandDescriptor) -> String {
    let summary = descriptor.summary.lines().next().unwrap_or("");
    format!("{name} - {summary}")
}

/// Listing of every registered command, one line each, in
/// first-registered order with aliases deduplicated.
#[must_use]
pub fn listing(registry: &Registry) -> String {
    let mut out = String::new();
    for (name, descriptor) in registry.list_canonical() {
        out.push_str(&summary_line(name, descriptor));
        out.push('\n');
    }
    out
}

/// Verbose help for one command: usage block, aliases when more than
/// one name is bound, then the description body with a single leading
/// blank line dropped. Unknown names report and stop; that is not an
/// error.
#[must_use]
pub fn describe(registry: &Registry, name: &str) -> String {
    let Some(descriptor) = registry.find(name) else {
        return format!("Unknown command: {name}\n");
    };

    let mut out = String::new();
    out.push_str("SUMMARY\n");
    let usage = descriptor.to_clap(name).render_long_help().to_string();
    for line in usage.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }

    if descriptor.names.len() > 1 {
        out.push_str("\nALIASES\n    ");
        out.push_str(&descriptor.names.join(", "));
        out.push('\n');
    }

    let body = descriptor
        .description
        .strip_prefix('\n')
        .unwrap_or(descriptor.description);
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}
