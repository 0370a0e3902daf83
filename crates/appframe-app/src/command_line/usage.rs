//! Generated usage text

use std::fmt::Write;

use super::option::{CommandLineOption, CommandLineOptionCollection, CommandLineOptionValueType};
use super::CommandLine;

const INDENT: &str = "  ";
const MIN_COLUMN: usize = 16;

pub(super) fn usage(cl: &CommandLine, program: &str) -> String {
    let mut out = String::new();

    if let Some(prefix) = &cl.help_text_prefix {
        let _ = writeln!(out, "{}", prefix);
        out.push('\n');
    }

    let mut synopsis = format!("Usage: {} [OPTIONS]", program);
    if !cl.commands.is_empty() {
        synopsis.push_str(" [COMMAND [COMMAND-OPTIONS]]");
    }
    synopsis.push_str(" [FILE...]");
    let _ = writeln!(out, "{}", synopsis);

    if cl.options.iter().any(CommandLineOption::is_declared) {
        out.push('\n');
        let _ = writeln!(out, "Options:");
        write_options(&mut out, &cl.options, cl, INDENT);
    }

    if !cl.commands.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "Commands:");
        let width = cl
            .commands
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max(MIN_COLUMN);
        for command in &cl.commands {
            write_row(&mut out, INDENT, &command.name, width, &command.description);
            if !command.options.is_empty() {
                write_options(&mut out, &command.options, cl, "      ");
            }
        }
    }

    if let Some(suffix) = &cl.help_text_suffix {
        out.push('\n');
        let _ = writeln!(out, "{}", suffix);
    }

    out
}

fn write_options(
    out: &mut String,
    options: &CommandLineOptionCollection,
    cl: &CommandLine,
    indent: &str,
) {
    let labels: Vec<(String, &CommandLineOption)> = options
        .iter()
        .filter(|o| o.is_declared())
        .map(|o| (option_label(o, cl), o))
        .collect();
    let width = labels
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0)
        .max(MIN_COLUMN);

    for (label, option) in &labels {
        let mut description = option.description.clone();
        if !option.optional {
            description.push_str(" (required)");
        }
        write_row(out, indent, label, width, description.trim_start());
    }
}

fn write_row(out: &mut String, indent: &str, label: &str, width: usize, description: &str) {
    if description.is_empty() {
        let _ = writeln!(out, "{}{}", indent, label);
    } else {
        let _ = writeln!(out, "{}{:<width$}  {}", indent, label, description, width = width);
    }
}

/// `-A, --activation-type <VALUE>` style label.
fn option_label(option: &CommandLineOption, cl: &CommandLine) -> String {
    let mut label = match option.abbreviation {
        Some(c) => format!("{}{}, ", cl.short_option_prefix, c),
        None => " ".repeat(cl.short_option_prefix.len() + 3),
    };
    label.push_str(&cl.long_option_prefix);
    label.push_str(&option.name);
    match option.value_type {
        CommandLineOptionValueType::None => {}
        CommandLineOptionValueType::Single => label.push_str(" <VALUE>"),
        CommandLineOptionValueType::Multiple => label.push_str(" <VALUE>..."),
    }
    label
}

#[cfg(test)]
mod tests {
    use crate::command_line::{CommandLine, CommandLineCommand, CommandLineOption};

    #[test]
    fn test_usage_lists_default_options() {
        let cl = CommandLine::default();
        let text = cl.usage("editor");

        assert!(text.starts_with("Usage: editor [OPTIONS] [FILE...]"));
        assert!(text.contains("-A, --activation-type <VALUE>"));
        assert!(text.contains("The type of activation for this app"));
        assert!(text.contains("    --help"));
        assert!(!text.contains("Commands:"));
    }

    #[test]
    fn test_usage_includes_commands_prefix_and_suffix() {
        let mut cl = CommandLine::default();
        cl.help_text_prefix = Some("Editor 1.0".to_string());
        cl.help_text_suffix = Some("Report bugs to the tracker.".to_string());
        cl.options_mut().add(
            CommandLineOption::multiple("include")
                .with_abbreviation('I')
                .required(),
        );
        cl.add_command(
            CommandLineCommand::new("export")
                .with_description("Export the document")
                .with_option(CommandLineOption::single("format")),
        );

        let text = cl.usage("editor");
        assert!(text.starts_with("Editor 1.0\n\nUsage: editor [OPTIONS] [COMMAND [COMMAND-OPTIONS]]"));
        assert!(text.contains("-I, --include <VALUE>..."));
        assert!(text.contains("(required)"));
        assert!(text.contains("Commands:"));
        assert!(text.contains("export"));
        assert!(text.contains("Export the document"));
        assert!(text.contains("--format <VALUE>"));
        assert!(text.trim_end().ends_with("Report bugs to the tracker."));
    }

    #[test]
    fn test_unknown_options_not_listed() {
        let mut cl = CommandLine::new(["--mystery"]);
        cl.parse();
        assert!(!cl.usage("editor").contains("mystery"));
    }
}
