//! Argument parsing for [`CommandLine`]
//!
//! Rules, in order, for each token:
//! 1. After a bare long prefix (`--`) or after options have ended, every
//!    token is a file name.
//! 2. `--name` / `--name=value` is a long option.
//! 3. `-abc` is a run of short options; the first one that takes a value
//!    consumes the rest of the token (`-ofile`) or the next token.
//! 4. The first other token is matched against the sub-commands. A match
//!    switches to that sub-command's options; otherwise options end and the
//!    token is the first file name.

use tracing::{debug, trace};

use super::option::{CommandLineOption, CommandLineOptionCollection};
use super::CommandLine;

pub(super) fn parse(cl: &mut CommandLine) {
    cl.options.reset();
    for command in &mut cl.commands {
        command.options.reset();
    }
    cl.file_names.clear();
    cl.command = None;

    let args = cl.arguments.clone();
    let long = cl.long_option_prefix.clone();
    let short = cl.short_option_prefix.clone();

    let mut options_done = false;
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        i += 1;

        if options_done {
            cl.file_names.push(arg.clone());
            continue;
        }

        if !long.is_empty() && *arg == long {
            trace!("End of options marker");
            options_done = true;
            continue;
        }

        if let Some(rest) = strip_option_prefix(arg, &long) {
            let (name, inline) = match rest.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (rest, None),
            };
            let options = active_options(cl);
            match options.get_mut(name) {
                Some(option) if option.takes_value() => {
                    match inline.or_else(|| next_value(&args, &mut i)) {
                        Some(value) => option.push_value(value),
                        None => {
                            debug!("Option --{} given without a value", name);
                            option.mark_present();
                        }
                    }
                }
                Some(option) => option.mark_present(),
                None => {
                    debug!("Unknown option --{}", name);
                    options.add(CommandLineOption::unknown(name, None));
                }
            }
            continue;
        }

        if let Some(rest) = strip_option_prefix(arg, &short) {
            parse_short_run(cl, rest, &args, &mut i);
            continue;
        }

        if cl.command.is_none() {
            if let Some(index) = cl.commands.iter().position(|c| c.name == *arg) {
                debug!("Selected sub-command '{}'", arg);
                cl.command = Some(index);
                continue;
            }
        }

        options_done = true;
        cl.file_names.push(arg.clone());
    }
}

/// `arg` without `prefix`, if it has the prefix and something after it.
fn strip_option_prefix<'a>(arg: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    arg.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}

fn next_value(args: &[String], i: &mut usize) -> Option<String> {
    let value = args.get(*i)?.clone();
    *i += 1;
    Some(value)
}

fn active_options(cl: &mut CommandLine) -> &mut CommandLineOptionCollection {
    match cl.command {
        Some(index) if index < cl.commands.len() => &mut cl.commands[index].options,
        _ => &mut cl.options,
    }
}

fn parse_short_run(cl: &mut CommandLine, run: &str, args: &[String], i: &mut usize) {
    let options = active_options(cl);
    for (offset, c) in run.char_indices() {
        match options.by_abbreviation_mut(c) {
            Some(option) if option.takes_value() => {
                let attached = &run[offset + c.len_utf8()..];
                let value = if attached.is_empty() {
                    next_value(args, i)
                } else {
                    Some(attached.to_string())
                };
                match value {
                    Some(value) => option.push_value(value),
                    None => {
                        debug!("Option -{} given without a value", c);
                        option.mark_present();
                    }
                }
                return;
            }
            Some(option) => option.mark_present(),
            None => {
                debug!("Unknown option -{}", c);
                options.add(CommandLineOption::unknown(c.to_string(), Some(c)));
            }
        }
    }
}
