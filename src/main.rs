//! appframe demo - a small note-taking shell built on the framework
//!
//! This is the binary entry point. It wires a few commands, a context and a
//! settings file together and runs one activation.
//!
//! ```bash
//! appframe --verbose notes.txt todo.txt
//! appframe -A Protocol
//! appframe --help
//! ```

use std::cell::Cell;
use std::rc::Rc;

use appframe::app::{
    CommandLineCommand, CommandLineOption, InstallationStatus, Setting, SettingsGroup,
    SettingsProvider, TomlSettingsProvider,
};
use appframe::core::logging;
use appframe::prelude::*;
use uuid::Uuid;

const APP_NAME: &str = "appframe-demo";
const AUTOSAVE_SETTING: Uuid = Uuid::from_u128(0x6170_7066_0001);
const SIGNATURE_SETTING: Uuid = Uuid::from_u128(0x6170_7066_0002);

/// Hooks for the demo: opens every file named on the command line in its own
/// context and refuses to quit while a context has unsaved edits.
#[derive(Debug, Default)]
struct NotesHooks {
    dirty: Rc<Cell<bool>>,
}

impl ApplicationHooks for NotesHooks {
    fn initialize(&self, app: &Application) -> Result<()> {
        let dirty = self.dirty.clone();
        app.add_command(
            Command::new("FileSave", "_Save").on_executed(command_handler(move |e| {
                info!("Saved ({:?})", e.source);
                dirty.set(false);
            })),
        );
        app.add_command(Command::new("EditAppend", "_Append"));
        Ok(())
    }

    fn on_activation(&self, app: &Application, phase: ActivationPhase, e: &mut ActivationEventArgs) {
        if phase != ActivationPhase::On {
            return;
        }
        app.log(format!(
            "Activated as {} (first run: {})",
            e.activation_type, e.first_run
        ));

        for file_name in &e.file_names {
            let mut ctx = Context::new(file_name.clone());
            let dirty = self.dirty.clone();
            let name = file_name.clone();
            ctx.attach_command_event_handler(
                "EditAppend",
                command_handler(move |args| {
                    let text = args.parameters.get_as::<String>("text").unwrap_or_default();
                    println!("{}: + {}", name, text);
                    dirty.set(true);
                }),
            );
            app.add_context(ctx);
        }
    }

    fn on_stopping(&self, app: &Application, e: &mut CancelEventArgs) {
        if self.dirty.get() {
            warn!("Unsaved changes, saving before quit");
            app.execute("FileSave");
        }
        e.cancel = self.dirty.get();
    }

    fn installation_status(&self, _app: &Application) -> InstallationStatus {
        InstallationStatus::Installed
    }
}

/// Prints context changes to stdout.
#[derive(Debug)]
struct ConsoleObserver;

impl ApplicationObserver for ConsoleObserver {
    fn name(&self) -> &str {
        "console"
    }

    fn on_event(&self, _app: &Application, event: &ApplicationEvent) -> Result<()> {
        match event {
            ApplicationEvent::ContextAdded { name, .. } => println!("opened {}", name),
            ApplicationEvent::ContextRemoved { name, .. } => println!("closed {}", name),
            other => debug!("event: {}", other.event_type()),
        }
        Ok(())
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    logging::init(APP_NAME)?;

    let mut app = Application::new()
        .with_short_name(APP_NAME)
        .with_title("appframe demo")
        .with_hooks(NotesHooks::default());

    {
        let command_line = app.command_line_mut();
        command_line.help_text_prefix = Some("appframe demo - append lines to notes".to_string());
        command_line
            .options_mut()
            .add(CommandLineOption::flag("verbose").with_abbreviation('v'));
        command_line.add_command(
            CommandLineCommand::new("append")
                .with_description("Append a line to each file")
                .with_option(
                    CommandLineOption::single("text")
                        .with_abbreviation('t')
                        .with_description("Line to append"),
                ),
        );
    }

    if let Some(config_dir) = app.config_dir() {
        let mut provider = TomlSettingsProvider::in_dir(&config_dir);
        provider.add_group(SettingsGroup::new(
            "Editor:General",
            [
                Setting::boolean("autosave", "Save automatically", false)
                    .with_id(AUTOSAVE_SETTING),
                Setting::text("signature", "Signature", "").with_id(SIGNATURE_SETTING),
            ],
        ));
        app.add_settings_provider(Box::new(provider));
    }
    app.add_observer(Rc::new(ConsoleObserver));

    let exit_code = app.start()?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    let text = app.command_line().value("text").map(str::to_string);
    if let Some(text) = text {
        app.execute_command("EditAppend", NamedParameters::new().with("text", text));
    }
    if app.command_line().is_present("verbose") {
        for ctx in app.contexts().iter() {
            println!("context {}", ctx);
        }
    }

    let autosave = app
        .find_setting("autosave")
        .map(|s| s.get_as(false, None))
        .unwrap_or(false);
    if autosave {
        app.execute("FileSave");
    }

    app.clear_contexts();
    let outcome = app.stop(0);
    info!("Shutdown outcome: {:?}", outcome);
    std::process::exit(app.exit_code());
}
