//! Interactive prompt as a string-keyed command table.
//!
//! Each entry maps a command word to a plain function over the [`Augment`]
//! facade and a [`Console`]. The console owns the reader and writer, so the
//! whole prompt runs against in-memory buffers in tests.

use crate::api::Augment;
use crate::cancel::CancellationToken;
use crate::dropbox::ProcessingStrategy;
use crate::error::Result;
use crate::logging::scoped;
use crate::model::Severity;
use crate::probe::DEFAULT_PROBE_KIND;
use std::io::{BufRead, Write};
use tracing::{error, info};

pub const PROMPT: &str = "augment > ";
pub const DEFAULT_PROBE_TARGET: &str = "localhost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console<'a> {
    input: &'a mut dyn BufRead,
    output: &'a mut dyn Write,
    cancel: CancellationToken,
}

impl<'a> Console<'a> {
    pub fn new(
        input: &'a mut dyn BufRead,
        output: &'a mut dyn Write,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            input,
            output,
            cancel,
        }
    }

    /// Print `label` and read one line. `None` on end of input.
    pub fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn say(&mut self, line: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", line.as_ref())?;
        Ok(())
    }
}

pub type Handler<S> = for<'a, 'b, 'c> fn(&'a Augment<S>, &'b mut Console<'c>) -> Result<Flow>;

struct Entry<S: ProcessingStrategy> {
    name: &'static str,
    help: &'static str,
    handler: Handler<S>,
}

pub struct CommandTable<S: ProcessingStrategy> {
    entries: Vec<Entry<S>>,
}

impl<S: ProcessingStrategy> CommandTable<S> {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The commands offered by the interactive prompt.
    pub fn standard() -> Self {
        Self::empty()
            .register("health", "Check nest health", health::<S>)
            .register("monitor", "Start monitoring dropbox", monitor::<S>)
            .register("flare", "Deploy a flare", flare::<S>)
            .register("probe", "Launch a test probe", probe::<S>)
            .register("listen", "Start communication listener", listen::<S>)
            .register("status", "Show current status", status::<S>)
            .register("help", "List available commands", help::<S>)
            .register("quit", "Exit augment", quit::<S>)
    }

    /// Add or replace the handler for `name`.
    pub fn register(mut self, name: &'static str, help: &'static str, handler: Handler<S>) -> Self {
        self.entries.retain(|e| e.name != name);
        self.entries.push(Entry { name, help, handler });
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    /// Run the command named by `input` (trimmed, case-insensitive).
    pub fn dispatch(
        &self,
        augment: &Augment<S>,
        console: &mut Console<'_>,
        input: &str,
    ) -> Result<Flow> {
        let command = input.trim().to_lowercase();
        match self.entries.iter().find(|e| e.name == command) {
            Some(entry) => (entry.handler)(augment, console),
            None => {
                console.say(format!("Unknown command: {}", command))?;
                console.say("Type 'help' for available commands")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Read-dispatch loop. Ends on `quit`, end of input, or an interrupt
    /// that arrives while waiting at the prompt.
    pub fn run(&self, augment: &Augment<S>, console: &mut Console<'_>) -> Result<()> {
        scoped(augment.log(), || info!("Starting interactive mode..."));
        console.say("")?;
        console.say("=".repeat(50))?;
        console.say("   NEST AUGMENT - Interactive Mode")?;
        console.say("=".repeat(50))?;
        console.say("")?;
        self.print_help(console)?;
        console.say("")?;

        loop {
            if console.cancel.is_cancelled() {
                break;
            }
            let Some(line) = console.prompt(PROMPT)? else {
                break;
            };
            // Ctrl-C while blocked in read_line: drop the line.
            if console.cancel.is_cancelled() {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            match self.dispatch(augment, console, &line) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    scoped(augment.log(), || error!("Error: {}", e));
                    console.say(format!("Error: {}", e))?;
                }
            }
        }

        scoped(augment.log(), || info!("Augment shutting down..."));
        Ok(())
    }

    fn print_help(&self, console: &mut Console<'_>) -> Result<()> {
        console.say("Available commands:")?;
        for entry in &self.entries {
            console.say(format!("  {:<10} - {}", entry.name, entry.help))?;
        }
        Ok(())
    }
}

fn health<S: ProcessingStrategy>(augment: &Augment<S>, console: &mut Console<'_>) -> Result<Flow> {
    let snapshot = augment.health();
    console.say(serde_json::to_string_pretty(&snapshot)?)?;
    Ok(Flow::Continue)
}

fn monitor<S: ProcessingStrategy>(augment: &Augment<S>, console: &mut Console<'_>) -> Result<Flow> {
    augment.monitor(&console.cancel);
    console.cancel.reset();
    Ok(Flow::Continue)
}

fn flare<S: ProcessingStrategy>(augment: &Augment<S>, console: &mut Console<'_>) -> Result<Flow> {
    let Some(message) = console.prompt("Flare message: ")? else {
        return Ok(Flow::Continue);
    };
    if console.cancel.is_cancelled() {
        return Ok(Flow::Quit);
    }
    let flare = augment.flare(message, Severity::Info)?;
    console.say(format!("Flare deployed [{}]: {}", flare.severity, flare.message))?;
    Ok(Flow::Continue)
}

fn probe<S: ProcessingStrategy>(augment: &Augment<S>, console: &mut Console<'_>) -> Result<Flow> {
    let Some(target) = console.prompt("Target (hostname or IP): ")? else {
        return Ok(Flow::Continue);
    };
    if console.cancel.is_cancelled() {
        return Ok(Flow::Quit);
    }
    let target = match target.trim() {
        "" => DEFAULT_PROBE_TARGET,
        t => t,
    };
    let report = augment.probe(target, DEFAULT_PROBE_KIND)?;
    console.say(serde_json::to_string_pretty(&report)?)?;
    Ok(Flow::Continue)
}

fn listen<S: ProcessingStrategy>(augment: &Augment<S>, console: &mut Console<'_>) -> Result<Flow> {
    let result = augment.listen(&console.cancel);
    console.cancel.reset();
    result.map(|_| Flow::Continue)
}

fn status<S: ProcessingStrategy>(augment: &Augment<S>, console: &mut Console<'_>) -> Result<Flow> {
    console.say("")?;
    console.say(augment.status().to_string().trim_end())?;
    console.say("")?;
    Ok(Flow::Continue)
}

fn help<S: ProcessingStrategy>(_augment: &Augment<S>, console: &mut Console<'_>) -> Result<Flow> {
    let names = CommandTable::<S>::standard().names().join("|");
    console.say(format!("Commands: {}", names))?;
    Ok(Flow::Continue)
}

fn quit<S: ProcessingStrategy>(_augment: &Augment<S>, _console: &mut Console<'_>) -> Result<Flow> {
    Ok(Flow::Quit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AugmentConfig;
    use crate::dropbox::PassThrough;
    use crate::layout::PathLayout;
    use crate::logging::capture;
    use std::fs;
    use std::io::{self, Cursor, Read};
    use tempfile::TempDir;

    /// Reader that trips `cancel` the first time a line is requested after
    /// `after_lines` lines, like Ctrl-C landing while `read_line` is blocked.
    struct InterruptedReader {
        inner: Cursor<Vec<u8>>,
        cancel: CancellationToken,
        after_lines: usize,
    }

    impl InterruptedReader {
        fn new(script: &str, cancel: CancellationToken, after_lines: usize) -> Self {
            Self {
                inner: Cursor::new(script.as_bytes().to_vec()),
                cancel,
                after_lines,
            }
        }
    }

    impl Read for InterruptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl BufRead for InterruptedReader {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            let consumed = &self.inner.get_ref()[..self.inner.position() as usize];
            if consumed.iter().filter(|b| **b == b'\n').count() >= self.after_lines {
                self.cancel.cancel();
            }
            self.inner.fill_buf()
        }

        fn consume(&mut self, amt: usize) {
            self.inner.consume(amt)
        }
    }

    fn interrupted_session(augment: &Augment, script: &str, after_lines: usize) -> String {
        let cancel = CancellationToken::new();
        let mut input = InterruptedReader::new(script, cancel.clone(), after_lines);
        let mut output = Vec::new();
        {
            let mut console = Console::new(&mut input, &mut output, cancel);
            CommandTable::standard().run(augment, &mut console).unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    fn augment(temp_dir: &TempDir) -> Augment {
        Augment::with_strategy(
            PathLayout::new(temp_dir.path()),
            AugmentConfig::default(),
            PassThrough::default(),
            capture().0,
        )
    }

    /// Feed `script` to the prompt and return everything it printed.
    fn session(augment: &Augment, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        {
            let mut console = Console::new(&mut input, &mut output, CancellationToken::new());
            CommandTable::standard().run(augment, &mut console).unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn banner_lists_commands_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let out = session(&augment(&temp_dir), "quit\n");
        let health = out.find("health").unwrap();
        let quit = out.find("quit").unwrap();
        assert!(out.contains("Interactive Mode"));
        assert!(health < quit);
    }

    #[test]
    fn health_prints_snapshot_json() {
        let temp_dir = TempDir::new().unwrap();
        let out = session(&augment(&temp_dir), "health\nquit\n");
        assert!(out.contains("\"files_pending\": 0"));
        assert!(out.contains("\"status\": \"healthy\""));
    }

    #[test]
    fn flare_prompts_for_message() {
        let temp_dir = TempDir::new().unwrap();
        let augment = augment(&temp_dir);
        let out = session(&augment, "flare\nbackup finished\nquit\n");

        assert!(out.contains("Flare message: "));
        assert!(out.contains("Flare deployed [INFO]: backup finished"));
        assert_eq!(augment.flares().unwrap()[0].message, "backup finished");
    }

    #[test]
    fn probe_defaults_to_localhost() {
        let temp_dir = TempDir::new().unwrap();
        let out = session(&augment(&temp_dir), "probe\n\nquit\n");
        assert!(out.contains("\"target\": \"localhost\""));
        assert!(out.contains("\"type\": \"ping\""));
    }

    #[test]
    fn status_shows_version_and_features() {
        let temp_dir = TempDir::new().unwrap();
        let out = session(&augment(&temp_dir), "STATUS\nquit\n");
        assert!(out.contains("Version: 1.0.0"));
        assert!(
            out.contains("Features: monitoring, auto_process, flare_deployment, probe_control")
        );
    }

    #[test]
    fn unknown_command_keeps_prompt_alive() {
        let temp_dir = TempDir::new().unwrap();
        let out = session(&augment(&temp_dir), "dance\nstatus\n");
        assert!(out.contains("Unknown command: dance"));
        assert!(out.contains("Uptime: Running"));
    }

    #[test]
    fn end_of_input_quits() {
        let temp_dir = TempDir::new().unwrap();
        let out = session(&augment(&temp_dir), "");
        assert!(out.ends_with(PROMPT));
    }

    #[test]
    fn handler_errors_are_reported_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let augment = augment(&temp_dir);
        // Flares cannot be appended to a directory.
        fs::create_dir_all(augment.layout().flare_log_path()).unwrap();

        let out = session(&augment, "flare\nlost\nstatus\nquit\n");
        assert!(out.contains("Error: Could not append flare"));
        assert!(out.contains("Uptime: Running"));
    }

    #[test]
    fn monitor_resets_token_after_interrupt() {
        let temp_dir = TempDir::new().unwrap();
        let augment = augment(&temp_dir);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let mut console = Console::new(&mut input, &mut output, cancel.clone());
        let flow = CommandTable::standard()
            .dispatch(&augment, &mut console, "monitor")
            .unwrap();

        assert_eq!(flow, Flow::Continue);
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn interrupt_during_read_skips_the_line() {
        let temp_dir = TempDir::new().unwrap();
        let augment = augment(&temp_dir);

        let out = interrupted_session(&augment, "flare\nafter ctrl-c\nstatus\n", 0);

        assert!(!out.contains("Flare message: "));
        assert!(!out.contains("Uptime: Running"));
        assert!(augment.flares().unwrap().is_empty());
    }

    #[test]
    fn interrupt_during_argument_read_skips_the_command() {
        let temp_dir = TempDir::new().unwrap();
        let augment = augment(&temp_dir);

        let out = interrupted_session(&augment, "flare\nafter ctrl-c\nstatus\n", 1);

        assert!(out.contains("Flare message: "));
        assert!(!out.contains("Uptime: Running"));
        assert!(augment.flares().unwrap().is_empty());
    }

    #[test]
    fn interrupt_before_monitor_is_not_swallowed() {
        let temp_dir = TempDir::new().unwrap();
        let out = interrupted_session(&augment(&temp_dir), "monitor\nstatus\n", 0);
        assert!(!out.contains("Uptime: Running"));
    }

    #[test]
    fn custom_handlers_can_be_registered() {
        fn ping<S: ProcessingStrategy>(_: &Augment<S>, console: &mut Console<'_>) -> Result<Flow> {
            console.say("pong")?;
            Ok(Flow::Continue)
        }

        let temp_dir = TempDir::new().unwrap();
        let augment = augment(&temp_dir);
        let table =
            CommandTable::standard().register("ping", "Reply with pong", ping::<PassThrough>);

        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let mut console = Console::new(&mut input, &mut output, CancellationToken::new());
        table.dispatch(&augment, &mut console, "Ping").unwrap();
        drop(console);

        assert_eq!(String::from_utf8(output).unwrap(), "pong\n");
        assert!(table.names().contains(&"ping"));
    }
}
