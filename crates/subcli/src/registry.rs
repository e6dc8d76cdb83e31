//! Command registration and dispatch.

use std::fmt;
use std::io::{self, Write};
use std::process::ExitCode;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::command::{Action, Command, CommandOptions, Handler, Middleware, wrap};
use crate::config::Config;
use crate::env::{EnvSource, ProcessEnv};
use crate::error::{Error, Result, SetupError};
use crate::flag::{Flag, FlagSet};
use crate::parse::Parser;
use crate::suggest;
use crate::usage::{Renderer, TopicMap};

const HELP_COMMAND: &str = "help";
const VERSION_COMMAND: &str = "version";

/// Runs after flags are parsed and before a user command's handler. Receives
/// the command name and its positional arguments.
pub type PostParse = Rc<dyn Fn(&str, &[String]) -> Result<()>>;

/// Turns the outcome of a failed dispatch into a process exit status.
pub type Resolver = Box<dyn Fn(Error) -> ExitCode>;

/// Everything a [`Registry`] can be configured with.
pub struct Options {
    pub config: Config,
    /// Source of usage text for `help` and usage errors.
    pub renderer: Box<dyn Renderer>,
    /// Environment fallbacks for flags.
    pub env: Box<dyn EnvSource>,
    pub stdout: Box<dyn Write>,
    pub stderr: Box<dyn Write>,
    /// Wraps every command registered afterwards, outside the command's own
    /// middleware.
    pub middleware: Vec<Middleware>,
    /// Invoked when no command is given. Without one the root usage is
    /// written to stderr and dispatch fails.
    pub default_handler: Option<Handler>,
    /// Skipped for `help` and `version`.
    pub post_parse: Option<PostParse>,
    /// Used by [`Registry::resolve`]. Without one the error is printed
    /// (unless already reported) and the process exits non-zero.
    pub resolver: Option<Resolver>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: Config::default(),
            renderer: Box::new(TopicMap::default()),
            env: Box::new(ProcessEnv),
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
            middleware: Vec::new(),
            default_handler: None,
            post_parse: None,
            resolver: None,
        }
    }
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Global flags plus the command table of one application.
pub struct Registry {
    name: String,
    config: Config,
    flags: FlagSet,
    commands: Vec<Command>,
    table: IndexMap<String, usize>,
    middleware: Vec<Middleware>,
    renderer: Box<dyn Renderer>,
    env: Box<dyn EnvSource>,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
    default_handler: Option<Handler>,
    post_parse: Option<PostParse>,
    resolver: Option<Resolver>,
}

impl Registry {
    /// Create a registry with the built-in `help` command, plus `version`
    /// when [`Config::version`] is set.
    pub fn new(name: &str, flags: Vec<Flag>, options: Options) -> Result<Self, SetupError> {
        let Options {
            config,
            renderer,
            env,
            stdout,
            stderr,
            middleware,
            default_handler,
            post_parse,
            resolver,
        } = options;

        let flags = FlagSet::new(flags)?.with_env_prefix(&config.env_prefix);
        let mut registry = Self {
            name: name.to_string(),
            config,
            flags,
            commands: Vec::new(),
            table: IndexMap::new(),
            middleware,
            renderer,
            env,
            stdout,
            stderr,
            default_handler,
            post_parse,
            resolver,
        };

        registry.insert(Command::builtin(HELP_COMMAND, Action::Help))?;
        if registry.config.version.is_some() {
            registry.insert(Command::builtin(VERSION_COMMAND, Action::Version))?;
        }
        Ok(registry)
    }

    /// Register a command.
    ///
    /// The name and alias are lower-cased and must not collide with any
    /// registered name or alias. Registry middleware is applied outside the
    /// command's own middleware.
    pub fn add<F>(
        &mut self,
        name: &str,
        handler: F,
        flags: Vec<Flag>,
        options: CommandOptions,
    ) -> Result<&mut Self, SetupError>
    where
        F: Fn(&[String]) -> Result<()> + 'static,
    {
        let name = name.trim().to_lowercase();
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(SetupError::InvalidName(name));
        }
        let alias = options
            .alias
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty() && *a != name);
        if let Some(alias) = alias
            .as_ref()
            .filter(|a| !a.starts_with(|c: char| c.is_ascii_alphabetic()))
        {
            return Err(SetupError::InvalidName(alias.clone()));
        }

        let flags = FlagSet::new(flags)?.with_env_prefix(&self.config.env_prefix);
        let chain: Vec<&Middleware> = self
            .middleware
            .iter()
            .chain(options.middleware.iter())
            .collect();
        let handler = wrap(Rc::new(handler), chain);

        self.insert(Command {
            name,
            alias,
            proxy: options.proxy,
            flags,
            action: Action::Run(handler),
        })?;
        Ok(self)
    }

    fn insert(&mut self, command: Command) -> Result<(), SetupError> {
        for key in std::iter::once(&command.name).chain(command.alias.as_ref()) {
            if self.table.contains_key(key) {
                return Err(SetupError::DuplicateCommand(key.clone()));
            }
        }

        tracing::trace!(command = %command.name, alias = ?command.alias, "registered command");
        let index = self.commands.len();
        self.table.insert(command.name.clone(), index);
        if let Some(alias) = &command.alias {
            self.table.insert(alias.clone(), index);
        }
        self.commands.push(command);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Global flags.
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Global flag by name or alias.
    pub fn flag(&self, key: &str) -> Option<&Flag> {
        self.flags.get(key)
    }

    /// Command by name or alias.
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.table.get(name).map(|&i| &self.commands[i])
    }

    /// Commands in registration order, built-ins first.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Parse `args` (program name first) and dispatch to one command.
    pub fn run(&mut self, args: &[String]) -> Result<()> {
        let argv = args.get(1..).unwrap_or_default();
        let parser = Parser::new(&*self.env).strict(self.config.strict);
        let positional = parser.parse(&mut self.flags, argv)?;

        let Some((requested, rest)) = positional.split_first() else {
            tracing::debug!("no command given");
            return self.run_default();
        };
        let Some(&index) = self.table.get(requested.as_str()) else {
            return self.command_not_found(requested);
        };

        let command = &mut self.commands[index];
        tracing::debug!(command = %command.name, requested = %requested, "dispatching");
        let args = if command.proxy {
            rest.to_vec()
        } else {
            parser.parse(&mut command.flags, rest)?
        };
        let name = command.name.clone();
        let action = command.action.clone();

        match action {
            Action::Help => self.help(&args),
            Action::Version => self.version(),
            Action::Run(handler) => {
                if let Some(hook) = &self.post_parse {
                    hook(&name, &args)?;
                }
                self.finish(&name, handler(&args))
            }
        }
    }

    /// Write the usage for `name` to stdout. An empty name is the root topic.
    pub fn usage(&mut self, name: &str) -> Result<()> {
        self.write_usage(Stream::Stdout, name)
    }

    /// Map the result of [`Registry::run`] to an exit status.
    pub fn resolve(&mut self, result: Result<()>) -> ExitCode {
        let err = match result {
            Ok(()) => return ExitCode::SUCCESS,
            Err(err) => err,
        };
        if let Some(resolver) = &self.resolver {
            return resolver(err);
        }
        if !err.is_reported() {
            let _ = writeln!(self.stderr, "{}: {err}", self.name);
            let _ = self.stderr.flush();
        }
        ExitCode::from(err.exit_status())
    }

    /// Run with the process arguments and resolve the outcome.
    pub fn main(&mut self) -> ExitCode {
        let args: Vec<String> = std::env::args_os()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let result = self.run(&args);
        self.resolve(result)
    }

    fn run_default(&mut self) -> Result<()> {
        match self.default_handler.clone() {
            Some(handler) => self.finish("", handler(&[])),
            None => {
                self.write_usage(Stream::Stderr, "")?;
                Err(Error::ExitFailure)
            }
        }
    }

    /// A handler asking for usage gets its topic printed, then fails.
    fn finish(&mut self, name: &str, result: Result<()>) -> Result<()> {
        match result {
            Err(Error::Usage) => {
                self.write_usage(Stream::Stderr, name)?;
                Err(Error::ExitFailure)
            }
            other => other,
        }
    }

    fn command_not_found(&mut self, requested: &str) -> Result<()> {
        let candidates = self
            .table
            .iter()
            .filter(|&(_, &i)| !self.commands[i].is_builtin())
            .map(|(key, _)| key.as_str());
        let suggestions = suggest::similar(requested, candidates);
        tracing::debug!(command = requested, ?suggestions, "unknown command");

        let app = &self.name;
        let out = &mut self.stderr;
        writeln!(out, "{app}: unknown command '{requested}'")?;
        writeln!(out, "Run '{app} help' for usage.")?;
        if !suggestions.is_empty() {
            writeln!(out, "\nDid you mean?")?;
            for name in &suggestions {
                writeln!(out, "    {name}")?;
            }
        }
        out.flush()?;

        Err(Error::CommandNotFound {
            name: requested.to_string(),
            suggestions,
        })
    }

    fn help(&mut self, args: &[String]) -> Result<()> {
        match args {
            [] => self.write_usage(Stream::Stdout, ""),
            [topic] => self.write_usage(Stream::Stdout, topic),
            _ => {
                let out = &mut self.stderr;
                writeln!(out, "usage: {} help [command]", self.name)?;
                writeln!(out, "Too many arguments given.")?;
                out.flush()?;
                Err(Error::ExitFailure)
            }
        }
    }

    fn version(&mut self) -> Result<()> {
        let version = self.config.version.as_deref().unwrap_or_default();
        writeln!(self.stdout, "{version}")?;
        self.stdout.flush()?;
        Ok(())
    }

    /// Renderer key for a help topic.
    ///
    /// The root topic is the scope itself; registered commands (by name or
    /// alias) live under the scope; anything else passes through untouched.
    fn topic_key(&self, name: &str) -> String {
        let scope = self.config.scope.as_str();
        if name.is_empty() {
            return scope.to_string();
        }
        match self.command(name) {
            Some(command) if scope.is_empty() => command.name.clone(),
            Some(command) => format!("{scope}/{}", command.name),
            None => name.to_string(),
        }
    }

    fn write_usage(&mut self, stream: Stream, name: &str) -> Result<()> {
        let key = self.topic_key(name);
        let bytes = match self.renderer.render(&key) {
            Ok(bytes) => bytes,
            Err(Error::UsageNotFound(_)) => {
                tracing::debug!(topic = %key, "usage topic not found");
                let out = &mut self.stderr;
                if name.is_empty() || name == self.config.scope {
                    writeln!(out, "Unknown help topic.")?;
                } else {
                    writeln!(out, "Unknown help topic '{name}'.")?;
                }
                writeln!(out, "Run '{} help' for usage information.", self.name)?;
                out.flush()?;
                return Err(Error::ExitFailure);
            }
            Err(err) => return Err(err),
        };

        let out = match stream {
            Stream::Stdout => &mut self.stdout,
            Stream::Stderr => &mut self.stderr,
        };
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("flags", &self.flags)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}
