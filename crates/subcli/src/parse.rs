//! Flag tokenizer.
//!
//! Grammar: `-name`, `--name`, `-name=value`, `-name value`. One or two
//! hyphens are interchangeable. A bare `-` or `--`, or the first token that
//! does not start with `-`, ends flag scanning; it and everything after it
//! are returned as positional arguments.

use crate::env::EnvSource;
use crate::error::{Error, Result};
use crate::flag::FlagSet;

/// Parses one scope of flags out of an argument list.
#[derive(Clone, Copy)]
pub struct Parser<'e> {
    env: &'e dyn EnvSource,
    strict: bool,
}

impl<'e> Parser<'e> {
    /// A strict parser reading fallbacks from `env`.
    pub fn new(env: &'e dyn EnvSource) -> Self {
        Self { env, strict: true }
    }

    /// Whether unknown flags are errors (`true`) or skipped (`false`).
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Apply environment values, then scan `args`, returning what is left
    /// once flags stop.
    pub fn parse(&self, flags: &mut FlagSet, args: &[String]) -> Result<Vec<String>> {
        self.seed_env(flags);

        let mut pending: Option<String> = None;
        let mut i = 0usize;
        while i < args.len() {
            let arg = args[i].as_str();

            if let Some(key) = pending.take() {
                let Some(flag) = flags.get_mut(&key) else {
                    self.undefined(key)?;
                    // Lenient: look at the same token again.
                    continue;
                };
                if !flag.has_arg() {
                    tracing::trace!(flag = %key, "switch");
                    flag.set("true");
                    continue;
                }
                if arg.starts_with('-') {
                    return Err(Error::RequiresArg(key));
                }
                tracing::trace!(flag = %key, value = arg, "flag value");
                flag.set(arg);
                i += 1;
                continue;
            }

            if arg == "-" || arg == "--" || !arg.starts_with('-') {
                return Ok(args[i..].to_vec());
            }

            let body = arg
                .strip_prefix("--")
                .or_else(|| arg.strip_prefix('-'))
                .unwrap_or(arg);
            if !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
                return Err(Error::FlagSyntax(arg.to_string()));
            }

            match body.split_once('=') {
                Some((key, value)) => match flags.get_mut(key) {
                    Some(flag) => {
                        tracing::trace!(flag = key, value, "flag value");
                        flag.set(value);
                    }
                    None => self.undefined(key.to_string())?,
                },
                None => pending = Some(body.to_string()),
            }
            i += 1;
        }

        if let Some(key) = pending {
            match flags.get_mut(&key) {
                Some(flag) if flag.has_arg() => return Err(Error::RequiresArg(key)),
                Some(flag) => {
                    tracing::trace!(flag = %key, "switch");
                    flag.set("true");
                }
                None => self.undefined(key)?,
            }
        }

        Ok(Vec::new())
    }

    fn seed_env(&self, flags: &mut FlagSet) {
        for flag in flags.iter_mut() {
            let Some(key) = flag.env_key() else {
                continue;
            };
            if let Some(value) = self.env.var(key) {
                tracing::trace!(flag = flag.name(), env = key, "seeded from environment");
                flag.set(&value);
            }
        }
    }

    fn undefined(&self, key: String) -> Result<()> {
        if self.strict {
            return Err(Error::UndefinedFlag(key));
        }
        tracing::debug!(flag = %key, "ignoring undefined flag");
        Ok(())
    }
}
