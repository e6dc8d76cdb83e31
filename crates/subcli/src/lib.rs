//! Sub-command dispatch with scoped flags, environment fallbacks and
//! "did you mean" suggestions.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::process::ExitCode;
//! use subcli::{CommandOptions, Config, Flag, FlagOptions, Options, Registry, Slot};
//!
//! fn main() -> ExitCode {
//!     let verbose = Slot::new(false);
//!     let name = Slot::new(String::new());
//!
//!     let options = Options {
//!         config: Config {
//!             env_prefix: "hello".to_string(),
//!             version: Some("1.0.0".to_string()),
//!             ..Default::default()
//!         },
//!         ..Default::default()
//!     };
//!     let mut app = Registry::new(
//!         "hello",
//!         vec![Flag::bool("verbose", &verbose, FlagOptions::default())],
//!         options,
//!     )
//!     .expect("invalid global flags");
//!
//!     let who = name.clone();
//!     app.add(
//!         "greet",
//!         move |_args| {
//!             println!("Hello, {}!", who.get());
//!             Ok(())
//!         },
//!         vec![Flag::new("name", &name, FlagOptions::default())],
//!         CommandOptions::default(),
//!     )
//!     .expect("invalid command");
//!
//!     app.main()
//! }
//! ```
//!
//! Flags accept one or two leading hyphens and either `-name value` or
//! `-name=value`. Values come from, in increasing precedence: the default,
//! the environment (`HELLO_NAME` above), the command line.

pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod flag;
pub mod levenshtein;
pub mod parse;
pub mod registry;
pub mod suggest;
pub mod usage;

pub use command::{Command, CommandOptions, Handler, Middleware, handler, middleware};
pub use config::Config;
pub use env::{DotenvEnv, EnvSource, ProcessEnv};
pub use error::{Error, Result, SetupError};
pub use flag::{BoolKind, Flag, FlagKind, FlagOptions, FlagSet, Slot, StringKind};
pub use levenshtein::levenshtein;
pub use parse::Parser;
pub use registry::{Options, PostParse, Registry, Resolver};
pub use suggest::SIMILAR_THRESHOLD;
pub use usage::{Renderer, TopicMap, UsageDir};
