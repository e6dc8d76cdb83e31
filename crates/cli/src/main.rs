use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Result, anyhow};
use subcli::{
    CommandOptions, Config, DotenvEnv, EnvSource, Flag, FlagOptions, Handler, Options, ProcessEnv,
    Registry, Slot, TopicMap, handler, middleware,
};
use tracing_subscriber::{EnvFilter, fmt};

const APP: &str = "greeter";
const CONFIG_ENV: &str = "GREETER_CONFIG";
const DOTENV_FILE: &str = ".env";

fn main() -> ExitCode {
    init_tracing();
    match build() {
        Ok(mut app) => app.main(),
        Err(err) => {
            eprintln!("{APP}: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn build() -> Result<Registry> {
    let config = load_config()?;
    let topics = usage_topics(&config.scope);
    let verbose = Slot::new(false);

    let options = Options {
        config,
        renderer: Box::new(topics),
        env: env_source()?,
        middleware: vec![middleware(timed)],
        post_parse: Some(Rc::new({
            let verbose = verbose.clone();
            move |name: &str, args: &[String]| -> subcli::Result<()> {
                if verbose.get() {
                    eprintln!("{APP}: running {name} with {} argument(s)", args.len());
                }
                Ok(())
            }
        })),
        ..Default::default()
    };

    let mut app = Registry::new(
        APP,
        vec![Flag::bool(
            "verbose",
            &verbose,
            FlagOptions {
                alias: Some("v".to_string()),
                ..Default::default()
            },
        )],
        options,
    )?;

    let name = Slot::new(String::new());
    let shout = Slot::new(false);
    let greet = {
        let name = name.clone();
        let shout = shout.clone();
        move |args: &[String]| -> subcli::Result<()> {
            if !args.is_empty() {
                return Err(subcli::Error::Usage);
            }
            let mut line = format!("Hello, {}!", name.get());
            if shout.get() {
                line = line.to_uppercase();
            }
            writeln!(std::io::stdout(), "{line}")?;
            Ok(())
        }
    };
    app.add(
        "greet",
        greet,
        vec![
            Flag::new(
                "name",
                &name,
                FlagOptions {
                    default_value: Some("world".to_string()),
                    ..Default::default()
                },
            ),
            Flag::bool(
                "shout",
                &shout,
                FlagOptions {
                    alias: Some("s".to_string()),
                    ..Default::default()
                },
            ),
        ],
        CommandOptions {
            alias: Some("hi".to_string()),
            ..Default::default()
        },
    )?;

    app.add(
        "echo",
        |args: &[String]| {
            writeln!(std::io::stdout(), "{}", args.join(" "))?;
            Ok(())
        },
        vec![],
        CommandOptions {
            proxy: true,
            ..Default::default()
        },
    )?;

    app.add("fail", fail, vec![], CommandOptions::default())?;

    Ok(app)
}

fn fail(_: &[String]) -> subcli::Result<()> {
    Err(anyhow!("something went wrong").into())
}

/// Logs how long each command took.
fn timed(next: Handler) -> Handler {
    handler(move |args| {
        let start = Instant::now();
        let result = next(args);
        tracing::debug!(
            elapsed = ?start.elapsed(),
            ok = result.is_ok(),
            "command finished"
        );
        result
    })
}

/// File config named by `GREETER_CONFIG`, with the built-in settings filled in.
fn load_config() -> Result<Config> {
    let mut config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    if config.env_prefix.is_empty() {
        config.env_prefix = APP.to_string();
    }
    if config.scope.is_empty() {
        config.scope = APP.to_string();
    }
    if config.version.is_none() {
        config.version = Some(env!("CARGO_PKG_VERSION").to_string());
    }
    tracing::debug!(?config, "loaded config");
    Ok(config)
}

fn env_source() -> Result<Box<dyn EnvSource>> {
    let path = Path::new(DOTENV_FILE);
    if path.is_file() {
        return Ok(Box::new(DotenvEnv::from_path(path)?));
    }
    Ok(Box::new(ProcessEnv))
}

fn usage_topics(scope: &str) -> TopicMap {
    TopicMap::new()
        .topic(scope, include_str!("../usage/README.md"))
        .topic(format!("{scope}/greet"), include_str!("../usage/greet.md"))
        .topic(format!("{scope}/echo"), include_str!("../usage/echo.md"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
