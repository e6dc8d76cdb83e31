use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::flag::FlagSet;

/// Business logic of a command. Receives the positional arguments left after
/// flag parsing.
pub type Handler = Rc<dyn Fn(&[String]) -> Result<()>>;

/// Wraps a handler with extra behavior.
pub type Middleware = Rc<dyn Fn(Handler) -> Handler>;

/// Box a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&[String]) -> Result<()> + 'static,
{
    Rc::new(f)
}

/// Box a closure as a [`Middleware`].
pub fn middleware<F>(f: F) -> Middleware
where
    F: Fn(Handler) -> Handler + 'static,
{
    Rc::new(f)
}

/// Wrap `handler` so that `chain[0]` ends up outermost.
pub fn wrap<'a, I>(handler: Handler, chain: I) -> Handler
where
    I: IntoIterator<Item = &'a Middleware>,
    I::IntoIter: DoubleEndedIterator,
{
    chain.into_iter().rev().fold(handler, |inner, m| m(inner))
}

/// Optional per-command settings.
#[derive(Clone, Default)]
pub struct CommandOptions {
    /// Second name resolving to the same command.
    pub alias: Option<String>,
    /// Hand the raw, unparsed arguments to the handler.
    pub proxy: bool,
    /// Applied inside any registry-wide middleware.
    pub middleware: Vec<Middleware>,
}

impl fmt::Debug for CommandOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandOptions")
            .field("alias", &self.alias)
            .field("proxy", &self.proxy)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

#[derive(Clone)]
pub(crate) enum Action {
    Run(Handler),
    Help,
    Version,
}

/// A registered sub-command.
pub struct Command {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) proxy: bool,
    pub(crate) flags: FlagSet,
    pub(crate) action: Action,
}

impl Command {
    pub(crate) fn builtin(name: &str, action: Action) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
            proxy: false,
            flags: FlagSet::default(),
            action,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn is_proxy(&self) -> bool {
        self.proxy
    }

    /// `help` or `version`.
    pub fn is_builtin(&self) -> bool {
        !matches!(self.action, Action::Run(_))
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("proxy", &self.proxy)
            .field("builtin", &self.is_builtin())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn tagging(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Middleware {
        let log = Rc::clone(log);
        middleware(move |next: Handler| {
            let log = Rc::clone(&log);
            handler(move |args| {
                log.borrow_mut().push(format!("{tag}:before"));
                let result = next(args);
                log.borrow_mut().push(format!("{tag}:after"));
                result
            })
        })
    }

    #[test]
    fn first_middleware_is_outermost() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let inner = {
            let log = Rc::clone(&log);
            handler(move |_| {
                log.borrow_mut().push("handler".to_string());
                Ok(())
            })
        };
        let chain = vec![tagging(&log, "outer"), tagging(&log, "inner")];
        let wrapped = wrap(inner, &chain);
        wrapped(&[]).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                "outer:before",
                "inner:before",
                "handler",
                "inner:after",
                "outer:after"
            ]
        );
    }

    #[test]
    fn empty_chain_is_identity() {
        let inner = handler(|args| {
            assert_eq!(args, ["x"]);
            Ok(())
        });
        let wrapped = wrap(inner, &Vec::<Middleware>::new());
        wrapped(&["x".to_string()]).unwrap();
    }

    #[test]
    fn middleware_can_short_circuit() {
        let deny = middleware(|_next: Handler| handler(|_| Err(crate::Error::Usage)));
        let wrapped = wrap(handler(|_| Ok(())), &vec![deny]);
        assert!(matches!(wrapped(&[]), Err(crate::Error::Usage)));
    }
}
