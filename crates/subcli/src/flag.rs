//! Typed, bindable command line flags.
//!
//! A [`Flag`] owns a type-erased setter closure that captures its
//! [`FlagKind`] and the caller's [`Slot`]. The tokenizer only ever hands it
//! raw strings; the kind decides how they become typed values.

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::error::SetupError;

/// How a flag turns raw text into a typed value.
pub trait FlagKind {
    type Value: 'static;

    /// Convert a raw token into the destination type.
    fn parse(&self, raw: &str) -> Self::Value;

    /// Whether the flag consumes the following token as its value.
    fn has_arg(&self) -> bool;
}

/// Plain string flag. Takes an argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringKind;

impl FlagKind for StringKind {
    type Value = String;

    fn parse(&self, raw: &str) -> String {
        raw.to_string()
    }

    fn has_arg(&self) -> bool {
        true
    }
}

/// Boolean switch. Never consumes the next token.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolKind;

impl FlagKind for BoolKind {
    type Value = bool;

    /// `true` for 1, t, T, true, TRUE, True, y, Y, yes, YES, Yes.
    fn parse(&self, raw: &str) -> bool {
        matches!(
            raw,
            "1" | "t" | "T" | "true" | "TRUE" | "True" | "y" | "Y" | "yes" | "YES" | "Yes"
        )
    }

    fn has_arg(&self) -> bool {
        false
    }
}

/// Shared destination a flag writes into.
///
/// Clone it, hand one copy to the flag, keep the other to read the value
/// after parsing.
#[derive(Debug, Default)]
pub struct Slot<T>(Rc<RefCell<T>>);

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Slot<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }
}

impl<T: Clone> Slot<T> {
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

/// Optional per-flag settings.
#[derive(Debug, Clone, Default)]
pub struct FlagOptions {
    /// Short form, matched verbatim (e.g. `v` for `-v`).
    pub alias: Option<String>,
    /// Environment variable to read before scanning argv. Overrides the
    /// key derived from the registry prefix.
    pub env_key: Option<String>,
    /// Value stored at construction. Does not count as being set.
    pub default_value: Option<String>,
}

type Setter = Box<dyn Fn(&str)>;

/// A named command line option bound to a [`Slot`].
pub struct Flag {
    name: String,
    alias: Option<String>,
    env_key: Option<String>,
    default_value: Option<String>,
    value: String,
    count: usize,
    has_arg: bool,
    setter: Setter,
}

impl Flag {
    /// String flag.
    pub fn new(name: &str, slot: &Slot<String>, options: FlagOptions) -> Self {
        Self::with_kind(name, slot, StringKind, options)
    }

    /// Boolean flag.
    pub fn bool(name: &str, slot: &Slot<bool>, options: FlagOptions) -> Self {
        Self::with_kind(name, slot, BoolKind, options)
    }

    /// Flag of any kind.
    pub fn with_kind<K>(name: &str, slot: &Slot<K::Value>, kind: K, options: FlagOptions) -> Self
    where
        K: FlagKind + 'static,
    {
        let has_arg = kind.has_arg();
        let slot = slot.clone();
        let setter: Setter = Box::new(move |raw: &str| slot.set(kind.parse(raw)));

        let mut flag = Self {
            name: name.trim().to_lowercase(),
            alias: options.alias.filter(|a| !a.trim().is_empty()),
            env_key: options.env_key.filter(|k| !k.trim().is_empty()),
            default_value: None,
            value: String::new(),
            count: 0,
            has_arg,
            setter,
        };
        if let Some(default_value) = options.default_value {
            (flag.setter)(&default_value);
            flag.value = default_value.clone();
            flag.default_value = Some(default_value);
        }
        flag
    }

    /// Record an explicit value from the command line or the environment.
    pub fn set(&mut self, raw: &str) {
        self.count += 1;
        (self.setter)(raw);
        self.value = raw.to_string();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Explicit or derived environment key.
    pub fn env_key(&self) -> Option<&str> {
        self.env_key.as_deref()
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Last accepted raw value (the default until explicitly set).
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Number of times the flag was explicitly set.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_set(&self) -> bool {
        self.count > 0
    }

    pub fn has_arg(&self) -> bool {
        self.has_arg
    }

    fn matches(&self, key: &str) -> bool {
        self.name == key || self.alias.as_deref() == Some(key)
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("env_key", &self.env_key)
            .field("default_value", &self.default_value)
            .field("value", &self.value)
            .field("count", &self.count)
            .field("has_arg", &self.has_arg)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Default environment key for `name` under `prefix`.
///
/// `uppercase(prefix_name)`, with `.`, `/`, `-` and `,` mapped to `_`.
pub fn env_key(prefix: &str, name: &str) -> String {
    format!("{prefix}_{name}")
        .chars()
        .map(|c| match c {
            '.' | '/' | '-' | ',' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// The flags of one scope: the global flags, or a single command's.
#[derive(Debug, Default)]
pub struct FlagSet {
    flags: Vec<Flag>,
}

impl FlagSet {
    /// Names and aliases share one namespace within the set.
    pub fn new(flags: Vec<Flag>) -> Result<Self, SetupError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for flag in &flags {
            if !flag.name.starts_with(|c: char| c.is_ascii_alphabetic()) {
                return Err(SetupError::InvalidName(flag.name.clone()));
            }
            if !seen.insert(flag.name.as_str()) {
                return Err(SetupError::DuplicateFlag(flag.name.clone()));
            }
            if let Some(alias) = flag.alias.as_deref() {
                if !alias.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    return Err(SetupError::InvalidName(alias.to_string()));
                }
                if !seen.insert(alias) {
                    return Err(SetupError::DuplicateFlag(alias.to_string()));
                }
            }
        }
        Ok(Self { flags })
    }

    /// Give every flag without an explicit key the one derived from `prefix`.
    ///
    /// An empty prefix derives nothing.
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return self;
        }
        for flag in &mut self.flags {
            if flag.env_key.is_none() {
                flag.env_key = Some(env_key(prefix, &flag.name));
            }
        }
        self
    }

    /// Look up a flag by name or alias.
    pub fn get(&self, key: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.matches(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Flag> {
        self.flags.iter_mut().find(|f| f.matches(key))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Flag> {
        self.flags.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Flag> {
        self.flags.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl<'a> IntoIterator for &'a FlagSet {
    type Item = &'a Flag;
    type IntoIter = std::slice::Iter<'a, Flag>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.iter()
    }
}
