//! Command set and per-command category table.

use std::collections::BTreeMap;

/// Commands tracked by the command view, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    Set,
    Cas,
    Add,
    Replace,
    Append,
    Prepend,
    Incr,
    Decr,
    Get,
    Gets,
    Delete,
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::Set,
        Command::Cas,
        Command::Add,
        Command::Replace,
        Command::Append,
        Command::Prepend,
        Command::Incr,
        Command::Decr,
        Command::Get,
        Command::Gets,
        Command::Delete,
    ];

    /// Protocol name, also the prefix of every stat field for the command.
    pub fn name(self) -> &'static str {
        match self {
            Command::Set => "set",
            Command::Cas => "cas",
            Command::Add => "add",
            Command::Replace => "replace",
            Command::Append => "append",
            Command::Prepend => "prepend",
            Command::Incr => "incr",
            Command::Decr => "decr",
            Command::Get => "get",
            Command::Gets => "gets",
            Command::Delete => "delete",
        }
    }

    /// Mutations. Also the set of commands that report `_success`.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Command::Set
                | Command::Cas
                | Command::Add
                | Command::Replace
                | Command::Append
                | Command::Prepend
                | Command::Incr
                | Command::Decr
        )
    }

    pub fn is_read(self) -> bool {
        matches!(self, Command::Get | Command::Gets)
    }

    /// Commands that locate an existing key and report hit/miss.
    pub fn has_hit_miss(self) -> bool {
        !matches!(self, Command::Set | Command::Add)
    }

    /// Stat field counting precondition conflicts, for the commands that have one.
    pub fn exist_field(self) -> Option<&'static str> {
        match self {
            Command::Cas => Some("cas_badval"),
            Command::Add => Some("add_exist"),
            _ => None,
        }
    }

    /// Whether the protocol reports `category` for this command at all.
    pub fn reports(self, category: Category) -> bool {
        match category {
            Category::Count | Category::Error => true,
            Category::Success => self.is_write(),
            Category::Hit | Category::Miss => self.has_hit_miss(),
            Category::Exist => self.exist_field().is_some(),
        }
    }
}

/// Outcome categories counted per command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Count,
    Error,
    Success,
    Hit,
    Miss,
    Exist,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Count,
        Category::Error,
        Category::Success,
        Category::Hit,
        Category::Miss,
        Category::Exist,
    ];
}

/// Sparse `(command, category) -> value` table.
///
/// A pair that was never inserted is absent, which is distinct from zero:
/// views render absent pairs as "not applicable".
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTable<T> {
    values: BTreeMap<(Command, Category), T>,
}

impl<T> Default for CommandTable<T> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<T: Copy> CommandTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, command: Command, category: Category) -> Option<T> {
        self.values.get(&(command, category)).copied()
    }

    pub fn insert(&mut self, command: Command, category: Category, value: T) {
        self.values.insert((command, category), value);
    }

    /// Present pairs in command display order.
    pub fn iter(&self) -> impl Iterator<Item = (Command, Category, T)> + '_ {
        self.values.iter().map(|(&(cmd, cat), &v)| (cmd, cat, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Copy + std::ops::AddAssign> CommandTable<T> {
    /// Adds `value` to the pair, creating it if absent.
    pub fn accumulate(&mut self, command: Command, category: Category, value: T) {
        self.values
            .entry((command, category))
            .and_modify(|v| *v += value)
            .or_insert(value);
    }
}
