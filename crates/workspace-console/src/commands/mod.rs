// ABOUTME: Console command trait, execution context and the name/alias dispatch table
// ABOUTME: Each command validates its own arguments and translates them into client calls

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use workspace_client::WorkspaceApi;

use crate::config::ConsoleConfig;
use crate::resolve::{self, ParentRef};

pub mod agent;
pub mod call;
pub mod directory;
pub mod query;
pub mod session;

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

/// Everything a command can touch while it runs
pub struct Context<'a> {
    pub api: &'a dyn WorkspaceApi,
    pub config: &'a ConsoleConfig,
    pub registry: &'a CommandRegistry,
    pub out: &'a mut (dyn Write + Send),
}

impl Context<'_> {
    /// Print one line
    pub fn say(&mut self, line: impl AsRef<str>) -> std::io::Result<()> {
        writeln!(self.out, "{}", line.as_ref())?;
        self.out.flush()
    }

    /// Print a usage hint and abort the command
    pub fn usage(&mut self, usage: &str) -> Result<Outcome> {
        self.say(format!("Usage: {}", usage))?;
        Ok(Outcome::Continue)
    }

    pub fn call_id(&self, args: &[String]) -> Option<String> {
        resolve::resolve_call_id(&self.api.calls(), args)
    }

    pub fn call_id_and_parent(&self, args: &[String]) -> Option<ParentRef> {
        resolve::resolve_call_id_and_parent(&self.api.calls(), args)
    }
}

/// A console command
#[async_trait]
pub trait Command: Send + Sync {
    /// Canonical name first, then aliases
    fn names(&self) -> &'static [&'static str];

    /// Argument synopsis, e.g. `<id> <destination>`
    fn synopsis(&self) -> &'static str {
        ""
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome>;

    fn name(&self) -> &'static str {
        self.names().first().copied().unwrap_or_default()
    }

    /// `name <args>` as shown in usage hints
    fn usage(&self) -> String {
        match self.synopsis() {
            "" => self.name().to_string(),
            synopsis => format!("{} {}", self.name(), synopsis),
        }
    }

    /// `name|alias <args>` as shown in help
    fn help_line(&self) -> String {
        let names = self.names().join("|");
        match self.synopsis() {
            "" => names,
            synopsis => format!("{} {}", names, synopsis),
        }
    }
}

/// Dispatch table from every name and alias to its command
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
    by_name: HashMap<&'static str, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full console catalog
    pub fn standard() -> Self {
        let mut registry = Self::new();
        session::register(&mut registry);
        query::register(&mut registry);
        agent::register(&mut registry);
        call::register(&mut registry);
        directory::register(&mut registry);
        registry
    }

    pub fn register(&mut self, command: impl Command + 'static) {
        let command: Arc<dyn Command> = Arc::new(command);
        for name in command.names().iter().copied() {
            let previous = self.by_name.insert(name, Arc::clone(&command));
            debug_assert!(previous.is_none(), "duplicate command name '{}'", name);
        }
        self.commands.push(command);
    }

    /// Look up by already lower-cased name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.by_name.get(name)
    }

    /// Commands in registration order
    pub fn commands(&self) -> impl Iterator<Item = &Arc<dyn Command>> {
        self.commands.iter()
    }
}
