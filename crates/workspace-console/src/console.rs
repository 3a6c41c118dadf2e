// ABOUTME: The interactive read-dispatch-print loop
// ABOUTME: Interleaves operator input with push events from the workspace client

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};
use workspace_client::{WorkspaceApi, WorkspaceEvent};

use crate::commands::{session, CommandRegistry, Context, Outcome};
use crate::config::ConsoleConfig;
use crate::parse::parse_input;
use crate::render::event_line;

pub const BANNER: &str = "Workspace Api Console";
pub const PROMPT: &str = "cmd>";

/// Console bound to one workspace session
pub struct Console {
    api: Arc<dyn WorkspaceApi>,
    config: ConsoleConfig,
    registry: CommandRegistry,
}

impl Console {
    pub fn new(api: Arc<dyn WorkspaceApi>, config: ConsoleConfig) -> Self {
        Self {
            api,
            config,
            registry: CommandRegistry::standard(),
        }
    }

    fn context<'a>(&'a self, out: &'a mut (dyn Write + Send)) -> Context<'a> {
        Context {
            api: self.api.as_ref(),
            config: &self.config,
            registry: &self.registry,
            out,
        }
    }

    /// Run until `exit` or end of input. Only an input read error is fatal.
    pub async fn run<R, W>(&self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write + Send,
    {
        writeln!(out, "{}", BANNER)?;
        writeln!(out)?;

        let mut events = self.api.subscribe();
        if self.config.auto_login {
            self.auto_login(out).await?;
        }

        let mut lines = input.lines();
        let mut events_open = true;

        'session: loop {
            events_open &= drain_events(&mut events, out)?;
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            // Wait for a line; events arriving meanwhile are shown above a fresh prompt
            loop {
                tokio::select! {
                    line = lines.next_line() => {
                        let Some(line) = line.context("Failed to read input")? else {
                            debug!("End of input");
                            self.shutdown(out).await?;
                            break 'session;
                        };
                        if self.dispatch(&line, out).await? == Outcome::Exit {
                            break 'session;
                        }
                        continue 'session;
                    }
                    event = events.recv(), if events_open => match event {
                        Ok(event) => {
                            writeln!(out)?;
                            writeln!(out, "{}", event_line(&event))?;
                            write!(out, "{}", PROMPT)?;
                            out.flush()?;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Push events dropped");
                        }
                        Err(RecvError::Closed) => {
                            debug!("Push event channel closed");
                            events_open = false;
                        }
                    },
                }
            }
        }

        Ok(())
    }

    /// Parse and execute one line. Command failures are printed, not returned.
    pub async fn dispatch<W: Write + Send>(&self, line: &str, out: &mut W) -> Result<Outcome> {
        let Some(input) = parse_input(line) else {
            return Ok(Outcome::Continue);
        };
        let Some(command) = self.registry.get(&input.name) else {
            debug!(command = %input.name, "Ignoring unknown command");
            return Ok(Outcome::Continue);
        };

        let result = {
            let mut ctx = self.context(&mut *out);
            command.execute(&mut ctx, &input.args).await
        };
        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(command = %input.name, error = %e, "Command failed");
                writeln!(out, "Command failed!")?;
                writeln!(out, "{:#}", e)?;
                out.flush()?;
                Ok(Outcome::Continue)
            }
        }
    }

    /// Initialize and activate channels with the configured defaults
    async fn auto_login<W: Write + Send>(&self, out: &mut W) -> Result<()> {
        let result = {
            let mut ctx = self.context(&mut *out);
            ctx.say("autoLogin is true...")?;
            match session::initialize(&mut ctx).await {
                Ok(()) => session::activate_channels(&mut ctx, &[]).await.map(|_| ()),
                Err(e) => Err(e),
            }
        };
        if let Err(e) = result {
            warn!(error = %e, "Auto-login failed");
            writeln!(out, "autoLogin failed!")?;
            writeln!(out, "{:#}", e)?;
        }
        Ok(())
    }

    /// Teardown at end of input; failures are logged only
    async fn shutdown<W: Write + Send>(&self, out: &mut W) -> Result<()> {
        writeln!(out)?;
        let mut ctx = self.context(&mut *out);
        if let Err(e) = session::destroy(&mut ctx).await {
            debug!(error = %e, "Teardown at end of input failed");
        }
        Ok(())
    }
}

/// Print events queued while a command ran. Returns false once the channel is closed.
fn drain_events<W: Write>(
    events: &mut broadcast::Receiver<WorkspaceEvent>,
    out: &mut W,
) -> Result<bool> {
    loop {
        match events.try_recv() {
            Ok(event) => writeln!(out, "{}", event_line(&event))?,
            Err(TryRecvError::Empty) => return Ok(true),
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "Push events dropped"),
            Err(TryRecvError::Closed) => return Ok(false),
        }
    }
}
