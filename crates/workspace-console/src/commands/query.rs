// ABOUTME: Read-only commands: dn, calls, user, configuration, config, clear, help
// ABOUTME: These print local state and never call the service

use std::io::Write;

use anyhow::Result;
use async_trait::async_trait;

use super::{Command, CommandRegistry, Context, Outcome};
use crate::render::{self, call_summary, pretty_json};

pub fn register(registry: &mut CommandRegistry) {
    registry.register(ShowDn);
    registry.register(ShowCalls);
    registry.register(ShowUser);
    registry.register(ShowConfiguration);
    registry.register(ShowConfig);
    registry.register(Clear);
    registry.register(Help);
}

const NOT_INITIALIZED: &str = "<not initialized>";

pub struct ShowDn;

#[async_trait]
impl Command for ShowDn {
    fn names(&self) -> &'static [&'static str] {
        &["dn"]
    }

    async fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<Outcome> {
        match ctx.api.dn() {
            Some(dn) => ctx.say(format!("DN:\n{}", pretty_json(&dn)?))?,
            None => ctx.say(NOT_INITIALIZED)?,
        }
        Ok(Outcome::Continue)
    }
}

/// One summary line per call, or full JSON when any argument is given
pub struct ShowCalls;

#[async_trait]
impl Command for ShowCalls {
    fn names(&self) -> &'static [&'static str] {
        &["calls"]
    }

    fn synopsis(&self) -> &'static str {
        "[full]"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        let calls = ctx.api.calls();
        ctx.say("Calls:")?;
        if calls.is_empty() {
            ctx.say("<none>")?;
            return Ok(Outcome::Continue);
        }

        let full = !args.is_empty();
        for call in &calls {
            if full {
                ctx.say(pretty_json(call)?)?;
            } else {
                ctx.say(call_summary(call))?;
            }
        }
        Ok(Outcome::Continue)
    }
}

pub struct ShowUser;

#[async_trait]
impl Command for ShowUser {
    fn names(&self) -> &'static [&'static str] {
        &["user", "u"]
    }

    async fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<Outcome> {
        match ctx.api.user() {
            Some(user) => ctx.say(format!("User details:\n{}", pretty_json(&user)?))?,
            None => ctx.say(NOT_INITIALIZED)?,
        }
        Ok(Outcome::Continue)
    }
}

/// Server-side configuration received at initialization
pub struct ShowConfiguration;

#[async_trait]
impl Command for ShowConfiguration {
    fn names(&self) -> &'static [&'static str] {
        &["configuration", "cfg"]
    }

    async fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<Outcome> {
        match ctx.api.configuration() {
            Some(configuration) => {
                ctx.say(format!("Configuration:\n{}", pretty_json(&configuration)?))?
            }
            None => ctx.say(NOT_INITIALIZED)?,
        }
        Ok(Outcome::Continue)
    }
}

/// Local startup options, secrets masked
pub struct ShowConfig;

#[async_trait]
impl Command for ShowConfig {
    fn names(&self) -> &'static [&'static str] {
        &["config", "conf"]
    }

    async fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<Outcome> {
        let options = pretty_json(&ctx.config.redacted())?;
        ctx.say(format!("Options:\n{}", options))?;
        Ok(Outcome::Continue)
    }
}

pub struct Clear;

#[async_trait]
impl Command for Clear {
    fn names(&self) -> &'static [&'static str] {
        &["clear"]
    }

    async fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<Outcome> {
        write!(ctx.out, "{}", render::CLEAR_SCREEN)?;
        ctx.out.flush()?;
        Ok(Outcome::Continue)
    }
}

pub struct Help;

#[async_trait]
impl Command for Help {
    fn names(&self) -> &'static [&'static str] {
        &["help", "?"]
    }

    async fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<Outcome> {
        let lines: Vec<String> = ctx
            .registry
            .commands()
            .map(|command| format!("    {}", command.help_line()))
            .collect();

        ctx.say("Commands:")?;
        for line in lines {
            ctx.say(line)?;
        }
        ctx.say("")?;
        ctx.say("The call id can be omitted when exactly one call is active.")?;
        Ok(Outcome::Continue)
    }
}
