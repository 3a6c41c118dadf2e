// ABOUTME: Session lifecycle commands: initialize, destroy, activate-channels, debug, exit
// ABOUTME: Also hosts the initialize/activate steps reused by auto-login

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use super::{Command, CommandRegistry, Context, Outcome};

const ACTIVATE_USAGE: &str = "activate-channels <agentId> <dn>";

pub fn register(registry: &mut CommandRegistry) {
    registry.register(Initialize);
    registry.register(InitializeAndActivate);
    registry.register(Destroy);
    registry.register(ActivateChannels);
    registry.register(ToggleDebug);
    registry.register(Exit);
}

/// Authenticate, then initialize the workspace session
pub async fn initialize(ctx: &mut Context<'_>) -> Result<()> {
    ctx.say("Authenticating...")?;
    ctx.api.authenticate().await?;
    ctx.say("Initializing api...")?;
    ctx.api.initialize().await?;
    ctx.say("Initialization complete.")?;
    Ok(())
}

/// Bind the agent to a DN. Exactly two arguments, or both configured defaults.
pub async fn activate_channels(ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
    let (agent_id, dn) = match args {
        [agent_id, dn] => (agent_id.clone(), dn.clone()),
        _ => match (&ctx.config.default_agent_id, &ctx.config.default_dn) {
            (Some(agent_id), Some(dn)) => (agent_id.clone(), dn.clone()),
            _ => return ctx.usage(ACTIVATE_USAGE),
        },
    };

    ctx.say(format!(
        "Sending activate-channels with agentId [{}] and dn [{}]...",
        agent_id, dn
    ))?;
    ctx.api.activate_channels(&agent_id, &dn).await?;
    info!(agent_id = %agent_id, dn = %dn, "Channels activated");
    Ok(Outcome::Continue)
}

/// Log out if a session is live. Safe to call repeatedly.
pub async fn destroy(ctx: &mut Context<'_>) -> Result<()> {
    ctx.say("Logging out and cleaning up...")?;
    if ctx.api.is_initialized() {
        ctx.api.destroy().await?;
    }
    Ok(())
}

pub struct Initialize;

#[async_trait]
impl Command for Initialize {
    fn names(&self) -> &'static [&'static str] {
        &["initialize", "init", "i"]
    }

    async fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<Outcome> {
        initialize(ctx).await?;
        Ok(Outcome::Continue)
    }
}

/// Initialize then activate channels in one step
pub struct InitializeAndActivate;

#[async_trait]
impl Command for InitializeAndActivate {
    fn names(&self) -> &'static [&'static str] {
        &["initialize-activate", "iac"]
    }

    fn synopsis(&self) -> &'static str {
        "<agentId> <dn>"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        initialize(ctx).await?;
        activate_channels(ctx, args).await
    }
}

pub struct Destroy;

#[async_trait]
impl Command for Destroy {
    fn names(&self) -> &'static [&'static str] {
        &["destroy", "logout", "l"]
    }

    async fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<Outcome> {
        destroy(ctx).await?;
        Ok(Outcome::Continue)
    }
}

pub struct ActivateChannels;

#[async_trait]
impl Command for ActivateChannels {
    fn names(&self) -> &'static [&'static str] {
        &["activate-channels", "ac"]
    }

    fn synopsis(&self) -> &'static str {
        "<agentId> <dn>"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        activate_channels(ctx, args).await
    }
}

pub struct ToggleDebug;

#[async_trait]
impl Command for ToggleDebug {
    fn names(&self) -> &'static [&'static str] {
        &["debug", "d"]
    }

    async fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<Outcome> {
        ctx.api.set_debug_enabled(!ctx.api.is_debug_enabled());
        ctx.say(format!("Debug enabled: {}", ctx.api.is_debug_enabled()))?;
        Ok(Outcome::Continue)
    }
}

/// Tear down the session and leave the loop. Teardown errors are not reported.
pub struct Exit;

#[async_trait]
impl Command for Exit {
    fn names(&self) -> &'static [&'static str] {
        &["exit", "x", "quit"]
    }

    async fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<Outcome> {
        if let Err(e) = destroy(ctx).await {
            debug!(error = %e, "Teardown on exit failed");
        }
        Ok(Outcome::Exit)
    }
}
