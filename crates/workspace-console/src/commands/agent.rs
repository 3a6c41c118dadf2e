// ABOUTME: Agent state commands: ready, not-ready, after-call-work, dnd, forwarding, voice login
// ABOUTME: None of these take a call id

use anyhow::Result;
use async_trait::async_trait;

use super::{Command, CommandRegistry, Context, Outcome};

const AFTER_CALL_WORK: &str = "AfterCallWork";

pub fn register(registry: &mut CommandRegistry) {
    registry.register(AgentCommand(AgentOp::Ready));
    registry.register(NotReady);
    registry.register(AgentCommand(AgentOp::AfterCallWork));
    registry.register(AgentCommand(AgentOp::DndOn));
    registry.register(AgentCommand(AgentOp::DndOff));
    registry.register(SetForward);
    registry.register(AgentCommand(AgentOp::CancelForward));
    registry.register(AgentCommand(AgentOp::VoiceLogin));
    registry.register(AgentCommand(AgentOp::VoiceLogout));
}

/// Argument-free agent state changes
#[derive(Debug, Clone, Copy)]
pub enum AgentOp {
    Ready,
    AfterCallWork,
    DndOn,
    DndOff,
    CancelForward,
    VoiceLogin,
    VoiceLogout,
}

impl AgentOp {
    fn names(self) -> &'static [&'static str] {
        match self {
            Self::Ready => &["ready", "r"],
            Self::AfterCallWork => &["after-call-work", "acw"],
            Self::DndOn => &["dnd-on"],
            Self::DndOff => &["dnd-off"],
            Self::CancelForward => &["cancel-forward", "cf"],
            Self::VoiceLogin => &["voice-login", "vl"],
            Self::VoiceLogout => &["voice-logout", "vlo"],
        }
    }
}

pub struct AgentCommand(pub AgentOp);

#[async_trait]
impl Command for AgentCommand {
    fn names(&self) -> &'static [&'static str] {
        self.0.names()
    }

    async fn execute(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<Outcome> {
        ctx.say(format!("Sending {}...", self.name()))?;
        let api = ctx.api;
        match self.0 {
            AgentOp::Ready => api.ready().await?,
            AgentOp::AfterCallWork => api.not_ready(None, Some(AFTER_CALL_WORK)).await?,
            AgentOp::DndOn => api.dnd_on().await?,
            AgentOp::DndOff => api.dnd_off().await?,
            AgentOp::CancelForward => api.cancel_forward().await?,
            AgentOp::VoiceLogin => api.voice_login().await?,
            AgentOp::VoiceLogout => api.voice_logout().await?,
        }
        Ok(Outcome::Continue)
    }
}

pub struct NotReady;

#[async_trait]
impl Command for NotReady {
    fn names(&self) -> &'static [&'static str] {
        &["not-ready", "nr"]
    }

    fn synopsis(&self) -> &'static str {
        "[reasonCode]"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        let reason_code = args.first().map(String::as_str);
        match reason_code {
            Some(code) => ctx.say(format!("Sending not-ready with reasonCode [{}]...", code))?,
            None => ctx.say("Sending not-ready...")?,
        }
        ctx.api.not_ready(reason_code, None).await?;
        Ok(Outcome::Continue)
    }
}

pub struct SetForward;

#[async_trait]
impl Command for SetForward {
    fn names(&self) -> &'static [&'static str] {
        &["set-forward", "sf"]
    }

    fn synopsis(&self) -> &'static str {
        "<destination>"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        let Some(destination) = args.first() else {
            return ctx.usage(&self.usage());
        };
        ctx.say(format!("Sending set-forward with destination [{}]...", destination))?;
        ctx.api.set_forward(destination).await?;
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_op_names() {
        assert_eq!(AgentCommand(AgentOp::AfterCallWork).name(), "after-call-work");
        assert_eq!(AgentCommand(AgentOp::VoiceLogout).help_line(), "voice-logout|vlo");
        assert_eq!(SetForward.usage(), "set-forward <destination>");
    }
}
