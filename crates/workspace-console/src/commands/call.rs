// ABOUTME: Call control commands: dialing, per-call actions, conference/transfer, user data, recording
// ABOUTME: Call ids may be omitted when the active call set makes them unambiguous

use anyhow::Result;
use async_trait::async_trait;
use workspace_client::KvPair;

use super::{Command, CommandRegistry, Context, Outcome};

pub fn register(registry: &mut CommandRegistry) {
    registry.register(MakeCall);
    registry.register(CallCommand(CallOp::Answer));
    registry.register(CallCommand(CallOp::Hold));
    registry.register(CallCommand(CallOp::Retrieve));
    registry.register(CallCommand(CallOp::Release));
    registry.register(CallCommand(CallOp::Clear));
    registry.register(TargetCommand(TargetOp::Redirect));
    registry.register(TargetCommand(TargetOp::InitiateConference));
    registry.register(ParentCommand(ParentOp::CompleteConference));
    registry.register(TargetCommand(TargetOp::InitiateTransfer));
    registry.register(ParentCommand(ParentOp::CompleteTransfer));
    registry.register(TargetCommand(TargetOp::SingleStepTransfer));
    registry.register(TargetCommand(TargetOp::SingleStepConference));
    registry.register(TargetCommand(TargetOp::DeleteFromConference));
    registry.register(TargetCommand(TargetOp::Alternate));
    registry.register(TargetCommand(TargetOp::Merge));
    registry.register(TargetCommand(TargetOp::Reconnect));
    registry.register(UserData(UserDataOp::Attach));
    registry.register(UserData(UserDataOp::Update));
    registry.register(DeleteUserDataPair);
    registry.register(TargetCommand(TargetOp::SendDtmf));
    registry.register(CallCommand(CallOp::StartRecording));
    registry.register(CallCommand(CallOp::PauseRecording));
    registry.register(CallCommand(CallOp::ResumeRecording));
    registry.register(CallCommand(CallOp::StopRecording));
    registry.register(SendUserEvent);
}

/// Dial a destination, falling back to the configured default
pub struct MakeCall;

#[async_trait]
impl Command for MakeCall {
    fn names(&self) -> &'static [&'static str] {
        &["make-call", "mc"]
    }

    fn synopsis(&self) -> &'static str {
        "[destination]"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        let destination = match args.first().or(ctx.config.default_destination.as_ref()) {
            Some(destination) => destination.clone(),
            None => return ctx.usage("make-call <destination>"),
        };
        ctx.say(format!(
            "Sending make-call with destination [{}]...",
            destination
        ))?;
        ctx.api.make_call(&destination).await?;
        Ok(Outcome::Continue)
    }
}

/// Actions that take only a call id
#[derive(Debug, Clone, Copy)]
pub enum CallOp {
    Answer,
    Hold,
    Retrieve,
    Release,
    Clear,
    StartRecording,
    PauseRecording,
    ResumeRecording,
    StopRecording,
}

impl CallOp {
    fn names(self) -> &'static [&'static str] {
        match self {
            Self::Answer => &["answer", "a"],
            Self::Hold => &["hold", "h"],
            Self::Retrieve => &["retrieve", "ret"],
            Self::Release => &["release", "rel"],
            Self::Clear => &["clear-call"],
            Self::StartRecording => &["start-recording", "sr"],
            Self::PauseRecording => &["pause-recording", "pr"],
            Self::ResumeRecording => &["resume-recording", "rr"],
            Self::StopRecording => &["stop-recording", "str"],
        }
    }
}

pub struct CallCommand(pub CallOp);

#[async_trait]
impl Command for CallCommand {
    fn names(&self) -> &'static [&'static str] {
        self.0.names()
    }

    fn synopsis(&self) -> &'static str {
        "[id]"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        let Some(id) = ctx.call_id(args) else {
            return ctx.usage(&format!("{} <id>", self.name()));
        };
        ctx.say(format!("Sending {} for call [{}]...", self.name(), id))?;

        let api = ctx.api;
        match self.0 {
            CallOp::Answer => api.answer_call(&id).await?,
            CallOp::Hold => api.hold_call(&id).await?,
            CallOp::Retrieve => api.retrieve_call(&id).await?,
            CallOp::Release => api.release_call(&id).await?,
            CallOp::Clear => api.clear_call(&id).await?,
            CallOp::StartRecording => api.start_recording(&id).await?,
            CallOp::PauseRecording => api.pause_recording(&id).await?,
            CallOp::ResumeRecording => api.resume_recording(&id).await?,
            CallOp::StopRecording => api.stop_recording(&id).await?,
        }
        Ok(Outcome::Continue)
    }
}

/// Actions on a call plus one trailing target: a destination, a DN or a second call id
#[derive(Debug, Clone, Copy)]
pub enum TargetOp {
    Redirect,
    InitiateConference,
    InitiateTransfer,
    SingleStepTransfer,
    SingleStepConference,
    DeleteFromConference,
    Alternate,
    Merge,
    Reconnect,
    SendDtmf,
}

impl TargetOp {
    fn names(self) -> &'static [&'static str] {
        match self {
            Self::Redirect => &["redirect"],
            Self::InitiateConference => &["initiate-conference", "ic"],
            Self::InitiateTransfer => &["initiate-transfer", "it"],
            Self::SingleStepTransfer => &["single-step-transfer", "sst"],
            Self::SingleStepConference => &["single-step-conference", "ssc"],
            Self::DeleteFromConference => &["delete-from-conference", "dfc"],
            Self::Alternate => &["alternate", "alt"],
            Self::Merge => &["merge"],
            Self::Reconnect => &["reconnect"],
            Self::SendDtmf => &["send-dtmf", "dtmf"],
        }
    }

    /// What the trailing token means
    fn label(self) -> &'static str {
        match self {
            Self::Redirect
            | Self::InitiateConference
            | Self::InitiateTransfer
            | Self::SingleStepTransfer
            | Self::SingleStepConference => "destination",
            Self::DeleteFromConference => "dnToDrop",
            Self::Alternate | Self::Reconnect => "heldConnId",
            Self::Merge => "otherConnId",
            Self::SendDtmf => "digits",
        }
    }

    fn synopsis(self) -> &'static str {
        match self.label() {
            "dnToDrop" => "[id] <dnToDrop>",
            "heldConnId" => "[id] <heldConnId>",
            "otherConnId" => "[id] <otherConnId>",
            "digits" => "[id] <digits>",
            _ => "[id] <destination>",
        }
    }
}

pub struct TargetCommand(pub TargetOp);

#[async_trait]
impl Command for TargetCommand {
    fn names(&self) -> &'static [&'static str] {
        self.0.names()
    }

    fn synopsis(&self) -> &'static str {
        self.0.synopsis()
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        let usage = format!("{} <id> <{}>", self.name(), self.0.label());
        if args.len() > 2 {
            return ctx.usage(&usage);
        }
        let Some(target) = args.last() else {
            return ctx.usage(&usage);
        };
        // A lone token is the target; the call is then inferred
        let id = if args.len() == 2 {
            Some(args[0].clone())
        } else {
            ctx.call_id(&[])
        };
        let Some(id) = id else {
            return ctx.usage(&usage);
        };

        ctx.say(format!(
            "Sending {} for call [{}] and {} [{}]...",
            self.name(),
            id,
            self.0.label(),
            target
        ))?;

        let api = ctx.api;
        match self.0 {
            TargetOp::Redirect => api.redirect_call(&id, target).await?,
            TargetOp::InitiateConference => api.initiate_conference(&id, target).await?,
            TargetOp::InitiateTransfer => api.initiate_transfer(&id, target).await?,
            TargetOp::SingleStepTransfer => api.single_step_transfer(&id, target).await?,
            TargetOp::SingleStepConference => api.single_step_conference(&id, target).await?,
            TargetOp::DeleteFromConference => api.delete_from_conference(&id, target).await?,
            TargetOp::Alternate => api.alternate_calls(&id, target).await?,
            TargetOp::Merge => api.merge_calls(&id, target).await?,
            TargetOp::Reconnect => api.reconnect_call(&id, target).await?,
            TargetOp::SendDtmf => api.send_dtmf(&id, target).await?,
        }
        Ok(Outcome::Continue)
    }
}

/// Completion of a two-step conference or transfer
#[derive(Debug, Clone, Copy)]
pub enum ParentOp {
    CompleteConference,
    CompleteTransfer,
}

pub struct ParentCommand(pub ParentOp);

#[async_trait]
impl Command for ParentCommand {
    fn names(&self) -> &'static [&'static str] {
        match self.0 {
            ParentOp::CompleteConference => &["complete-conference", "cc"],
            ParentOp::CompleteTransfer => &["complete-transfer", "ct"],
        }
    }

    fn synopsis(&self) -> &'static str {
        "[id parentConnId]"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        let Some(call) = ctx.call_id_and_parent(args) else {
            return ctx.usage(&format!("{} <id> <parentConnId>", self.name()));
        };
        ctx.say(format!(
            "Sending {} for call [{}] and parentConnId [{}]...",
            self.name(),
            call.conn_id,
            call.parent_conn_id
        ))?;

        match self.0 {
            ParentOp::CompleteConference => {
                ctx.api
                    .complete_conference(&call.conn_id, &call.parent_conn_id)
                    .await?
            }
            ParentOp::CompleteTransfer => {
                ctx.api
                    .complete_transfer(&call.conn_id, &call.parent_conn_id)
                    .await?
            }
        }
        Ok(Outcome::Continue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum UserDataOp {
    Attach,
    Update,
}

/// Attach or update one string-typed key/value pair on a call
pub struct UserData(pub UserDataOp);

#[async_trait]
impl Command for UserData {
    fn names(&self) -> &'static [&'static str] {
        match self.0 {
            UserDataOp::Attach => &["attach-user-data", "aud"],
            UserDataOp::Update => &["update-user-data", "uud"],
        }
    }

    fn synopsis(&self) -> &'static str {
        "[id] <key> <value>"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        let usage = format!("{} <id> <key> <value>", self.name());
        let (id, key, value) = match args {
            [id, key, value] => (Some(id.clone()), key, value),
            [key, value] => (ctx.call_id(&[]), key, value),
            _ => return ctx.usage(&usage),
        };
        let Some(id) = id else {
            return ctx.usage(&usage);
        };

        ctx.say(format!(
            "Sending {} for call [{}] with [{}={}]...",
            self.name(),
            id,
            key,
            value
        ))?;

        let data = [KvPair::string(key, value)];
        match self.0 {
            UserDataOp::Attach => ctx.api.attach_user_data(&id, &data).await?,
            UserDataOp::Update => ctx.api.update_user_data(&id, &data).await?,
        }
        Ok(Outcome::Continue)
    }
}

pub struct DeleteUserDataPair;

#[async_trait]
impl Command for DeleteUserDataPair {
    fn names(&self) -> &'static [&'static str] {
        &["delete-user-data-pair", "dud"]
    }

    fn synopsis(&self) -> &'static str {
        "[id] <key>"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        let (id, key) = match args {
            [id, key] => (Some(id.clone()), key),
            [key] => (ctx.call_id(&[]), key),
            _ => return ctx.usage("delete-user-data-pair <id> <key>"),
        };
        let Some(id) = id else {
            return ctx.usage("delete-user-data-pair <id> <key>");
        };

        ctx.say(format!(
            "Sending delete-user-data-pair for call [{}] and key [{}]...",
            id, key
        ))?;
        ctx.api.delete_user_data_pair(&id, key).await?;
        Ok(Outcome::Continue)
    }
}

/// Broadcast a user event, optionally tied to a call by uuid
pub struct SendUserEvent;

#[async_trait]
impl Command for SendUserEvent {
    fn names(&self) -> &'static [&'static str] {
        &["send-user-event", "sue"]
    }

    fn synopsis(&self) -> &'static str {
        "<key> <value> [callUuid]"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        let (key, value, call_uuid) = match args {
            [key, value] => (key, value, None),
            [key, value, uuid] => (key, value, Some(uuid.as_str())),
            _ => return ctx.usage(&self.usage()),
        };

        match call_uuid {
            Some(uuid) => ctx.say(format!(
                "Sending send-user-event [{}={}] for callUuid [{}]...",
                key, value, uuid
            ))?,
            None => ctx.say(format!("Sending send-user-event [{}={}]...", key, value))?,
        }
        ctx.api
            .send_user_event(&[KvPair::string(key, value)], call_uuid)
            .await?;
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_synopsis_follows_label() {
        assert_eq!(
            TargetCommand(TargetOp::Merge).help_line(),
            "merge [id] <otherConnId>"
        );
        assert_eq!(
            TargetCommand(TargetOp::SendDtmf).help_line(),
            "send-dtmf|dtmf [id] <digits>"
        );
        assert_eq!(
            TargetCommand(TargetOp::InitiateTransfer).help_line(),
            "initiate-transfer|it [id] <destination>"
        );
    }

    #[test]
    fn test_recording_aliases() {
        assert_eq!(CallOp::StopRecording.names(), &["stop-recording", "str"]);
        assert_eq!(CallCommand(CallOp::Clear).name(), "clear-call");
    }
}
