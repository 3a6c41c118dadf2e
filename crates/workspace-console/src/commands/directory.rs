// ABOUTME: Directory lookup: target-search
// ABOUTME: Prints the raw search result as JSON

use anyhow::Result;
use async_trait::async_trait;

use super::{Command, CommandRegistry, Context, Outcome};
use crate::render::pretty_json;

pub fn register(registry: &mut CommandRegistry) {
    registry.register(TargetSearch);
}

pub struct TargetSearch;

#[async_trait]
impl Command for TargetSearch {
    fn names(&self) -> &'static [&'static str] {
        &["target-search", "ts"]
    }

    fn synopsis(&self) -> &'static str {
        "<searchTerm> [limit]"
    }

    async fn execute(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<Outcome> {
        let (term, limit) = match args {
            [term] => (term, None),
            [term, limit] => match limit.parse::<u32>() {
                Ok(limit) => (term, Some(limit)),
                Err(_) => return ctx.usage(&self.usage()),
            },
            _ => return ctx.usage(&self.usage()),
        };

        match limit {
            Some(limit) => ctx.say(format!(
                "Searching targets with searchTerm [{}] and limit [{}]...",
                term, limit
            ))?,
            None => ctx.say(format!("Searching targets with searchTerm [{}]...", term))?,
        }
        let targets = ctx.api.search_targets(term, limit).await?;
        ctx.say(format!("Search results:\n{}", pretty_json(&targets)?))?;
        Ok(Outcome::Continue)
    }
}
