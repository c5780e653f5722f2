//! Checks run before a command's handler.
//!
//! A check is a predicate over the [`SlashCommandContext`] plus the reason
//! shown to the user when it fails. The dispatcher evaluates every check of
//! a command in order; if any fail, the handler is skipped and the user gets
//! an embed listing each failure reason.

use std::{fmt, sync::Arc};

use twilight_model::guild::Permissions;

use crate::{context::SlashCommandContext, ext::PermissionsExt, markdown::markdown};

const NO_REASON: &str = "no reason provided";

type Predicate = dyn Fn(&SlashCommandContext) -> Result<(), String> + Send + Sync;

/// A single pre-execution check.
#[derive(Clone)]
pub struct Check {
    predicate: Arc<Predicate>,
    reason: String,
}

impl Check {
    /// A check that fails with `reason` when `predicate` returns `false`.
    pub fn new<F>(reason: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&SlashCommandContext) -> bool + Send + Sync + 'static,
    {
        let reason = reason.into();
        let failure = reason.clone();
        Self {
            predicate: Arc::new(move |ctx| {
                if predicate(ctx) {
                    Ok(())
                } else {
                    Err(failure.clone())
                }
            }),
            reason,
        }
    }

    /// A check that works out its own failure reason.
    pub fn dynamic<F>(predicate: F) -> Self
    where
        F: Fn(&SlashCommandContext) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            reason: NO_REASON.to_string(),
        }
    }

    /// The static reason. Dynamic checks report theirs from [`evaluate`](Self::evaluate).
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// `Err` carries the reason to show the user.
    pub fn evaluate(&self, ctx: &SlashCommandContext) -> Result<(), String> {
        (self.predicate)(ctx)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

/// Evaluate `checks` in order and collect the reason of every failure.
pub fn run_checks(checks: &[Check], ctx: &SlashCommandContext) -> Vec<String> {
    checks
        .iter()
        .filter_map(|check| check.evaluate(ctx).err())
        .collect()
}

/// Collects the checks of one command.
#[derive(Debug, Clone, Default)]
pub struct ChecksBuilder {
    checks: Vec<Check>,
}

impl ChecksBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check: Check) -> &mut Self {
        self.checks.push(check);
        self
    }

    pub fn check<F>(&mut self, reason: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(&SlashCommandContext) -> bool + Send + Sync + 'static,
    {
        self.add(Check::new(reason, predicate))
    }

    pub fn check_with<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&SlashCommandContext) -> Result<(), String> + Send + Sync + 'static,
    {
        self.add(Check::dynamic(predicate))
    }

    /// The invoking member must have the Administrator permission.
    pub fn require_user_administrator(&mut self) -> &mut Self {
        self.check_with(|ctx| {
            let is_admin = ctx
                .member_permissions()
                .is_some_and(|p| p.contains(Permissions::ADMINISTRATOR));
            if is_admin {
                Ok(())
            } else {
                Err(ctx.settings().check_user_not_admin.clone())
            }
        })
    }

    /// The invoking user must own the application, or be on its team.
    pub fn require_user_application_owner(&mut self) -> &mut Self {
        self.check_with(|ctx| {
            let is_owner = ctx
                .user_id()
                .is_some_and(|id| ctx.application_owners().contains(&id));
            if is_owner {
                Ok(())
            } else {
                Err(ctx.settings().check_user_not_owner.clone())
            }
        })
    }

    /// The invoking member must hold every permission in `required`.
    /// Administrators pass regardless.
    pub fn require_user_permission(&mut self, required: Permissions) -> &mut Self {
        self.check_with(move |ctx| {
            let Some(granted) = ctx.member_permissions() else {
                return Err("User not in a guild.".to_string());
            };
            if granted.contains(Permissions::ADMINISTRATOR) {
                return Ok(());
            }
            let missing = required - granted;
            if missing.is_empty() {
                Ok(())
            } else {
                Err(format!(
                    "User does not have the following permissions: {}",
                    markdown(missing.display_names().join(", ")).inline_code()
                ))
            }
        })
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn build(self) -> Vec<Check> {
        self.checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::{slash_context, Invoker};
    use twilight_model::id::Id;

    fn build(func: impl FnOnce(&mut ChecksBuilder)) -> Vec<Check> {
        let mut b = ChecksBuilder::new();
        func(&mut b);
        b.build()
    }

    #[test]
    fn static_check_reports_its_reason() {
        let check = Check::new("User is a bot.", |ctx| {
            !ctx.user().is_some_and(|u| u.bot)
        });
        assert_eq!(check.reason(), "User is a bot.");

        let human = slash_context(Invoker::member(1, Permissions::empty()));
        assert_eq!(check.evaluate(&human), Ok(()));

        let bot = slash_context(Invoker::bot(2));
        assert_eq!(check.evaluate(&bot), Err("User is a bot.".to_string()));
    }

    #[test]
    fn dynamic_check_defaults_reason() {
        let check = Check::dynamic(|_| Err("computed".into()));
        assert_eq!(check.reason(), NO_REASON);
        let ctx = slash_context(Invoker::member(1, Permissions::empty()));
        assert_eq!(check.evaluate(&ctx), Err("computed".to_string()));
    }

    #[test]
    fn run_checks_collects_every_failure_in_order() {
        let checks = build(|c| {
            c.check("first", |_| false)
                .check("passes", |_| true)
                .check("second", |_| false);
        });
        let ctx = slash_context(Invoker::member(1, Permissions::empty()));
        assert_eq!(run_checks(&checks, &ctx), ["first", "second"]);
    }

    #[test]
    fn run_checks_empty_when_all_pass() {
        let checks = build(|c| {
            c.check("never", |_| true);
        });
        let ctx = slash_context(Invoker::member(1, Permissions::empty()));
        assert!(run_checks(&checks, &ctx).is_empty());
    }

    #[test]
    fn administrator_check_uses_settings_reason() {
        let checks = build(|c| {
            c.require_user_administrator();
        });

        let admin = slash_context(Invoker::member(1, Permissions::ADMINISTRATOR));
        assert!(run_checks(&checks, &admin).is_empty());

        let pleb = slash_context(Invoker::member(1, Permissions::SEND_MESSAGES));
        assert_eq!(
            run_checks(&checks, &pleb),
            ["User does not have the Administrator permission."]
        );

        let dm = slash_context(Invoker::dm(1));
        assert_eq!(run_checks(&checks, &dm).len(), 1);
    }

    #[test]
    fn owner_check_uses_application_owners() {
        let checks = build(|c| {
            c.require_user_application_owner();
        });

        let owner = slash_context(Invoker::member(10, Permissions::empty()))
            .with_owners(vec![Id::new(10)]);
        assert!(run_checks(&checks, &owner).is_empty());

        let stranger = slash_context(Invoker::member(11, Permissions::empty()))
            .with_owners(vec![Id::new(10)]);
        assert_eq!(
            run_checks(&checks, &stranger),
            ["User is not an owner of the Application."]
        );
    }

    #[test]
    fn permission_check_lists_missing_permissions() {
        let checks = build(|c| {
            c.require_user_permission(Permissions::MANAGE_MESSAGES | Permissions::KICK_MEMBERS);
        });

        let partial = slash_context(Invoker::member(1, Permissions::MANAGE_MESSAGES));
        assert_eq!(
            run_checks(&checks, &partial),
            ["User does not have the following permissions: `Kick Members`"]
        );

        let full = slash_context(Invoker::member(
            1,
            Permissions::MANAGE_MESSAGES | Permissions::KICK_MEMBERS,
        ));
        assert!(run_checks(&checks, &full).is_empty());

        let admin = slash_context(Invoker::member(1, Permissions::ADMINISTRATOR));
        assert!(run_checks(&checks, &admin).is_empty());
    }

    #[test]
    fn permission_check_fails_outside_guilds() {
        let checks = build(|c| {
            c.require_user_permission(Permissions::MANAGE_MESSAGES);
        });
        let dm = slash_context(Invoker::dm(1));
        assert_eq!(run_checks(&checks, &dm), ["User not in a guild."]);
    }
}
