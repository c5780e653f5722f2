//! Demo bot.
//!
//! Registers a handful of commands showing off options, checks, buttons and
//! selection menus, then hands control to [`slashcord::bot::start`].
//! Needs `DISCORD_TOKEN` in the environment or a `.env` file.

use slashcord::prelude::*;
use tracing::{error, info};

// ---------------------------------------------------------------------------
// /say
// ---------------------------------------------------------------------------

/// Repeats the given text in an embed, with a button only the invoker can
/// use to delete it.
struct Say {
    definition: CommandDefinition,
}

impl Say {
    fn new() -> Self {
        let definition = CommandDefinition::new("say", "Bot repeats what you tell it to.")
            .options(|o| {
                o.required_string("content", "What to say").max_length(2000);
            })
            .checks(|c| {
                c.check("User is a bot.", |ctx| !ctx.user().is_some_and(|u| u.bot));
            })
            .buttons(|b, ctx| {
                b.danger(&ctx.owned_component_id().action("delete"), "Delete");
            });
        Self { definition }
    }
}

#[async_trait]
impl SlashCommand for Say {
    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    async fn handle_slash_command(
        &self,
        ctx: &SlashCommandContext,
    ) -> anyhow::Result<CommandResult> {
        let content: String = ctx.option_value("content")?;
        let author = ctx.user().map(|u| u.name.clone()).unwrap_or_default();
        Ok(ctx
            .result()
            .embed(|e| e.description(content).footer(format!("Said by {author}")))
            .with_command_buttons())
    }

    async fn handle_button_click(&self, ctx: &ButtonClickContext) -> anyhow::Result<()> {
        let id = ctx.parsed_id();
        if id.action_part() != Some("delete") {
            ctx.ack().await?;
            return Ok(());
        }

        let invoker = ctx.user_id().map(|u| u.to_string());
        if id.user_part() != invoker.as_deref() {
            ctx.respond(
                CommandResult::new()
                    .content("Only the person who used /say can delete this.")
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }

        ctx.ack().await?;
        ctx.delete_message().await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// /color
// ---------------------------------------------------------------------------

const PALETTE: &[(&str, u32)] = &[
    ("Red", colors::RED),
    ("Green", colors::GREEN),
    ("Blue", colors::BLUE),
    ("Orange", colors::ORANGE),
    ("Blurple", colors::BLURPLE),
];

/// Recolors its own embed from a selection menu.
struct Color {
    definition: CommandDefinition,
}

impl Color {
    fn new() -> Self {
        let definition = CommandDefinition::new("color", "Pick a color for an embed.")
            .selection_menus(|m, ctx| {
                m.menu(&ctx.owned_component_id().action("pick"), |menu| {
                    menu.placeholder("Pick a color");
                    for (name, value) in PALETTE {
                        menu.option(*name, format!("{value:06X}"));
                    }
                });
            });
        Self { definition }
    }
}

#[async_trait]
impl SlashCommand for Color {
    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    async fn handle_slash_command(
        &self,
        ctx: &SlashCommandContext,
    ) -> anyhow::Result<CommandResult> {
        Ok(ctx
            .result()
            .embed(|e| e.title("Colors").description("Pick one below."))
            .with_command_menus())
    }

    async fn handle_selection_menu(&self, ctx: &SelectionMenuContext) -> anyhow::Result<()> {
        let Some(hex) = ctx.selected_values().first() else {
            return Ok(ctx.ack().await?);
        };
        let color = u32::from_str_radix(hex, 16)?;
        ctx.edit_message_embed(|e| {
            let picked = markdown(format!("#{hex}")).inline_code();
            e.title("Colors")
                .description(format!("You picked {picked}."))
                .color(color)
        })
        .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// /admin-echo
// ---------------------------------------------------------------------------

/// Echoes text back, for administrators only.
struct AdminEcho {
    definition: CommandDefinition,
}

impl AdminEcho {
    fn new() -> Self {
        let definition = CommandDefinition::new("admin-echo", "Echo text, administrators only.")
            .options(|o| {
                o.required_string("content", "What to echo");
                o.optional_boolean("secret", "Only show it to you");
            })
            .checks(|c| {
                c.require_user_administrator();
            });
        Self { definition }
    }
}

#[async_trait]
impl SlashCommand for AdminEcho {
    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    async fn handle_slash_command(
        &self,
        ctx: &SlashCommandContext,
    ) -> anyhow::Result<CommandResult> {
        let content: String = ctx.option_value("content")?;
        let secret = ctx.option_or("secret", false)?;
        Ok(ctx.result().content(content).ephemeral(secret))
    }
}

// ---------------------------------------------------------------------------
// /roll
// ---------------------------------------------------------------------------

/// Rolls a die and offers a reroll button carrying the number of sides.
struct Roll {
    definition: CommandDefinition,
}

impl Roll {
    const DEFAULT_SIDES: i64 = 6;

    fn new() -> Self {
        let definition = CommandDefinition::new("roll", "Roll a die.")
            .options(|o| {
                o.optional_integer("sides", "Number of sides (default: 6)")
                    .min_value(2)
                    .max_value(1000);
            });
        Self { definition }
    }

    fn roll(sides: i64) -> i64 {
        (rand::random::<u32>() as i64 % sides) + 1
    }

    fn text(sides: i64) -> String {
        format!("Rolling a d{sides}... {}!", markdown(Self::roll(sides).to_string()).bold())
    }
}

#[async_trait]
impl SlashCommand for Roll {
    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    async fn handle_slash_command(
        &self,
        ctx: &SlashCommandContext,
    ) -> anyhow::Result<CommandResult> {
        let sides = ctx.option_or("sides", Self::DEFAULT_SIDES)?;
        let reroll = ctx.owned_component_id().action("reroll").value(sides);
        Ok(ctx.result().content(Self::text(sides)).buttons(|b| {
            b.secondary_emoji(&reroll, unicode_emoji("🎲"));
        }))
    }

    async fn handle_button_click(&self, ctx: &ButtonClickContext) -> anyhow::Result<()> {
        let sides = ctx
            .parsed_id()
            .value_part()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_SIDES)
            .clamp(2, 1000);
        ctx.edit_message(Self::text(sides)).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn config() -> ClientConfig {
    ClientConfig::of(|c| {
        c.command(Say::new())
            .command(Color::new())
            .command(AdminEcho::new())
            .command(Roll::new());
    })
}

#[tokio::main]
async fn main() {
    slashcord::bot::init_tracing();
    info!("starting demo bot");

    if let Err(e) = slashcord::bot::start(config()).await {
        error!(error = %format!("{e:#}"), "bot stopped with an error");
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_commands_are_all_registered() {
        let config = config();
        let names: Vec<_> = config
            .all_commands()
            .iter()
            .map(|c| c.definition().name())
            .collect();
        assert_eq!(names, ["say", "color", "admin-echo", "roll"]);
        assert_eq!(config.guild_commands().count(), 0);
    }

    #[test]
    fn say_requires_content() {
        let say = Say::new();
        let options = say.definition().option_list();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].required, Some(true));
        assert_eq!(options[0].max_length, Some(2000));
        assert_eq!(say.definition().check_list().len(), 1);
    }

    #[test]
    fn admin_echo_orders_required_first() {
        let echo = AdminEcho::new();
        let names: Vec<_> = echo
            .definition()
            .option_list()
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(names, ["content", "secret"]);
    }

    #[test]
    fn rolls_stay_in_range() {
        for sides in [2, 6, 1000] {
            let n = Roll::roll(sides);
            assert!((1..=sides).contains(&n));
        }
    }
}
