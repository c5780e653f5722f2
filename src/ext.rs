//! Extension traits for twilight-model types.
//!
//! These add the ergonomic helpers command code keeps reaching for but that
//! twilight intentionally leaves out of its plain data types.

use twilight_model::{
    application::{
        command::{
            CommandOption, CommandOptionChoice, CommandOptionChoiceValue, CommandOptionValue,
        },
        interaction::Interaction,
    },
    channel::ChannelType,
    guild::Permissions,
    id::{marker::UserMarker, Id},
    user::User,
};

// ===========================================================================
// CommandOptionExt
// ===========================================================================

/// In-place customisation of a [`CommandOption`], returned by the
/// [`OptionsBuilder`](crate::options::OptionsBuilder) methods.
pub trait CommandOptionExt {
    /// Add string choices as `(name, value)` pairs.
    fn choices<N, V>(&mut self, pairs: impl IntoIterator<Item = (N, V)>) -> &mut Self
    where
        N: Into<String>,
        V: Into<String>;

    /// Add string choices whose name and value are the same.
    fn string_choices<S: Into<String>>(&mut self, values: impl IntoIterator<Item = S>)
        -> &mut Self;

    /// Add integer choices as `(name, value)` pairs.
    fn int_choices<N: Into<String>>(&mut self, pairs: impl IntoIterator<Item = (N, i64)>)
        -> &mut Self;

    fn min_value(&mut self, min: i64) -> &mut Self;
    fn max_value(&mut self, max: i64) -> &mut Self;
    fn min_length(&mut self, min: u16) -> &mut Self;
    fn max_length(&mut self, max: u16) -> &mut Self;

    /// Restrict a channel option to the given channel kinds.
    fn channel_types(&mut self, kinds: impl IntoIterator<Item = ChannelType>) -> &mut Self;

    fn autocomplete(&mut self, enabled: bool) -> &mut Self;
}

fn push_choice(option: &mut CommandOption, name: String, value: CommandOptionChoiceValue) {
    option
        .choices
        .get_or_insert_with(Vec::new)
        .push(CommandOptionChoice {
            name,
            name_localizations: None,
            value,
        });
}

impl CommandOptionExt for CommandOption {
    fn choices<N, V>(&mut self, pairs: impl IntoIterator<Item = (N, V)>) -> &mut Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        for (name, value) in pairs {
            push_choice(self, name.into(), CommandOptionChoiceValue::String(value.into()));
        }
        self
    }

    fn string_choices<S: Into<String>>(
        &mut self,
        values: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        self.choices(values.into_iter().map(|v| {
            let v = v.into();
            (v.clone(), v)
        }))
    }

    fn int_choices<N: Into<String>>(
        &mut self,
        pairs: impl IntoIterator<Item = (N, i64)>,
    ) -> &mut Self {
        for (name, value) in pairs {
            push_choice(self, name.into(), CommandOptionChoiceValue::Integer(value));
        }
        self
    }

    fn min_value(&mut self, min: i64) -> &mut Self {
        self.min_value = Some(CommandOptionValue::Integer(min));
        self
    }

    fn max_value(&mut self, max: i64) -> &mut Self {
        self.max_value = Some(CommandOptionValue::Integer(max));
        self
    }

    fn min_length(&mut self, min: u16) -> &mut Self {
        self.min_length = Some(min);
        self
    }

    fn max_length(&mut self, max: u16) -> &mut Self {
        self.max_length = Some(max);
        self
    }

    fn channel_types(&mut self, kinds: impl IntoIterator<Item = ChannelType>) -> &mut Self {
        self.channel_types = Some(kinds.into_iter().collect());
        self
    }

    fn autocomplete(&mut self, enabled: bool) -> &mut Self {
        self.autocomplete = Some(enabled);
        self
    }
}

// ===========================================================================
// InteractionExt
// ===========================================================================

/// Convenience methods on [`Interaction`].
pub trait InteractionExt {
    /// The user who triggered the interaction.
    ///
    /// In a guild context, the user is nested inside `member`. In a DM, the
    /// user is at the top level. This helper checks both.
    fn invoker(&self) -> Option<&User>;

    fn invoker_id(&self) -> Option<Id<UserMarker>> {
        self.invoker().map(|u| u.id)
    }
}

impl InteractionExt for Interaction {
    fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }
}

// ===========================================================================
// PermissionsExt
// ===========================================================================

/// Human readable permission names.
pub trait PermissionsExt {
    /// `MANAGE_MESSAGES | BAN_MEMBERS` → `["Manage Messages", "Ban Members"]`.
    fn display_names(&self) -> Vec<String>;
}

impl PermissionsExt for Permissions {
    fn display_names(&self) -> Vec<String> {
        self.iter_names().map(|(name, _)| title_case(name)).collect()
    }
}

fn title_case(flag: &str) -> String {
    flag.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
