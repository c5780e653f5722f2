//! Buttons, selection menus and action rows.
//!
//! The helper functions construct the twilight `Component` enum variants
//! directly, hiding the per-variant struct construction. [`ButtonsBuilder`]
//! and [`MenusBuilder`] are the scopes a command's lazy component factories
//! receive; they only accept [`ComponentId`]s for interactive components so
//! that clicks can be routed back to the command.

use twilight_model::channel::message::{
    component::{
        ActionRow, Button, ButtonStyle, SelectMenu, SelectMenuOption, SelectMenuType,
    },
    Component, EmojiReactionType,
};

use crate::component_id::ComponentId;

/// Discord renders at most this many buttons in one action row.
pub const BUTTONS_PER_ROW: usize = 5;

// ===========================================================================
// Component helper functions
// ===========================================================================

/// Build an Action Row wrapping other components.
pub fn action_row(components: Vec<Component>) -> Component {
    Component::ActionRow(ActionRow { components })
}

/// Lay out buttons in rows of [`BUTTONS_PER_ROW`].
pub fn button_rows(buttons: Vec<Component>) -> Vec<Component> {
    buttons
        .chunks(BUTTONS_PER_ROW)
        .map(|chunk| action_row(chunk.to_vec()))
        .collect()
}

/// Select menus take up a whole row each.
pub fn menu_rows(menus: Vec<Component>) -> Vec<Component> {
    menus.into_iter().map(|m| action_row(vec![m])).collect()
}

/// Build an interactive button.
pub fn button(
    style: ButtonStyle,
    custom_id: impl Into<String>,
    label: Option<String>,
    emoji: Option<EmojiReactionType>,
) -> Component {
    Component::Button(Button {
        custom_id: Some(custom_id.into()),
        disabled: false,
        emoji,
        label,
        style,
        url: None,
        sku_id: None,
    })
}

/// Build a link button (no custom_id, requires url).
pub fn link_button(
    url: impl Into<String>,
    label: Option<String>,
    emoji: Option<EmojiReactionType>,
) -> Component {
    Component::Button(Button {
        custom_id: None,
        disabled: false,
        emoji,
        label,
        style: ButtonStyle::Link,
        url: Some(url.into()),
        sku_id: None,
    })
}

/// A unicode emoji for buttons and menu options.
pub fn unicode_emoji(name: impl Into<String>) -> EmojiReactionType {
    EmojiReactionType::Unicode { name: name.into() }
}

/// The custom id of an interactive component, or `None` for link buttons
/// and layout components.
pub fn custom_id(component: &Component) -> Option<&str> {
    match component {
        Component::Button(b) => b.custom_id.as_deref(),
        Component::SelectMenu(m) => Some(&m.custom_id),
        Component::TextInput(t) => Some(&t.custom_id),
        _ => None,
    }
}

// ===========================================================================
// ButtonsBuilder
// ===========================================================================

/// Collects the buttons produced by a command's button factory.
#[derive(Debug, Clone, Default)]
pub struct ButtonsBuilder {
    buttons: Vec<Component>,
}

impl ButtonsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a button of any style. Link buttons treat `id_or_url` as the url.
    pub fn create(
        &mut self,
        style: ButtonStyle,
        id_or_url: impl Into<String>,
        label: Option<String>,
        emoji: Option<EmojiReactionType>,
    ) -> &mut Self {
        let component = if style == ButtonStyle::Link {
            link_button(id_or_url, label, emoji)
        } else {
            button(style, id_or_url, label, emoji)
        };
        self.buttons.push(component);
        self
    }

    fn labelled(&mut self, style: ButtonStyle, id: &ComponentId, label: &str) -> &mut Self {
        self.create(style, id.as_str(), Some(label.to_string()), None)
    }

    fn emoji_only(
        &mut self,
        style: ButtonStyle,
        id: &ComponentId,
        emoji: EmojiReactionType,
    ) -> &mut Self {
        self.create(style, id.as_str(), None, Some(emoji))
    }

    pub fn primary(&mut self, id: &ComponentId, label: &str) -> &mut Self {
        self.labelled(ButtonStyle::Primary, id, label)
    }

    pub fn primary_emoji(&mut self, id: &ComponentId, emoji: EmojiReactionType) -> &mut Self {
        self.emoji_only(ButtonStyle::Primary, id, emoji)
    }

    pub fn secondary(&mut self, id: &ComponentId, label: &str) -> &mut Self {
        self.labelled(ButtonStyle::Secondary, id, label)
    }

    pub fn secondary_emoji(&mut self, id: &ComponentId, emoji: EmojiReactionType) -> &mut Self {
        self.emoji_only(ButtonStyle::Secondary, id, emoji)
    }

    pub fn success(&mut self, id: &ComponentId, label: &str) -> &mut Self {
        self.labelled(ButtonStyle::Success, id, label)
    }

    pub fn success_emoji(&mut self, id: &ComponentId, emoji: EmojiReactionType) -> &mut Self {
        self.emoji_only(ButtonStyle::Success, id, emoji)
    }

    pub fn danger(&mut self, id: &ComponentId, label: &str) -> &mut Self {
        self.labelled(ButtonStyle::Danger, id, label)
    }

    pub fn danger_emoji(&mut self, id: &ComponentId, emoji: EmojiReactionType) -> &mut Self {
        self.emoji_only(ButtonStyle::Danger, id, emoji)
    }

    pub fn link(&mut self, url: &str, label: &str) -> &mut Self {
        self.create(ButtonStyle::Link, url, Some(label.to_string()), None)
    }

    pub fn link_emoji(&mut self, url: &str, emoji: EmojiReactionType) -> &mut Self {
        self.create(ButtonStyle::Link, url, None, Some(emoji))
    }

    /// Disable the most recently added button.
    pub fn disabled(&mut self) -> &mut Self {
        if let Some(Component::Button(b)) = self.buttons.last_mut() {
            b.disabled = true;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn build(self) -> Vec<Component> {
        self.buttons
    }
}

// ===========================================================================
// MenusBuilder
// ===========================================================================

/// One option of a text select menu.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub description: Option<String>,
    pub emoji: Option<EmojiReactionType>,
    pub default: bool,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
            emoji: None,
            default: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn emoji(mut self, emoji: EmojiReactionType) -> Self {
        self.emoji = Some(emoji);
        self
    }

    pub fn default_selected(mut self) -> Self {
        self.default = true;
        self
    }
}

impl From<SelectOption> for SelectMenuOption {
    fn from(o: SelectOption) -> Self {
        SelectMenuOption {
            default: o.default,
            description: o.description,
            emoji: o.emoji,
            label: o.label,
            value: o.value,
        }
    }
}

/// Configures one text select menu.
#[derive(Debug, Clone)]
pub struct SelectMenuBuilder {
    custom_id: String,
    placeholder: Option<String>,
    min_values: Option<u8>,
    max_values: Option<u8>,
    disabled: bool,
    options: Vec<SelectMenuOption>,
}

impl SelectMenuBuilder {
    pub fn new(custom_id: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            placeholder: None,
            min_values: None,
            max_values: None,
            disabled: false,
            options: Vec::new(),
        }
    }

    pub fn placeholder(&mut self, text: impl Into<String>) -> &mut Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn min_values(&mut self, min: u8) -> &mut Self {
        self.min_values = Some(min);
        self
    }

    pub fn max_values(&mut self, max: u8) -> &mut Self {
        self.max_values = Some(max);
        self
    }

    pub fn disabled(&mut self, disabled: bool) -> &mut Self {
        self.disabled = disabled;
        self
    }

    pub fn option(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.option_with(SelectOption::new(label, value))
    }

    pub fn option_with(&mut self, option: SelectOption) -> &mut Self {
        self.options.push(option.into());
        self
    }

    pub fn build(self) -> Component {
        Component::SelectMenu(SelectMenu {
            channel_types: None,
            custom_id: self.custom_id,
            default_values: None,
            disabled: self.disabled,
            kind: SelectMenuType::Text,
            max_values: self.max_values,
            min_values: self.min_values,
            options: Some(self.options),
            placeholder: self.placeholder,
        })
    }
}

/// Collects the selection menus produced by a command's menu factory.
#[derive(Debug, Clone, Default)]
pub struct MenusBuilder {
    menus: Vec<Component>,
}

impl MenusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn menu(
        &mut self,
        id: &ComponentId,
        func: impl FnOnce(&mut SelectMenuBuilder),
    ) -> &mut Self {
        let mut builder = SelectMenuBuilder::new(id.as_str());
        func(&mut builder);
        self.menus.push(builder.build());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    pub fn build(self) -> Vec<Component> {
        self.menus
    }
}
