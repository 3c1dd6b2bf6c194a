//! Game state and its transitions.
//!
//! `known` is the single source of truth: every discovered element, in
//! discovery order. The crafting area only stores names and is rendered by
//! looking them up in `known`, so a flag set on an element shows up in both
//! the sidebar and the crafting area.
//!
//! Card lifecycle while delete mode is on:
//!
//! ```text
//!   normal ──click──► marked ──click──► normal
//!                       │
//!              leave delete mode
//!                       ▼
//!                    removed
//! ```

use craft_config::{ClientConfig, DeleteScope};
use craft_core::{initial_elements, Element};
use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

/// A discovered element plus its transient "just found" badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownElement {
    pub element: Element,
    pub is_new: bool,
    /// Which `ScheduleExpireNew` owns the current badge.
    badge: u64,
}

impl KnownElement {
    fn settled(element: Element) -> Self {
        Self {
            element,
            is_new: false,
            badge: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.element.name
    }
}

/// Sidebar ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Discovery order
    #[default]
    Time,
    Name,
    Emoji,
}

impl SortMode {
    pub fn next(&self) -> Self {
        match self {
            Self::Time => Self::Name,
            Self::Name => Self::Emoji,
            Self::Emoji => Self::Time,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "time" | "discovery" => Some(Self::Time),
            "name" => Some(Self::Name),
            "emoji" => Some(Self::Emoji),
            _ => None,
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time => write!(f, "time"),
            Self::Name => write!(f, "name"),
            Self::Emoji => write!(f, "emoji"),
        }
    }
}

/// Timing and delete behavior
#[derive(Debug, Clone)]
pub struct Settings {
    pub new_badge: Duration,
    pub error_banner: Duration,
    pub delete_scope: DeleteScope,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for Settings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            new_badge: Duration::from_secs(config.new_badge_secs),
            error_banner: Duration::from_secs(config.error_banner_secs),
            delete_scope: config.delete_scope,
        }
    }
}

/// Everything that can happen to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start from saved elements, or the built-in set when there are none.
    Load(Option<Vec<Element>>),
    /// Click on a card in the crafting area.
    ClickCard(String),
    /// Click on a sidebar entry.
    SidebarClick(String),
    DragStart(String),
    /// Release the dragged card on `target`.
    Drop(String),
    CombineSucceeded {
        inputs: [String; 2],
        element: Element,
    },
    CombineFailed {
        inputs: [String; 2],
        message: String,
    },
    /// Badge timer fired. Ignored unless `badge` is still the element's
    /// current one.
    ExpireNew { name: String, badge: u64 },
    DismissError,
    /// Saving discoveries failed; shown like a failed combine.
    PersistFailed(String),
    /// Enter delete mode, or confirm and leave it.
    ToggleDeleteMode,
    ClearCraftingArea,
    Reset,
    CycleSort,
}

/// Work the owner of the state has to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RequestCombine { first: String, second: String },
    /// Overwrite the saved element list.
    Persist(Vec<Element>),
    ScheduleExpireNew {
        name: String,
        badge: u64,
        after: Duration,
    },
    ScheduleDismissError { after: Duration },
}

#[derive(Debug, Clone)]
pub struct CraftState {
    known: Vec<KnownElement>,
    crafting: Vec<String>,
    selected: Option<String>,
    dragged: Option<String>,
    delete_mode: bool,
    marked: Vec<String>,
    sort: SortMode,
    error: Option<String>,
    badge_seq: u64,
    settings: Settings,
}

impl Default for CraftState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl CraftState {
    /// Fresh state holding the built-in elements.
    pub fn new(settings: Settings) -> Self {
        let mut state = Self {
            known: Vec::new(),
            crafting: Vec::new(),
            selected: None,
            dragged: None,
            delete_mode: false,
            marked: Vec::new(),
            sort: SortMode::Time,
            error: None,
            badge_seq: 0,
            settings,
        };
        state.replace_all(initial_elements());
        state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn dragged(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    pub fn delete_mode(&self) -> bool {
        self.delete_mode
    }

    pub fn is_marked(&self, name: &str) -> bool {
        self.marked.iter().any(|m| m == name)
    }

    pub fn marked(&self) -> &[String] {
        &self.marked
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.sort = sort;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn known(&self, name: &str) -> Option<&KnownElement> {
        self.known.iter().find(|k| k.name() == name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known(name).is_some()
    }

    pub fn in_crafting(&self, name: &str) -> bool {
        self.crafting.iter().any(|c| c == name)
    }

    /// Known elements in discovery order, without badges.
    pub fn known_elements(&self) -> Vec<Element> {
        self.known.iter().map(|k| k.element.clone()).collect()
    }

    /// Names in the crafting area, in placement order.
    pub fn crafting_names(&self) -> &[String] {
        &self.crafting
    }

    /// Crafting area cards resolved against the known set.
    pub fn crafting_view(&self) -> Vec<&KnownElement> {
        self.crafting
            .iter()
            .filter_map(|name| self.known(name))
            .collect()
    }

    /// Sidebar entries in the current sort order.
    pub fn sidebar_view(&self) -> Vec<&KnownElement> {
        let mut view: Vec<&KnownElement> = self.known.iter().collect();
        match self.sort {
            SortMode::Time => {}
            SortMode::Name => view.sort_by(|a, b| compare_names(&a.element.name, &b.element.name)),
            SortMode::Emoji => view.sort_by(|a, b| a.element.emoji.cmp(&b.element.emoji)),
        }
        view
    }

    /// Apply one action and return the effects it requires.
    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Load(saved) => {
                let elements = saved
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(initial_elements);
                self.replace_all(elements);
                Vec::new()
            }
            Action::ClickCard(name) => self.click_card(name),
            Action::SidebarClick(name) => {
                if self.is_known(&name) && !self.in_crafting(&name) {
                    self.crafting.push(name);
                }
                Vec::new()
            }
            Action::DragStart(name) => {
                if self.in_crafting(&name) {
                    self.dragged = Some(name);
                }
                Vec::new()
            }
            Action::Drop(target) => match self.dragged.take() {
                Some(dragged) if dragged != target && self.in_crafting(&target) => {
                    vec![Effect::RequestCombine {
                        first: dragged,
                        second: target,
                    }]
                }
                _ => Vec::new(),
            },
            Action::CombineSucceeded { inputs, element } => self.merge(inputs, element),
            Action::CombineFailed { message, .. } => self.show_error(message),
            Action::PersistFailed(message) => {
                self.show_error(format!("Could not save discoveries: {}", message))
            }
            Action::ExpireNew { name, badge } => {
                if let Some(known) = self
                    .known
                    .iter_mut()
                    .find(|k| k.element.name == name && k.badge == badge)
                {
                    known.is_new = false;
                }
                Vec::new()
            }
            Action::DismissError => {
                self.error = None;
                Vec::new()
            }
            Action::ToggleDeleteMode => self.toggle_delete_mode(),
            Action::ClearCraftingArea => {
                self.crafting.clear();
                self.selected = None;
                self.dragged = None;
                self.marked.clear();
                Vec::new()
            }
            Action::Reset => {
                let elements = initial_elements();
                self.replace_all(elements.clone());
                vec![Effect::Persist(elements)]
            }
            Action::CycleSort => {
                self.sort = self.sort.next();
                Vec::new()
            }
        }
    }

    fn click_card(&mut self, name: String) -> Vec<Effect> {
        if !self.in_crafting(&name) {
            return Vec::new();
        }

        if self.delete_mode {
            if let Some(pos) = self.marked.iter().position(|m| *m == name) {
                self.marked.remove(pos);
            } else {
                self.marked.push(name);
            }
            return Vec::new();
        }

        match self.selected.take() {
            Some(first) => vec![Effect::RequestCombine {
                first,
                second: name,
            }],
            None => {
                self.selected = Some(name);
                Vec::new()
            }
        }
    }

    fn show_error(&mut self, message: String) -> Vec<Effect> {
        self.error = Some(message);
        vec![Effect::ScheduleDismissError {
            after: self.settings.error_banner,
        }]
    }

    fn merge(&mut self, inputs: [String; 2], element: Element) -> Vec<Effect> {
        let name = element.name.clone();
        let mut badged = false;

        if !self.is_known(&name) {
            self.known.push(KnownElement::settled(element));
            badged = true;
        }

        if !self.in_crafting(&name) {
            self.crafting.retain(|c| !inputs.contains(c));
            self.crafting.push(name.clone());
            badged = true;
        }

        let mut effects = vec![Effect::Persist(self.known_elements())];
        if badged {
            self.badge_seq += 1;
            let badge = self.badge_seq;
            if let Some(known) = self.known.iter_mut().find(|k| k.element.name == name) {
                known.is_new = true;
                known.badge = badge;
            }
            effects.push(Effect::ScheduleExpireNew {
                name,
                badge,
                after: self.settings.new_badge,
            });
        }
        effects
    }

    fn toggle_delete_mode(&mut self) -> Vec<Effect> {
        if !self.delete_mode {
            self.delete_mode = true;
            self.marked.clear();
            self.selected = None;
            return Vec::new();
        }

        self.delete_mode = false;
        let marked = std::mem::take(&mut self.marked);
        if marked.is_empty() {
            return Vec::new();
        }

        self.crafting.retain(|c| !marked.contains(c));
        match self.settings.delete_scope {
            DeleteScope::CraftingArea => Vec::new(),
            DeleteScope::Everywhere => {
                self.known.retain(|k| !marked.contains(&k.element.name));
                vec![Effect::Persist(self.known_elements())]
            }
        }
    }

    /// Replace everything with `elements`, all placed in the crafting area.
    fn replace_all(&mut self, elements: Vec<Element>) {
        self.known.clear();
        for element in elements {
            if !self.is_known(&element.name) {
                self.known.push(KnownElement::settled(element));
            }
        }
        self.crafting = self.known.iter().map(|k| k.element.name.clone()).collect();
        self.selected = None;
        self.dragged = None;
        self.delete_mode = false;
        self.marked.clear();
        self.error = None;
    }
}

/// Case-insensitive first, exact order as tie-break.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
