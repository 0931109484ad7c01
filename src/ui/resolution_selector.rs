//! Custom resolution dropdown.
//!
//! State changes go through [`SelectorState::apply`], a pure `(state, event) -> state`
//! function. [`ResolutionSelector`] owns the state plus the trigger geometry and pushes
//! every change to a [`SelectorSurface`], which is where pixels actually happen.

use iced::{Rectangle, Size};

use crate::domain::ResolutionOption;

const OPTIONS_GAP: f32 = 8.0;
const BOTTOM_MARGIN: f32 = 24.0;
const MIN_USABLE_HEIGHT: f32 = 80.0;
const FALLBACK_MAX_HEIGHT: f32 = 180.0;
const MAX_VIEWPORT_SHARE: f32 = 0.6;

/// Where the option list goes on screen, in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub max_height: f32,
}

impl Placement {
    /// Anchored just below `trigger`, never taller than the room left in `viewport`.
    pub fn below(trigger: Rectangle, viewport: Size) -> Self {
        let bottom = trigger.y + trigger.height;
        let available = viewport.height - bottom - BOTTOM_MARGIN;
        let max_height = if available > MIN_USABLE_HEIGHT {
            available.min(viewport.height * MAX_VIEWPORT_SHARE)
        } else {
            FALLBACK_MAX_HEIGHT
        };

        Self {
            left: trigger.x,
            top: bottom + OPTIONS_GAP,
            width: trigger.width,
            max_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEvent {
    Populate(Vec<ResolutionOption>),
    Select(String),
    Open,
    Close,
    Toggle,
    /// Click on the option row at this index. Never reaches outside-click handling.
    OptionClicked(usize),
    OutsideClicked,
    Resized { viewport: Size, trigger: Rectangle },
    Scrolled { trigger: Rectangle },
    /// Fresh trigger bounds measured from the laid-out widget tree.
    TriggerMoved(Rectangle),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorState {
    pub options: Vec<ResolutionOption>,
    /// `None` iff `options` is empty.
    pub selected_value: Option<String>,
    /// Row holding `selected_value`; labels can repeat, so the value alone is ambiguous.
    selected_index: Option<usize>,
    pub is_open: bool,
}

impl SelectorState {
    pub fn apply(self, event: SelectorEvent) -> Self {
        match event {
            SelectorEvent::Populate(options) => {
                // last entry is the default; the backend orders resolutions ascending
                let selected_index = options.len().checked_sub(1);
                let selected_value = options.last().map(|o| o.value().to_string());
                Self {
                    options,
                    selected_value,
                    selected_index,
                    is_open: false,
                }
            }
            SelectorEvent::Select(value) => self.with_selection(value),
            SelectorEvent::Open => self.opened(),
            SelectorEvent::Close | SelectorEvent::OutsideClicked => self.closed(),
            SelectorEvent::Toggle => {
                if self.is_open {
                    self.closed()
                } else {
                    self.opened()
                }
            }
            SelectorEvent::OptionClicked(index) => self.with_index(index).closed(),
            SelectorEvent::Resized { .. }
            | SelectorEvent::Scrolled { .. }
            | SelectorEvent::TriggerMoved(_) => self,
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected_option(&self) -> Option<&ResolutionOption> {
        self.selected_index.and_then(|i| self.options.get(i))
    }

    fn with_selection(self, value: String) -> Self {
        if self.selected_value.as_deref() == Some(value.as_str()) {
            return self;
        }
        match self.options.iter().position(|o| o.value() == value) {
            Some(index) => self.with_index(index),
            None => self,
        }
    }

    fn with_index(mut self, index: usize) -> Self {
        if let Some(option) = self.options.get(index) {
            self.selected_value = Some(option.value().to_string());
            self.selected_index = Some(index);
        }
        self
    }

    fn opened(mut self) -> Self {
        self.is_open = !self.options.is_empty();
        self
    }

    fn closed(mut self) -> Self {
        self.is_open = false;
        self
    }
}

/// Rendering side of the selector.
pub trait SelectorSurface {
    /// Hidden means no trigger at all, not just a closed list.
    fn set_visible(&mut self, visible: bool);
    fn set_options(&mut self, options: &[ResolutionOption]);
    /// Clears every other option's selected flag.
    fn set_selected(&mut self, index: Option<usize>);
    fn set_trigger_label(&mut self, label: String);
    fn place(&mut self, placement: Placement);
    fn set_open(&mut self, open: bool);
    fn focus_trigger(&mut self);
}

pub struct ResolutionSelector<S> {
    state: SelectorState,
    trigger: Rectangle,
    viewport: Size,
    surface: S,
}

impl<S: SelectorSurface> ResolutionSelector<S> {
    pub fn new(surface: S, trigger: Rectangle, viewport: Size) -> Self {
        let mut selector = Self {
            state: SelectorState::default(),
            trigger,
            viewport,
            surface,
        };
        selector.render(true, false);
        selector
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn selected_value(&self) -> Option<&str> {
        self.state.selected_value.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn populate(&mut self, options: Vec<ResolutionOption>) {
        self.dispatch(SelectorEvent::Populate(options));
    }

    pub fn select(&mut self, value: impl Into<String>) {
        self.dispatch(SelectorEvent::Select(value.into()));
    }

    pub fn open(&mut self) {
        self.dispatch(SelectorEvent::Open);
    }

    pub fn close(&mut self) {
        self.dispatch(SelectorEvent::Close);
    }

    pub fn toggle(&mut self) {
        self.dispatch(SelectorEvent::Toggle);
    }

    pub fn dispatch(&mut self, event: SelectorEvent) {
        match &event {
            SelectorEvent::Resized { viewport, trigger } => {
                self.viewport = *viewport;
                self.trigger = *trigger;
            }
            SelectorEvent::Scrolled { trigger } | SelectorEvent::TriggerMoved(trigger) => {
                self.trigger = *trigger
            }
            _ => {}
        }

        let repopulated = matches!(event, SelectorEvent::Populate(_));
        let option_clicked = matches!(event, SelectorEvent::OptionClicked(_));

        self.state = std::mem::take(&mut self.state).apply(event);
        self.render(repopulated, option_clicked);
    }

    fn render(&mut self, repopulated: bool, option_clicked: bool) {
        let visible = !self.state.options.is_empty();

        if repopulated {
            self.surface.set_options(&self.state.options);
        }
        self.surface.set_visible(visible);
        self.surface.set_selected(self.state.selected_index());
        self.surface.set_trigger_label(
            self.state
                .selected_option()
                .map(ResolutionOption::display_label)
                .unwrap_or_default(),
        );

        // placement must be known before the list becomes visible
        if self.state.is_open {
            self.surface.place(Placement::below(self.trigger, self.viewport));
        }
        self.surface.set_open(self.state.is_open);

        if option_clicked && visible {
            self.surface.focus_trigger();
        }
    }
}
