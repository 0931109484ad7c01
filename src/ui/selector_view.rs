use iced::{
    widget::{self, button, column, container, mouse_area, scrollable, text},
    Element, Length, Padding, Rectangle, Task, Theme,
};

use super::resolution_selector::{Placement, SelectorSurface};
use crate::domain::ResolutionOption;

type ButtonStyle = fn(&Theme, button::Status) -> button::Style;

const TRIGGER_ID: &str = "resolution-trigger";

fn trigger_id() -> widget::Id {
    widget::Id::new(TRIGGER_ID)
}

/// Bounds of the trigger as laid out on screen, already offset by page scrolling.
pub fn measure_trigger() -> Task<Option<Rectangle>> {
    widget::selector::find(trigger_id())
        .map(|target| target.and_then(|target| target.visible_bounds()))
}

/// iced rendering of the resolution dropdown.
#[derive(Debug, Default)]
pub struct SelectorView {
    visible: bool,
    /// Option labels in backend order
    labels: Vec<String>,
    selected: Option<usize>,
    trigger_label: String,
    placement: Option<Placement>,
    open: bool,
    trigger_focused: bool,
}

impl SelectorSurface for SelectorView {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_options(&mut self, options: &[ResolutionOption]) {
        self.labels = options.iter().map(ResolutionOption::display_label).collect();
        self.selected = None;
    }

    fn set_selected(&mut self, index: Option<usize>) {
        self.selected = index;
    }

    fn set_trigger_label(&mut self, label: String) {
        self.trigger_label = label;
    }

    fn place(&mut self, placement: Placement) {
        self.placement = Some(placement);
    }

    fn set_open(&mut self, open: bool) {
        if open && !self.open {
            self.trigger_focused = false;
        }
        self.open = open;
    }

    fn focus_trigger(&mut self) {
        self.trigger_focused = true;
    }
}

impl SelectorView {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn trigger<'a, M: Clone + 'a>(&'a self, on_press: M, width: f32) -> Element<'a, M> {
        let style: ButtonStyle = if self.trigger_focused {
            button::primary
        } else {
            button::secondary
        };

        container(
            button(text(format!("{}  ▾", self.trigger_label)))
                .on_press(on_press)
                .width(Length::Fixed(width))
                .padding(10)
                .style(style),
        )
        .id(trigger_id())
        .into()
    }

    /// Option list layer, positioned in window coordinates. `None` while closed.
    ///
    /// Presses inside the panel that miss every row produce `on_panel_press`, so they
    /// never count as clicks outside the widget.
    pub fn dropdown<'a, M: Clone + 'a>(
        &'a self,
        on_pick: impl Fn(usize) -> M,
        on_panel_press: M,
    ) -> Option<Element<'a, M>> {
        if !self.visible || !self.open {
            return None;
        }
        let placement = self.placement?;

        let rows = self.labels.iter().enumerate().map(|(i, label)| {
            let style: ButtonStyle = if Some(i) == self.selected {
                button::primary
            } else {
                button::text
            };
            button(text(label.as_str()))
                .on_press(on_pick(i))
                .width(Length::Fill)
                .style(style)
                .into()
        });

        let panel = container(scrollable(column(rows).spacing(2)))
            .width(Length::Fixed(placement.width))
            .max_height(placement.max_height)
            .padding(4)
            .style(container::bordered_box);

        Some(
            container(mouse_area(panel).on_press(on_panel_press))
                .padding(Padding {
                    top: placement.top,
                    right: 0.0,
                    bottom: 0.0,
                    left: placement.left,
                })
                .into(),
        )
    }
}
