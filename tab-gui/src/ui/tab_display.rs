//! Monospace panel showing the rendered tablature.

use iced::widget::{column, container, scrollable, text};
use iced::{Element, Font, Length};

/// Creates the tab panel. Long tabs scroll horizontally.
pub fn view(tab_text: &str) -> Element<'_, crate::Message> {
    let tab = text(tab_text).font(Font::MONOSPACE).size(14);
    let scroller = scrollable(container(tab).padding(8))
        .direction(scrollable::Direction::Both {
            vertical: scrollable::Scrollbar::new(),
            horizontal: scrollable::Scrollbar::new(),
        })
        .width(Length::Fill)
        .height(Length::Fixed(170.0));

    container(column![text("Guitar Tab").size(18), scroller].spacing(6))
        .padding(10)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}
