//! # Main Display Module
//!
//! This module contains the main layout of the Guitar Tab Generator window:
//! title, control buttons, status line, tab panel and notes panel.

use iced::widget::{button, column, container, row, text};
use iced::{Alignment, Element, Length};

use super::{notes_display, tab_display};
use crate::{AppDisplayData, Message};

/// Creates the complete main application view
pub fn create_main_view(data: &AppDisplayData) -> Element<'_, Message> {
    let title = text("Guitar Tab Generator").size(24);

    let record_label = if data.is_recording { "Stop" } else { "Record" };
    let idle = !data.is_recording && !data.is_analyzing;
    let can_analyze = idle && data.has_audio;
    let can_save = idle && data.has_tab;
    let controls = row![
        button(text(record_label))
            .on_press_maybe((!data.is_analyzing).then_some(Message::ToggleRecording)),
        button(text("Analyze")).on_press_maybe(can_analyze.then_some(Message::Analyze)),
        button(text("Load Audio File")).on_press_maybe(idle.then_some(Message::LoadAudioFile)),
        button(text("Save Tab")).on_press_maybe(can_save.then_some(Message::SaveTab)),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let status = container(text(&data.status).size(14))
        .padding(5)
        .width(Length::Fill)
        .style(container::bordered_box);

    let content = column![
        title,
        controls,
        status,
        tab_display::view(&data.tab_text),
        notes_display::view(&data.notes, data.analyzed),
    ]
    .spacing(10)
    .padding(20);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
