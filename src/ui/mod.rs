//! Terminal UI: the picker frame, its dialogs and toasts.

pub mod layout;
pub mod modal;
pub mod picker;
pub mod toast;
pub mod toast_widget;

use ratatui::Frame;

use crate::app::{App, Phase};
use modal::{ConfirmModal, NamePromptModal};
use toast_widget::ToastWidget;

pub use toast::{Toast, ToastManager, ToastType};

/// Draw one frame for the current picker state.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    picker::render_picker(app, area, frame.buffer_mut());

    if let Phase::PromptingNewName(prompt) = &app.phase {
        frame.render_widget(
            NamePromptModal::new(prompt, app.mode),
            NamePromptModal::calculate_area(area),
        );
    } else if let Some(modal) = ConfirmModal::from_phase(&app.phase) {
        let modal = modal.with_remove_after_merge(app.settings().remove_after_merge);
        frame.render_widget(modal, ConfirmModal::calculate_area(area));
    }

    let toasts = app.toast_manager.visible_toasts();
    ToastWidget::new(&toasts).render(frame, area);
}
