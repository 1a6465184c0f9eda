use egui::{vec2, Align, Layout, RichText, Ui};

use crate::state::{EditorState, SelectionMode};
use crate::theme::AppTheme;
use crate::ui_controls;

const MODES: [SelectionMode; 4] = [
    SelectionMode::Create,
    SelectionMode::Edit,
    SelectionMode::Delete,
    SelectionMode::Move,
];

#[derive(Default)]
pub struct ToolbarResponse {
    pub open_requested: bool,
    pub paste_requested: bool,
}

pub fn show_toolbar(ui: &mut Ui, state: &mut EditorState, theme: &AppTheme) -> ToolbarResponse {
    let mut out = ToolbarResponse::default();

    ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
        ui.spacing_mut().interact_size.y = theme.layout.chip_h;
        ui.spacing_mut().button_padding.y = theme.layout.space_1;
        ui.spacing_mut().item_spacing = vec2(theme.layout.control_gap, 0.0);

        for mode in MODES {
            let selected = state.mode == mode;
            if ui_controls::tool_chip(ui, theme, mode.label(), selected)
                .on_hover_text(mode.hint())
                .clicked()
            {
                state.set_mode(mode);
            }
        }

        ui_controls::vertical_divider(ui, theme, theme.layout.chip_h);

        if ui_controls::ghost_button(ui, theme, "−", vec2(30.0, theme.layout.chip_h))
            .on_hover_text("Zoom out")
            .clicked()
        {
            state.zoom_out();
        }
        ui.label(
            RichText::new(format!("{:.0}%", state.viewport.zoom * 100.0))
                .color(theme.text.secondary)
                .monospace(),
        );
        if ui_controls::ghost_button(ui, theme, "+", vec2(30.0, theme.layout.chip_h))
            .on_hover_text("Zoom in")
            .clicked()
        {
            state.zoom_in();
        }
        if ui_controls::ghost_button(ui, theme, "1:1", vec2(38.0, theme.layout.chip_h))
            .on_hover_text("Reset zoom and pan")
            .clicked()
        {
            state.zoom_reset();
        }

        ui_controls::vertical_divider(ui, theme, theme.layout.chip_h);

        ui.add_enabled_ui(state.can_undo(), |ui| {
            if ui_controls::ghost_button(ui, theme, "Undo", vec2(52.0, theme.layout.chip_h))
                .clicked()
            {
                state.undo();
            }
        });
        ui.add_enabled_ui(state.can_redo(), |ui| {
            if ui_controls::ghost_button(ui, theme, "Redo", vec2(52.0, theme.layout.chip_h))
                .clicked()
            {
                state.redo();
            }
        });

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui_controls::primary_button(ui, theme, "Open…", vec2(64.0, theme.layout.chip_h))
                .on_hover_text("Open an image file")
                .clicked()
            {
                out.open_requested = true;
            }
            if ui_controls::ghost_button(ui, theme, "Paste", vec2(56.0, theme.layout.chip_h))
                .on_hover_text("Use a clipboard image as the backdrop")
                .clicked()
            {
                out.paste_requested = true;
            }

            if let Some(size) = state.image_size() {
                ui.label(
                    RichText::new(format!("{} × {} px", size.x as u32, size.y as u32))
                        .color(theme.text.muted)
                        .size(12.0),
                );
            }
        });
    });

    out
}
