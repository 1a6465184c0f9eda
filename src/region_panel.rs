use egui::{vec2, Align, DragValue, Layout, RichText, ScrollArea, Ui};

use crate::clipboard;
use crate::region::{RegionField, RegionId};
use crate::state::{AppUiFlags, EditorState};
use crate::theme::AppTheme;
use crate::ui_controls;

/// Side panel listing every committed region with manual coordinate entry,
/// per-region copy and delete, and the full-list actions.
pub fn show_region_panel(
    ui: &mut Ui,
    state: &mut EditorState,
    theme: &AppTheme,
    ui_flags: &mut AppUiFlags,
) {
    ui.add_space(theme.layout.space_2);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Regions")
                .color(theme.text.primary)
                .size(15.0)
                .strong(),
        );
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.label(
                RichText::new(format!("{}", state.regions.len()))
                    .color(theme.text.muted)
                    .monospace(),
            );
        });
    });
    ui.add_space(theme.layout.space_2);

    if state.regions.is_empty() {
        ui.label(
            RichText::new("Drag on the image to mark a region.")
                .color(theme.text.muted)
                .size(12.0),
        );
        return;
    }

    ScrollArea::vertical()
        .id_source("region_panel_scroll")
        .show(ui, |ui| {
            let snapshot = state.regions.clone();
            for (index, region) in snapshot.iter().enumerate() {
                let selected = state.selection == Some(region.id);
                ui_controls::card_frame(theme).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let title = RichText::new(format!("#{}", index + 1))
                            .strong()
                            .color(if selected {
                                theme.text.accent
                            } else {
                                theme.text.primary
                            });
                        if ui.selectable_label(selected, title).clicked() {
                            state.selection = Some(region.id);
                        }
                        ui.label(
                            RichText::new(region.coords_string())
                                .color(theme.text.muted)
                                .monospace()
                                .size(12.0),
                        );
                    });

                    ui.horizontal(|ui| {
                        field_input(ui, state, region.id, RegionField::X, "x", region.x);
                        field_input(ui, state, region.id, RegionField::Y, "y", region.y);
                        field_input(ui, state, region.id, RegionField::Width, "w", region.width);
                        field_input(ui, state, region.id, RegionField::Height, "h", region.height);
                    });

                    ui.horizontal(|ui| {
                        if ui_controls::ghost_button(ui, theme, "Copy", vec2(48.0, 22.0))
                            .on_hover_text("Copy this region's coordinates")
                            .clicked()
                        {
                            copy_with_feedback(ui, ui_flags, &region.coords_string());
                        }
                        if ui_controls::ghost_button(ui, theme, "Remove", vec2(58.0, 22.0))
                            .clicked()
                        {
                            state.remove_region(region.id);
                        }
                    });
                });
                ui.add_space(theme.layout.space_2);
            }
        });

    ui.add_space(theme.layout.space_2);
    ui.separator();
    ui.horizontal(|ui| {
        if ui_controls::primary_button(ui, theme, "Copy all", vec2(72.0, 24.0))
            .on_hover_text("Copy the full region list")
            .clicked()
        {
            let list = state.region_list_string();
            copy_with_feedback(ui, ui_flags, &list);
        }
        if ui_controls::ghost_button(ui, theme, "Clear all", vec2(72.0, 24.0)).clicked() {
            state.clear_regions();
        }
    });
}

fn field_input(
    ui: &mut Ui,
    state: &mut EditorState,
    id: RegionId,
    field: RegionField,
    label: &str,
    current: f32,
) {
    ui.label(RichText::new(label).size(11.0).monospace());
    let mut value = current.round();
    let response = ui.add(
        DragValue::new(&mut value)
            .speed(1.0)
            .max_decimals(0)
            .update_while_editing(false),
    );
    if response.changed() {
        state.update_region_field(id, field, value);
    }
}

fn copy_with_feedback(ui: &Ui, ui_flags: &mut AppUiFlags, text: &str) {
    match clipboard::copy_text(text) {
        Ok(()) => {
            ui_flags.copy_feedback_until = Some(ui.input(|input| input.time) + 1.5);
        }
        Err(err) => log::warn!("cannot copy to clipboard: {err:#}"),
    }
}
