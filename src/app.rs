use anyhow::Context as _;
use eframe::egui::{self, Context as EguiContext, Key, RichText};
use eframe::{App, Frame};
use image::DynamicImage;

use crate::canvas;
use crate::clipboard;
use crate::region_panel;
use crate::state::{AppUiFlags, EditorState, PendingImage, SelectionMode};
use crate::theme::{self, AppTheme};
use crate::toolbar;
use crate::ui_controls;

pub struct RegionMarkApp {
    pub state: EditorState,
    ui_flags: AppUiFlags,
    theme: AppTheme,
}

impl RegionMarkApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme = theme::dark_theme();
        theme::apply_theme(&cc.egui_ctx, &theme);

        Self {
            state: EditorState::default(),
            ui_flags: AppUiFlags::default(),
            theme,
        }
    }

    fn handle_shortcuts(&mut self, ctx: &EguiContext) {
        // A focused text field owns the keyboard.
        if ctx.wants_keyboard_input() {
            return;
        }

        let cmd = ctx.input(|input| input.modifiers.command || input.modifiers.ctrl);
        let shift = ctx.input(|input| input.modifiers.shift);

        if ctx.input(|input| input.key_pressed(Key::Escape)) {
            self.state.selection = None;
        }

        if !cmd {
            if ctx.input(|input| input.key_pressed(Key::C)) {
                self.state.set_mode(SelectionMode::Create);
            }
            if ctx.input(|input| input.key_pressed(Key::E)) {
                self.state.set_mode(SelectionMode::Edit);
            }
            if ctx.input(|input| input.key_pressed(Key::D)) {
                self.state.set_mode(SelectionMode::Delete);
            }
            if ctx.input(|input| input.key_pressed(Key::M)) {
                self.state.set_mode(SelectionMode::Move);
            }

            if ctx
                .input(|input| input.key_pressed(Key::Delete) || input.key_pressed(Key::Backspace))
            {
                self.state.delete_selected();
            }

            return;
        }

        if ctx.input(|input| input.key_pressed(Key::Z)) {
            if shift {
                self.state.redo();
            } else {
                self.state.undo();
            }
        }

        if ctx.input(|input| input.key_pressed(Key::O)) {
            self.open_image_dialog();
        }

        if ctx.input(|input| input.key_pressed(Key::V)) {
            self.paste_image();
        }

        if ctx.input(|input| input.key_pressed(Key::C)) {
            self.copy_region_list(ctx);
        }

        if ctx.input(|input| input.key_pressed(Key::Plus) || input.key_pressed(Key::Equals)) {
            self.state.zoom_in();
        }

        if ctx.input(|input| input.key_pressed(Key::Minus)) {
            self.state.zoom_out();
        }

        if ctx.input(|input| input.key_pressed(Key::Num0)) {
            self.state.zoom_reset();
        }
    }

    fn open_image_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Open image")
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "webp"])
            .pick_file()
        else {
            return;
        };

        match image::open(&path).with_context(|| format!("cannot open {}", path.display())) {
            Ok(image) => {
                log::info!(
                    "loaded {} ({}x{})",
                    path.display(),
                    image.width(),
                    image.height()
                );
                self.accept_image(image);
            }
            Err(err) => log::warn!("{err:#}"),
        }
    }

    fn paste_image(&mut self) {
        match clipboard::read_image() {
            Ok(Some(image)) => self.accept_image(image),
            Ok(None) => {}
            Err(err) => log::warn!("cannot paste image: {err:#}"),
        }
    }

    /// Loads the image immediately unless regions would be lost, in which
    /// case the replace dialog asks first.
    fn accept_image(&mut self, image: DynamicImage) {
        if self.state.image.is_some() && !self.state.regions.is_empty() {
            self.ui_flags.ask_replace_image = Some(PendingImage { image });
        } else {
            self.state.load_image(image);
        }
    }

    fn copy_region_list(&mut self, ctx: &EguiContext) {
        if self.state.regions.is_empty() {
            return;
        }
        match clipboard::copy_text(&self.state.region_list_string()) {
            Ok(()) => {
                self.ui_flags.copy_feedback_until =
                    Some(ctx.input(|input| input.time) + 1.5);
            }
            Err(err) => log::warn!("cannot copy to clipboard: {err:#}"),
        }
    }

    fn show_replace_dialog(&mut self, ctx: &EguiContext) {
        if self.ui_flags.ask_replace_image.is_none() {
            return;
        }

        let mut replace = None;
        egui::Window::new("Replace image?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .frame(ui_controls::card_frame(&self.theme))
            .show(ctx, |ui| {
                ui.label(
                    RichText::new(
                        "Loading a new image discards the current regions and their history.",
                    )
                    .color(self.theme.text.secondary),
                );
                ui.add_space(self.theme.layout.space_3);
                ui.horizontal(|ui| {
                    if ui_controls::primary_button(
                        ui,
                        &self.theme,
                        "Replace",
                        egui::vec2(84.0, 26.0),
                    )
                    .clicked()
                    {
                        replace = Some(true);
                    }
                    if ui_controls::ghost_button(ui, &self.theme, "Keep", egui::vec2(64.0, 26.0))
                        .clicked()
                    {
                        replace = Some(false);
                    }
                });
            });

        if let Some(replace) = replace {
            let pending = self.ui_flags.ask_replace_image.take();
            if replace {
                if let Some(pending) = pending {
                    self.state.load_image(pending.image);
                }
            }
        }
    }

    fn show_copy_feedback(&mut self, ctx: &EguiContext) {
        let Some(until) = self.ui_flags.copy_feedback_until else {
            return;
        };
        if ctx.input(|input| input.time) > until {
            self.ui_flags.copy_feedback_until = None;
            return;
        }

        egui::Area::new(egui::Id::new("copy_feedback"))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 56.0))
            .show(ctx, |ui| {
                ui_controls::subtle_badge(ui, &self.theme, "Copied");
            });
        ctx.request_repaint();
    }
}

impl App for RegionMarkApp {
    fn update(&mut self, ctx: &EguiContext, _frame: &mut Frame) {
        self.handle_shortcuts(ctx);

        let mut toolbar_response = toolbar::ToolbarResponse::default();
        egui::TopBottomPanel::top("regionmark_toolbar")
            .frame(ui_controls::toolbar_frame(&self.theme))
            .show(ctx, |ui| {
                toolbar_response = toolbar::show_toolbar(ui, &mut self.state, &self.theme);
            });

        if toolbar_response.open_requested {
            self.open_image_dialog();
        }
        if toolbar_response.paste_requested {
            self.paste_image();
        }

        egui::TopBottomPanel::bottom("regionmark_status")
            .frame(ui_controls::toolbar_frame(&self.theme))
            .show(ctx, |ui| {
                ui.label(
                    RichText::new(self.state.mode.hint())
                        .color(self.theme.text.muted)
                        .size(12.0),
                );
            });

        if self.state.settings.show_region_panel {
            egui::SidePanel::right("regionmark_regions")
                .exact_width(self.theme.layout.region_panel_width)
                .show(ctx, |ui| {
                    region_panel::show_region_panel(
                        ui,
                        &mut self.state,
                        &self.theme,
                        &mut self.ui_flags,
                    );
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.surfaces.app_bg))
            .show(ctx, |ui| {
                canvas::show_canvas(ui, ctx, &mut self.state, &self.theme);
            });

        self.show_replace_dialog(ctx);
        self.show_copy_feedback(ctx);
    }
}
