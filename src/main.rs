mod app;
mod canvas;
mod clipboard;
mod history;
mod region;
mod region_panel;
mod state;
mod theme;
mod toolbar;
mod ui_controls;
mod viewport;

use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let viewport = egui::ViewportBuilder::default()
        .with_title("RegionMark")
        .with_inner_size([1180.0, 800.0])
        .with_min_inner_size([720.0, 520.0]);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "RegionMark",
        options,
        Box::new(|cc| Box::new(app::RegionMarkApp::new(cc))),
    )
}
