use eframe::egui;
use scan_annotator::gui::ViewerApp;
use scan_annotator::logging;
use scan_annotator::settings::Settings;

fn main() -> anyhow::Result<()> {
    let mut settings = Settings::load("settings.json")?;
    logging::init(settings.debug_logging);

    // An image path on the command line overrides the settings file.
    if let Some(path) = std::env::args().nth(1) {
        settings.image_path = Some(path);
    }

    let window_size = settings.window_size.unwrap_or((900.0, 700.0));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([window_size.0, window_size.1])
            .with_min_inner_size([480.0, 400.0]),
        ..Default::default()
    };

    let app = ViewerApp::new(&settings);
    eframe::run_native(
        "Scan Annotator",
        native_options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|err| anyhow::anyhow!("failed to start viewer window: {err}"))
}
