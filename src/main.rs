use dropzone::app::DropZoneApp;
use dropzone::config::DropZoneConfig;
use dropzone::services::Services;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DropZoneConfig::load();
    log::info!(
        target: "dropzone",
        "max file size {} bytes, {} allowed type(s), latency {}",
        config.policy.max_file_size,
        config.policy.allowed_types.len(),
        if config.simulate_latency { "on" } else { "off" }
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!(target: "dropzone", "failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };
    let handle = runtime.handle().clone();
    let services = Services::seeded(config.simulate_latency);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 760.0])
            .with_min_inner_size([420.0, 520.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let result = eframe::run_native(
        "DropZone",
        options,
        Box::new(move |cc| Box::new(DropZoneApp::new(cc, services, &config, handle))),
    );

    runtime.shutdown_background();
    result
}
