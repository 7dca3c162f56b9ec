use triage_core::TriageConfig;

pub fn run(config: &TriageConfig, route: Option<&str>) {
    let app = super::open_app(config, route);
    let mut tui = crate::tui::app::App::new(app);
    let result = tui.run();
    super::save_fragment(config, tui.core());
    if let Err(e) = result {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
