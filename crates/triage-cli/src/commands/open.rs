use triage_core::TriageConfig;

pub fn run(config: &TriageConfig, fragment: &str) {
    let app = super::open_app(config, Some(fragment));
    super::save_fragment(config, &app);
    super::print_app(&app);
}
