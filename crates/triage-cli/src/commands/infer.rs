use std::path::Path;
use std::time::Duration;

use triage_core::{FileReader, FsFileReader, Route, TriageConfig, UploadError};

pub fn run(config: &TriageConfig, path: &Path) {
    let file = match FsFileReader.read(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot read {}: {e}", path.display());
            std::process::exit(1);
        }
    };

    let mut app = super::open_app(config, Some("#/"));
    if *app.route() != Route::Home {
        eprintln!("Not signed in. Run `triage login` or `triage signup` first.");
        std::process::exit(1);
    }

    match app.submit_upload(Some(file)) {
        Ok(()) => {}
        Err(UploadError::Invalid(errors)) => super::fail_with(&errors),
        Err(UploadError::Busy) => {
            eprintln!("An analysis is already running.");
            std::process::exit(1);
        }
    }

    println!("Running analysis…");
    let limit = config.inference_delay() + Duration::from_secs(1);
    let mut elapsed = Duration::ZERO;
    while app.is_busy() && elapsed < limit {
        let step = config.frame_interval();
        app.advance(step);
        elapsed += step;
    }

    super::save_fragment(config, &app);
    super::print_app(&app);
}
