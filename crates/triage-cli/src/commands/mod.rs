pub mod auth;
pub mod chart;
pub mod infer;
pub mod open;
pub mod series;
pub mod ui;

use std::fs;
use std::path::{Path, PathBuf};

use triage_core::view::{
    CHART_HELP, DASHBOARD_HELP, HOME_LEDE, NO_RESULT_HELP, NOT_FOUND_TEXT, PRIVACY_TEXT,
    RESULT_DISCLAIMER, STATUS_IDLE, STATUS_RUNNING, UPLOAD_HELP,
};
use triage_core::{FormErrors, NavLink, Services, TriageApp, TriageConfig, VerifyStatus, View};

/// Load the config file (if any) and apply the `--data-dir` override.
/// Exits with a message on unreadable or malformed config.
pub fn load_config(path: Option<&Path>, data_dir: Option<PathBuf>) -> TriageConfig {
    let mut config = match TriageConfig::load(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    config
}

/// Last visited fragment, if one was saved.
pub fn saved_fragment(config: &TriageConfig) -> Option<String> {
    fs::read_to_string(config.route_path())
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Remember the current fragment for the next start.
pub fn save_fragment(config: &TriageConfig, app: &TriageApp) {
    let result = fs::create_dir_all(&config.data_dir)
        .and_then(|()| fs::write(config.route_path(), app.fragment()));
    if let Err(e) = result {
        log::warn!("cannot save route: {e}");
    }
}

/// Start the app on the file-backed stores. `fragment` overrides the saved
/// route.
pub fn open_app(config: &TriageConfig, fragment: Option<&str>) -> TriageApp {
    let services = match Services::on_disk(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: cannot open user registry: {e}");
            std::process::exit(1);
        }
    };
    let saved = saved_fragment(config);
    let fragment = fragment.or(saved.as_deref());
    match TriageApp::start(config.clone(), services, fragment) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Print form errors one per line and exit.
pub fn fail_with(errors: &FormErrors) -> ! {
    for e in errors.iter() {
        eprintln!("  {:<10} {}", e.field, e.message);
    }
    std::process::exit(1);
}

/// Header line with the navigation links for the session state.
pub fn nav_line(app: &TriageApp) -> String {
    let links: Vec<&str> = triage_core::nav_links(app.is_authenticated())
        .iter()
        .map(|l| l.label())
        .collect();
    let who = app
        .session()
        .map(|s| format!("  ({})", s.user.email))
        .unwrap_or_default();
    format!("{}  [{}]{who}", app.fragment(), links.join(" · "))
}

/// Plain-text rendering of a view, shared by the CLI and the terminal UI.
pub fn view_lines(view: &View) -> Vec<String> {
    let mut out = vec![view.title(), String::new()];
    match view {
        View::Home {
            upload_errors,
            busy,
        } => {
            out.push(HOME_LEDE.into());
            out.push(CHART_HELP.into());
            out.push(String::new());
            out.push("Try the prototype".into());
            out.push(UPLOAD_HELP.into());
            if let Some(msg) = upload_errors.get("image") {
                out.push(format!("  ! {msg}"));
            }
            out.push(if *busy { STATUS_RUNNING } else { STATUS_IDLE }.into());
        }
        View::Login { errors } | View::Signup { errors } => {
            for e in errors.iter() {
                out.push(format!("  ! {}: {}", e.field, e.message));
            }
        }
        View::Dashboard { stats, .. } => {
            out.push(DASHBOARD_HELP.into());
            out.push(format!("  Global rounds        {}", stats.global_rounds));
            out.push(format!("  Participating nodes  {}", stats.participating_nodes));
            out.push(format!("  Last AUC             {:.2}", stats.last_auc));
        }
        View::Result(r) => {
            out.push(format!("Image: {}", r.image.as_str()));
            match r.badge {
                Some(badge) => out.push(format!("{}  [{badge}]", r.verdict)),
                None => out.push(r.verdict.to_string()),
            }
            out.push(r.accuracy_line());
            out.push(String::new());
            out.push("Recommendations".into());
            for line in &r.recommendations {
                out.push(format!("  • {line}"));
            }
            out.push(String::new());
            out.push("Consult specialists".into());
            for s in r.specialists {
                out.push(format!("  {} - {} · {}", s.name, s.title, s.org));
                out.push(format!("      {}  {}", s.email, s.phone));
            }
            out.push(String::new());
            out.push(RESULT_DISCLAIMER.into());
        }
        View::NoResult => {
            out.push(NO_RESULT_HELP.into());
            out.push("→ Go to upload".into());
        }
        View::Privacy => out.push(PRIVACY_TEXT.into()),
        View::VerifyEmail(status) => match status {
            VerifyStatus::Success(msg) => out.push(format!("✓ {msg}")),
            VerifyStatus::Failed(msg) => out.push(format!("✗ {msg}")),
        },
        View::NotFound { path } => out.push(format!("{NOT_FOUND_TEXT} ({path})")),
    }
    out
}

/// Print the current view with its navigation header.
pub fn print_app(app: &TriageApp) {
    println!("{}", nav_line(app));
    println!("{}", "─".repeat(60));
    for line in view_lines(&app.view()) {
        println!("{line}");
    }
}

/// Key hint for a navigation link in the terminal UI.
pub fn nav_key(link: NavLink) -> &'static str {
    match link {
        NavLink::Home => "F1",
        NavLink::Dashboard => "F2",
        NavLink::Logout => "F10",
        NavLink::Signup => "F4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{ImageRef, ResultRecord, ResultView, infer};

    fn memory_app(fragment: &str) -> TriageApp {
        TriageApp::start(TriageConfig::default(), Services::in_memory(), Some(fragment)).unwrap()
    }

    // -----------------------------------------------------------------------
    // view_lines tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_result_lines_include_badge_and_accuracy() {
        let record = ResultRecord::new(ImageRef("a.png".into()), infer("a.png", 500));
        let view = View::Result(Box::new(ResultView::from_record(&record)));
        let lines = view_lines(&view);
        assert!(lines.iter().any(|l| l == "Image is cancerous  [Gastric cancer]"));
        assert!(lines.iter().any(|l| l == "Assumed accuracy: 95%"));
        assert!(lines.iter().any(|l| l.contains("Dr. Kenji Nakamura")));
    }

    #[test]
    fn test_login_errors_are_listed() {
        let mut errors = FormErrors::new();
        errors.add("password", "Invalid credentials");
        let lines = view_lines(&View::Login { errors });
        assert!(lines.iter().any(|l| l.contains("password: Invalid credentials")));
    }

    #[test]
    fn test_not_found_mentions_path() {
        let lines = view_lines(&View::NotFound {
            path: "/x".into(),
        });
        assert_eq!(lines[0], "404");
        assert!(lines[2].contains("/x"));
    }

    // -----------------------------------------------------------------------
    // nav tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_guest_nav_shows_signup_only() {
        let app = memory_app("#/privacy");
        assert_eq!(nav_line(&app), "#/privacy  [Sign up]");
    }

    #[test]
    fn test_nav_keys_are_distinct() {
        let keys: Vec<&str> = [NavLink::Home, NavLink::Dashboard, NavLink::Logout, NavLink::Signup]
            .into_iter()
            .map(nav_key)
            .collect();
        let mut dedup = keys.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(keys.len(), dedup.len());
    }

    // -----------------------------------------------------------------------
    // route persistence tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_saved_fragment_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = TriageConfig {
            data_dir: dir.path().join("data"),
            ..Default::default()
        };
        assert_eq!(saved_fragment(&config), None);
        let app = memory_app("#/privacy");
        save_fragment(&config, &app);
        assert_eq!(saved_fragment(&config).as_deref(), Some("#/privacy"));
    }

    #[test]
    fn test_data_dir_override() {
        let config = load_config(None, Some(PathBuf::from("/tmp/triage-x")));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/triage-x"));
        assert_eq!(config.seed, 42);
    }
}
