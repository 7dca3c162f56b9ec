use triage_core::{LoginForm, SignupForm, TriageConfig};

pub fn signup(config: &TriageConfig, form: SignupForm) {
    let mut app = super::open_app(config, Some("#/signup"));
    if app.is_authenticated() {
        eprintln!("Already signed in. Run `triage logout` first.");
        std::process::exit(1);
    }
    if let Err(errors) = app.submit_signup(&form) {
        eprintln!("Signup failed:");
        super::fail_with(&errors);
    }
    super::save_fragment(config, &app);
    super::print_app(&app);

    if let Some(token) = app.verification_token(&form.email) {
        println!("\nVerify your email with:");
        println!("  triage verify {token}");
        println!("  (or open #/verify-email?token={token})");
    }
}

pub fn login(config: &TriageConfig, form: LoginForm) {
    let mut app = super::open_app(config, Some("#/login"));
    if app.is_authenticated() {
        eprintln!("Already signed in. Run `triage logout` first.");
        std::process::exit(1);
    }
    if let Err(errors) = app.submit_login(&form) {
        eprintln!("Login failed:");
        super::fail_with(&errors);
    }
    super::save_fragment(config, &app);
    super::print_app(&app);
}

pub fn logout(config: &TriageConfig) {
    let mut app = super::open_app(config, None);
    if !app.is_authenticated() {
        println!("Not signed in.");
    }
    app.logout();
    super::save_fragment(config, &app);
    super::print_app(&app);
}

pub fn verify(config: &TriageConfig, token: &str) {
    let app = super::open_app(config, Some(&format!("#/verify-email?token={token}")));
    super::print_app(&app);
}
