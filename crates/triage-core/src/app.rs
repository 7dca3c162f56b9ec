//! Application controller.
//!
//! [`TriageApp`] owns all mutable state: session, router, scheduler, the
//! mounted chart, the pending inference and per-form errors. Every public
//! method runs to completion before returning, so no caller can observe a
//! half-applied transition (for example a cleared session on a guarded
//! route).
//!
//! Time moves only through [`TriageApp::advance`], which dispatches due
//! scheduler wakeups one at a time.

use std::time::Duration;

use crate::animation::{ChartMount, FrameOutcome};
use crate::auth::AuthService;
use crate::chart::{ChartGeometry, FrameBuffer};
use crate::config::TriageConfig;
use crate::error::{AuthError, ChartError, FieldError, FormErrors, SlotError, UploadError};
use crate::file_reader::ImageFile;
use crate::forms::{self, LoginForm, SignupForm};
use crate::inference::infer;
use crate::result_slot::{ResultRecord, ResultSlot};
use crate::route::Route;
use crate::router::{Navigation, Router};
use crate::scheduler::{MountId, Scheduler, TimerId, Wakeup};
use crate::series::SeriesPair;
use crate::session::{Session, SessionStore};
use crate::view::{self, SlotState, VerifyStatus, View, ViewContext};

pub const MSG_ANALYSIS_FAILED: &str = "Analysis failed. Try again.";

/// External collaborators the controller talks to.
pub struct Services {
    pub sessions: Box<dyn SessionStore>,
    pub auth: Box<dyn AuthService>,
    pub slot: Box<dyn ResultSlot>,
}

impl Services {
    /// Everything in memory; nothing survives the process.
    pub fn in_memory() -> Self {
        Self {
            sessions: Box::new(crate::session::MemorySessionStore::new()),
            auth: Box::new(crate::auth::LocalAuthService::in_memory()),
            slot: Box::new(crate::result_slot::MemoryResultSlot::new()),
        }
    }

    /// File-backed stores under `config.data_dir`.
    pub fn on_disk(config: &TriageConfig) -> Result<Self, AuthError> {
        Ok(Self {
            sessions: Box::new(crate::session::FileSessionStore::new(config.session_path())),
            auth: Box::new(crate::auth::LocalAuthService::open(config.users_path())?),
            slot: Box::new(crate::result_slot::FileResultSlot::new(config.result_path())),
        })
    }
}

/// What happened during one [`TriageApp::advance`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Frames drawn on the current chart.
    pub frames: usize,
    /// Frame wakeups addressed to a chart that is no longer mounted.
    pub stale_frames: usize,
    /// The pending inference finished and the result view was opened.
    pub inference_completed: bool,
}

#[derive(Debug)]
struct PendingInference {
    timer: TimerId,
    file: ImageFile,
}

pub struct TriageApp {
    config: TriageConfig,
    services: Services,
    session: Option<Session>,
    router: Router,
    scheduler: Scheduler,
    geometry: ChartGeometry,
    series: SeriesPair,
    chart: Option<(MountId, ChartMount<FrameBuffer>)>,
    next_mount: u64,
    pending: Option<PendingInference>,
    login_errors: FormErrors,
    signup_errors: FormErrors,
    upload_errors: FormErrors,
    verification: Option<VerifyStatus>,
    slot_state: SlotState,
}

impl TriageApp {
    /// Restore the session, resolve the initial route from `fragment` and
    /// enter it.
    pub fn start(
        config: TriageConfig,
        mut services: Services,
        fragment: Option<&str>,
    ) -> Result<Self, ChartError> {
        let geometry = ChartGeometry::new(config.canvas_width, config.canvas_height, config.steps)?;
        let series = SeriesPair::from_seed(config.seed, config.steps);

        let mut session = services.sessions.load();
        if let Some(s) = &session {
            if !services.auth.validate(s) {
                log::warn!("discarding stale session for {}", s.user.email);
                if let Err(e) = services.sessions.clear() {
                    log::warn!("cannot clear session store: {e}");
                }
                session = None;
            }
        }

        let (router, transition) = Router::start(fragment, session.is_some());
        let mut app = Self {
            scheduler: Scheduler::new(config.frame_interval()),
            config,
            services,
            session,
            router,
            geometry,
            series,
            chart: None,
            next_mount: 0,
            pending: None,
            login_errors: FormErrors::new(),
            signup_errors: FormErrors::new(),
            upload_errors: FormErrors::new(),
            verification: None,
            slot_state: SlotState::Empty,
        };
        app.enter(&transition.resolved);
        Ok(app)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn route(&self) -> &Route {
        self.router.current()
    }

    pub fn fragment(&self) -> String {
        self.router.fragment()
    }

    /// Renders emitted by the router, including the initial one.
    pub fn renders(&self) -> u64 {
        self.router.renders()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn series(&self) -> &SeriesPair {
        &self.series
    }

    /// The mounted chart, if the current view hosts one.
    pub fn chart(&self) -> Option<&ChartMount<FrameBuffer>> {
        self.chart.as_ref().map(|(_, m)| m)
    }

    /// True while an inference is outstanding.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Email verification token issued for `email`, if still pending.
    pub fn verification_token(&self, email: &str) -> Option<String> {
        self.services.auth.verification_token(email)
    }

    pub fn view(&self) -> View {
        let ctx = ViewContext {
            session: self.session.as_ref(),
            slot: &self.slot_state,
            login_errors: &self.login_errors,
            signup_errors: &self.signup_errors,
            upload_errors: &self.upload_errors,
            busy: self.is_busy(),
            verification: self.verification.as_ref(),
        };
        view::dispatch(self.router.current(), &ctx)
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn navigate(&mut self, target: Route) -> Navigation {
        let nav = self.router.navigate(target, self.session.is_some());
        if let Navigation::Rendered(t) = &nav {
            if let Some(from) = &t.from {
                self.leave(from);
            }
            self.enter(&t.resolved);
        }
        nav
    }

    /// Navigate by fragment string, as a link click would.
    pub fn open(&mut self, fragment: &str) -> Navigation {
        self.navigate(Route::parse(fragment))
    }

    fn leave(&mut self, route: &Route) {
        if *route == Route::Home {
            self.unmount_chart();
            if let Some(p) = self.pending.take() {
                self.scheduler.cancel_timer(p.timer);
                log::debug!("discarding pending analysis of {:?}", p.file.name);
            }
        }
    }

    fn enter(&mut self, route: &Route) {
        match route {
            Route::Home => {
                self.upload_errors = FormErrors::new();
                self.mount_chart();
            }
            Route::Login => self.login_errors = FormErrors::new(),
            Route::Signup => self.signup_errors = FormErrors::new(),
            Route::Result => self.slot_state = self.read_slot(),
            Route::VerifyEmail { token } => {
                self.verification = Some(self.verify(token.as_deref()));
            }
            _ => {}
        }
    }

    fn read_slot(&mut self) -> SlotState {
        match self.services.slot.get_last() {
            Ok(Some(record)) => SlotState::Ready(record),
            Ok(None) => SlotState::Empty,
            Err(SlotError::Corrupt(reason)) => {
                log::warn!("discarding corrupt result record: {reason}");
                if let Err(e) = self.services.slot.clear_last() {
                    log::warn!("cannot clear result slot: {e}");
                }
                SlotState::Empty
            }
            Err(e) => {
                log::warn!("cannot read result slot: {e}");
                SlotState::Empty
            }
        }
    }

    fn verify(&mut self, token: Option<&str>) -> VerifyStatus {
        let Some(token) = token else {
            return VerifyStatus::Failed(crate::auth::MSG_NO_TOKEN.to_string());
        };
        match self.services.auth.verify_email(token) {
            Ok(_) => VerifyStatus::Success(crate::auth::MSG_VERIFIED.to_string()),
            Err(AuthError::Rejected(f)) => VerifyStatus::Failed(f.message),
            Err(e) => {
                log::warn!("email verification failed: {e}");
                VerifyStatus::Failed(crate::auth::MSG_VERIFY_FAILED.to_string())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Chart
    // -----------------------------------------------------------------------

    fn mount_chart(&mut self) {
        self.unmount_chart();
        let id = MountId(self.next_mount);
        self.next_mount += 1;
        let mount = ChartMount::mount(
            FrameBuffer::new(),
            self.geometry,
            self.series.clone(),
            self.config.device_pixel_ratio,
            self.config.reveal_ms,
        );
        self.scheduler.request_frame(id);
        self.chart = Some((id, mount));
    }

    fn unmount_chart(&mut self) {
        if let Some((id, _)) = self.chart.take() {
            self.scheduler.cancel_frames(id);
        }
    }

    // -----------------------------------------------------------------------
    // Forms
    // -----------------------------------------------------------------------

    fn establish(&mut self, session: Session) -> Result<(), AuthError> {
        self.services.sessions.save(&session)?;
        self.session = Some(session);
        Ok(())
    }

    /// Validate and submit the login form. On success the session is stored
    /// and the home view opens.
    pub fn submit_login(&mut self, form: &LoginForm) -> Result<(), FormErrors> {
        let result = form
            .validate()
            .map_err(AuthError::Invalid)
            .and_then(|()| self.services.auth.login(&form.email, &form.password))
            .and_then(|session| self.establish(session));
        match result {
            Ok(()) => {
                self.login_errors = FormErrors::new();
                self.navigate(Route::Home);
                Ok(())
            }
            Err(e) => {
                let errors = e.form_errors("password", forms::MSG_LOGIN_FAILED);
                self.login_errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Validate and submit the signup form. On success the session is stored
    /// and the dashboard opens.
    pub fn submit_signup(&mut self, form: &SignupForm) -> Result<(), FormErrors> {
        let result = form
            .validate()
            .map_err(AuthError::Invalid)
            .and_then(|()| {
                self.services
                    .auth
                    .signup(&form.name, &form.email, &form.password)
            })
            .and_then(|session| self.establish(session));
        match result {
            Ok(()) => {
                self.signup_errors = FormErrors::new();
                self.navigate(Route::Dashboard);
                Ok(())
            }
            Err(e) => {
                let errors = e.form_errors("email", forms::MSG_SIGNUP_FAILED);
                self.signup_errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Clear the session, then go to login. Storage failures are logged; the
    /// in-memory session is dropped regardless.
    pub fn logout(&mut self) -> Navigation {
        if let Some(p) = self.pending.take() {
            self.scheduler.cancel_timer(p.timer);
        }
        if let Some(session) = self.session.take() {
            if let Err(e) = self.services.auth.logout(&session) {
                log::warn!("logout: {e}");
            }
        }
        if let Err(e) = self.services.sessions.clear() {
            log::warn!("cannot clear session store: {e}");
        }
        self.navigate(Route::Login)
    }

    /// Start the simulated analysis of `file`. The result lands in the slot
    /// and the result view opens once the delay elapses.
    pub fn submit_upload(&mut self, file: Option<ImageFile>) -> Result<(), UploadError> {
        if self.pending.is_some() {
            log::warn!("analysis already running, ignoring new submission");
            return Err(UploadError::Busy);
        }
        let file = match forms::validate_upload(file.as_ref()) {
            Ok(f) => f.clone(),
            Err(errors) => {
                self.upload_errors = errors.clone();
                return Err(UploadError::Invalid(errors));
            }
        };
        self.upload_errors = FormErrors::new();
        let timer = self.scheduler.set_timer(self.config.inference_delay());
        log::debug!("analysis of {:?} scheduled", file.name);
        self.pending = Some(PendingInference { timer, file });
        Ok(())
    }

    /// "Analyze another image": drop the stored result and go home.
    pub fn new_analysis(&mut self) -> Navigation {
        if let Err(e) = self.services.slot.clear_last() {
            log::warn!("cannot clear result slot: {e}");
        }
        self.slot_state = SlotState::Empty;
        self.navigate(Route::Home)
    }

    fn complete_inference(&mut self, file: ImageFile) -> bool {
        let inference = infer(&file.name, file.size);
        log::info!(
            "analysis of {:?}: {} ({:.3})",
            file.name,
            inference.label,
            inference.confidence
        );
        let record = ResultRecord::new(file.image, inference);
        if let Err(e) = self.services.slot.set_last(&record) {
            log::warn!("cannot store result: {e}");
            self.upload_errors = FormErrors::from(FieldError::new("image", MSG_ANALYSIS_FAILED));
            return false;
        }
        // Already on the result view, navigation is a no-op and will not
        // re-read the slot.
        self.slot_state = SlotState::Ready(record);
        self.navigate(Route::Result);
        true
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Move the clock forward by `delta`, dispatching every wakeup that falls
    /// due on the way.
    pub fn advance(&mut self, delta: Duration) -> Tick {
        let until = self.scheduler.now().checked_add(delta).unwrap_or(Duration::MAX);
        let mut tick = Tick::default();
        while let Some(wakeup) = self.scheduler.pop_due(until) {
            match wakeup {
                Wakeup::Frame {
                    mount,
                    timestamp_ms,
                } => match &mut self.chart {
                    Some((id, chart)) if *id == mount => {
                        tick.frames += 1;
                        if chart.on_frame(timestamp_ms) == FrameOutcome::Continue {
                            self.scheduler.request_frame(mount);
                        }
                    }
                    _ => tick.stale_frames += 1,
                },
                Wakeup::Timer { id } => {
                    let due = self.pending.as_ref().is_some_and(|p| p.timer == id);
                    if due {
                        if let Some(p) = self.pending.take() {
                            tick.inference_completed |= self.complete_inference(p.file);
                        }
                    }
                }
            }
        }
        if tick.frames > 0 || tick.inference_completed {
            log::debug!(
                "advanced to {:.1}ms: {} frames, inference {}",
                self.scheduler.now_ms(),
                tick.frames,
                tick.inference_completed
            );
        }
        tick
    }

    /// Advance in frame-sized steps until nothing is scheduled or `limit`
    /// has elapsed. Returns the total time advanced.
    pub fn run_until_idle(&mut self, limit: Duration) -> Duration {
        let start = self.scheduler.now();
        let step = self.config.frame_interval();
        while !self.scheduler.is_idle() && self.scheduler.now() - start < limit {
            self.advance(step);
        }
        self.scheduler.now() - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_reader::ImageRef;

    fn app_at(fragment: Option<&str>) -> TriageApp {
        TriageApp::start(TriageConfig::default(), Services::in_memory(), fragment).unwrap()
    }

    fn signed_in() -> TriageApp {
        let mut app = app_at(Some("#/signup"));
        app.submit_signup(&SignupForm {
            name: "Ada".into(),
            email: "ada@example.org".into(),
            password: "longenough".into(),
            confirm: "longenough".into(),
        })
        .unwrap();
        app
    }

    fn png(name: &str, size: u64) -> ImageFile {
        ImageFile::new(name, size, ImageRef(format!("/scans/{name}")))
    }

    #[test]
    fn guest_start_lands_on_login_without_chart() {
        let app = app_at(None);
        assert_eq!(app.route(), &Route::Login);
        assert!(app.chart().is_none());
        assert!(app.scheduler().is_idle());
    }

    #[test]
    fn signup_opens_dashboard() {
        let app = signed_in();
        assert_eq!(app.route(), &Route::Dashboard);
        assert_eq!(app.view().title(), "Welcome, Ada");
    }

    #[test]
    fn home_mounts_a_chart_that_finishes() {
        let mut app = signed_in();
        app.navigate(Route::Home);
        assert!(app.chart().is_some());
        app.advance(Duration::from_millis(1000));
        let chart = app.chart().unwrap();
        assert!(chart.is_finished());
        assert_eq!(chart.visible(), 80);
        assert_eq!(app.scheduler().pending_frames(), 0);
    }

    #[test]
    fn remount_ignores_previous_frames() {
        let mut app = signed_in();
        app.navigate(Route::Home);
        app.advance(Duration::from_millis(100));
        app.navigate(Route::Privacy);
        assert!(app.chart().is_none());
        app.navigate(Route::Home);
        let tick = app.advance(Duration::from_millis(50));
        assert!(tick.frames > 0);
        assert_eq!(tick.stale_frames, 0);
        assert!(app.chart().unwrap().progress() < 0.1);
    }

    #[test]
    fn upload_runs_after_delay() {
        let mut app = signed_in();
        app.navigate(Route::Home);
        app.submit_upload(Some(png("a.png", 500))).unwrap();
        assert!(app.is_busy());
        assert_eq!(
            app.submit_upload(Some(png("b.png", 1))),
            Err(UploadError::Busy)
        );
        let tick = app.advance(Duration::from_millis(599));
        assert!(!tick.inference_completed);
        let tick = app.advance(Duration::from_millis(1));
        assert!(tick.inference_completed);
        assert_eq!(app.route(), &Route::Result);
        match app.view() {
            View::Result(r) => assert_eq!(r.confidence_pct, 95),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn upload_finishing_on_result_view_shows_new_record() {
        let mut app = signed_in();
        app.navigate(Route::Home);
        app.submit_upload(Some(png("a.png", 500))).unwrap();
        app.advance(Duration::from_millis(600));
        assert_eq!(app.route(), &Route::Result);

        app.submit_upload(Some(png("b.png", 999))).unwrap();
        let renders = app.renders();
        let tick = app.advance(Duration::from_millis(600));
        assert!(tick.inference_completed);
        assert_eq!(app.renders(), renders);
        match app.view() {
            View::Result(r) => {
                assert_eq!(r.image, ImageRef("/scans/b.png".into()));
                assert_eq!(r.confidence_pct, 99);
            }
            other => panic!("unexpected view {other:?}"),
        }
        assert_eq!(
            app.services.slot.get_last().unwrap().map(|r| r.image),
            Some(ImageRef("/scans/b.png".into()))
        );
    }

    #[test]
    fn upload_without_file_sets_inline_error() {
        let mut app = signed_in();
        app.navigate(Route::Home);
        let err = app.submit_upload(None).unwrap_err();
        assert!(matches!(err, UploadError::Invalid(_)));
        match app.view() {
            View::Home { upload_errors, .. } => {
                assert_eq!(upload_errors.get("image"), Some(forms::MSG_IMAGE_REQUIRED));
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn leaving_home_discards_pending_analysis() {
        let mut app = signed_in();
        app.navigate(Route::Home);
        app.submit_upload(Some(png("a.png", 500))).unwrap();
        app.navigate(Route::Privacy);
        assert!(!app.is_busy());
        let tick = app.advance(Duration::from_secs(2));
        assert!(!tick.inference_completed);
        assert_eq!(app.route(), &Route::Privacy);
    }

    #[test]
    fn new_analysis_clears_result() {
        let mut app = signed_in();
        app.navigate(Route::Home);
        app.submit_upload(Some(png("a.png", 500))).unwrap();
        app.advance(Duration::from_secs(1));
        app.new_analysis();
        assert_eq!(app.route(), &Route::Home);
        app.navigate(Route::Result);
        assert_eq!(app.view(), View::NoResult);
    }

    #[test]
    fn login_failure_stays_on_login() {
        let mut app = app_at(Some("#/login"));
        let err = app
            .submit_login(&LoginForm {
                email: "who@example.org".into(),
                password: "x".into(),
            })
            .unwrap_err();
        assert_eq!(err.get("password"), Some(crate::auth::MSG_BAD_CREDENTIALS));
        assert_eq!(app.route(), &Route::Login);
        match app.view() {
            View::Login { errors } => assert_eq!(errors, err),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn verify_route_consumes_token() {
        let mut app = signed_in();
        let token = app.verification_token("ada@example.org").unwrap();
        app.open(&format!("#/verify-email?token={token}"));
        assert_eq!(
            app.view(),
            View::VerifyEmail(VerifyStatus::Success(crate::auth::MSG_VERIFIED.into()))
        );
        assert!(app.verification_token("ada@example.org").is_none());
    }
}
