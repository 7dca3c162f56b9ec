//! View dispatcher: maps the current route plus application state to the
//! content a front end should render.
//!
//! Views are plain data. They carry every string a renderer needs so the
//! terminal UI and the CLI print the same text.

use serde::Serialize;

use crate::error::FormErrors;
use crate::file_reader::ImageRef;
use crate::inference::{InferenceResult, Specialist, recommendations, specialists};
use crate::result_slot::ResultRecord;
use crate::route::Route;
use crate::session::Session;

pub const HOME_TITLE: &str = "Federated Intelligence for Gastric Cancer Detection";
pub const HOME_LEDE: &str =
    "Accurate. Secure. Federated. Revolutionizing gastric cancer diagnosis through privacy-preserving AI.";
pub const CHART_HELP: &str = "Synthetic metric preview";
pub const UPLOAD_HELP: &str = "Select an endoscopy image (JPG/PNG). The image stays on this machine. A simulated risk score illustrates the intended workflow.";
pub const STATUS_IDLE: &str = "No result yet.";
pub const STATUS_RUNNING: &str = "Running analysis…";
pub const PRIVACY_TEXT: &str =
    "No real data is processed in this demo. All authentication is local-only.";
pub const DASHBOARD_HELP: &str =
    "This is a demo dashboard. Connect your real FL backend to populate rounds and metrics.";
pub const NO_RESULT_TITLE: &str = "No result available";
pub const NO_RESULT_HELP: &str = "Please upload an image on the home page to run analysis.";
pub const RESULT_DISCLAIMER: &str = "This is a simulated result for UI demonstration only.";
pub const BADGE_TEXT: &str = "Gastric cancer";
pub const NOT_FOUND_TEXT: &str = "Page not found.";

/// Fixed federation numbers shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub global_rounds: u32,
    pub participating_nodes: u32,
    pub last_auc: f64,
}

pub const DEMO_STATS: DashboardStats = DashboardStats {
    global_rounds: 128,
    participating_nodes: 9,
    last_auc: 0.91,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavLink {
    Home,
    Dashboard,
    Logout,
    Signup,
}

impl NavLink {
    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Dashboard => "Dashboard",
            Self::Logout => "Logout",
            Self::Signup => "Sign up",
        }
    }
}

/// Header links for the given session state.
pub fn nav_links(authenticated: bool) -> &'static [NavLink] {
    if authenticated {
        &[NavLink::Home, NavLink::Dashboard, NavLink::Logout]
    } else {
        &[NavLink::Signup]
    }
}

/// Outcome of an email verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum VerifyStatus {
    Success(String),
    Failed(String),
}

/// What the result slot held when the view was built. An unreadable record
/// is discarded on read and shows up here as `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    Empty,
    Ready(ResultRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub image: ImageRef,
    pub inference: InferenceResult,
    pub verdict: &'static str,
    pub confidence_pct: u32,
    pub badge: Option<&'static str>,
    pub recommendations: [String; 3],
    pub specialists: &'static [Specialist],
}

impl ResultView {
    pub fn from_record(record: &ResultRecord) -> Self {
        let r = &record.inference;
        Self {
            image: record.image.clone(),
            inference: *r,
            verdict: r.verdict(),
            confidence_pct: r.confidence_pct(),
            badge: r.shows_badge().then_some(BADGE_TEXT),
            recommendations: recommendations(r),
            specialists: specialists(),
        }
    }

    /// "Assumed accuracy: 95%".
    pub fn accuracy_line(&self) -> String {
        format!("Assumed accuracy: {}%", self.confidence_pct)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Home {
        upload_errors: FormErrors,
        busy: bool,
    },
    Login {
        errors: FormErrors,
    },
    Signup {
        errors: FormErrors,
    },
    Dashboard {
        user_name: String,
        stats: DashboardStats,
    },
    Result(Box<ResultView>),
    NoResult,
    Privacy,
    VerifyEmail(VerifyStatus),
    NotFound {
        path: String,
    },
}

impl View {
    pub fn title(&self) -> String {
        match self {
            Self::Home { .. } => HOME_TITLE.to_string(),
            Self::Login { .. } => "Log in".to_string(),
            Self::Signup { .. } => "Create account".to_string(),
            Self::Dashboard { user_name, .. } => format!("Welcome, {user_name}"),
            Self::Result(_) => "Result".to_string(),
            Self::NoResult => NO_RESULT_TITLE.to_string(),
            Self::Privacy => "Privacy".to_string(),
            Self::VerifyEmail(_) => "Email verification".to_string(),
            Self::NotFound { .. } => "404".to_string(),
        }
    }

    /// Whether this view hosts the animated preview chart.
    pub fn has_chart(&self) -> bool {
        matches!(self, Self::Home { .. })
    }
}

/// Everything besides the route that influences what is shown.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub session: Option<&'a Session>,
    pub slot: &'a SlotState,
    pub login_errors: &'a FormErrors,
    pub signup_errors: &'a FormErrors,
    pub upload_errors: &'a FormErrors,
    pub busy: bool,
    pub verification: Option<&'a VerifyStatus>,
}

/// Build the view for an already-guarded route.
///
/// Guarded routes reached without a session (which the router prevents)
/// fall back to the login view rather than panicking.
pub fn dispatch(route: &Route, ctx: &ViewContext<'_>) -> View {
    match route {
        Route::Home => View::Home {
            upload_errors: ctx.upload_errors.clone(),
            busy: ctx.busy,
        },
        Route::Login => View::Login {
            errors: ctx.login_errors.clone(),
        },
        Route::Signup => View::Signup {
            errors: ctx.signup_errors.clone(),
        },
        Route::Dashboard => match ctx.session {
            Some(session) => View::Dashboard {
                user_name: session.user.name.clone(),
                stats: DEMO_STATS,
            },
            None => View::Login {
                errors: ctx.login_errors.clone(),
            },
        },
        Route::Result => match ctx.slot {
            SlotState::Empty => View::NoResult,
            SlotState::Ready(record) => View::Result(Box::new(ResultView::from_record(record))),
        },
        Route::Privacy => View::Privacy,
        Route::VerifyEmail { .. } => View::VerifyEmail(
            ctx.verification
                .cloned()
                .unwrap_or_else(|| VerifyStatus::Failed(crate::auth::MSG_NO_TOKEN.to_string())),
        ),
        Route::NotFound { path } => View::NotFound { path: path.clone() },
    }
}
