//! # triage-core
//!
//! Client-side simulation core of the gastric-cancer triage demo.
//!
//! Nothing here talks to a model or a server. The core produces a seeded
//! synthetic training curve, animates it onto an abstract drawing surface,
//! fakes an inference from a file's name and size, and routes between views
//! behind a local session.
//!
//! ## Quick Start
//!
//! ```
//! use std::time::Duration;
//! use triage_core::{Route, Services, TriageApp, TriageConfig};
//!
//! let mut app = TriageApp::start(TriageConfig::default(), Services::in_memory(), Some("#/dashboard"))
//!     .expect("default chart geometry is valid");
//!
//! // No session yet, so the guard sends us to login.
//! assert_eq!(app.route(), &Route::Login);
//!
//! // Time only moves when the caller says so.
//! app.advance(Duration::from_millis(16));
//! ```
//!
//! ## Architecture
//!
//! SeededStream → SeriesPair → ChartMount (driven by Scheduler frames) → Surface
//!
//! TriageApp owns Router, Session, Scheduler, the mounted chart and the
//! pending inference. Views are computed from that state by [`view::dispatch`].

pub mod animation;
pub mod app;
pub mod auth;
pub mod chart;
pub mod config;
pub mod error;
pub mod file_reader;
pub mod forms;
pub mod inference;
pub mod prng;
pub mod result_slot;
pub mod route;
pub mod router;
pub mod scheduler;
pub mod series;
pub mod session;
pub mod view;

pub use animation::{ChartMount, FrameOutcome, Progress, REVEAL_DURATION_MS};
pub use app::{Services, Tick, TriageApp};
pub use auth::{AuthService, LocalAuthService};
pub use chart::{ChartGeometry, DrawOp, FrameBuffer, Surface, compose_frame};
pub use config::TriageConfig;
pub use error::{AuthError, ChartError, ConfigError, FieldError, FormErrors, SlotError, UploadError};
pub use file_reader::{FileReader, FsFileReader, ImageFile, ImageRef};
pub use forms::{LoginForm, SignupForm};
pub use inference::{InferenceResult, Label, infer, name_hash, recommendations, specialists};
pub use prng::SeededStream;
pub use result_slot::{FileResultSlot, MemoryResultSlot, ResultRecord, ResultSlot};
pub use route::Route;
pub use router::{Navigation, Router, Transition, guard};
pub use scheduler::{MountId, Scheduler, TimerId, Wakeup};
pub use series::SeriesPair;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore, User};
pub use view::{NavLink, ResultView, View, VerifyStatus, nav_links};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
