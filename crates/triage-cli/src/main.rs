//! CLI for the gastric-cancer triage demo: synthetic metrics, simulated
//! inference and a session-gated terminal UI.

mod commands;
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "triage: local simulation of the federated gastric-cancer triage demo")]
#[command(version = triage_core::VERSION)]
struct Cli {
    /// JSON config file (seed, steps, canvas size, delays, data dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for session.json, users.json and last_result.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print (or save) the synthetic loss/AUC series
    Series {
        /// Generator seed (defaults to the config seed, 42)
        #[arg(long)]
        seed: Option<u32>,

        /// Points per curve (defaults to the config steps, 80)
        #[arg(long)]
        steps: Option<usize>,

        /// Write the series as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Simulate the chart reveal on a virtual clock.
    /// Without --at-ms, runs frame by frame until the animation finishes.
    Chart {
        /// Frame timestamps in milliseconds (repeatable)
        #[arg(long = "at-ms")]
        at_ms: Vec<f64>,

        /// Logical canvas width
        #[arg(long)]
        width: Option<f64>,

        /// Logical canvas height
        #[arg(long)]
        height: Option<f64>,

        /// Device pixel ratio (floored, at least 1)
        #[arg(long)]
        dpr: Option<f64>,

        /// Dump the draw operations of the last frame as JSON
        #[arg(long)]
        ops: bool,
    },

    /// Run the simulated analysis on an image file (requires login)
    Infer {
        /// Image to analyse
        path: PathBuf,
    },

    /// Create a local account and sign in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },

    /// Sign in with a local account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign out and return to the login view
    Logout,

    /// Verify an email address with the token issued at signup
    Verify {
        token: String,
    },

    /// Open a route fragment (e.g. "#/dashboard") and print the resolved view
    Open {
        fragment: String,
    },

    /// Interactive terminal UI
    Ui {
        /// Start at this route fragment instead of the last visited one
        #[arg(long)]
        route: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref(), cli.data_dir);

    match cli.command {
        Commands::Series {
            seed,
            steps,
            output,
        } => commands::series::run(&config, seed, steps, output.as_deref()),
        Commands::Chart {
            at_ms,
            width,
            height,
            dpr,
            ops,
        } => commands::chart::run(
            &config,
            commands::chart::ChartCommandConfig {
                at_ms: &at_ms,
                width,
                height,
                dpr,
                dump_ops: ops,
            },
        ),
        Commands::Infer { path } => commands::infer::run(&config, &path),
        Commands::Signup {
            name,
            email,
            password,
            confirm,
        } => commands::auth::signup(
            &config,
            triage_core::SignupForm {
                name,
                email,
                password,
                confirm,
            },
        ),
        Commands::Login { email, password } => {
            commands::auth::login(&config, triage_core::LoginForm { email, password })
        }
        Commands::Logout => commands::auth::logout(&config),
        Commands::Verify { token } => commands::auth::verify(&config, &token),
        Commands::Open { fragment } => commands::open::run(&config, &fragment),
        Commands::Ui { route } => commands::ui::run(&config, route.as_deref()),
    }
}
