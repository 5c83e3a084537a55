//! sckrec: audio capture via a native ScreenCaptureKit recorder
//!
//! This library provides the core functionality for:
//! - Keeping the native recorder binary built and current (mtime-based cache)
//! - Generating timestamped output paths under a configurable directory
//! - Running one capture session as a child process with interrupt forwarding
//! - Localized user-facing messages (English and Simplified Chinese)
//!
//! # Architecture
//!
//! ```text
//!   CaptureRequest {mode, duration, output_path}
//!          │
//!          ▼
//!   ┌───────────────┐   stale?   ┌──────────────────┐
//!   │  build_cache  │──────────▶ │ compiler (child)  │
//!   └───────────────┘            └──────────────────┘
//!          │ BinaryReady
//!          ▼
//!   ┌───────────────┐   spawn    ┌──────────────────┐
//!   │ CaptureSession│──────────▶ │ recorder (child)  │
//!   └───────────────┘  SIGINT ─▶ └──────────────────┘
//!          │
//!          ▼
//!   RecordingResult {Completed | Interrupted | Failed}
//! ```
//!
//! The recorder itself is an opaque external program; this crate only owns
//! its build freshness, its invocation contract, and the session lifecycle.

pub mod build_cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod i18n;
pub mod lock;
pub mod outpath;
pub mod prompt;
pub mod session;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::{Result, SckrecError};
pub use session::{CaptureDuration, CaptureRequest, CaptureSession, Mode, Outcome, RecordingResult};
