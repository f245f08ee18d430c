//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Bootstrap (sequencer.rs):
//!     Load TLS credentials once → walk candidate ports → bind → serve
//!
//! Shared state (state.rs, instance.rs):
//!     attempt index, running flag, active ServerInstance handle
//!
//! Publication (publisher.rs, signals.rs):
//!     on_bound → external owner may request stop / restart
//!     SIGTERM/SIGINT → stop, SIGHUP → restart
//! ```
//!
//! # Design Decisions
//! - One control task drives every bind attempt; no parallel binds
//! - The serving task parks on a cancellation token, never polls
//! - Publishers are injected, never global

pub mod instance;
pub mod publisher;
pub mod sequencer;
pub mod signals;
pub mod state;

pub use instance::ServerInstance;
pub use publisher::{LoggingPublisher, StatusPublisher};
pub use sequencer::{AttemptFailure, BootstrapError, BootstrapOutcome, BootstrapSequencer};
pub use signals::SignalPublisher;
pub use state::{BootstrapState, Phase};
