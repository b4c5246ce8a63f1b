//! Quell Engine
//!
//! Incrementally finds emoji in a live document's text and suppresses them
//! visually (hide, desaturate, dim or blur) by wrapping each one in a styled
//! marker element, while the page keeps mutating.
//!
//! # Pipeline
//! - [`coordinator`] collects nodes added by page mutations and debounces them
//! - [`scheduler`] drains queued nodes in batches, one batch per host slot
//! - [`processor`] splits text nodes, consulting [`policy`] and [`classifier`]
//! - [`controller`] restyles or reverts existing markers
//!
//! # Example
//! ```rust
//! use quell_engine::{DisplayMode, Engine, EngineConfig, ManualHost};
//!
//! let mut engine = Engine::from_html(
//!     "<p>Ship it 🚀</p>",
//!     "https://example.com/",
//!     ManualHost::new(),
//!     EngineConfig::default(),
//! );
//! engine.start(DisplayMode::Blur);
//! assert_eq!(engine.stats().markers, 1);
//! ```

pub mod classifier;
pub mod config;
pub mod controller;
pub mod coordinator;
mod engine;
mod error;
pub mod host;
pub mod logging;
pub mod messaging;
pub mod mode;
pub mod policy;
pub mod prefs;
pub mod processed;
pub mod processor;
pub mod scheduler;

pub use classifier::{contains_emoji, extract_emojis, is_emoji};
pub use config::EngineConfig;
pub use controller::{revert_processing, update_mode};
pub use coordinator::{HoldRelease, MutationCoordinator};
pub use engine::{Engine, EngineStats};
pub use error::{EngineError, EngineResult};
pub use host::{Host, ManualHost, SlotKind};
pub use messaging::{Command, CommandOutcome, broadcast};
pub use mode::{DisplayMode, MarkerStyle};
pub use policy::VisitationPolicy;
pub use prefs::{KeyValueStore, MemoryStore, Preferences, Settings, SettingsPatch, StorageError};
pub use processed::ProcessedSet;
pub use processor::NodeProcessor;
pub use scheduler::{BatchScheduler, SlotReport, WorkItem};

pub use quell_dom as dom;
pub use quell_html as html;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
