//! unitwatch - deploy host configuration files as systemd units
//!
//! A Rust implementation that:
//! - Watches well-known configuration files with inotify
//! - Translates them into systemd-networkd units via an external command
//! - Deploys the units through the systemd D-Bus API
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────── unitwatch ────────────────────────┐
//! │  watch (dispatcher) ─▶ synth ─▶ materialize (temp file)   │
//! └──────────────────────────────┬─────────────────────────────┘
//!                                │ StartTransientUnit
//! ┌────────────────────── unitwatch-deploy ───────────────────┐
//! │  units (placement) ─▶ manager (enable/reload/activate)    │
//! ├────────────────────────────────────────────────────────────┤
//! │                    dbus (systemd client)                   │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod dbus;
pub mod manager;
pub mod materialize;
pub mod synth;
pub mod units;
pub mod watch;

pub use dbus::SystemdClient;
pub use manager::{JobMode, ManagerError, TransientProperties, UnitControl};
pub use materialize::{MaterializeError, Materializer};
pub use synth::{Handler, SynthError, Synthesizer, Translator};
pub use units::{Document, Persistence, Unit, UnitGroup, UserData};
pub use watch::{DispatchError, Dispatcher, WatchError, WatchEvent, WatchRegistry};
