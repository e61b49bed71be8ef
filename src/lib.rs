//! pinmap: embedded single-pin map widget
//!
//! Renders one location pin with an info popup using a third-party maps
//! JavaScript library loaded at runtime.
//!
//! ## Features
//!
//! - Lazy, de-duplicated library script loading
//! - Map, marker and popup built from a TOML config
//! - Debounced re-layout on container and window resize
//! - Headless host for tests and the CLI, browser host on `wasm32`
//!
//! ## Quick Start
//!
//! ```rust
//! use pinmap::host::headless::HeadlessHost;
//! use pinmap::{Config, MapWidget};
//! use std::rc::Rc;
//!
//! let host = Rc::new(HeadlessHost::new());
//! let widget = MapWidget::new(host.clone(), Config::default());
//!
//! widget.start();
//! assert!(widget.state().is_loading());
//!
//! host.complete_script_load();
//! assert!(widget.state().is_ready());
//!
//! widget.stop();
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod host;
pub mod widget;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use widget::{MapWidget, WidgetState};
