//! rootlog - leveled line logger with project-relative caller locations
//!
//! Every line carries the severity tag and the `file:line` of the call site,
//! with the file shown relative to the detected project root when possible.
//!
//! ```no_run
//! use rootlog::{Config, Logger};
//!
//! let logger = Logger::open(&Config::load()?)?;
//! rootlog::info!(logger, "listening on port {}", 8080);
//! # Ok::<(), rootlog::Error>(())
//! ```

pub mod caller;
pub mod config;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod normalize;
pub mod root;
pub mod sink;

pub use caller::{CallSite, CallerInfo, FixedCaller, TrackedCaller};
pub use config::{Config, EnvSource, Layered, ProcessEnv};
pub use error::{Error, Result};
pub use format::FormatFlags;
pub use level::Severity;
pub use logger::{Logger, LoggerBuilder};
pub use normalize::normalize;
pub use root::{Anchor, MarkerFile, ProjectRootLocator, RootPredicate};
pub use sink::SharedBuffer;
