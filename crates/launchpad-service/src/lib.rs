//! # launchpad-service
//!
//! Domain services of the Launchpad backend with an in-process caching
//! layer in front of the identity directory and the seat repository.
//!
//! ## Modules
//!
//! - [`cache`] - TTL stores and the typed user/seat cache adapters
//! - [`service`] - Cache-aside user and seat services
//! - [`bootstrap`] - Wiring of caches and services from configuration
//! - [`config`] - Configuration model and loader
//! - [`context`] - Cancellation and deadlines for upstream calls

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod observability;
pub mod repository;
pub mod service;

pub use bootstrap::{Services, init};
pub use cache::{CacheError, CacheKind, CacheStats, Clock, ManualClock, SystemClock};
pub use config::{AppConfig, CacheConfig, StoreSettings};
pub use context::RequestContext;
pub use error::{BootstrapError, ServiceError, ServiceResult};
pub use filter::filter_bots;
pub use repository::{RepositoryError, RepositoryResult, SeatRepository, SeatTransaction};
pub use service::{SeatService, UserService};
