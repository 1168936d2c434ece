//! Core domain logic for the bird clock.
//!
//! This crate contains the fundamental types and logic for:
//! - Catalog: validated seasons, quiet hours and merged bird schedules
//! - Resolution: mapping a timestamp to quiet hours or the active bird
//! - Tracking: detecting state transitions across clock events
//! - Debouncing: spacing out bouncy button input before it is enqueued

pub mod catalog;
pub mod debounce;
pub mod media;
pub mod resolver;
pub mod tracker;
pub mod types;

pub use catalog::{
    BirdDefinition, CatalogData, ConfigError, QuietWindow, ScheduleCatalog, SeasonEntry,
};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use media::{AudioPlayer, MediaError, Presenter};
pub use resolver::{QuietRule, ResolvedState, Resolver};
pub use tracker::{ClockEvent, Outcome, StateTracker, Transition};
pub use types::{BirdId, Month, SeasonId, TimeOfDay, ValidationError};
