//! # Chorale Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The calendar sync orchestrator and reconciler
//! - The conflict-resolution policy
//!
//! ## Architecture Principles
//! - Only depends on `chorale-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod sync;

// Re-export specific items to avoid ambiguity
pub use sync::ports::{
    CalendarProvider, DraftWhen, EventRepository, MemberRepository, RemoteEvent, RemoteEventDraft,
    RemoteWhen, SyncLease, SyncLeaseManager, SyncWindow, TokenRefresh, TokenRepository,
};
pub use sync::reconciler::EventReconciler;
pub use sync::service::SyncService;
pub use sync::strategy::{ConflictStrategy, RemoteEventFields, RemoteWinsStrategy};
pub use sync::token::TokenRefresher;
