//! Domain models for insight-vault.
//!
//! # Core Concepts
//!
//! ## Session Entities
//!
//! These live only as long as the process:
//!
//! - [`ExtractedQuestion`]: A correctly-answered exam item pulled out of pasted text or a PDF.
//! - [`ExtractionResult`]: A domain label plus the [`InsightBlock`]s synthesized from staged items.
//! - [`SessionSnapshot`]: What the controller currently shows (view, staging, status, vault).
//!
//! ## Persistent Entities
//!
//! - [`VaultItem`]: One mastered principle per synthesized question, keyed by the
//!   question's digest so the same question is never stored twice.

mod insight;
mod question;
mod session;
mod vault;

pub use insight::*;
pub use question::*;
pub use session::*;
pub use vault::*;
