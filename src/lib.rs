// SPDX-License-Identifier: PMPL-1.0-or-later
//! lockbot: Content Locking and Legibility Safeguards
//!
//! Part of the gitbot-fleet ecosystem. Lockbot stamps content into annotated
//! markup templates, lets an arbitrary style layer restyle it, and then
//! proves that the styling left protected content present and legible.
//!
//! ## Content Locker
//!
//! - **Templates**: one annotated markup template per media kind
//! - **Lock**: escaped placeholder substitution and protected/style-allowed
//!   index sets read back from the rendered markup
//! - **Integrity**: protected text compared by element, locked text by
//!   position, with a fingerprint fast path
//!
//! ## Accessibility Validator
//!
//! - **Contrast** (1.4.3/1.4.6): declared color pairs against WCAG AA/AAA
//! - **Visibility**: protected elements hidden, faded, shrunk, buried or
//!   pushed off-screen, plus unstyled calls to action
//! - **Auto-fix**: appended override patches and a blanket safeguard block
//!   for aggressive style sources

pub mod analyzers;
pub mod batch;
pub mod color;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fixer;
pub mod inputs;
pub mod locker;
pub mod markup;
pub mod report;
pub mod stylesheet;
pub mod validator;
pub mod violation;

pub use analyzers::{contrast::ContrastAuditor, visibility::VisibilityAuditor, Auditor};
pub use config::Config;
pub use coordinator::{Coordinator, StyleGenerator, StyleOutput, StyleSource};
pub use error::{LockbotError, Result};
pub use locker::{
    ContentLocker, ContentRequirements, IntegrityReport, IntegrityViolation, LockedMarkup,
    MediaKind,
};
pub use validator::Validator;
pub use violation::{
    CorrectivePatch, PatchKind, Severity, ValidationResult, Violation, ViolationKind, WcagLevel,
};
