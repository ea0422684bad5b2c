//! # Journal Guard Testkit
//!
//! Testing utilities for Journal Guard.
//!
//! ## Overview
//!
//! - **Fixtures**: A guard with a configured authority and verified grantees
//! - **Generators**: Proptest strategies for identities, levels, material and
//!   whole operation sequences
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use journal_guard_testkit::generators::{grant_ops, GrantOp};
//!
//! proptest! {
//!     #[test]
//!     fn shares_never_exceed_cap(ops in grant_ops(4, 32)) {
//!         // apply ops, check the invariant after each one
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use journal_guard_testkit::fixtures::GuardFixture;
//! use journal_guard::{EntryId, GrantRequest};
//!
//! let mut fixture = GuardFixture::new(2);
//! let owner = fixture.owner_ctx(10);
//! let grantee = fixture.therapists[0];
//! fixture.guard.grant_permission(&owner, GrantRequest::new(EntryId(0), grantee, 1)).unwrap();
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{parties, GuardFixture};
pub use generators::{GrantOp, KeyMaterial};
