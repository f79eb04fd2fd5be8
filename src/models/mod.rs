// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the session client.

pub mod identity;
pub mod request;
pub mod role;
pub mod session;

pub use identity::Identity;
pub use request::{ApiRequest, ApiResponse};
pub use role::{Role, RoleProfile};
pub use session::{LegacySlots, Session};
