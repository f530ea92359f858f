// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Client for the remote blogging prompt settings service.
//!
//! The service stores, per site, whether prompt reminders are enabled together with the
//! weekdays and time of day they fire. The reminders engine mirrors its local schedule into
//! these settings and pushes them with [`PromptsClient::update_settings`].

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(clippy::struct_excessive_bools, clippy::match_bool)]

mod client;
mod config;
mod error;
mod http;
mod types;

pub use crate::client::PromptsClient;
pub use crate::config::{AuthMethod, PromptsConfig};
pub use crate::error::PromptsError;
pub use crate::types::{PromptSettings, ReminderDays, SiteId};
