//! Page layer: HTTP handlers and the shop API payloads they work with.
//!
//! - **[`handlers`]**: Axum route handlers, one module per page family
//! - **[`models`]**: Request/response data structures for the shop API
//!
//! # Page Structure
//!
//! - **Dashboard** (`/`): headline counters and sales metrics
//! - **Entities** (`/{entity}/*`): list/detail/create/edit/delete for the registry in
//!   [`crate::views::entities`]
//! - **Companies** (`/companies/{id}/delete`): guarded deletion
//! - **Company** (`/settings`, `/sms/*`): settings and SMS credits
//! - **Reports** (`/reports`), **Swaps** (`/swaps/*`)
//! - **Administration** (`/admin/*`): benchmarks, data reset, modules, email logs

pub mod handlers;
pub mod models;
