//! # Rollcall Checklist
//!
//! The weekly attendance checklist, carried entirely in a round-tripped token.
//!
//! ```text
//! token ──render──▶ ChecklistView ──(button)──▶ postback "action:n&state:<token'>"
//!   ▲                                                   │
//!   └────────────────────── apply(token, code) ◀────────┘
//!
//! submit "action:r&state:<token>" ──▶ SheetLayout::row_write ──▶ spreadsheet
//! ```

pub mod applier;
pub mod catalog;
pub mod codec;
pub mod postback;
pub mod render;
pub mod roster;

pub use catalog::{CatalogEntry, EventCatalog};
pub use postback::ChecklistAction;
pub use render::{ChecklistView, Control, Emphasis, render};
pub use roster::{RowWrite, SheetLayout};
