//! Linked admin form fields: conditional disabling and server-driven
//! repopulation.
//!
//! Models one data-entry behavior: a primary paper-type selector that
//! disables and clears a dependent trade selector when it takes a value in
//! the disable set, and an assignment selector whose option list is rebuilt
//! from a server lookup whenever either controlling field changes. The
//! behavior re-binds itself to dynamically inserted form rows without
//! doubling handlers.
//!
//! The form lives in a headless [`Page`]; the lookup endpoint is reached
//! through the [`LookupClient`] trait, with [`HttpLookup`] as the bundled
//! blocking-HTTP implementation. All control flow runs on the caller's
//! thread; [`FormLink::pump`] drains deferred work and arrived replies.
//!
//! ```no_run
//! use formlink::{Control, FormLink, HttpLookup, Page, DEFAULT_ENDPOINT};
//!
//! let mut page = Page::new();
//! let paper = page.add_control(
//!     formlink::ScopeId::DOCUMENT,
//!     Control::select("id_question_paper", "question_paper"),
//! );
//! page.add_control(formlink::ScopeId::DOCUMENT, Control::select("id_trade", "trade"));
//! page.add_control(formlink::ScopeId::DOCUMENT, Control::select("id_qp_assign", "qp_assign"));
//!
//! let endpoint = format!("https://admin.example{DEFAULT_ENDPOINT}");
//! let mut link = FormLink::attach(page, HttpLookup::new(endpoint));
//! link.edit(paper, "Secondary");
//! link.pump();
//! ```

mod controller;
mod error;
mod lookup;
mod page;
mod selector;
mod sync;
mod toggle;
mod types;

pub use controller::{FormLink, Options};
pub use error::Error;
pub use lookup::{
    classify_body, HttpLookup, LookupClient, LookupReply, LookupResponse, Ticket,
    DEFAULT_ENDPOINT,
};
pub use page::{Control, Page, WidgetHook};
pub use types::{
    ControlId, FieldKind, FieldRole, LookupQuery, OptionEntry, ScopeId, PLACEHOLDER_TEXT,
};
