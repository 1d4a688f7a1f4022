//! The guided review dialogue.
//!
//! A [`Session`] walks one user through intake (problem, language, code),
//! requests a review, relays it, and then answers follow-up questions until
//! the user finishes or goes idle. Sessions are built by a
//! [`SessionFactory`] and fed by an [`Inbox`].

mod driver;
mod inbox;
pub mod messages;
mod phase;

pub use driver::{
    IDLE_TIMEOUT, QA_WINDOW, Session, SessionFactory, SessionSettings, SessionSummary,
};
pub use inbox::{Inbox, Wait};
pub use phase::Phase;
