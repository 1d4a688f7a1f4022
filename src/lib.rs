//! # review-bot - Guided AI Code Reviews in Chat
//!
//! `review-bot` walks a user through a short intake (problem, language,
//! code), asks an OpenAI-compatible chat completion API for a review, posts
//! it back in chunks, and then answers follow-up questions about it.
//!
//! ## Layout
//!
//! - [`session`] runs one review dialogue per thread
//! - [`dispatch`] routes chat events to commands and sessions
//! - [`platform`] is the seam to a chat service; [`console`] implements it
//!   on the terminal
//! - [`completion`] talks to the API
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! review-bot --prompts prompts/code_review.json
//! # then type: !review
//! ```
//!
//! ## Configuration
//!
//! Settings are read from `~/.config/review-bot/config.toml`:
//!
//! ```toml
//! [bot]
//! prefix = "!"
//! prompt_path = "prompts/code_review.json"
//!
//! [completion]
//! model = "gpt-4o"
//! api_key_env = "OPENAI_API_KEY"
//! ```

/// Command-line interface definitions and handlers.
pub mod cli;

/// Chat completion client and conversation types.
pub mod completion;

/// Configuration file management.
pub mod config;

/// Terminal chat platform.
pub mod console;

/// Event routing and bot commands.
pub mod dispatch;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Chat platform abstraction.
pub mod platform;

/// Submission records, prompts, sanitisation and chunking.
pub mod review;

/// The per-thread review dialogue.
pub mod session;

/// Terminal colours.
pub mod ui;

#[cfg(test)]
mod testing;
