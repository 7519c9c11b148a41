//! MediQuery is a terminal healthcare chatbot whose answers are grounded in
//! live web search and cited.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation state machine, the message exchange, the
//!   remote chat session, source normalization, and configuration.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that drives user input and display updates.
//! - [`api`] defines the Gemini `generateContent` payloads.
//! - [`utils`] holds URL, credential, and logging helpers.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`ui::chat_loop`] for
//! interactive sessions and [`cli::ask`] for one-shot questions.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
