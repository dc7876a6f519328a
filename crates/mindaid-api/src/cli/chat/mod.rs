//! Interactive CLI chat experience for MindAid.
//!
//! This module implements the chat loop: streamed assistant replies printed
//! as they arrive, a welcome banner, slash commands, and Ctrl+C to stop a
//! reply. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
