//! Interactive terminal form.
//!
//! The terminal rendition of the single-page form: type a prompt and press
//! Enter to submit, `/clear` to reset. Input stays live while a request is
//! in flight; a watcher task renders every state change. Entry point:
//! `loop_runner::run_form_loop`.

pub mod banner;
pub mod commands;
pub mod events;
pub mod input;
pub mod loop_runner;
pub mod renderer;
