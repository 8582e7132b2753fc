//! Weft - a modal text editing engine driven by a host application

pub mod action;
pub mod collaborator;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod host;
pub mod key;
pub mod keymap;
pub mod lines;
pub mod measure;
pub mod mode;
pub mod rpc;
pub mod session;
pub mod term;
pub mod timers;
pub mod undo;
pub mod update;
pub mod wrap;

#[cfg(test)]
pub mod test_utils;
