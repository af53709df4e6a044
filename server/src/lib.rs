//! HTTP front door for the NoorAI flows.

pub mod config;
pub mod http_server;
