//! Core subsystems: unified token construction and the agent session gateway

pub mod agent;
pub mod token;
