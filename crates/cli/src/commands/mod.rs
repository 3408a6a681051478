//! Subcommand handlers

pub mod aop;
pub mod audit;
pub mod budget;
pub mod cost_center;
pub mod employee;
pub mod purchase;
