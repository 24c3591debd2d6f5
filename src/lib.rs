//! Course Compass - Retrieval-Augmented Chat Engine
//!
//! This crate implements the conversational core for an IT training
//! company's website assistant: knowledge retrieval over embedded course
//! and article content, intent classification, grounded response
//! generation with provider failover, and lead signal extraction.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
