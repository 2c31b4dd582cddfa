//! Shared configuration for the monitorswitch DDC/CI tool.

pub mod config;
