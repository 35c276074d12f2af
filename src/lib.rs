pub mod config;
pub mod gate;
pub mod sink;
pub mod source;
pub mod tracker;
pub mod web;
