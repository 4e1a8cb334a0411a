pub mod config;
pub mod entities;
pub mod notice;
pub mod todo;
pub mod web;
