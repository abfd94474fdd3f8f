//! HTTP request handlers, one module per resource

pub mod chat;
pub mod documents;
pub mod health;
pub mod history;
