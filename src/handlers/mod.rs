//! HTTP handlers: JSON country API, HTML pages, and the login flow.

pub mod auth;
pub mod countries;
pub mod pages;
