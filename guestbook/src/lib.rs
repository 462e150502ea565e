//! A small guestbook web application.
//!
//! Visitors leave a name and a message through an HTML form. Entries are kept
//! in a [`store::GuestbookStore`] (DynamoDB in production) and redisplayed
//! together with a few diagnostics taken from the environment the process runs
//! in: node name, pod or host name, and region. The `/volume` routes append
//! sequential ids to a file on a mounted volume so persistence across restarts
//! can be observed.
//!
//! The application is transport agnostic. [`App::handle`] takes an
//! `http::Request` with a fully buffered body and returns an `http::Response`;
//! the `guestbook` binary drives it with hyper, the `guestbook_lambda` crate
//! drives it from API Gateway and ALB events.

pub use crate::{app::App, error::AppError, response::IntoResponse};

mod app;
pub mod config;
pub mod entry;
mod error;
pub mod render;
pub mod response;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod volume;

/// Type alias for `http::Request`s with a buffered body
pub type Request = http::Request<bytes::Bytes>;

/// Type alias for `http::Response`s with a buffered body
pub type Response = http::Response<bytes::Bytes>;
