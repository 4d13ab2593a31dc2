//! # API crate: the student peer-rating service
//!
//! Everything between an HTTP request and the record store: the domain model,
//! rating aggregation, the identity seam, and the axum handlers that tie them
//! together. The `server` binary only adds configuration, logging and transport
//! layers on top of [`routes::router`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | `Account`, `Student`, `Rating` and the validated values they carry (`RatingValue`, `Category`, `NewStudent`) |
//! | [`aggregate`] | Appending a rating and recomputing a student's average and review count |
//! | [`records`] | Key layout (`student:<id>`, `user:<email>`) and typed reads/writes on the record store |
//! | [`seed`] | Demo students for an empty installation |
//! | [`stats`] | Dashboard aggregates across all students |
//! | [`auth`] | Identity service trait, local password/token implementation, bearer extractor |
//! | [`handlers`] / [`routes`] | HTTP endpoints |
//! | [`error`] | `ApiError` and its `{ "error": ... }` response shape |
//!
//! ## Endpoints
//!
//! - **Accounts**: `POST /signup`, `POST /login`, `POST /logout`
//! - **Students**: `GET /students`, `GET /students/{id}`, `POST /students`
//! - **Ratings**: `POST /ratings`
//! - **Dashboard**: `GET /stats`, `POST /init-demo`
//! - **Liveness**: `GET /health`

pub mod aggregate;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod records;
pub mod routes;
pub mod seed;
pub mod state;
pub mod stats;

pub use error::ApiError;
pub use models::{Account, AccountInfo, Category, Rating, RatingValue, Student};
pub use routes::router;
pub use state::{AppState, AuthConfig};
