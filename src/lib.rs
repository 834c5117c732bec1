//! Adaptive TEKS grade-6 math tutor: item generation, grading and learner
//! progress, plus the HTTP/WebSocket layer that serves them.

pub mod fraction;
pub mod error;
pub mod domain;
pub mod util;
pub mod templates;
pub mod sampler;
pub mod solver;
pub mod expr;
pub mod svg;
pub mod skills;
pub mod decorator;
pub mod validator;
pub mod factory;
pub mod grader;
pub mod mastery;
pub mod curriculum;
pub mod review;
pub mod config;
pub mod telemetry;
pub mod seeds;
pub mod state;
pub mod protocol;
pub mod logic;
pub mod routes;

pub use domain::Item;
pub use error::{GenerationError, TemplateError};
pub use factory::ItemFactory;
