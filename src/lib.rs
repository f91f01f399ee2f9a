pub mod client;
pub mod config;
pub mod error;
pub mod image_processing;
pub mod params;
pub mod qr;
pub mod renderer;
pub mod routes;
pub mod url_validation;
pub mod web_pages;

pub use client::{ClientError, CreateOptions, DEFAULT_BASE_URL, QrCodeClient, encode_data};
pub use config::{RenderConfig, ServerConfig};
pub use error::ApiError;
pub use params::{CreateParams, GenerationRequest, LogoOptions, decode_lenient};
pub use renderer::QrRenderer;
pub use routes::{AppState, router};
