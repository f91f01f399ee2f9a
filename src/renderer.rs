use anyhow::{Result, anyhow};
use image::DynamicImage;
use qrcode::EcLevel;
use reqwest::Client;

use crate::{
    config::RenderConfig,
    image_processing,
    params::GenerationRequest,
    qr,
    url_validation::validate_http_url,
};

/// Turns a validated request into PNG bytes, downloading the center logo
/// when one is requested.
#[derive(Clone, Debug)]
pub struct QrRenderer {
    http: Client,
    logo_max_bytes: u64,
}

impl QrRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.logo_fetch_timeout)
            .build()
            .map_err(|err| anyhow!("build http client failed: {err}"))?;
        Ok(Self {
            http,
            logo_max_bytes: config.logo_max_bytes,
        })
    }

    pub async fn render(&self, request: &GenerationRequest) -> Result<Vec<u8>> {
        let logo = match &request.logo {
            Some(options) => Some(self.fetch_logo(&options.url).await?),
            None => None,
        };
        let request = request.clone();
        tokio::task::spawn_blocking(move || compose(&request, logo.as_ref()))
            .await
            .map_err(|err| anyhow!("render task failed: {err}"))?
    }

    async fn fetch_logo(&self, raw_url: &str) -> Result<DynamicImage> {
        let url = validate_http_url(raw_url)?;
        tracing::debug!(%url, "fetching logo");
        let mut response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|err| anyhow!("fetch image failed: {err}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("fetch image failed: HTTP {status}"));
        }
        let limit = self.logo_max_bytes;
        if let Some(length) = response.content_length().filter(|length| *length > limit) {
            return Err(anyhow!("image too large: {length} bytes exceeds {limit}"));
        }
        let headers = response.headers().clone();
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| anyhow!("read image bytes failed: {err}"))?
        {
            if (bytes.len() + chunk.len()) as u64 > limit {
                return Err(anyhow!("image too large: exceeds {limit} bytes"));
            }
            bytes.extend_from_slice(&chunk);
        }
        let mime_from_header = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string());
        let detected = image_processing::detect_mime_type(&bytes).map(str::to_string);
        let mime_type = detected
            .or(mime_from_header)
            .ok_or_else(|| anyhow!("unsupported image type"))?;
        image_processing::decode_image(&bytes, &mime_type)
    }
}

/// Synchronous half of rendering: matrix, raster, optional logo, PNG.
pub fn compose(request: &GenerationRequest, logo: Option<&DynamicImage>) -> Result<Vec<u8>> {
    let ec_level = if logo.is_some() { EcLevel::H } else { EcLevel::M };
    let code = qr::encode_matrix(&request.data, ec_level)?;
    let raster = DynamicImage::ImageLuma8(qr::rasterize(&code, request.box_size, request.border)?);
    let image = match (logo, request.logo.as_ref()) {
        (Some(logo), Some(options)) => {
            let mut image = raster.to_rgba8();
            let symbol_side = code.width() as u32 * request.box_size;
            image_processing::overlay_logo(&mut image, logo, symbol_side, options);
            DynamicImage::ImageRgba8(image)
        }
        _ => raster,
    };
    image_processing::encode_png(&image)
}
