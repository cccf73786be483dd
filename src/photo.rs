use std::time::Duration;

use image::DynamicImage;

use crate::error::ImageFetchError;

// ---------------------------------------------------------------------------
// Odometer photo download
// ---------------------------------------------------------------------------

/// Blocking one-shot photo download with a bounded timeout. No retries.
pub struct PhotoFetcher {
    client: reqwest::blocking::Client,
}

impl PhotoFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ImageFetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ImageFetchError::Client)?;
        Ok(PhotoFetcher { client })
    }

    /// GET `url` and decode the body as an image.
    pub fn fetch(&self, url: &str) -> Result<DynamicImage, ImageFetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageFetchError::Status(status));
        }
        let body = response.bytes()?;
        decode_image(&body)
    }
}

/// Decode an image of any enabled format, guessing it from the bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ImageFetchError> {
    Ok(image::load_from_memory(bytes)?)
}
