//! Asynchronous loading of the textured demo's image.
//!
//! The load runs off the frame loop; each frame polls the request once and
//! keeps drawing with whatever texture is bound until the image arrives.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use log::{error, info};

use crate::error::ImageLoadError;

/// Decoded RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decodes an encoded image (PNG or JPEG) into RGBA8.
pub fn decode_image(path: &Path, bytes: &[u8]) -> Result<LoadedImage, ImageLoadError> {
    let decoded = image::load_from_memory(bytes).map_err(|source| ImageLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

type LoadResult = Result<LoadedImage, ImageLoadError>;

/// An image load in flight.
#[derive(Debug)]
pub struct ImageRequest {
    path: PathBuf,
    receiver: Receiver<LoadResult>,
}

impl ImageRequest {
    /// Starts loading `path` in the background.
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (sender, receiver) = mpsc::channel();
        start_load(path.clone(), sender);
        Self { path, receiver }
    }

    /// A request that has already finished with `result`.
    pub fn resolved(path: impl Into<PathBuf>, result: LoadResult) -> Self {
        let (sender, receiver) = mpsc::channel();
        let _ = sender.send(result);
        Self {
            path: path.into(),
            receiver,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the outcome once it is available.
    pub fn poll(&self) -> Option<LoadResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ImageLoadError::Disconnected {
                path: self.path.clone(),
            })),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn start_load(path: PathBuf, sender: mpsc::Sender<LoadResult>) {
    std::thread::spawn(move || {
        let result = std::fs::read(&path)
            .map_err(|source| ImageLoadError::Io {
                path: path.clone(),
                source,
            })
            .and_then(|bytes| decode_image(&path, &bytes));
        let _ = sender.send(result);
    });
}

#[cfg(target_arch = "wasm32")]
fn start_load(path: PathBuf, sender: mpsc::Sender<LoadResult>) {
    wasm_bindgen_futures::spawn_local(async move {
        let result = fetch_bytes(&path.to_string_lossy())
            .await
            .map_err(|message| ImageLoadError::Fetch {
                path: path.clone(),
                message,
            })
            .and_then(|bytes| decode_image(&path, &bytes));
        let _ = sender.send(result);
    });
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let window = web_sys::window().ok_or_else(|| "window not available".to_string())?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|err| format!("{err:?}"))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| "fetch did not return a Response".to_string())?;
    if !response.ok() {
        return Err(format!("HTTP status {}", response.status()));
    }
    let buffer = response
        .array_buffer()
        .map_err(|err| format!("{err:?}"))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|err| format!("{err:?}"))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Outcome reported by [`TextureSlot::poll`] exactly once.
#[derive(Debug)]
pub enum TextureEvent {
    Loaded(LoadedImage),
    Failed(String),
}

/// Load state of the texture: waiting, uploaded, or given up on.
#[derive(Debug)]
pub enum TextureSlot {
    Pending(ImageRequest),
    Ready,
    Failed(String),
}

impl TextureSlot {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let request = ImageRequest::spawn(path);
        info!("loading texture {}", request.path().display());
        Self::Pending(request)
    }

    /// Advances a pending load. Failures are final; there is no retry.
    pub fn poll(&mut self) -> Option<TextureEvent> {
        let Self::Pending(request) = self else {
            return None;
        };
        match request.poll()? {
            Ok(image) => {
                info!(
                    "loaded texture {} ({}x{})",
                    request.path().display(),
                    image.width,
                    image.height
                );
                *self = Self::Ready;
                Some(TextureEvent::Loaded(image))
            }
            Err(err) => {
                error!("{err}");
                let message = format!("Could not load image {}: {err}", request.path().display());
                *self = Self::Failed(message.clone());
                Some(TextureEvent::Failed(message))
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let mut image = image::RgbaImage::new(2, 1);
        image.put_pixel(1, 0, image::Rgba([255, 0, 0, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, image::ImageOutputFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn decodes_png_to_rgba() {
        let image = decode_image(Path::new("pixel.png"), &png_bytes()).unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.rgba, vec![0, 0, 0, 0, 255, 0, 0, 255]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_image(Path::new("mandrill.png"), b"not an image").unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode { .. }));
    }

    #[test]
    fn slot_reports_success_once() {
        let image = decode_image(Path::new("pixel.png"), &png_bytes()).unwrap();
        let mut slot = TextureSlot::Pending(ImageRequest::resolved("pixel.png", Ok(image)));
        assert!(matches!(slot.poll(), Some(TextureEvent::Loaded(_))));
        assert!(matches!(slot, TextureSlot::Ready));
        assert!(slot.poll().is_none());
    }

    #[test]
    fn slot_failure_is_final() {
        let result = decode_image(Path::new("mandrill.png"), b"nope");
        let mut slot = TextureSlot::Pending(ImageRequest::resolved("mandrill.png", result));
        let Some(TextureEvent::Failed(message)) = slot.poll() else {
            panic!("expected failure");
        };
        assert!(message.starts_with("Could not load image mandrill.png"));
        assert!(slot.is_failed());
        assert!(slot.poll().is_none());
    }

    #[test]
    fn missing_file_fails_in_background() {
        let request = ImageRequest::spawn("/definitely/not/here.png");
        let result = loop {
            if let Some(result) = request.poll() {
                break result;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        };
        assert!(matches!(result, Err(ImageLoadError::Io { .. })));
    }
}
