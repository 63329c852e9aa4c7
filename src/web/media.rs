//! Browser asset loading and HTML audio playback
//!
//! Images and sounds are fetched as promises and awaited together; any
//! single failure fails the whole load.

use std::collections::{BTreeMap, HashMap};

use js_sys::{Array, Promise};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlAudioElement, HtmlImageElement};

use crate::audio::AudioBackend;
use crate::error::EngineError;

/// Plays clips through a fixed set of `<audio>` elements, one per channel
pub struct HtmlAudioBackend {
    channels: Vec<HtmlAudioElement>,
}

impl HtmlAudioBackend {
    pub fn new(channel_count: usize) -> Result<Self, JsValue> {
        let channels = (0..channel_count)
            .map(|_| HtmlAudioElement::new())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { channels })
    }
}

impl AudioBackend for HtmlAudioBackend {
    type Clip = HtmlAudioElement;

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn duration_secs(&self, clip: &HtmlAudioElement) -> f64 {
        let duration = clip.duration();
        if duration.is_finite() { duration } else { 0.0 }
    }

    fn start(&mut self, channel: usize, clip: &HtmlAudioElement) {
        let Some(element) = self.channels.get(channel) else {
            return;
        };
        element.set_src(&clip.src());
        element.load();
        if let Err(e) = element.play() {
            log::warn!("Audio channel {} failed to play: {:?}", channel, e);
        }
    }
}

/// Resolves once the image has decoded
fn image_promise(image: &HtmlImageElement, path: &str) -> Promise {
    let promise = Promise::new(&mut |resolve, reject| {
        image.set_onload(Some(&resolve));
        image.set_onerror(Some(&reject));
    });
    image.set_src(path);
    promise
}

/// Resolves once the clip can play through
fn audio_promise(audio: &HtmlAudioElement) -> Promise {
    let promise = Promise::new(&mut |resolve, reject| {
        let _ = audio.add_event_listener_with_callback("canplaythrough", &resolve);
        audio.set_onerror(Some(&reject));
    });
    audio.load();
    promise
}

fn describe(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "network or decode error".to_string())
}

/// Decoded browser assets
pub struct LoadedMedia {
    pub sheet: HtmlImageElement,
    /// Path -> clip
    pub clips: HashMap<String, HtmlAudioElement>,
}

/// Load the sprite sheet and every sound in parallel
pub async fn load_media(sheet_path: &str, sounds: &BTreeMap<String, String>) -> Result<LoadedMedia, EngineError> {
    let asset_error = |asset: &str, e: JsValue| EngineError::asset_load(asset, describe(&e));

    let sheet = HtmlImageElement::new().map_err(|e| asset_error(sheet_path, e))?;
    let pending = Array::new();
    pending.push(&image_promise(&sheet, sheet_path));

    let mut clips = HashMap::new();
    for path in sounds.values() {
        let clip = HtmlAudioElement::new_with_src(path).map_err(|e| asset_error(path, e))?;
        pending.push(&audio_promise(&clip));
        clips.insert(path.clone(), clip);
    }

    JsFuture::from(Promise::all(&pending))
        .await
        .map_err(|e| asset_error("game assets", e))?;

    log::info!("Loaded sprite sheet and {} sounds", clips.len());
    Ok(LoadedMedia { sheet, clips })
}
