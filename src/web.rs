//! Browser bindings. The page owns the canvas, the renderer, the overlay and
//! `requestAnimationFrame`; it forwards DOM events here and calls `tick`.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{KeyboardEvent, MouseEvent, Response};

use crate::assets::{AssetDescriptor, AssetError, AssetRole, AssetSource, LoadedAsset};
use crate::config::SceneManifest;
use crate::controller::input::wasm as dom;
use crate::controller::ControllerState;
use crate::logging;

#[wasm_bindgen(start)]
pub fn start() {
    logging::init();
}

fn js_error<E: Into<String>>(msg: E) -> JsValue {
    js_sys::Error::new(&msg.into()).into()
}

async fn fetch_text(url: &str) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no global `window`"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    if !response.ok() {
        return Err(js_error(format!("HTTP {}", response.status())));
    }
    let body = JsFuture::from(response.text()?).await?;
    body.as_string().ok_or_else(|| js_error("response body is not text"))
}

/// Loads JSON mesh files with `fetch`, relative to the page.
#[derive(Debug, Clone, Default)]
pub struct FetchAssetSource;

impl AssetSource for FetchAssetSource {
    fn load(&self, descriptor: &AssetDescriptor) -> impl Future<Output = Result<LoadedAsset, AssetError>> {
        let path = descriptor.path.clone();
        async move {
            let text = fetch_text(&path).await.map_err(|err| AssetError::Fetch {
                path: path.clone(),
                message: format!("{err:?}"),
            })?;
            LoadedAsset::from_json(&path, &text)
        }
    }
}

#[wasm_bindgen]
pub struct WalkthroughHandle {
    state: Rc<RefCell<ControllerState>>,
}

#[wasm_bindgen]
impl WalkthroughHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(manifest_json: &str, width: u32, height: u32) -> Result<WalkthroughHandle, JsValue> {
        let manifest = SceneManifest::from_json(manifest_json).map_err(|e| js_error(e.to_string()))?;
        let state = ControllerState::new(&manifest, width, height);
        let handle = Self {
            state: Rc::new(RefCell::new(state)),
        };
        if !manifest.assets.is_empty() {
            handle.spawn_loads(manifest.assets);
        }
        Ok(handle)
    }

    pub fn on_key_down(&self, code: &str) {
        self.state.borrow_mut().on_key_down(code);
    }

    pub fn on_key_up(&self, code: &str) {
        self.state.borrow_mut().on_key_up(code);
    }

    /// Convenience for listeners that pass the DOM event straight through.
    pub fn on_keyboard_event(&self, event: &KeyboardEvent, is_down: bool) {
        self.state.borrow_mut().process_event(&dom::keyboard_event_to_input(event, is_down));
    }

    pub fn on_pointer_move(&self, dx: f32, dy: f32) {
        self.state.borrow_mut().on_pointer_move(dx, dy);
    }

    pub fn on_mouse_move(&self, event: &MouseEvent) {
        self.state.borrow_mut().process_event(&dom::mouse_move_to_input(event));
    }

    pub fn on_pointer_lock_changed(&self, locked: bool) {
        self.state.borrow_mut().on_pointer_lock_changed(locked);
    }

    pub fn on_focus_lost(&self) {
        self.state.borrow_mut().on_focus_lost();
    }

    pub fn trigger_start(&self) {
        self.state.borrow_mut().trigger_start();
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.state.borrow_mut().resize(width, height);
    }

    /// Register meshes the page already has in memory, e.g. extracted from a
    /// glTF it loaded itself. Returns how many colliders were added.
    pub fn register_meshes(&self, role: &str, meshes_json: &str) -> Result<usize, JsValue> {
        let role = AssetRole::parse(role).ok_or_else(|| js_error(format!("unknown asset role '{role}'")))?;
        let asset = LoadedAsset::from_json("<inline>", meshes_json).map_err(|e| js_error(e.to_string()))?;
        let descriptor = AssetDescriptor {
            path: "<inline>".to_string(),
            role,
            offset: glam::Vec3::ZERO,
        };
        Ok(self.state.borrow_mut().register_asset(&descriptor, &asset))
    }

    /// Fetch a JSON list of asset descriptors in the background.
    pub fn load_assets(&self, descriptors_json: &str) -> Result<(), JsValue> {
        let descriptors: Vec<AssetDescriptor> =
            serde_json::from_str(descriptors_json).map_err(|e| js_error(e.to_string()))?;
        self.spawn_loads(descriptors);
        Ok(())
    }

    /// Advance one frame; returns the frame output as JSON.
    pub fn tick(&self, now_ms: f64) -> Result<String, JsValue> {
        let output = self.state.borrow_mut().tick(now_ms);
        serde_json::to_string(&output).map_err(|e| js_error(e.to_string()))
    }

    /// Camera uniform bytes for the renderer's uniform buffer.
    pub fn camera_uniform(&self) -> Vec<u8> {
        let uniform = self.state.borrow().active_camera().uniform();
        bytemuck::bytes_of(&uniform).to_vec()
    }
}

impl WalkthroughHandle {
    /// One independent load per asset; completions register on the UI thread
    /// between ticks, failures only cost that asset.
    fn spawn_loads(&self, descriptors: Vec<AssetDescriptor>) {
        for descriptor in descriptors {
            let state = Rc::clone(&self.state);
            spawn_local(async move {
                match FetchAssetSource.load(&descriptor).await {
                    Ok(asset) => {
                        state.borrow_mut().register_asset(&descriptor, &asset);
                    }
                    Err(err) => tracing::warn!(path = %descriptor.path, %err, "asset load failed"),
                }
            });
        }
    }
}
