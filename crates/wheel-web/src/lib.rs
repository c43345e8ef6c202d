pub mod runner;

pub use runner::WheelRunner;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNERS: RefCell<HashMap<u32, WheelRunner>> = RefCell::new(HashMap::new());
    static NEXT_HANDLE: Cell<u32> = const { Cell::new(1) };
}

/// Run `f` against the runner behind `handle`. Unknown or disposed handles
/// yield `fallback`, so a late frame callback after teardown is a no-op.
fn with_runner<R>(handle: u32, fallback: R, f: impl FnOnce(&mut WheelRunner) -> R) -> R {
    RUNNERS.with(|cell| match cell.borrow_mut().get_mut(&handle) {
        Some(runner) => f(runner),
        None => fallback,
    })
}

/// 32 bytes of seed from `crypto.getRandomValues`, falling back to
/// `Math.random` where no crypto object exists.
fn entropy_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    let filled = web_sys::window()
        .and_then(|window| window.crypto().ok())
        .is_some_and(|crypto| crypto.get_random_values_with_u8_array(&mut seed).is_ok());
    if !filled {
        log::warn!("crypto.getRandomValues unavailable, seeding from Math.random");
        for chunk in seed.chunks_mut(4) {
            let word = (js_sys::Math::random() * u32::MAX as f64) as u32;
            chunk.copy_from_slice(&word.to_le_bytes());
        }
    }
    seed
}

/// Install the panic hook and console logger. `level` is a `log` level name
/// ("error" .. "trace"); anything else means "info".
#[wasm_bindgen]
pub fn wheel_init(level: &str) {
    console_error_panic_hook::set_once();
    let level = level.parse().unwrap_or(log::Level::Info);
    let _ = console_log::init_with_level(level);
    log::info!("wheel-web: initialized");
}

/// Create a wheel from a JSON config. Returns its handle, or 0 when the
/// config is rejected.
#[wasm_bindgen]
pub fn wheel_create(config_json: &str) -> u32 {
    let rng = StdRng::from_seed(entropy_seed());
    match WheelRunner::from_json(config_json, rng) {
        Ok(runner) => {
            let handle = NEXT_HANDLE.with(|next| {
                let handle = next.get();
                next.set(handle.wrapping_add(1).max(1));
                handle
            });
            RUNNERS.with(|cell| cell.borrow_mut().insert(handle, runner));
            log::debug!("wheel {handle} created");
            handle
        }
        Err(err) => {
            log::error!("wheel_create: {err}");
            0
        }
    }
}

/// 0 ignored, 1 started, 2 resolved immediately, negative on error.
#[wasm_bindgen]
pub fn wheel_spin(handle: u32) -> i32 {
    with_runner(handle, runner::error_code(&wheel_engine::WheelError::Disposed), |r| r.spin())
}

/// Advance by one animation frame. Call from `requestAnimationFrame` with
/// the elapsed milliseconds.
#[wasm_bindgen]
pub fn wheel_tick(handle: u32, dt_ms: f64) {
    with_runner(handle, (), |r| {
        r.tick(dt_ms);
    });
}

#[wasm_bindgen]
pub fn wheel_rotation(handle: u32) -> f64 {
    with_runner(handle, 0.0, |r| r.rotation())
}

/// 0 idle, 1 spinning, 2 settling; -1 for an unknown handle.
#[wasm_bindgen]
pub fn wheel_phase(handle: u32) -> f32 {
    with_runner(handle, -1.0, |r| r.phase())
}

#[wasm_bindgen]
pub fn wheel_label(handle: u32, index: u32) -> Option<String> {
    with_runner(handle, None, |r| r.label(index as usize))
}

/// Winning index of the last settled spin, or -1.
#[wasm_bindgen]
pub fn wheel_result_index(handle: u32) -> i32 {
    with_runner(handle, -1, |r| r.result_index())
}

// ---- Frame buffer accessors ----

#[wasm_bindgen]
pub fn wheel_events_ptr(handle: u32) -> *const f32 {
    with_runner(handle, std::ptr::null(), |r| r.events_ptr())
}

#[wasm_bindgen]
pub fn wheel_events_len(handle: u32) -> u32 {
    with_runner(handle, 0, |r| r.events_len())
}

// ---- Reconfiguration ----

/// Replace labels from a JSON string array. False if rejected.
#[wasm_bindgen]
pub fn wheel_set_segments(handle: u32, labels_json: &str) -> bool {
    with_runner(handle, false, |r| match r.set_segments_json(labels_json) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("wheel_set_segments({handle}): {err}");
            false
        }
    })
}

#[wasm_bindgen]
pub fn wheel_set_reduced_motion(handle: u32, enabled: bool) -> bool {
    with_runner(handle, false, |r| r.set_reduced_motion(enabled).is_ok())
}

/// Tear down a wheel. Safe from any phase and for stale handles.
#[wasm_bindgen]
pub fn wheel_dispose(handle: u32) {
    let removed = RUNNERS.with(|cell| cell.borrow_mut().remove(&handle));
    if let Some(mut runner) = removed {
        runner.dispose();
        log::debug!("wheel {handle} disposed");
    }
}
