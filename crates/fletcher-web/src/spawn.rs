//! Spawner for the browser event loop.

use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};

/// [`LocalSpawn`] that hands futures to `wasm_bindgen_futures::spawn_local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmSpawner;

impl LocalSpawn for WasmSpawner {
	fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
		wasm_bindgen_futures::spawn_local(future);
		Ok(())
	}
}
