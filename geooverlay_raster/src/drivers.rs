use std::sync::Once;

static INIT: Once = Once::new();

/// Registers the native raster drivers once per process. Safe to call from
/// any thread, any number of times.
pub fn init_drivers() {
	INIT.call_once(|| {
		#[cfg(feature = "gdal")]
		{
			gdal::DriverManager::register_all();
			// no .aux.xml side files next to opened rasters
			if let Err(err) = gdal::config::set_config_option("GDAL_PAM_ENABLED", "NO") {
				log::warn!("failed to disable GDAL PAM: {err}");
			}
			log::debug!("registered {} GDAL drivers", gdal::DriverManager::count());
		}
		log::debug!("raster backends: {}", available_backends().join(", "));
	});
}

pub fn available_backends() -> Vec<&'static str> {
	let mut backends = vec!["tiff"];
	if cfg!(feature = "gdal") {
		backends.push("gdal");
	}
	backends
}
