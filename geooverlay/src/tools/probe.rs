use anyhow::Result;
use geooverlay_raster::{open_raster, resolve_location};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoTIFF file, as a path or file:// URI
	#[arg(required = true)]
	filename: String,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("probe {:?}", arguments.filename);

	let raster = open_raster(&resolve_location(&arguments.filename))?;
	println!("{}", raster.info());

	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::tests::run_command;
	use geooverlay_raster::fixtures::GeoTiffFixture;

	#[test]
	fn probe_fixture() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("probe.tif");
		GeoTiffFixture::new(4, 3, 3).write(&path).unwrap();
		run_command(vec!["geooverlay", "probe", "-q", path.to_str().unwrap()]).unwrap();
	}

	#[test]
	fn probe_missing_file() {
		assert!(run_command(vec!["geooverlay", "probe", "-q", "/does/not/exist.tif"]).is_err());
	}
}
