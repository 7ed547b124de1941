use std::fmt::{self, Display};

/// A coordinate reference system as far as the pure-Rust reprojection
/// backend understands it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CrsDefinition {
	Epsg(u16),
	Proj(String),
}

impl CrsDefinition {
	/// Parses `EPSG:<code>`, OGC URNs, PROJ strings, and WKT carrying an
	/// EPSG authority for the whole CRS. Returns `None` for anything else.
	pub fn parse(crs: &str) -> Option<Self> {
		let crs = crs.trim();
		if crs.is_empty() {
			return None;
		}
		if crs.starts_with("+proj") {
			return Some(CrsDefinition::Proj(crs.trim_end_matches('|').trim().to_string()));
		}
		if let Some(code) = strip_prefix_ignore_case(crs, "EPSG:") {
			return code.trim().parse().ok().map(CrsDefinition::Epsg);
		}
		if strip_prefix_ignore_case(crs, "urn:").is_some() {
			let pos = crs.rfind("EPSG::")?;
			return parse_leading_number(&crs[pos + 6..]).map(CrsDefinition::Epsg);
		}
		wkt_epsg_code(crs).map(CrsDefinition::Epsg)
	}

	pub fn proj_string(&self) -> Option<String> {
		match self {
			CrsDefinition::Epsg(code) => crs_definitions::from_code(*code).map(|def| def.proj4.to_string()),
			CrsDefinition::Proj(proj) => Some(proj.clone()),
		}
	}

	pub fn is_wgs84(&self) -> bool {
		matches!(self, CrsDefinition::Epsg(4326))
	}
}

impl Display for CrsDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CrsDefinition::Epsg(code) => write!(f, "EPSG:{code}"),
			CrsDefinition::Proj(proj) => f.write_str(proj),
		}
	}
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
	let head = text.get(..prefix.len())?;
	head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

fn parse_leading_number(text: &str) -> Option<u16> {
	let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
	digits.parse().ok()
}

/// EPSG code of the outermost WKT node. Only an authority that is the last
/// child of that node counts, so an authority on a nested node is ignored.
fn wkt_epsg_code(wkt: &str) -> Option<u16> {
	let (pos, len) = ["AUTHORITY[\"EPSG\",", "ID[\"EPSG\","]
		.iter()
		.filter_map(|marker| wkt.rfind(marker).map(|pos| (pos, marker.len())))
		.max_by_key(|(pos, _)| *pos)?;
	let node = &wkt[pos + len..];
	let close = node.find(']')?;
	if !node[close + 1..].chars().all(|c| c == ']' || c.is_whitespace()) {
		return None;
	}
	parse_leading_number(node[..close].trim_start().trim_start_matches('"'))
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[rstest]
	#[case("EPSG:4326", Some(CrsDefinition::Epsg(4326)))]
	#[case("epsg:32633", Some(CrsDefinition::Epsg(32633)))]
	#[case("urn:ogc:def:crs:EPSG::3857", Some(CrsDefinition::Epsg(3857)))]
	#[case(
		"+proj=longlat +datum=WGS84 +no_defs|",
		Some(CrsDefinition::Proj("+proj=longlat +datum=WGS84 +no_defs".into()))
	)]
	#[case("", None)]
	#[case("   ", None)]
	#[case("EPSG:abc", None)]
	#[case("LOCAL_CS[\"arbitrary\"]", None)]
	#[case(
		r#"PROJCS["custom TM",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],AUTHORITY["EPSG","4326"]],PROJECTION["Transverse_Mercator"],UNIT["metre",1]]"#,
		None
	)]
	#[case(r#"GEOGCRS["WGS 84",ID["EPSG",4326]],UNIT["degree",1]"#, None)]
	fn parse(#[case] input: &str, #[case] expected: Option<CrsDefinition>) {
		assert_eq!(CrsDefinition::parse(input), expected);
	}

	#[test]
	fn wkt1_uses_outer_authority() {
		let wkt = r#"PROJCS["WGS 84 / UTM zone 33N",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],AUTHORITY["EPSG","4326"]],PROJECTION["Transverse_Mercator"],AUTHORITY["EPSG","32633"]]"#;
		assert_eq!(CrsDefinition::parse(wkt), Some(CrsDefinition::Epsg(32633)));
	}

	#[test]
	fn wkt2_id() {
		let wkt = r#"GEOGCRS["WGS 84",DATUM["World Geodetic System 1984"],ID["EPSG",4326]]"#;
		assert_eq!(CrsDefinition::parse(wkt), Some(CrsDefinition::Epsg(4326)));
	}

	#[test]
	fn proj_strings() {
		assert!(CrsDefinition::Epsg(4326).is_wgs84());
		assert!(
			CrsDefinition::Epsg(32633)
				.proj_string()
				.unwrap()
				.contains("+proj=utm")
		);
		assert_eq!(CrsDefinition::Epsg(3857).to_string(), "EPSG:3857");
	}
}
