//! Namespace prefixes used by WCS capabilities and coverage documents.

pub const WCS: &str = "http://www.opengis.net/wcs";
pub const WCS11: &str = "http://www.opengis.net/wcs/1.1";
pub const OWS: &str = "http://www.opengis.net/ows";
pub const OWS11: &str = "http://www.opengis.net/ows/1.1";
pub const GML: &str = "http://www.opengis.net/gml";
pub const XLINK: &str = "http://www.w3.org/1999/xlink";
pub const OGC: &str = "http://www.opengis.net/ogc";

const TABLE: &[(&str, &str)] = &[
    ("wcs", WCS),
    ("wcs11", WCS11),
    ("ows", OWS),
    ("ows11", OWS11),
    ("gml", GML),
    ("xlink", XLINK),
    ("ogc", OGC),
];

/// 以前綴查詢命名空間 URI
pub fn lookup(prefix: &str) -> Option<&'static str> {
    TABLE
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| *uri)
}

/// Every OWS flavour (1.0, 1.1, and the WCS 1.1 embedded profile) shares this root.
pub fn is_ows(uri: &str) -> bool {
    uri.starts_with(OWS) || uri.starts_with("http://www.opengis.net/wcs/1.1/ows")
}
