use crate::utils::error::{Result, WcsError};
use serde::Serialize;

/// Protocol families with structurally different documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProtocolVersion {
    V100,
    V11x,
}

impl ProtocolVersion {
    pub fn from_version(version: &str) -> Result<Self> {
        match version {
            "1.0.0" => Ok(ProtocolVersion::V100),
            "1.1.0" | "1.1.1" | "1.1.2" => Ok(ProtocolVersion::V11x),
            other => Err(WcsError::UnsupportedVersion {
                version: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceIdentification {
    pub service: String,
    pub version: String,
    pub title: Option<String>,
    pub r#abstract: Option<String>,
    pub keywords: Vec<String>,
    pub fees: Option<String>,
    pub access_constraints: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactMetadata {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceProvider {
    pub name: Option<String>,
    /// WCS has no dedicated provider URL, the provider name is repeated here.
    pub url: Option<String>,
    pub contact: ContactMetadata,
}

/// One DCP binding of an operation, e.g. `Get` → `http://host/wcs?`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationMethod {
    pub binding: String,
    pub url: String,
}

/// A named parameter or constraint with its allowed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllowedValues {
    pub name: Option<String>,
    pub values: Vec<String>,
}

/// Strips a Clark-notation namespace, `{uri}Get` becomes `Get`.
pub fn binding_local_name(tag: &str) -> &str {
    match tag.rfind('}') {
        Some(idx) => &tag[idx + 1..],
        None => tag,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Operation {
    /// `None` when the server omits the `name` attribute; such operations are never found by name.
    pub name: Option<String>,
    pub format_options: Vec<String>,
    pub methods: Vec<OperationMethod>,
    pub parameters: Vec<AllowedValues>,
    pub constraints: Vec<AllowedValues>,
}

impl Operation {
    /// URL of the binding whose tag matches `binding`, ignoring case and namespace.
    pub fn method_url(&self, binding: &str) -> Option<&str> {
        let wanted = binding_local_name(binding);
        self.methods
            .iter()
            .find(|m| binding_local_name(&m.binding).eq_ignore_ascii_case(wanted))
            .map(|m| m.url.as_str())
    }

    pub fn parameter(&self, name: &str) -> Option<&AllowedValues> {
        self.parameters
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
    }
}

pub fn find_operation<'a>(operations: &'a [Operation], name: &str) -> Result<&'a Operation> {
    operations
        .iter()
        .find(|op| op.name.as_deref() == Some(name))
        .ok_or_else(|| WcsError::OperationNotFound {
            name: name.to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

/// A bounding box in a CRS other than WGS84.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrsBoundingBox {
    pub bbox: BoundingBox,
    pub crs: String,
}

fn parse_corner(corner: &str) -> Result<(f64, f64)> {
    let tokens: Vec<&str> = corner.split_whitespace().collect();
    if tokens.len() != 2 {
        return Err(WcsError::BoundingBoxError {
            value: corner.to_string(),
            reason: format!("expected 2 coordinates, found {}", tokens.len()),
        });
    }

    let parse = |token: &str| {
        token.parse::<f64>().map_err(|e| WcsError::BoundingBoxError {
            value: corner.to_string(),
            reason: e.to_string(),
        })
    };
    Ok((parse(tokens[0])?, parse(tokens[1])?))
}

impl BoundingBox {
    /// 由 `LowerCorner` / `UpperCorner` 文字建立
    pub fn from_corners(lower: &str, upper: &str) -> Result<Self> {
        let (minx, miny) = parse_corner(lower)?;
        let (maxx, maxy) = parse_corner(upper)?;
        Ok(BoundingBox {
            minx,
            miny,
            maxx,
            maxy,
        })
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.minx, self.miny, self.maxx, self.maxy)
    }
}

/// GML envelope as carried by WCS 1.0.0 documents: two raw positions and an SRS.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Envelope {
    pub min_pos: Option<String>,
    pub max_pos: Option<String>,
    pub srs_urn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimePeriod {
    pub begin: Option<String>,
    pub end: Option<String>,
}
