//! Request parameters for the two pipeline modes, loadable from JSON.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::curve::{ParameterKind, ParameterQuery};
use crate::error::{Error, Result};

/// Recommended elevation bin width in metres.
pub const DEFAULT_VERTICAL_SPACING: f64 = 1.0;

fn default_spacing() -> f64 {
    DEFAULT_VERTICAL_SPACING
}

/// Flood-extent request: one known quantity plus the bin width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InundationRequest {
    pub parameter: ParameterKind,
    pub value: f64,
    #[serde(default = "default_spacing")]
    pub vertical_spacing: f64,
}

impl InundationRequest {
    pub fn new(parameter: ParameterKind, value: f64, vertical_spacing: f64) -> Self {
        Self { parameter, value, vertical_spacing }
    }

    /// Build the curve query, rejecting a non-positive spacing.
    pub fn query(&self) -> Result<ParameterQuery> {
        ParameterQuery::new(self.parameter, self.value, self.vertical_spacing)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

/// Curve-export request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveRequest {
    #[serde(default = "default_spacing")]
    pub vertical_spacing: f64,
}

impl Default for CurveRequest {
    fn default() -> Self {
        Self { vertical_spacing: DEFAULT_VERTICAL_SPACING }
    }
}

impl CurveRequest {
    pub fn validate(&self) -> Result<()> {
        check_spacing(self.vertical_spacing)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

/// Vertical spacing must be a finite number greater than zero.
pub fn check_spacing(spacing: f64) -> Result<()> {
    if spacing.is_finite() && spacing > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidSpacing(spacing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inundation_request_defaults_spacing() {
        let req = InundationRequest::from_json_str(r#"{"parameter": "volume", "value": 2.5e6}"#).unwrap();
        assert_eq!(req.parameter, ParameterKind::Volume);
        assert_eq!(req.value, 2.5e6);
        assert_eq!(req.vertical_spacing, DEFAULT_VERTICAL_SPACING);
        assert!(req.query().is_ok());
    }

    #[test]
    fn zero_spacing_fails_query() {
        let req = InundationRequest::new(ParameterKind::Height, 3.0, 0.0);
        assert!(matches!(req.query(), Err(Error::InvalidSpacing(s)) if s == 0.0));
        assert!(CurveRequest { vertical_spacing: -2.0 }.validate().is_err());
        assert!(CurveRequest::default().validate().is_ok());
    }

    #[test]
    fn unknown_parameter_is_a_json_error() {
        let err = InundationRequest::from_json_str(r#"{"parameter": "depth", "value": 1}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
