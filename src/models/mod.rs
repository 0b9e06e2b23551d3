//! Core input data models for a PheWAS study
//!
//! Subjects and their diagnosis event streams are loaded by an external
//! collaborator and treated as immutable for the remainder of a run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnosis coding system of a raw event code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeSystem {
    /// ICD-9-CM
    Icd9,
    /// ICD-10
    Icd10,
    /// ICD-10-CM
    Icd10Cm,
}

impl fmt::Display for CodeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Icd9 => write!(f, "ICD-9"),
            Self::Icd10 => write!(f, "ICD-10"),
            Self::Icd10Cm => write!(f, "ICD-10-CM"),
        }
    }
}

/// A single dated diagnosis event from a subject's record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisEvent {
    /// Raw diagnosis code as recorded
    pub code: String,
    /// Coding system the code belongs to
    pub system: CodeSystem,
    /// Date the code was recorded
    pub date: NaiveDate,
}

impl DiagnosisEvent {
    /// Create a new diagnosis event
    #[must_use]
    pub fn new(code: impl Into<String>, system: CodeSystem, date: NaiveDate) -> Self {
        Self {
            code: code.into(),
            system,
            date,
        }
    }
}

/// A study subject with exposure, covariates and diagnosis history
///
/// The covariate vector is positional: its order must follow the
/// cohort-wide covariate name list handed to the matrix builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier
    pub id: String,
    /// Exposure value: binary coded 0/1, or continuous
    pub exposure: f64,
    /// Covariate values, aligned with the cohort covariate names
    pub covariates: Vec<f64>,
    /// Ordered diagnosis event stream
    pub events: Vec<DiagnosisEvent>,
}

impl Subject {
    /// Create a new subject
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        exposure: f64,
        covariates: Vec<f64>,
        events: Vec<DiagnosisEvent>,
    ) -> Self {
        Self {
            id: id.into(),
            exposure,
            covariates,
            events,
        }
    }
}
