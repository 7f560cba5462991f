//! Python bindings (enabled with the `python` feature).

use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::{PyIOError, PyKeyboardInterrupt, PyValueError};
use pyo3::prelude::*;

use crate::config::PipelineConfig;
use crate::dedup::deduplicate;
use crate::enumerate::NaturalClassEnumerator;
use crate::error::PhonosimError;
use crate::inventory::FeatureInventory;
use crate::matrix::SimilarityMatrix;
use crate::pipeline::{Pipeline, PipelineReport};
use crate::similarity::SimilarityMethod;

impl From<PhonosimError> for PyErr {
    fn from(err: PhonosimError) -> Self {
        match err {
            PhonosimError::Io { .. } | PhonosimError::MatrixNotFound { .. } => {
                PyIOError::new_err(err.to_string())
            }
            PhonosimError::Interrupted { .. } => PyKeyboardInterrupt::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

// ============================================================================
// NATURAL CLASSES
// ============================================================================

#[pyfunction]
fn py_natural_classes(feature_matrix: &str) -> PyResult<Vec<(String, Vec<String>)>> {
    let inventory = FeatureInventory::load(feature_matrix)?;
    let classes = NaturalClassEnumerator::new(&inventory).enumerate(|_| {})?;
    Ok(deduplicate(&classes)
        .into_iter()
        .map(|c| (c.vector.to_string(), c.members))
        .collect())
}

// ============================================================================
// SIMILARITY
// ============================================================================

#[pyfunction]
fn py_similarity_matrix<'py>(
    py: Python<'py>,
    feature_matrix: &str,
    method: Option<&str>,
) -> PyResult<(Vec<String>, &'py PyArray2<f64>)> {
    let method: SimilarityMethod = method.unwrap_or("frisch").parse()?;
    let inventory = FeatureInventory::load(feature_matrix)?;
    let classes = deduplicate(&NaturalClassEnumerator::new(&inventory).enumerate(|_| {})?);
    let scorer = method.scorer(&classes);
    let matrix = SimilarityMatrix::build(&inventory.labels(), scorer.as_ref());
    Ok((
        matrix.segments().to_vec(),
        matrix.values().clone().into_pyarray(py),
    ))
}

#[pyfunction]
fn py_run_pipeline(
    language: &str,
    feature_matrix: &str,
    output_dir: Option<&str>,
) -> PyResult<PyPipelineReport> {
    let mut config = PipelineConfig::new(language, feature_matrix);
    if let Some(dir) = output_dir {
        config.output_dir = dir.into();
    }
    let report = Pipeline::new(config)?.run(|_| {})?;
    Ok(PyPipelineReport::from(report))
}

// ============================================================================
// PYTHON WRAPPER TYPES
// ============================================================================

#[pyclass]
struct PyPipelineReport {
    #[pyo3(get)]
    language: String,
    #[pyo3(get)]
    segments: usize,
    #[pyo3(get)]
    classes: usize,
    #[pyo3(get)]
    from_cache: bool,
    #[pyo3(get)]
    matrix_path: String,
    matrix: SimilarityMatrix,
}

impl From<PipelineReport> for PyPipelineReport {
    fn from(report: PipelineReport) -> Self {
        Self {
            language: report.language,
            segments: report.segments,
            classes: report.classes,
            from_cache: report.from_cache,
            matrix_path: report.matrix_path.display().to_string(),
            matrix: report.matrix,
        }
    }
}

#[pymethods]
impl PyPipelineReport {
    fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        self.matrix.get(a, b)
    }

    fn nearest(&self, segment: &str, k: usize) -> Vec<(String, f64)> {
        self.matrix.nearest(segment, k)
    }
}

// ============================================================================
// MODULE DEFINITION
// ============================================================================

#[pymodule]
fn phonosim_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_natural_classes, m)?)?;
    m.add_function(wrap_pyfunction!(py_similarity_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(py_run_pipeline, m)?)?;

    m.add_class::<PyPipelineReport>()?;

    Ok(())
}
