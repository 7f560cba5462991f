use std::path::Path;

use pyo3::exceptions::{PyFileNotFoundError, PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::AdjacencyError;

fn to_py_err(err: AdjacencyError) -> PyErr {
    match err {
        AdjacencyError::MatrixNotFound { .. } => PyFileNotFoundError::new_err(err.to_string()),
        AdjacencyError::WordList { .. } => PyIOError::new_err(err.to_string()),
        AdjacencyError::Core(_) => PyValueError::new_err(err.to_string()),
    }
}

/// Average adjacent similarity for each word of a word-list file.
#[pyfunction]
fn calc(output_dir: &str, language: &str, word_list: &str) -> PyResult<Vec<f64>> {
    let matrix = crate::load_matrix(Path::new(output_dir), language).map_err(to_py_err)?;
    crate::calc_file(&matrix, Path::new(word_list)).map_err(to_py_err)
}

/// Average adjacent similarity for in-memory words.
#[pyfunction]
fn calc_words(output_dir: &str, language: &str, words: Vec<String>) -> PyResult<Vec<f64>> {
    let matrix = crate::load_matrix(Path::new(output_dir), language).map_err(to_py_err)?;
    Ok(crate::calc(&matrix, &words))
}

/// Python module definition.
#[pymodule]
fn phonosim_adjacency(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(calc, m)?)?;
    m.add_function(wrap_pyfunction!(calc_words, m)?)?;
    Ok(())
}
