use crate::{DedupOptions, Deduplicator};
use pyo3::prelude::*;
use std::collections::BTreeMap;

fn value_error(e: crate::Error) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())
}

fn options_for(threshold: f64) -> PyResult<DedupOptions> {
    let options = DedupOptions::default().with_threshold(threshold);
    options.validate().map_err(value_error)?;
    Ok(options)
}

/// Returns `(comparison_text, clean_text, allergen_codes)`.
#[pyfunction]
fn normalize(name: &str) -> (String, String, Vec<String>) {
    let form = crate::normalize(name);
    (
        form.comparison,
        form.clean,
        form.allergen_codes.into_iter().collect(),
    )
}

#[pyfunction]
fn dish_headline(name: &str) -> String {
    crate::dish_headline(name)
}

#[pyfunction]
#[pyo3(signature = (name1, name2, threshold=crate::DEFAULT_THRESHOLD))]
fn are_duplicates(name1: &str, name2: &str, threshold: f64) -> PyResult<bool> {
    let options = options_for(threshold)?;
    Ok(crate::are_duplicates(name1, name2, &options))
}

/// Returns `(groups, mapping)`: member lists in claim order and old -> canonical.
#[pyfunction]
#[pyo3(signature = (names, threshold=crate::DEFAULT_THRESHOLD))]
fn find_duplicates(
    py: Python<'_>,
    names: Vec<String>,
    threshold: f64,
) -> PyResult<(Vec<Vec<String>>, BTreeMap<String, String>)> {
    let options = options_for(threshold)?;
    let report = py.allow_threads(|| Deduplicator::with_options(options).run(names));

    let mapping = report
        .mapping
        .iter()
        .map(|(old, canonical)| (old.to_string(), canonical.to_string()))
        .collect();
    let groups = report.groups.into_iter().map(|group| group.members).collect();

    Ok((groups, mapping))
}

#[pymodule]
fn _mealdedup(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(normalize, m)?)?;
    m.add_function(wrap_pyfunction!(dish_headline, m)?)?;
    m.add_function(wrap_pyfunction!(are_duplicates, m)?)?;
    m.add_function(wrap_pyfunction!(find_duplicates, m)?)?;

    Ok(())
}
