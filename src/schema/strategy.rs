use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use super::ordered::OrderedMap;
use super::value::Scalar;
use crate::error::{Constraint, FieldPath, ValidationError};
use crate::validation::{Validate, check_expression, check_min, check_non_empty};

/// The build matrix; GitHub expands it, this crate only writes it out
#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    Axes {
        axes: OrderedMap<Vec<String>>,
        include: Vec<OrderedMap<Scalar>>,
        exclude: Vec<OrderedMap<Scalar>>,
    },
    /// A `${{ ... }}` expression producing the matrix, e.g. `fromJSON(...)`
    Expression(String),
}

impl Matrix {
    pub fn new() -> Self {
        Matrix::Axes {
            axes: OrderedMap::new(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn expression(expr: impl Into<String>) -> Self {
        Matrix::Expression(expr.into())
    }

    /// Add an axis; axis values are always emitted as strings
    pub fn axis<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Matrix::Axes { axes, .. } = &mut self {
            axes.insert(name, values.into_iter().map(Into::into).collect());
        }
        self
    }

    pub fn include<I, K, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        if let Matrix::Axes { include, .. } = &mut self {
            include.push(row.into_iter().map(|(k, v)| (k, v.into())).collect());
        }
        self
    }

    pub fn exclude<I, K, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        if let Matrix::Axes { exclude, .. } = &mut self {
            exclude.push(row.into_iter().map(|(k, v)| (k, v.into())).collect());
        }
        self
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Matrix::Expression(expr) => serializer.serialize_str(expr),
            Matrix::Axes {
                axes,
                include,
                exclude,
            } => {
                let mut map = serializer.serialize_map(None)?;
                for (name, values) in axes.iter() {
                    map.serialize_entry(name, values)?;
                }
                if !include.is_empty() {
                    map.serialize_entry("include", include)?;
                }
                if !exclude.is_empty() {
                    map.serialize_entry("exclude", exclude)?;
                }
                map.end()
            }
        }
    }
}

impl Validate for Matrix {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        match self {
            Matrix::Expression(expr) => check_expression(expr, path),
            Matrix::Axes {
                axes,
                include,
                exclude,
            } => {
                if axes.is_empty() && include.is_empty() {
                    return Err(ValidationError::new(path.clone(), Constraint::Empty));
                }
                for (name, values) in axes.iter() {
                    let axis_path = path.clone().key(name);
                    if name == "include" || name == "exclude" {
                        return Err(ValidationError::new(
                            axis_path,
                            Constraint::Invalid {
                                reason: "is reserved; use Matrix::include or Matrix::exclude",
                            },
                        ));
                    }
                    check_non_empty(name, &axis_path)?;
                    crate::validation::check_non_empty_list(values, &axis_path)?;
                }
                for (i, row) in exclude.iter().enumerate() {
                    let row_path = path.clone().key("exclude").index(i);
                    for key in row.keys() {
                        if !axes.contains_key(key) {
                            return Err(ValidationError::new(
                                row_path.clone().key(key),
                                Constraint::Invalid {
                                    reason: "is not a matrix axis",
                                },
                            ));
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

/// `strategy`: matrix plus failure handling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strategy {
    pub matrix: Matrix,

    #[serde(skip_serializing_if = "Option::is_none", rename = "fail-fast")]
    pub fail_fast: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "max-parallel")]
    pub max_parallel: Option<u32>,
}

impl Strategy {
    pub fn matrix(matrix: Matrix) -> Self {
        Self {
            matrix,
            fail_fast: None,
            max_parallel: None,
        }
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = Some(fail_fast);
        self
    }

    pub fn max_parallel(mut self, max: u32) -> Self {
        self.max_parallel = Some(max);
        self
    }
}

impl Validate for Strategy {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        self.matrix.validate(&path.clone().key("matrix"))?;
        if let Some(max) = self.max_parallel {
            check_min(u64::from(max), 1, &path.clone().key("max-parallel"))?;
        }
        Ok(())
    }
}
