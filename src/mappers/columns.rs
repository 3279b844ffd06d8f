//! Column-level mappers: projection, filtering, and derived numerics.

use crate::error::{Error, Result};
use crate::ops::Mapper;
use crate::record::{field, number_field, Record, Value};

/// Yield the record unchanged.
pub struct Identity;

impl Mapper for Identity {
    fn map(&self, row: Record) -> Result<Vec<Record>> {
        Ok(vec![row])
    }
}

/// Keep exactly the named columns.
pub struct Project {
    columns: Vec<String>,
}

impl Project {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
        }
    }
}

impl Mapper for Project {
    fn map(&self, row: Record) -> Result<Vec<Record>> {
        let mut out = Record::new();
        for column in &self.columns {
            out.insert(column.clone(), field(&row, column)?.clone());
        }
        Ok(vec![out])
    }
}

/// Keep records satisfying a predicate.
pub struct Filter {
    predicate: Box<dyn Fn(&Record) -> bool + Send + Sync>,
}

impl Filter {
    pub fn new(predicate: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }
}

impl Mapper for Filter {
    fn map(&self, row: Record) -> Result<Vec<Record>> {
        if (self.predicate)(&row) {
            Ok(vec![row])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Product of numeric columns, stored in a result column.
///
/// All-integer inputs produce an integer (falling back to a float on
/// overflow); any float input produces a float.
pub struct Product {
    columns: Vec<String>,
    result_column: String,
}

impl Product {
    pub fn new(columns: &[&str], result_column: impl Into<String>) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
            result_column: result_column.into(),
        }
    }
}

impl Mapper for Product {
    fn map(&self, mut row: Record) -> Result<Vec<Record>> {
        let mut int_product: Option<i64> = Some(1);
        let mut float_product = 1.0_f64;
        for column in &self.columns {
            let Value::Number(n) = field(&row, column)? else {
                return Err(Error::FieldType {
                    field: column.clone(),
                    expected: "numeric",
                });
            };
            int_product = match (int_product, n.as_i64()) {
                (Some(acc), Some(i)) => acc.checked_mul(i),
                _ => None,
            };
            float_product *= n.as_f64().ok_or_else(|| Error::FieldType {
                field: column.clone(),
                expected: "numeric",
            })?;
        }
        let value = match int_product {
            Some(i) => Value::from(i),
            None => Value::from(float_product),
        };
        row.insert(self.result_column.clone(), value);
        Ok(vec![row])
    }
}

/// Natural log of the ratio of two numeric columns: `ln(num / den)`.
///
/// This is the workhorse behind both IDF (`ln(total docs / docs with
/// word)`) and PMI (`ln(in-document frequency / corpus frequency)`).
pub struct LogRatio {
    numerator: String,
    denominator: String,
    result_column: String,
}

impl LogRatio {
    pub fn new(
        numerator: impl Into<String>,
        denominator: impl Into<String>,
        result_column: impl Into<String>,
    ) -> Self {
        Self {
            numerator: numerator.into(),
            denominator: denominator.into(),
            result_column: result_column.into(),
        }
    }
}

impl Mapper for LogRatio {
    fn map(&self, mut row: Record) -> Result<Vec<Record>> {
        let num = number_field(&row, &self.numerator)?;
        let den = number_field(&row, &self.denominator)?;
        row.insert(self.result_column.clone(), Value::from((num / den).ln()));
        Ok(vec![row])
    }
}
