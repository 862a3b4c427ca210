use serde_json::Value;

/// Element type of a parameter array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberKind {
    Int,
    Double,
}

impl NumberKind {
    /// Template key of the primitive type name.
    pub fn key(self) -> &'static str {
        match self {
            NumberKind::Int => "int",
            NumberKind::Double => "double",
        }
    }
}

/// Flat, row-major storage of an array's elements.
#[derive(Clone, Debug, PartialEq)]
pub enum Numbers {
    Int(Vec<i64>),
    Double(Vec<f64>),
}

/// A named parameter array of rank 1 to 3. Generators hand these to the
/// assembler, which places them according to the packaging mode.
#[derive(Clone, Debug, PartialEq)]
pub struct DataArray {
    pub name: String,
    pub shape: Vec<usize>,
    pub values: Numbers,
}

impl DataArray {
    pub fn ints(name: &str, values: Vec<i64>) -> Self {
        Self {
            name: name.to_string(),
            shape: vec![values.len()],
            values: Numbers::Int(values),
        }
    }

    pub fn doubles(name: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            shape: vec![values.len()],
            values: Numbers::Double(values),
        }
    }

    /// Rectangular rows; the column count comes from the first row.
    pub fn matrix(name: &str, rows: &[Vec<f64>]) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        Self {
            name: name.to_string(),
            shape: vec![rows.len(), cols],
            values: Numbers::Double(rows.concat()),
        }
    }

    pub fn cube(name: &str, blocks: &[Vec<Vec<f64>>]) -> Self {
        let rows = blocks.first().map_or(0, |b| b.len());
        let cols = blocks
            .first()
            .and_then(|b| b.first())
            .map_or(0, |r| r.len());
        Self {
            name: name.to_string(),
            shape: vec![blocks.len(), rows, cols],
            values: Numbers::Double(blocks.iter().flat_map(|b| b.concat()).collect()),
        }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn kind(&self) -> NumberKind {
        match self.values {
            Numbers::Int(_) => NumberKind::Int,
            Numbers::Double(_) => NumberKind::Double,
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            Numbers::Int(v) => v.len(),
            Numbers::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nested JSON arrays mirroring the shape. Doubles keep full precision.
    pub fn to_json(&self) -> Value {
        let flat: Vec<Value> = match &self.values {
            Numbers::Int(v) => v.iter().map(|x| Value::from(*x)).collect(),
            Numbers::Double(v) => v.iter().map(|x| Value::from(*x)).collect(),
        };
        nest(flat, &self.shape)
    }
}

fn nest(flat: Vec<Value>, shape: &[usize]) -> Value {
    if shape.len() <= 1 {
        return Value::Array(flat);
    }
    let stride = shape[1..].iter().product::<usize>().max(1);
    Value::Array(
        flat.chunks(stride)
            .map(|chunk| nest(chunk.to_vec(), &shape[1..]))
            .collect(),
    )
}
