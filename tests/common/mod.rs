//! Builds small ONNX rating graphs at test time.
//!
//! Only the subset of the ONNX protobuf schema the fixtures need is declared
//! here, with the field numbers from `onnx.proto`. The graph is a linear
//! scorer over the feature row:
//!
//! ```text
//! X[N, F] -> MatMul(W[F, 3]) -> scores -> Softmax -> "probabilities"
//!                                      -> ArgMax  -> "label" (int64)
//! ```
//!
//! `W` routes years since promotion to class 0, years at company to class 1
//! and salary hike to class 2, so the predicted class is whichever of those
//! three columns is largest.

#![allow(dead_code)]

use prost::Message;
use std::fs;
use std::path::{Path, PathBuf};

const FLOAT: i32 = 1;
const INT64: i32 = 7;
const ATTRIBUTE_INT: i32 = 2;

#[derive(Clone, PartialEq, Message)]
pub struct ModelProto {
    #[prost(int64, tag = "1")]
    pub ir_version: i64,
    #[prost(string, tag = "2")]
    pub producer_name: String,
    #[prost(message, optional, tag = "7")]
    pub graph: Option<GraphProto>,
    #[prost(message, repeated, tag = "8")]
    pub opset_import: Vec<OperatorSetIdProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct OperatorSetIdProto {
    #[prost(string, tag = "1")]
    pub domain: String,
    #[prost(int64, tag = "2")]
    pub version: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct GraphProto {
    #[prost(message, repeated, tag = "1")]
    pub node: Vec<NodeProto>,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, repeated, tag = "5")]
    pub initializer: Vec<TensorProto>,
    #[prost(message, repeated, tag = "11")]
    pub input: Vec<ValueInfoProto>,
    #[prost(message, repeated, tag = "12")]
    pub output: Vec<ValueInfoProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct NodeProto {
    #[prost(string, repeated, tag = "1")]
    pub input: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub output: Vec<String>,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(string, tag = "4")]
    pub op_type: String,
    #[prost(message, repeated, tag = "5")]
    pub attribute: Vec<AttributeProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AttributeProto {
    #[prost(string, tag = "1")]
    pub name: String,
    // Explicit presence so that a zero value is still written
    #[prost(int64, optional, tag = "3")]
    pub i: Option<i64>,
    #[prost(int32, tag = "20")]
    pub r#type: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct TensorProto {
    #[prost(int64, repeated, tag = "1")]
    pub dims: Vec<i64>,
    #[prost(int32, tag = "2")]
    pub data_type: i32,
    #[prost(float, repeated, tag = "4")]
    pub float_data: Vec<f32>,
    #[prost(string, tag = "8")]
    pub name: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ValueInfoProto {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub r#type: Option<TypeProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TypeProto {
    #[prost(message, optional, tag = "1")]
    pub tensor_type: Option<TensorTypeProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TensorTypeProto {
    #[prost(int32, tag = "1")]
    pub elem_type: i32,
    #[prost(message, optional, tag = "2")]
    pub shape: Option<TensorShapeProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TensorShapeProto {
    #[prost(message, repeated, tag = "1")]
    pub dim: Vec<Dimension>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Dimension {
    #[prost(int64, optional, tag = "1")]
    pub dim_value: Option<i64>,
    #[prost(string, optional, tag = "2")]
    pub dim_param: Option<String>,
}

/// Width of the model's feature input.
#[derive(Debug, Clone, Copy)]
pub enum FeatureDim {
    Fixed(usize),
    /// Declared as a named symbol, so the feature count is unknown.
    Symbolic,
}

/// Which outputs the graph exposes.
#[derive(Debug, Clone, Copy)]
pub enum Outputs {
    /// Float probabilities first, then the int64 `label`.
    ProbabilitiesThenLabel,
    /// A single int64 output under another name.
    ClassOnly,
}

fn dim_value(value: usize) -> Dimension {
    Dimension {
        dim_value: Some(value as i64),
        dim_param: None,
    }
}

fn dim_param(name: &str) -> Dimension {
    Dimension {
        dim_value: None,
        dim_param: Some(name.to_string()),
    }
}

fn tensor_info(name: &str, elem_type: i32, dims: Option<Vec<Dimension>>) -> ValueInfoProto {
    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            tensor_type: Some(TensorTypeProto {
                elem_type,
                shape: dims.map(|dim| TensorShapeProto { dim }),
            }),
        }),
    }
}

fn int_attribute(name: &str, value: i64) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        i: Some(value),
        r#type: ATTRIBUTE_INT,
    }
}

fn node(op_type: &str, inputs: &[&str], output: &str, attribute: Vec<AttributeProto>) -> NodeProto {
    NodeProto {
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: vec![output.to_string()],
        name: format!("{}_{}", op_type.to_lowercase(), output),
        op_type: op_type.to_string(),
        attribute,
    }
}

/// Serialized ONNX model scoring a row of `features` columns.
pub fn rating_model(features: FeatureDim, outputs: Outputs) -> Vec<u8> {
    // W is row-major [F, 3]
    let width = match features {
        FeatureDim::Fixed(n) => n,
        FeatureDim::Symbolic => 9,
    };
    let mut weights = vec![0.0f32; width * 3];
    weights[7 * 3] = 1.0; // years since promotion -> Poor
    weights[5 * 3 + 1] = 1.0; // years at company -> Average
    weights[3 + 2] = 1.0; // salary hike -> Excellent

    let feature_dim = match features {
        FeatureDim::Fixed(n) => dim_value(n),
        FeatureDim::Symbolic => dim_param("F"),
    };

    let label_name = match outputs {
        Outputs::ProbabilitiesThenLabel => "label",
        Outputs::ClassOnly => "class",
    };
    let mut nodes = vec![
        node("MatMul", &["X", "W"], "scores", Vec::new()),
        node(
            "ArgMax",
            &["scores"],
            label_name,
            vec![int_attribute("axis", 1), int_attribute("keepdims", 0)],
        ),
    ];
    let mut graph_outputs = Vec::new();
    if let Outputs::ProbabilitiesThenLabel = outputs {
        nodes.push(node("Softmax", &["scores"], "probabilities", vec![int_attribute("axis", 1)]));
        graph_outputs.push(tensor_info("probabilities", FLOAT, None));
    }
    graph_outputs.push(tensor_info(label_name, INT64, None));

    let model = ModelProto {
        ir_version: 7,
        producer_name: "perfrating-tests".to_string(),
        graph: Some(GraphProto {
            node: nodes,
            name: "rating".to_string(),
            initializer: vec![TensorProto {
                dims: vec![width as i64, 3],
                data_type: FLOAT,
                float_data: weights,
                name: "W".to_string(),
            }],
            input: vec![tensor_info("X", FLOAT, Some(vec![dim_param("N"), feature_dim]))],
            output: graph_outputs,
        }),
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: 13,
        }],
    };
    model.encode_to_vec()
}

/// Writes a rating model into `dir` and returns its path.
pub fn write_rating_model(dir: &Path, file: &str, features: FeatureDim, outputs: Outputs) -> PathBuf {
    let path = dir.join(file);
    fs::write(&path, rating_model(features, outputs)).unwrap();
    path
}
