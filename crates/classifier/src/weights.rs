//! Network parameters and their safetensors serialization.
//!
//! Tensor names follow the PyTorch `state_dict` of the training script
//! (`conv1.weight`, `bn1.running_var`, ..., `fc.bias`), so a checkpoint
//! exported with `safetensors.torch.save_file(model.state_dict(), ...)` loads
//! directly. Extra entries such as `bn1.num_batches_tracked` are ignored.

use std::path::Path;

use ndarray::{Array1, ArrayD, Ix1, Ix2, Ix4, IxDyn};
use safetensors::tensor::{Dtype, TensorView};
use safetensors::SafeTensors;
use tracing::{debug, info};

use crate::error::{ClassifierError, ClassifierResult};
use crate::layers::{BatchNorm2d, Conv2d, Linear};
use crate::{BN_EPS, KERNEL_SIZE, STAGE_CHANNELS};

/// One conv → batch-norm stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvBlock {
    pub conv: Conv2d,
    pub bn: BatchNorm2d,
}

/// Every learned parameter of the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkWeights {
    pub blocks: [ConvBlock; 3],
    pub fc: Linear,
}

impl NetworkWeights {
    /// All weights and biases zero, running variance one. Every input maps to
    /// a logit of exactly 0.
    pub fn zeroed() -> Self {
        let block = |i: usize| ConvBlock {
            conv: Conv2d::zeros(STAGE_CHANNELS[i], STAGE_CHANNELS[i + 1]),
            bn: BatchNorm2d::zeroed(STAGE_CHANNELS[i + 1]),
        };
        Self {
            blocks: [block(0), block(1), block(2)],
            fc: Linear::zeros(STAGE_CHANNELS[3], 1),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> ClassifierResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        info!(path = %path.display(), bytes = bytes.len(), "Loading classifier weights");
        Self::from_safetensors(&bytes)
    }

    pub fn from_safetensors(bytes: &[u8]) -> ClassifierResult<Self> {
        let tensors =
            SafeTensors::deserialize(bytes).map_err(|e| ClassifierError::Safetensors(e.to_string()))?;
        debug!(tensors = tensors.names().len(), "Parsed safetensors header");

        let mut blocks = Vec::with_capacity(3);
        for stage in 0..3 {
            let (cin, cout) = (STAGE_CHANNELS[stage], STAGE_CHANNELS[stage + 1]);
            let n = stage + 1;
            let conv = Conv2d {
                weight: read_tensor(&tensors, &format!("conv{n}.weight"), &[cout, cin, KERNEL_SIZE, KERNEL_SIZE])?
                    .into_dimensionality::<Ix4>()
                    .map_err(|e| ClassifierError::Safetensors(e.to_string()))?,
                bias: read_vector(&tensors, &format!("conv{n}.bias"), cout)?,
            };
            let bn = BatchNorm2d {
                weight: read_vector(&tensors, &format!("bn{n}.weight"), cout)?,
                bias: read_vector(&tensors, &format!("bn{n}.bias"), cout)?,
                running_mean: read_vector(&tensors, &format!("bn{n}.running_mean"), cout)?,
                running_var: read_vector(&tensors, &format!("bn{n}.running_var"), cout)?,
                eps: BN_EPS,
            };
            blocks.push(ConvBlock { conv, bn });
        }

        let fc = Linear {
            weight: read_tensor(&tensors, "fc.weight", &[1, STAGE_CHANNELS[3]])?
                .into_dimensionality::<Ix2>()
                .map_err(|e| ClassifierError::Safetensors(e.to_string()))?,
            bias: read_vector(&tensors, "fc.bias", 1)?,
        };

        let blocks: [ConvBlock; 3] = blocks
            .try_into()
            .map_err(|_| ClassifierError::Safetensors("expected three conv stages".into()))?;
        Ok(Self { blocks, fc })
    }

    /// Serialize to safetensors bytes (f32, little-endian) using the same
    /// tensor names [`from_safetensors`](Self::from_safetensors) expects.
    pub fn to_safetensors(&self) -> ClassifierResult<Vec<u8>> {
        let mut entries: Vec<(String, Vec<usize>, Vec<u8>)> = Vec::new();
        for (i, block) in self.blocks.iter().enumerate() {
            let n = i + 1;
            entries.push(entry(format!("conv{n}.weight"), block.conv.weight.shape(), block.conv.weight.iter()));
            entries.push(vector_entry(format!("conv{n}.bias"), &block.conv.bias));
            entries.push(vector_entry(format!("bn{n}.weight"), &block.bn.weight));
            entries.push(vector_entry(format!("bn{n}.bias"), &block.bn.bias));
            entries.push(vector_entry(format!("bn{n}.running_mean"), &block.bn.running_mean));
            entries.push(vector_entry(format!("bn{n}.running_var"), &block.bn.running_var));
        }
        entries.push(entry("fc.weight".into(), self.fc.weight.shape(), self.fc.weight.iter()));
        entries.push(vector_entry("fc.bias".into(), &self.fc.bias));

        let views = entries
            .iter()
            .map(|(name, shape, data)| {
                TensorView::new(Dtype::F32, shape.clone(), data)
                    .map(|view| (name.clone(), view))
                    .map_err(|e| ClassifierError::Safetensors(e.to_string()))
            })
            .collect::<ClassifierResult<Vec<_>>>()?;

        safetensors::serialize(views, &None).map_err(|e| ClassifierError::Safetensors(e.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ClassifierResult<()> {
        std::fs::write(path, self.to_safetensors()?)?;
        Ok(())
    }
}

fn entry<'a>(
    name: String,
    shape: &[usize],
    values: impl Iterator<Item = &'a f32>,
) -> (String, Vec<usize>, Vec<u8>) {
    let data = values.flat_map(|v| v.to_le_bytes()).collect();
    (name, shape.to_vec(), data)
}

fn vector_entry(name: String, values: &Array1<f32>) -> (String, Vec<usize>, Vec<u8>) {
    entry(name, values.shape(), values.iter())
}

fn read_vector(tensors: &SafeTensors<'_>, name: &str, len: usize) -> ClassifierResult<Array1<f32>> {
    read_tensor(tensors, name, &[len])?
        .into_dimensionality::<Ix1>()
        .map_err(|e| ClassifierError::Safetensors(e.to_string()))
}

fn read_tensor(tensors: &SafeTensors<'_>, name: &str, expected: &[usize]) -> ClassifierResult<ArrayD<f32>> {
    let view = tensors
        .tensor(name)
        .map_err(|_| ClassifierError::MissingTensor(name.to_string()))?;

    if view.shape() != expected {
        return Err(ClassifierError::TensorShape {
            name: name.to_string(),
            expected: expected.to_vec(),
            got: view.shape().to_vec(),
        });
    }

    let data = view.data();
    let values: Vec<f32> = match view.dtype() {
        Dtype::F32 => data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        Dtype::F64 => data
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32)
            .collect(),
        other => {
            return Err(ClassifierError::UnsupportedDtype {
                name: name.to_string(),
                dtype: format!("{other:?}"),
            })
        }
    };

    ArrayD::from_shape_vec(IxDyn(expected), values).map_err(|e| ClassifierError::Safetensors(e.to_string()))
}
