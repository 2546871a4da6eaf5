use burn::{
    module::Ignored,
    nn::{Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation,
};
use serde::{Deserialize, Serialize};

/// Activation applied after each hidden layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HiddenActivation {
    #[default]
    Relu,
    Sigmoid,
    Tanh,
}

impl HiddenActivation {
    /// Applies the activation element-wise.
    pub fn forward<B: Backend, const D: usize>(&self, tensor: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            HiddenActivation::Relu => activation::relu(tensor),
            HiddenActivation::Sigmoid => activation::sigmoid(tensor),
            HiddenActivation::Tanh => activation::tanh(tensor),
        }
    }
}

/// Configuration to create a [fully connected network](FullyConnectedNetwork).
#[derive(Config)]
pub struct FullyConnectedNetworkConfig {
    /// Number of input features, once the image is flattened.
    pub input_size: usize,
    /// Output size of each hidden layer.
    pub hidden_sizes: Vec<usize>,
    /// Output size of the final projection, one per class.
    pub output_size: usize,
    /// Activation after each hidden layer.
    #[config(default = "HiddenActivation::Relu")]
    pub activation: HiddenActivation,
    /// Dropout probability after each hidden layer. No dropout layer is created if `<= 0`.
    #[config(default = 0.0)]
    pub dropout: f64,
}

/// Simple fully connected network (multilayer perceptron).
///
/// The input `[batch_size, width, height, channels]` is flattened to
/// `[batch_size, width * height * channels]`, passed through the hidden layers and projected to
/// one logit per class.
#[derive(Module, Debug)]
pub struct FullyConnectedNetwork<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
    dropout: Option<Dropout>,
    activation: Ignored<HiddenActivation>,
}

impl FullyConnectedNetworkConfig {
    /// Network for 28x28 grayscale digits: hidden sizes 256, 128 and 64, ReLU, dropout 0.2.
    pub fn mnist() -> Self {
        Self::new(28 * 28, vec![256, 128, 64], 10).with_dropout(0.2)
    }

    /// Initializes a new network on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> FullyConnectedNetwork<B> {
        let mut hidden = Vec::with_capacity(self.hidden_sizes.len());
        let mut d_input = self.input_size;

        for &d_output in self.hidden_sizes.iter() {
            hidden.push(
                LinearConfig::new(d_input, d_output)
                    .with_bias(true)
                    .init(device),
            );
            d_input = d_output;
        }

        let dropout = (self.dropout > 0.0).then(|| DropoutConfig::new(self.dropout).init());

        FullyConnectedNetwork {
            hidden,
            output: LinearConfig::new(d_input, self.output_size).init(device),
            dropout,
            activation: Ignored(self.activation),
        }
    }
}

impl<B: Backend> FullyConnectedNetwork<B> {
    /// Computes the class logits.
    ///
    /// # Shapes
    ///
    /// - input: `[batch_size, width, height, channels]`
    /// - output: `[batch_size, output_size]`
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch_size, width, height, channels] = input.dims();
        let mut x = input.reshape([batch_size, width * height * channels]);

        for linear in self.hidden.iter() {
            x = linear.forward(x);
            x = self.activation.forward(x);

            if let Some(dropout) = &self.dropout {
                x = dropout.forward(x);
            }
        }

        self.output.forward(x)
    }

    /// Number of hidden layers.
    pub fn num_hidden_layers(&self) -> usize {
        self.hidden.len()
    }

    /// Checks if dropout is applied during training.
    pub fn has_dropout(&self) -> bool {
        self.dropout.is_some()
    }
}
