//! A short tour of burn tensors, printed step by step.

use burn::{prelude::*, tensor::ElementConversion};
use mnist_mlp::backend::{self, Backend as B};

fn main() {
    // Every tensor lives on a device. The backend feature decides which one.
    let device = backend::device();

    // Tensors are created from data. The kind (float, int or bool) is part of the type,
    // the element type of each kind is chosen by the backend.
    let almost_pi = Tensor::<B, 1>::from_floats([std::f32::consts::PI], &device);
    let the_answer = Tensor::<B, 1, Int>::from_ints([42], &device);
    let is_true = Tensor::<B, 1, Bool>::from_data(TensorData::from([true]), &device);

    println!("{:?}", almost_pi.dtype());
    println!("{:?}", the_answer.dtype());
    println!("{:?}", is_true.dtype());

    // Converting between kinds creates a new tensor.
    println!("{:?}", the_answer.clone().float().dtype());
    println!("{:?}", almost_pi.clone().int().dtype());

    // Math operations apply to every element at once.
    let sin = almost_pi.sin().into_scalar().elem::<f32>();
    println!("sin(pi) = {sin}");

    // Tensors of the same shape are combined element-wise.
    println!("{}", the_answer.clone() + the_answer);
    println!(
        "{}",
        Tensor::<B, 1, Int>::arange(0..8, &device) + Tensor::<B, 1, Int>::arange(10..18, &device)
    );

    // A scalar is applied to every element.
    println!("{}", Tensor::<B, 1, Int>::arange(0..8, &device).add_scalar(2));

    // Dimensions of size one are broadcast: each row of the 4x2 tensor gets [100, 1000] added.
    let rows = Tensor::<B, 1, Int>::arange(0..8, &device).reshape([4, 2]);
    let offsets = Tensor::<B, 2, Int>::from_ints([[100, 1000]], &device);
    println!("{}", rows + offsets);
}
