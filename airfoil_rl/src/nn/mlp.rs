//! Reference actor and critic networks.
//!
//! Both flatten the observation and run it through ReLU hidden layers. The
//! actor squashes its mean into the unit interval with a sigmoid and learns
//! a state-independent log std; the critic ends in a single linear unit.
//!
//! ```ignore
//! let agent = MlpConfig::new(400, 2)
//!     .with_hidden(vec![128, 64])
//!     .init_agent::<Autodiff<NdArray>>(&config, bounds, &device);
//! ```

use burn::grad_clipping::GradientClippingConfig;
use burn::module::{Module, Param};
use burn::nn::{Linear, LinearConfig};
use burn::optim::{AdamConfig, Optimizer};
use burn::tensor::activation::{relu, sigmoid};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::Tensor;

use crate::algorithms::agent::{ActorCriticAgent, PolicyNetwork, ValueNetwork};
use crate::algorithms::gaussian::{ActionBounds, DiagGaussian};
use crate::runners::config::TrainConfig;

/// Configuration for the MLP actor/critic pair.
#[derive(Debug, Clone)]
pub struct MlpConfig {
    /// Flattened observation length.
    pub d_input: usize,
    /// Action dimensions.
    pub action_dim: usize,
    /// Hidden layer widths shared by actor and critic.
    pub hidden: Vec<usize>,
    /// Initial value of the learnable log std. The default 0.1 gives a
    /// starting std of e^0.1, about 1.105.
    pub init_log_std: f32,
}

impl MlpConfig {
    pub fn new(d_input: usize, action_dim: usize) -> Self {
        Self {
            d_input,
            action_dim,
            hidden: vec![64, 64],
            init_log_std: 0.1,
        }
    }

    pub fn with_hidden(mut self, hidden: Vec<usize>) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_init_log_std(mut self, log_std: f32) -> Self {
        self.init_log_std = log_std;
        self
    }

    /// Set the starting standard deviation directly.
    pub fn with_init_std(self, std: f32) -> Self {
        self.with_init_log_std(std.ln())
    }

    fn hidden_layers<B: Backend>(&self, device: &B::Device) -> (Vec<Linear<B>>, usize) {
        let mut width = self.d_input;
        let layers = self
            .hidden
            .iter()
            .map(|&out| {
                let layer = LinearConfig::new(width, out).init(device);
                width = out;
                layer
            })
            .collect();
        (layers, width)
    }

    pub fn init_actor<B: Backend>(&self, device: &B::Device) -> MlpActor<B> {
        let (hidden, width) = self.hidden_layers(device);
        let log_std =
            Tensor::<B, 1>::ones([self.action_dim], device).mul_scalar(self.init_log_std);
        MlpActor {
            hidden,
            mean_head: LinearConfig::new(width, self.action_dim).init(device),
            log_std: Param::from_tensor(log_std),
        }
    }

    pub fn init_critic<B: Backend>(&self, device: &B::Device) -> MlpCritic<B> {
        let (hidden, width) = self.hidden_layers(device);
        MlpCritic {
            hidden,
            value_head: LinearConfig::new(width, 1).init(device),
        }
    }

    /// Actor, critic and one Adam optimizer each, configured from `train`.
    pub fn init_agent<B: AutodiffBackend>(
        &self,
        train: &TrainConfig,
        bounds: ActionBounds,
        device: &B::Device,
    ) -> ActorCriticAgent<
        B,
        MlpActor<B>,
        MlpCritic<B>,
        impl Optimizer<MlpActor<B>, B>,
        impl Optimizer<MlpCritic<B>, B>,
    > {
        let mut adam_config = AdamConfig::new().with_epsilon(1e-5);
        if let Some(max_norm) = train.max_grad_norm {
            adam_config =
                adam_config.with_grad_clipping(Some(GradientClippingConfig::Norm(max_norm)));
        }

        ActorCriticAgent::new(
            self.init_actor(device),
            self.init_critic(device),
            adam_config.init::<B, MlpActor<B>>(),
            adam_config.init::<B, MlpCritic<B>>(),
            bounds,
            self.d_input,
        )
        .with_learning_rates(train.actor_lr, train.critic_lr)
    }
}

fn run_hidden<B: Backend>(layers: &[Linear<B>], mut x: Tensor<B, 2>) -> Tensor<B, 2> {
    for layer in layers {
        x = relu(layer.forward(x));
    }
    x
}

/// Gaussian policy with sigmoid-squashed mean.
#[derive(Module, Debug)]
pub struct MlpActor<B: Backend> {
    hidden: Vec<Linear<B>>,
    mean_head: Linear<B>,
    log_std: Param<Tensor<B, 1>>,
}

impl<B: Backend> MlpActor<B> {
    /// Mean in the unit interval: [batch, action_dim].
    pub fn mean(&self, observations: Tensor<B, 2>) -> Tensor<B, 2> {
        sigmoid(self.mean_head.forward(run_hidden(&self.hidden, observations)))
    }

    pub fn log_std(&self) -> Tensor<B, 1> {
        self.log_std.val()
    }
}

impl<B: AutodiffBackend> PolicyNetwork<B> for MlpActor<B> {
    fn distribution(&self, observations: Tensor<B, 2>) -> DiagGaussian<B> {
        DiagGaussian::with_shared_log_std(self.mean(observations), self.log_std())
    }
}

/// State value network.
#[derive(Module, Debug)]
pub struct MlpCritic<B: Backend> {
    hidden: Vec<Linear<B>>,
    value_head: Linear<B>,
}

impl<B: Backend> MlpCritic<B> {
    pub fn values(&self, observations: Tensor<B, 2>) -> Tensor<B, 1> {
        self.value_head
            .forward(run_hidden(&self.hidden, observations))
            .flatten(0, 1)
    }
}

impl<B: AutodiffBackend> ValueNetwork<B> for MlpCritic<B> {
    fn forward(&self, observations: Tensor<B, 2>) -> Tensor<B, 1> {
        self.values(observations)
    }
}
