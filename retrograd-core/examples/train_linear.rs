//! # Exemple d'Entraînement d'une Régression Linéaire
//!
//! Cet exemple illustre les étapes fondamentales d'une boucle
//! d'entraînement avec `retrograd-core` :
//!
//! 1. **Création des données synthétiques** : `y = 2x + 1` plus un peu de
//!    bruit.
//! 2. **Définition du modèle** : une couche `Linear` (1 entrée, 1 sortie).
//! 3. **Boucle d'entraînement manuelle** :
//!    - Passe avant (`forward`).
//!    - Calcul de la perte (`MseLoss`).
//!    - Passe arrière (`backward`) pour calculer les gradients.
//!    - Mise à jour des poids par descente de gradient (`Sgd`).
//!    - Remise à zéro des gradients pour l'itération suivante.
//!
//! ## Exécution
//! `cargo run --example train_linear`

use retrograd_core::nn::layers::Linear;
use retrograd_core::nn::losses::{MseLoss, Reduction};
use retrograd_core::nn::Module;
use retrograd_core::optim::{Optimizer, Sgd};
use retrograd_core::{Graph, RetroGradError};

fn main() -> Result<(), RetroGradError> {
    let graph: Graph<f32> = Graph::new();

    // Synthetic dataset: y = 2x + 1 with a tiny deterministic wobble.
    let xs: Vec<f32> = (0..8).map(|i| i as f32 * 0.5).collect();
    let ys: Vec<f32> = xs
        .iter()
        .enumerate()
        .map(|(i, &x)| 2.0 * x + 1.0 + if i % 2 == 0 { 0.01 } else { -0.01 })
        .collect();
    let n = xs.len();

    let inputs = graph.leaf(xs, vec![n, 1])?;
    let targets = graph.leaf(ys, vec![n, 1])?;

    let model = Linear::new(&graph, 1, 1, true)?;
    let loss_fn = MseLoss::new(Reduction::Mean);
    let mut optimizer = Sgd::new(
        model.parameters().into_iter().cloned().collect(),
        0.05,
    );

    for epoch in 0..200 {
        let predictions = model.forward(&inputs)?;
        let loss = loss_fn.calculate(&predictions, &targets)?;

        loss.backward()?;
        optimizer.step()?;
        model.zero_grad();

        if epoch % 20 == 0 {
            println!("epoch {:3} | loss {:.6}", epoch, loss.item()?);
        }
    }

    let weight = model.weight().data()[0];
    let bias = model.bias().map(|b| b.data()[0]).unwrap_or(0.0);
    println!("learned: y = {:.3} * x + {:.3} (target: y = 2x + 1)", weight, bias);

    Ok(())
}
