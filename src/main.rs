//! osccalc demo - cached probabilities, gradients and NSI at a DUNE-like baseline
//!
//! Run with: `cargo run --release`. Set `OSCCALC_LOG=trace` to watch the cache.

use osccalc::{
    copy_params, Dual, OscCalc, OscCalcAdjustable, OscCalcNsi, PmnsOptCalc, Sign,
};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

fn main() {
    let level = std::env::var("OSCCALC_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    println!("osccalc - Cached Neutrino Oscillation Probabilities");
    println!("===================================================\n");

    let mut calc = PmnsOptCalc::<f64>::new();
    calc.set_th12(0.5843);
    calc.set_th13(0.1477);
    calc.set_th23(0.7367);
    calc.set_dcp(-1.9);
    calc.set_dmsq21(7.53e-5);
    calc.set_dmsq32(2.51e-3);
    calc.set_rho(2.8);
    calc.set_l(1300.0);

    let e = 2.5;
    println!("Parameters (DUNE-like, Normal Ordering):");
    println!("  Baseline: {} km", calc.l());
    println!("  Energy: {} GeV", e);
    println!("  Density: {} g/cm³", calc.rho());
    println!();

    println!("Neutrino probabilities:");
    print_matrix(&mut calc, 1, e);
    println!("\nAntineutrino probabilities:");
    print_matrix(&mut calc, -1, e);

    let bins: Vec<f64> = (0..40).map(|i| 0.5 + 0.125 * i as f64).collect();
    for _ in 0..10 {
        calc.p_energies(14, 12, &bins);
        calc.p_energies(14, 14, &bins);
    }
    info!(
        neutrino = calc.cache_len(Sign::Neutrino),
        antineutrino = calc.cache_len(Sign::Antineutrino),
        "cache entries after repeated spectrum evaluation"
    );

    let mut grad = PmnsOptCalc::<Dual<2>>::new();
    copy_params(&calc, &mut grad);
    grad.set_th23(Dual::variable(0.7367, 0));
    grad.set_dcp(Dual::variable(-1.9, 1));
    let pme = grad.p(14, 12, e);
    println!("\nGradient of P(νμ → νe):");
    println!("  P:        {:.6}", pme.val);
    println!("  ∂P/∂θ23:  {:+.6}", pme.grad[0]);
    println!("  ∂P/∂δCP:  {:+.6}", pme.grad[1]);

    let mut nsi = OscCalcNsi::<osccalc::HamiltonianPropagator>::new();
    copy_params(&calc, &mut nsi);
    nsi.set_eps_emu(0.1);
    nsi.set_delta_emu(0.5);
    println!("\nNSI effect on P(νμ → νe) (|ε_eμ| = 0.1, δ_eμ = 0.5):");
    println!("  Standard: {:.6}", calc.p(14, 12, e));
    println!("  NSI:      {:.6}", nsi.p(14, 12, e));
}

fn print_matrix<C: OscCalc<f64>>(calc: &mut C, sign: i32, e: f64) {
    println!("         e          μ          τ");
    let labels = ['e', 'μ', 'τ'];
    let codes = [12, 14, 16];
    for (label, before) in labels.iter().zip(codes) {
        let row: Vec<f64> = codes
            .iter()
            .map(|after| calc.p(sign * before, sign * after, e))
            .collect();
        println!(
            "  {} → {:>9.6}  {:>9.6}  {:>9.6}",
            label, row[0], row[1], row[2]
        );
    }
}
