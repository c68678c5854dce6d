//! NuFast three-flavor probabilities in vacuum and constant-density matter.
//!
//! Port of [NuFast](https://github.com/PeterDenton/NuFast) by Peter Denton,
//! generic over [`Scalar`] so the same arithmetic produces plain values or
//! forward-mode gradients.
//!
//! Antineutrino probabilities follow from passing a negative energy: that
//! flips the matter potential and the sign of every kinematic phase, which
//! is equivalent to conjugating the PMNS phase.

use core::f64::consts::PI;

use crate::scalar::Scalar;

/// Conversion factor: eV² × km → GeV (divided by 4)
///
/// Δ = Δm² × L / (4E) in natural units
pub const EV_SQ_KM_TO_GEV_OVER4: f64 = 1e-9 / 1.97327e-7 * 1e3 / 4.0;

/// Matter potential conversion factor: Y_e × ρ × E → A
///
/// A = 2√2 G_F N_e E, approximately 1.52 × 10⁻⁴ eV² / (g/cm³ × GeV)
pub const YE_RHO_E_TO_A: f64 = 1.52e-4;

/// 3×3 probability matrix, `probs[α][β]` = P(ν_α → ν_β) with 0 = e, 1 = μ, 2 = τ.
pub type ProbabilityMatrix<S> = [[S; 3]; 3];

/// Vacuum oscillation inputs. Angles as sin²θ, δ in radians, splittings in eV²,
/// L in km, E in GeV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VacuumParameters<S> {
    pub s12sq: S,
    pub s13sq: S,
    pub s23sq: S,
    pub delta: S,
    pub Dmsq21: S,
    /// Positive for normal ordering, negative for inverted.
    pub Dmsq31: S,
    pub L: f64,
    pub E: f64,
}

impl<S: Scalar> VacuumParameters<S> {
    /// NuFit 5.2 best fit, normal ordering.
    pub fn nufit52_no(l: f64, e: f64) -> Self {
        Self {
            s12sq: S::from_f64(0.307),
            s13sq: S::from_f64(0.02203),
            s23sq: S::from_f64(0.546),
            delta: S::from_f64(1.36 * PI),
            Dmsq21: S::from_f64(7.42e-5),
            Dmsq31: S::from_f64(2.517e-3),
            L: l,
            E: e,
        }
    }
}

/// Matter oscillation inputs: [`VacuumParameters`] plus density and Y_e.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatterParameters<S> {
    pub s12sq: S,
    pub s13sq: S,
    pub s23sq: S,
    pub delta: S,
    pub Dmsq21: S,
    pub Dmsq31: S,
    pub L: f64,
    /// GeV; negative for antineutrinos.
    pub E: f64,
    /// g/cm³
    pub rho: f64,
    pub Ye: f64,
    /// Newton iterations for λ₃ (0 = DMP approximation)
    pub N_Newton: u8,
}

impl<S: Scalar> MatterParameters<S> {
    /// NuFit 5.2 best fit, normal ordering, Earth crust (ρ = 2.6, Y_e = 0.5).
    pub fn nufit52_no(l: f64, e: f64) -> Self {
        Self::from_vacuum(&VacuumParameters::nufit52_no(l, e), 2.6, 0.5, 0)
    }

    /// NuFit 5.2 best fit, inverted ordering.
    pub fn nufit52_io(l: f64, e: f64) -> Self {
        let mut vac = VacuumParameters::nufit52_no(l, e);
        vac.s13sq = S::from_f64(0.02219);
        vac.s23sq = S::from_f64(0.539);
        vac.delta = S::from_f64(1.56 * PI);
        vac.Dmsq31 = S::from_f64(-2.498e-3);
        Self::from_vacuum(&vac, 2.6, 0.5, 0)
    }

    pub fn from_vacuum(vac: &VacuumParameters<S>, rho: f64, ye: f64, n_newton: u8) -> Self {
        Self {
            s12sq: vac.s12sq,
            s13sq: vac.s13sq,
            s23sq: vac.s23sq,
            delta: vac.delta,
            Dmsq21: vac.Dmsq21,
            Dmsq31: vac.Dmsq31,
            L: vac.L,
            E: vac.E,
            rho,
            Ye: ye,
            N_Newton: n_newton,
        }
    }
}

/// Fill the nine probabilities from the three computed ones using unitarity.
#[inline]
fn assemble<S: Scalar>(Pee: S, Pme: S, Pem: S, Pmm: S) -> ProbabilityMatrix<S> {
    let one = S::one();
    let Pet = one - Pee - Pem;
    let Pmt = one - Pme - Pmm;
    let Pte = one - Pee - Pme;
    let Ptm = one - Pem - Pmm;
    let Ptt = one - Pet - Pmt;
    [[Pee, Pem, Pet], [Pme, Pmm, Pmt], [Pte, Ptm, Ptt]]
}

/// Vacuum oscillation probabilities for long-baseline experiments.
///
/// ```rust
/// use osccalc::nufast::{probability_vacuum_lbl, VacuumParameters};
///
/// let params = VacuumParameters::<f64>::nufit52_no(295.0, 0.6);
/// let probs = probability_vacuum_lbl(&params);
/// let row_sum: f64 = probs[1].iter().sum();
/// assert!((row_sum - 1.0).abs() < 1e-10);
/// ```
pub fn probability_vacuum_lbl<S: Scalar>(parameters: &VacuumParameters<S>) -> ProbabilityMatrix<S> {
    let VacuumParameters {
        s12sq,
        s13sq,
        s23sq,
        delta,
        Dmsq21,
        Dmsq31,
        L,
        E,
    } = *parameters;

    let one = S::one();
    let two = S::from_f64(2.0);
    let c13sq = one - s13sq;

    let Ue3sq = s13sq;
    let Ue2sq = c13sq * s12sq;

    let Um3sq = c13sq * s23sq;
    // Ut2sq and Um2sq start as temporaries
    let Ut2sq = s13sq * s12sq * s23sq;
    let Um2sq = (one - s12sq) * (one - s23sq);

    let Jrr = (Um2sq * Ut2sq).sqrt();
    let sind = delta.sin();
    let cosd = delta.cos();
    let Um2sq = Um2sq + Ut2sq - two * Jrr * cosd;
    let Jvac = S::from_f64(8.0) * Jrr * c13sq * sind;

    let Ue1sq = one - Ue3sq - Ue2sq;
    let Um1sq = one - Um3sq - Um2sq;

    let Ut3sq = one - Um3sq - Ue3sq;
    let Ut2sq = one - Um2sq - Ue2sq;
    let Ut1sq = one - Um1sq - Ue1sq;

    let Lover4E = S::from_f64(EV_SQ_KM_TO_GEV_OVER4 * L / E);

    let D21 = Dmsq21 * Lover4E;
    let D31 = Dmsq31 * Lover4E;

    let sinD21 = D21.sin();
    let sinD31 = D31.sin();
    let sinD32 = (D31 - D21).sin();

    let triple_sin = sinD21 * sinD31 * sinD32;

    let sinsqD21_2 = two * sinD21 * sinD21;
    let sinsqD31_2 = two * sinD31 * sinD31;
    let sinsqD32_2 = two * sinD32 * sinD32;

    let Pme_CPC = (Ut3sq - Um2sq * Ue1sq - Um1sq * Ue2sq) * sinsqD21_2
        + (Ut2sq - Um3sq * Ue1sq - Um1sq * Ue3sq) * sinsqD31_2
        + (Ut1sq - Um3sq * Ue2sq - Um2sq * Ue3sq) * sinsqD32_2;
    let Pme_CPV = -Jvac * triple_sin;

    let Pmm = one
        - two
            * (Um2sq * Um1sq * sinsqD21_2
                + Um3sq * Um1sq * sinsqD31_2
                + Um3sq * Um2sq * sinsqD32_2);

    let Pee = one
        - two
            * (Ue2sq * Ue1sq * sinsqD21_2
                + Ue3sq * Ue1sq * sinsqD31_2
                + Ue3sq * Ue2sq * sinsqD32_2);

    assemble(Pee, Pme_CPC + Pme_CPV, Pme_CPC - Pme_CPV, Pmm)
}

/// Matter oscillation probabilities for long-baseline experiments.
///
/// DMP approximation for λ₃ refined by `N_Newton` Newton steps, then the
/// Rosetta/NHS identities for the matter mixing elements and Jarlskog.
pub fn probability_matter_lbl<S: Scalar>(parameters: &MatterParameters<S>) -> ProbabilityMatrix<S> {
    let MatterParameters {
        s12sq,
        s13sq,
        s23sq,
        delta,
        Dmsq21,
        Dmsq31,
        L,
        E,
        rho,
        Ye,
        N_Newton,
    } = *parameters;

    let one = S::one();
    let two = S::from_f64(2.0);
    let four = S::from_f64(4.0);
    let half = S::from_f64(0.5);

    let c13sq = one - s13sq;

    let Ue2sq = c13sq * s12sq;
    let Ue3sq = s13sq;

    let Um3sq = c13sq * s23sq;
    let Ut2sq = s13sq * s12sq * s23sq;
    let Um2sq = (one - s12sq) * (one - s23sq);

    let Jrr = (Um2sq * Ut2sq).sqrt();
    let sind = delta.sin();
    let cosd = delta.cos();

    let Um2sq = Um2sq + Ut2sq - two * Jrr * cosd;
    let Jmatter = S::from_f64(8.0) * Jrr * c13sq * sind;
    let Amatter = S::from_f64(Ye * rho * E * YE_RHO_E_TO_A);
    let Dmsqee = Dmsq31 - s12sq * Dmsq21;

    let A_sum = Dmsq21 + Dmsq31;
    let See = A_sum - Dmsq21 * Ue2sq - Dmsq31 * Ue3sq;
    let Tmm_base = Dmsq21 * Dmsq31;
    let Tee = Tmm_base * (one - Ue3sq - Ue2sq);
    let C = Amatter * Tee;
    let A = A_sum + Amatter;

    // λ₃ from λ₊ of MP/DMP
    let xmat = Amatter / Dmsqee;
    let tmp = one - xmat;
    let mut lambda3 =
        Dmsq31 + half * Dmsqee * (xmat - one + (tmp * tmp + four * s13sq * xmat).sqrt());

    let B = Tmm_base + Amatter * See;
    for _ in 0..N_Newton {
        lambda3 = (lambda3 * lambda3 * (two * lambda3 - A) + C)
            / (lambda3 * (S::from_f64(3.0) * lambda3 - two * A) + B);
    }

    let tmp = A - lambda3;
    let Dlambda21 = (tmp * tmp - four * C / lambda3).sqrt();
    let lambda2 = half * (A - lambda3 + Dlambda21);
    let Dlambda32 = lambda3 - lambda2;
    let Dlambda31 = Dlambda32 + Dlambda21;

    // Rosetta for the matter |U_ei|², |U_μi|²
    let PiDlambdaInv = one / (Dlambda31 * Dlambda32 * Dlambda21);
    let Xp3 = PiDlambdaInv * Dlambda21;
    let Xp2 = -PiDlambdaInv * Dlambda31;

    let Ue3sq = (lambda3 * (lambda3 - See) + Tee) * Xp3;
    let Ue2sq = (lambda2 * (lambda2 - See) + Tee) * Xp2;

    let Smm = A - Dmsq21 * Um2sq - Dmsq31 * Um3sq;
    let Tmm = Tmm_base * (one - Um3sq - Um2sq) + Amatter * (See + Smm - A);

    let Um3sq = (lambda3 * (lambda3 - Smm) + Tmm) * Xp3;
    let Um2sq = (lambda2 * (lambda2 - Smm) + Tmm) * Xp2;

    // NHS for the matter Jarlskog
    let Jmatter = Jmatter * Dmsq21 * Dmsq31 * (Dmsq31 - Dmsq21) * PiDlambdaInv;

    let Ue1sq = one - Ue3sq - Ue2sq;
    let Um1sq = one - Um3sq - Um2sq;

    let Ut3sq = one - Um3sq - Ue3sq;
    let Ut2sq = one - Um2sq - Ue2sq;
    let Ut1sq = one - Um1sq - Ue1sq;

    let Lover4E = S::from_f64(EV_SQ_KM_TO_GEV_OVER4 * L / E);

    let D21 = Dlambda21 * Lover4E;
    let D32 = Dlambda32 * Lover4E;

    let sinD21 = D21.sin();
    let sinD31 = (D32 + D21).sin();
    let sinD32 = D32.sin();

    let triple_sin = sinD21 * sinD31 * sinD32;

    let sinsqD21_2 = two * sinD21 * sinD21;
    let sinsqD31_2 = two * sinD31 * sinD31;
    let sinsqD32_2 = two * sinD32 * sinD32;

    let Pme_CPC = (Ut3sq - Um2sq * Ue1sq - Um1sq * Ue2sq) * sinsqD21_2
        + (Ut2sq - Um3sq * Ue1sq - Um1sq * Ue3sq) * sinsqD31_2
        + (Ut1sq - Um3sq * Ue2sq - Um2sq * Ue3sq) * sinsqD32_2;
    let Pme_CPV = -Jmatter * triple_sin;

    let Pmm = one
        - two
            * (Um2sq * Um1sq * sinsqD21_2
                + Um3sq * Um1sq * sinsqD31_2
                + Um3sq * Um2sq * sinsqD32_2);

    let Pee = one
        - two
            * (Ue2sq * Ue1sq * sinsqD21_2
                + Ue3sq * Ue1sq * sinsqD31_2
                + Ue3sq * Ue2sq * sinsqD32_2);

    assemble(Pee, Pme_CPC + Pme_CPV, Pme_CPC - Pme_CPV, Pmm)
}
