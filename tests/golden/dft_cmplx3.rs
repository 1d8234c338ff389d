// Generated by sched2kernel. Do not edit.

use num_complex::Complex64;

pub const N: usize = 3;

#[allow(non_snake_case, dead_code, clippy::excessive_precision)]
pub fn dft_cmplx3(xi: &[Complex64], xo: &mut [Complex64]) {
    const I: Complex64 = Complex64::new(0.0, 1.0);
    const KP866025403: f64 = 0.866025403784438646763723170752936183471402627;
    const KP500000000: f64 = 0.500000000000000000000000000000000000000000000;

    let T1 = xi[0];
    let T2 = xi[1] + xi[2];
    let T3 = KP866025403 * (xi[2] - xi[1]);
    xo[0] = T1 + T2;
    let T4 = T1 - (KP500000000 * T2);
    let T5 = I * T3;
    xo[1] = T4 + T5;
    xo[2] = T4 - T5;
}
