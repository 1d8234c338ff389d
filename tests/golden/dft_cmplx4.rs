// Generated by sched2kernel. Do not edit.

use num_complex::Complex64;

pub const N: usize = 4;

#[allow(non_snake_case, dead_code, clippy::excessive_precision)]
pub fn dft_cmplx4(xi: &[Complex64], xo: &mut [Complex64]) {
    const I: Complex64 = Complex64::new(0.0, 1.0);

    let T1 = xi[0] + xi[2];
    let T2 = xi[0] - xi[2];
    let T3 = xi[1] + xi[3];
    let T4 = I * (xi[1] - xi[3]);
    xo[0] = T1 + T3;
    xo[2] = T1 - T3;
    xo[1] = T2 - T4;
    xo[3] = T2 + T4;
}
