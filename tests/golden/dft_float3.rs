// Generated by sched2kernel. Do not edit.

pub const N: usize = 3;

#[allow(non_snake_case, dead_code, clippy::excessive_precision)]
pub fn dft_float3(ri: &[f64], ii: &[f64], ro: &mut [f64], io: &mut [f64]) {
    const KP866025403: f64 = 0.866025403784438646763723170752936183471402627;
    const KP500000000: f64 = 0.500000000000000000000000000000000000000000000;

    let T1 = ri[0];
    let T2 = ii[0];
    let T3 = ri[1] + ri[2];
    let T4 = ii[1] + ii[2];
    let T5 = KP866025403 * (ri[2] - ri[1]);
    let T6 = KP866025403 * (ii[1] - ii[2]);
    ro[0] = T1 + T3;
    io[0] = T2 + T4;
    let T7 = T1 - (KP500000000 * T3);
    let T8 = T2 - (KP500000000 * T4);
    ro[1] = T7 + T6;
    io[1] = T8 + T5;
    ro[2] = T7 - T6;
    io[2] = T8 - T5;
}
