//! Example: size-4 complex DFT kernel
//!
//! Walks a radix-2 schedule through each stage of the generator and runs the
//! result through the evaluator.
//!
//! Run with: cargo run --example emit_dft4

use num_complex::Complex64;
use schedule_to_kernel::eval::{direct_dft, mean_abs_error, step_input, verify_step};
use schedule_to_kernel::{compile, Analyzer, CodeGenerator, Evaluator, Parser, Program};

const SCHEDULE: &str = "\
(:= T1 (+ xi[0] xi[2]))
(:= T2 (- xi[0] xi[2]))
(:= T3 (+ xi[1] xi[3]))
(:= T4 (* I (- xi[1] xi[3])))
(:= xo[0] (+ T1 T3))
(:= xo[2] (- T1 T3))
(:= xo[1] (+ T2 (- T4)))
(:= xo[3] (+ T2 T4))
";

fn main() {
    println!("=== Size-4 Complex DFT Example ===\n");

    // Example 1: one call from schedule to source
    println!("Example 1: compile()\n");

    let kernel = compile(SCHEDULE, "", "dft_cmplx4").unwrap();
    println!("{}\n", kernel.summary());
    println!("{}", kernel.source);

    // Example 2: the stages one by one
    println!("Example 2: parse, analyze, generate\n");

    let statements = Parser::new(SCHEDULE).parse_program().unwrap();
    println!("Parsed {} statements", statements.len());

    let analyzed = Analyzer::new()
        .analyze(Program::new(Vec::new(), statements))
        .unwrap();
    println!("Signature: {}", analyzed.signature);
    println!("Size: {}", analyzed.size);

    let generated = CodeGenerator::new("dft_cmplx4").generate(&analyzed).unwrap();
    assert_eq!(generated.source, kernel.source);
    println!();

    // Example 3: numeric check against the direct DFT
    println!("Example 3: evaluation\n");

    let input = step_input(analyzed.size);
    let output = Evaluator::new(&analyzed).unwrap().run(&input).unwrap();
    for (k, value) in output.iter().enumerate() {
        println!("  X[{}] = {:+.3} {:+.3}i", k, value.re, value.im);
    }

    let reference = direct_dft(&input, -1.0);
    println!("\nMean step error: {:e}", mean_abs_error(&output, &reference));
    println!("verify_step:     {:e}", verify_step(&analyzed).unwrap());

    let impulse: Vec<Complex64> = (0..4).map(|k| Complex64::new(if k == 0 { 1.0 } else { 0.0 }, 0.0)).collect();
    println!("\nImpulse response: {:?}", Evaluator::new(&analyzed).unwrap().run(&impulse).unwrap());
}
