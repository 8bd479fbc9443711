//! Command-line driver for the power_algebra primitives.
//!
//! Prints parameter sets, evaluates powers, runs a local key exchange
//! between two simulated parties, writes symbolic growth records, and
//! audits a parameter set's algebraic laws.

use power_algebra::{
    audit, growth_profile, write_text_series, GrowthRecord, KeyExchange, MultilinearOperator,
    ParameterSet, PowerEngine, SimplePrng,
};
use rand::{CryptoRng, RngCore};
use std::{env, path::PathBuf};

fn fatal(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn print_help() {
    println!("Usage: power_algebra <command> ...");
    println!("  params <m3|m4|toy|file.json>");
    println!("  pow <set> <k> [c0 c1 ...]");
    println!("  exchange <set> [--seed <u64>]");
    println!("  growth <set> <max_k> [--out <dir>]");
    println!("  audit <set> [--bound <N>] [--samples <N>] [--seed <u64>]");
}

fn main() {
    let mut args = env::args().skip(1);
    let command = args.next();
    let rest: Vec<String> = args.collect();
    match command.as_deref() {
        Some("params") => cmd_params(rest),
        Some("pow") => cmd_pow(rest),
        Some("exchange") => cmd_exchange(rest),
        Some("growth") => cmd_growth(rest),
        Some("audit") => cmd_audit(rest),
        Some("help") | Some("--help") | None => print_help(),
        Some(other) => {
            print_help();
            fatal(&format!("unknown command: {other}"));
        }
    }
}

fn load_params(source: &str) -> ParameterSet {
    let loaded = if source.ends_with(".json") {
        ParameterSet::from_json_file(source)
    } else {
        ParameterSet::by_name(source)
    };
    loaded.unwrap_or_else(|err| fatal(&format!("failed to load parameter set {source}: {err}")))
}

fn load_operator(params: &ParameterSet) -> MultilinearOperator {
    MultilinearOperator::from_params(params)
        .unwrap_or_else(|err| fatal(&format!("invalid parameter set: {err}")))
}

fn parse_u64(value: Option<String>, flag: &str) -> u64 {
    let value = value.unwrap_or_else(|| fatal(&format!("{flag} expects a value")));
    value
        .parse()
        .unwrap_or_else(|_| fatal(&format!("invalid {flag} value: {value}")))
}

fn cmd_params(args: Vec<String>) {
    let source = args
        .first()
        .unwrap_or_else(|| fatal("Usage: power_algebra params <m3|m4|toy|file.json>"));
    let params = load_params(source);
    let json = params
        .to_json()
        .unwrap_or_else(|err| fatal(&format!("failed to encode parameter set: {err}")));
    println!("{json}");
}

fn cmd_pow(args: Vec<String>) {
    let mut iter = args.into_iter();
    let source = iter
        .next()
        .unwrap_or_else(|| fatal("Usage: power_algebra pow <set> <k> [c0 c1 ...]"));
    let k = parse_u64(iter.next(), "<k>");
    let params = load_params(&source);
    let op = load_operator(&params);
    let coords: Vec<u64> = iter.map(|c| parse_u64(Some(c), "coordinate")).collect();
    let a = if coords.is_empty() {
        *params.base()
    } else {
        op.vector(&coords)
            .unwrap_or_else(|err| fatal(&format!("invalid vector: {err}")))
    };
    let (value, trace) = PowerEngine::new(&op)
        .power_with_trace(&a, k)
        .unwrap_or_else(|err| fatal(&format!("power failed: {err}")));
    println!("set:         {}", op.name());
    println!("base:        {a}");
    println!("exponent:    {k}");
    println!("power:       {value}");
    println!("evaluations: {}", trace.evaluations());
}

fn cmd_exchange(args: Vec<String>) {
    let mut iter = args.into_iter();
    let source = iter
        .next()
        .unwrap_or_else(|| fatal("Usage: power_algebra exchange <set> [--seed <u64>]"));
    let mut seed = None;
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => seed = Some(parse_u64(iter.next(), "--seed")),
            other => fatal(&format!("unknown argument: {other}")),
        }
    }
    let params = load_params(&source);
    let op = load_operator(&params);
    match seed {
        Some(seed) => run_exchange(&op, &params, &mut SimplePrng::new(seed)),
        None => run_exchange(&op, &params, &mut rand::thread_rng()),
    }
}

fn run_exchange<R: RngCore + CryptoRng>(
    op: &MultilinearOperator,
    params: &ParameterSet,
    rng: &mut R,
) {
    let kx = KeyExchange::from_params(op, params)
        .unwrap_or_else(|err| fatal(&format!("invalid exchange setup: {err}")));
    let alice = kx
        .keygen(rng)
        .unwrap_or_else(|err| fatal(&format!("key generation failed: {err}")));
    let bob = kx
        .keygen(rng)
        .unwrap_or_else(|err| fatal(&format!("key generation failed: {err}")));
    let alice_share = *alice.public_share();
    let bob_share = *bob.public_share();
    println!("set:          {}", op.name());
    println!("base:         {}", kx.base());
    println!("alice share:  {}", alice_share.to_hex());
    println!("bob share:    {}", bob_share.to_hex());
    let s1 = alice
        .derive(&bob_share)
        .unwrap_or_else(|err| fatal(&format!("derivation failed: {err}")));
    let s2 = bob
        .derive(&alice_share)
        .unwrap_or_else(|err| fatal(&format!("derivation failed: {err}")));
    if s1 != s2 {
        fatal("shared secrets disagree");
    }
    println!("session key:  {}", hex::encode(s1.session_key()));
}

fn cmd_growth(args: Vec<String>) {
    let mut iter = args.into_iter();
    let source = iter
        .next()
        .unwrap_or_else(|| fatal("Usage: power_algebra growth <set> <max_k> [--out <dir>]"));
    let max_k = parse_u64(iter.next(), "<max_k>");
    let mut out_dir: Option<PathBuf> = None;
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => {
                let dir = iter
                    .next()
                    .unwrap_or_else(|| fatal("--out expects a directory"));
                out_dir = Some(PathBuf::from(dir));
            }
            other => fatal(&format!("unknown argument: {other}")),
        }
    }
    let params = load_params(&source);
    let op = load_operator(&params);
    let stats = growth_profile(&op, max_k)
        .unwrap_or_else(|err| fatal(&format!("growth profile failed: {err}")));
    println!("{:>4} | {:>10} | {:>6} | per component", "k", "monomials", "degree");
    println!("{}", "-".repeat(48));
    for s in &stats {
        println!(
            "{:>4} | {:>10} | {:>6} | {:?}",
            s.exponent, s.monomials, s.degree, s.per_component
        );
    }
    if let Some(dir) = out_dir {
        let lines = GrowthRecord::from_stats(op.name(), &stats).to_lines();
        let prefix = format!("growth_{}", op.name().to_lowercase());
        match write_text_series(&dir, &prefix, max_k as usize, &lines) {
            Ok(path) => println!("record written to {}", path.display()),
            Err(err) => fatal(&format!("failed to write growth record: {err}")),
        }
    }
}

fn cmd_audit(args: Vec<String>) {
    let mut iter = args.into_iter();
    let source = iter.next().unwrap_or_else(|| {
        fatal("Usage: power_algebra audit <set> [--bound <N>] [--samples <N>] [--seed <u64>]")
    });
    let mut bound = 16u64;
    let mut samples = 4usize;
    let mut seed = 0u64;
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--bound" => bound = parse_u64(iter.next(), "--bound"),
            "--samples" => samples = parse_u64(iter.next(), "--samples") as usize,
            "--seed" => seed = parse_u64(iter.next(), "--seed"),
            other => fatal(&format!("unknown argument: {other}")),
        }
    }
    let params = load_params(&source);
    let op = load_operator(&params);
    let report = audit(&op, params.base(), bound, samples, seed)
        .unwrap_or_else(|err| fatal(&format!("audit failed: {err}")));
    println!("set:                    {}", report.name);
    println!("bound:                  {}", report.bound);
    println!("vectors checked:        {}", report.bases_checked);
    println!("power-associative:      {}", report.power_associative);
    println!("internally commutative: {}", report.internally_commutative);
    match &report.non_commutative_witness {
        Some((a, b)) => println!("non-commutative:        a = {a}, b = {b}"),
        None => println!("non-commutative:        no witness found"),
    }
    match &report.non_associative_witness {
        Some((a, b, c)) => println!("non-associative:        a = {a}, b = {b}, c = {c}"),
        None => println!("non-associative:        no witness found"),
    }
    if !report.passed() {
        fatal("audit FAILED");
    }
    println!("audit passed");
}
