use power_algebra::{KeyExchange, MultilinearOperator, ParameterSet, SimplePrng};

fn main() {
    for params in [ParameterSet::m3(), ParameterSet::m4()] {
        let op = MultilinearOperator::from_params(&params).expect("published set is valid");
        let kx = KeyExchange::from_params(&op, &params).expect("published base is valid");
        let mut rng = SimplePrng::new(2024);
        let alice = kx.keygen(&mut rng).expect("keygen");
        let bob = kx.keygen(&mut rng).expect("keygen");
        let (a, b) = (*alice.public_share(), *bob.public_share());
        let s1 = alice.derive(&b).expect("derive");
        let s2 = bob.derive(&a).expect("derive");
        if s1 == s2 {
            println!("{}: agreed on {}", params.name(), s1.value());
        } else {
            eprintln!("{}: shared secrets disagree.", params.name());
            std::process::exit(1);
        }
    }
}
