use power_algebra::{growth_profile, MultilinearOperator, ParameterSet};

fn main() {
    for params in [ParameterSet::m3(), ParameterSet::m4()] {
        let op = MultilinearOperator::from_params(&params).expect("published set is valid");
        let profile = growth_profile(&op, 8).expect("growth profile");
        println!("{}", params.name());
        for stats in profile {
            println!(
                "  k = {:>2}: {:>4} monomials, degree {}",
                stats.exponent, stats.monomials, stats.degree
            );
        }
    }
}
